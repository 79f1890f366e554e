//! # Demo Business Day
//!
//! Seeds a café over in-memory stores and plays one scripted day on a
//! manual clock, so the output is the same on every run.
//!
//! ## Script
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. seed: 10 customers, 5 employees, PC-1..PC-10 at 10,000/h, 5 items   │
//! │  2. user1 → PC-1, user2 → PC-2; opening top-ups 200,000 / 150,000       │
//! │  3. half the session later: user1 orders                                │
//! │       Coca ×1 (ACCOUNT) • Snack ×2 (CASH) • Mi ly ×1 (ACCOUNT)          │
//! │     then a 100,000 top-up while user1 is still online                   │
//! │  4. end of session: both log out, invoices printed                      │
//! │  5. order history and revenue summary                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Args;
use serde::Serialize;

use netcafe_core::report::{DateRange, RevenueSummary};
use netcafe_core::{
    Account, AccountRole, Computer, Invoice, Money, Operator, OrderItem, PaymentSource,
    ServiceCategory, ServiceItem,
};
use netcafe_engine::{CafeEngine, EngineConfig, ManualClock, NewAccount};

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// Length of each demo session in minutes
    #[arg(long, default_value_t = 60)]
    pub minutes: i64,
}

/// Everything the demo produced.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub invoices: Vec<Invoice>,
    pub orders: Vec<OrderItem>,
    pub summary: RevenueSummary,
    pub balances: Vec<(String, Money)>,
}

struct Seed {
    employees: Vec<Account>,
    computers: Vec<Computer>,
    coca: ServiceItem,
    snack: ServiceItem,
    noodles: ServiceItem,
}

pub async fn run(config: EngineConfig, args: DemoArgs, json: bool) -> Result<(), CliError> {
    let report = play(config.clone(), args.minutes).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&config, &report);
    }
    Ok(())
}

/// Runs the scripted day and collects the results.
pub async fn play(config: EngineConfig, minutes: i64) -> Result<DemoReport, CliError> {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine = CafeEngine::builder()
        .with_config(config)
        .with_clock(clock.clone())
        .build()?;

    let seed = seed(&engine).await?;
    let operator = |i: usize| Operator::employee(&seed.employees[i].id, &seed.employees[i].display_name);

    let s1 = engine.login("user1", "123", &seed.computers[0].id).await?;
    let s2 = engine.login("user2", "123", &seed.computers[1].id).await?;

    engine.top_up("user1", &operator(0), Money::from_minor(200_000), "Opening top-up").await?;
    engine.top_up("user2", &operator(1), Money::from_minor(150_000), "Opening top-up").await?;

    clock.advance(Duration::minutes(minutes / 2));

    engine.add_order(&s1, &seed.coca.id, 1, PaymentSource::Account).await?;
    engine.add_order(&s1, &seed.snack.id, 2, PaymentSource::Cash).await?;
    let noodles = engine.add_order(&s1, &seed.noodles.id, 1, PaymentSource::Account).await?;
    engine.mark_served(&s1, &noodles.id)?;

    engine.top_up("user1", &operator(2), Money::from_minor(100_000), "Mid-session top-up").await?;

    clock.advance(Duration::minutes(minutes - minutes / 2));

    let mut invoices = vec![engine.logout(&s1).await?, engine.logout(&s2).await?];
    invoices.sort_by_key(|i| i.created_at);

    let mut balances = Vec::new();
    for username in ["user1", "user2"] {
        balances.push((username.to_string(), engine.accounts().find(username).await?.balance));
    }

    Ok(DemoReport {
        invoices,
        orders: engine.reporting().order_history(DateRange::all()).await?,
        summary: engine.reporting().revenue_summary(DateRange::all()).await?,
        balances,
    })
}

async fn seed(engine: &CafeEngine) -> Result<Seed, CliError> {
    for i in 1..=10 {
        engine
            .accounts()
            .register(
                NewAccount::customer(format!("user{i}"), "123", format!("User {i}"))
                    .with_phone(format!("09000000{i}")),
            )
            .await?;
    }

    let mut employees = Vec::new();
    for i in 1..=5 {
        let employee = NewAccount {
            role: AccountRole::Employee,
            ..NewAccount::customer(format!("emp{i}"), "123", format!("Employee {i}"))
                .with_phone(format!("09111111{i}"))
        };
        employees.push(engine.accounts().register(employee).await?);
    }

    let mut computers = Vec::new();
    for i in 1..=10 {
        computers.push(
            engine
                .computers()
                .register(&format!("PC-{i}"), Money::from_minor(10_000))
                .await?,
        );
    }

    let catalog = engine.catalog();
    let coca = catalog.create_item("Coca", Money::from_minor(15_000), ServiceCategory::Drink).await?;
    catalog.create_item("Cafe", Money::from_minor(30_000), ServiceCategory::Drink).await?;
    let noodles = catalog.create_item("Mi ly", Money::from_minor(25_000), ServiceCategory::Food).await?;
    let snack = catalog.create_item("Snack", Money::from_minor(20_000), ServiceCategory::Snack).await?;
    catalog.create_item("Banh ngot", Money::from_minor(18_000), ServiceCategory::Snack).await?;

    Ok(Seed {
        employees,
        computers,
        coca,
        snack,
        noodles,
    })
}

fn print_report(config: &EngineConfig, report: &DemoReport) {
    let money = |m: Money| config.format_money(m);

    println!("===== {} =====", config.cafe.name);
    for invoice in &report.invoices {
        println!("Invoice #{}", invoice.id);
        println!("  User:              {}", invoice.account_name);
        println!("  PC:                {}", invoice.computer_name);
        println!("  Minutes billed:    {}", invoice.billed_minutes);
        println!("  Time:              {}", money(invoice.time_amount));
        println!("  Service (ACCOUNT): {}", money(invoice.service_account_amount));
        println!("  Service (CASH):    {}", money(invoice.service_cash_amount));
        println!("  Service (TOTAL):   {}", money(invoice.service_amount));
        println!("  TOTAL:             {}", money(invoice.total_amount));
        println!("----------------------------------");
    }

    println!("Order history");
    for order in &report.orders {
        println!(
            "  {} | {:?} | qty {} | {} | {:?} | {:?}",
            order.name_snapshot,
            order.category,
            order.quantity,
            money(order.cost()),
            order.payment_source,
            order.status
        );
    }

    println!("Balances");
    for (username, balance) in &report.balances {
        println!("  {:<8} {}", username, money(*balance));
    }

    let summary = &report.summary;
    println!("Revenue");
    println!("  Top-ups:        {}", money(summary.top_up_total));
    println!("  Time:           {}", money(summary.time_revenue));
    println!("  Services:       {}", money(summary.service_total));
    println!("  Cash collected: {}", money(summary.cash_collected));
}
