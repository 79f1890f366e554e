//! # Revenue Reporting
//!
//! Aggregates persisted invoices and top-ups over a date range.
//!
//! ## Figures
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  top_up_total     Σ TopUpHistory.amount                                 │
//! │  time_revenue     Σ Invoice.time_amount                                 │
//! │  service_cash     Σ Invoice.service_cash_amount                         │
//! │  service_account  Σ Invoice.service_account_amount                      │
//! │  service_total    service_cash + service_account                        │
//! │  cash_collected   top_up_total + service_cash   (money in the drawer)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Account-paid charges are not cash: that money entered the drawer
//! earlier, as a top-up.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Invoice, OrderItem, TopUpHistory};

/// Inclusive calendar-day range. An open bound matches everything on
/// that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Range matching every date.
    pub fn all() -> Self {
        DateRange::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Range covering a single day.
    pub fn day(day: NaiveDate) -> Self {
        DateRange::between(day, day)
    }

    /// Checks whether the calendar day of `at` (UTC) falls in the range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let date = at.date_naive();
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Revenue totals over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub range: DateRange,
    pub top_up_total: Money,
    pub time_revenue: Money,
    pub service_cash: Money,
    pub service_account: Money,
    pub service_total: Money,
    pub cash_collected: Money,
    pub invoice_count: usize,
    pub top_up_count: usize,
}

impl RevenueSummary {
    /// Computes the summary. Invoices are dated by `created_at` (session
    /// end), top-ups by their own `created_at`.
    pub fn compute(invoices: &[Invoice], top_ups: &[TopUpHistory], range: DateRange) -> Self {
        let mut summary = RevenueSummary {
            range,
            ..Default::default()
        };

        for invoice in invoices.iter().filter(|i| range.contains(i.created_at)) {
            summary.time_revenue += invoice.time_amount;
            summary.service_cash += invoice.service_cash_amount;
            summary.service_account += invoice.service_account_amount;
            summary.invoice_count += 1;
        }

        for top_up in top_ups.iter().filter(|t| range.contains(t.created_at)) {
            summary.top_up_total += top_up.amount;
            summary.top_up_count += 1;
        }

        summary.service_total = summary.service_cash + summary.service_account;
        summary.cash_collected = summary.top_up_total + summary.service_cash;
        summary
    }
}

/// Order items of every invoice in `range`, oldest first.
pub fn order_history(invoices: &[Invoice], range: DateRange) -> Vec<OrderItem> {
    let mut items: Vec<OrderItem> = invoices
        .iter()
        .filter(|i| range.contains(i.created_at))
        .flat_map(|i| i.order_items.iter().cloned())
        .collect();
    items.sort_by_key(|o| o.ordered_at);
    items
}

// =============================================================================
// Unit Tests
// =============================================================================
