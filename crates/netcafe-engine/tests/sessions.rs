//! End-to-end session scenarios: login, orders, top-ups, logout, invoice.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use common::{
    cafe, cafe_with_stores, cashier, customer, stored_balance, FlakyAccountStore,
    FlakyInvoiceStore,
};
use netcafe_core::report::DateRange;
use netcafe_core::{
    CoreError, Money, OrderStatus, PaymentSource, ServiceCategory, Session, SessionStatus,
};
use netcafe_store::{InvoiceStore, SessionStore, StoreError, StoreResult, Stores};

#[tokio::test]
async fn test_full_session_invoice() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 200_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine
        .add_order(&session, &cafe.coca.id, 1, PaymentSource::Account)
        .await
        .unwrap();
    engine
        .add_order(&session, &cafe.snack.id, 2, PaymentSource::Cash)
        .await
        .unwrap();
    assert_eq!(session.account().balance(), Money::from_minor(185_000));

    cafe.clock.advance(Duration::hours(1));
    let invoice = engine.logout(&session).await.unwrap();

    assert_eq!(invoice.billed_minutes, 60);
    assert_eq!(invoice.time_amount, Money::from_minor(10_000));
    assert_eq!(invoice.service_account_amount, Money::from_minor(15_000));
    assert_eq!(invoice.service_cash_amount, Money::from_minor(40_000));
    assert_eq!(invoice.service_amount, Money::from_minor(55_000));
    assert_eq!(invoice.total_amount, Money::from_minor(25_000));
    assert_eq!(invoice.account_name, "USER1");
    assert_eq!(invoice.computer_name, "PC-1");
    assert_eq!(invoice.order_items.len(), 2);
    assert!(invoice.is_reconciled());

    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(185_000));
    assert!(!engine.context().is_online("user1"));
    assert!(!engine.computers().find(&cafe.pc1.id).await.unwrap().is_occupied);

    let stored: Session = engine.stores().sessions.find_by_id(session.id()).await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::Closed);
    assert_eq!(stored.orders.len(), 2);
    assert!(engine.stores().invoices.find_by_id(&invoice.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_closed_session_rejects_orders_and_second_logout() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 50_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine.logout(&session).await.unwrap();

    let err = engine
        .add_order(&session, &cafe.coca.id, 1, PaymentSource::Account)
        .await
        .unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::InactiveSession(_))));

    let err = engine.logout(&session).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::InvalidState { .. })));

    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(50_000));
    assert_eq!(engine.stores().invoices.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_length_session_bills_nothing() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    let invoice = engine.logout(&session).await.unwrap();

    assert_eq!(invoice.billed_minutes, 0);
    assert_eq!(invoice.total_amount, Money::zero());
    assert!(invoice.order_items.is_empty());
}

#[tokio::test]
async fn test_insufficient_balance_leaves_state_unchanged() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 10_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    let err = engine
        .add_order(&session, &cafe.coca.id, 1, PaymentSource::Account)
        .await
        .unwrap_err();

    assert!(matches!(
        err.core_error(),
        Some(CoreError::InsufficientBalance { .. })
    ));
    assert_eq!(session.account().balance(), Money::from_minor(10_000));
    assert!(session.snapshot().orders.is_empty());

    // Cash orders never look at the balance.
    engine
        .add_order(&session, &cafe.coca.id, 3, PaymentSource::Cash)
        .await
        .unwrap();
    assert_eq!(session.account().balance(), Money::from_minor(10_000));
}

#[tokio::test]
async fn test_invalid_quantity_and_unknown_item() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 100_000).await;
    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();

    for quantity in [0, -2] {
        let err = engine
            .add_order(&session, &cafe.coca.id, quantity, PaymentSource::Account)
            .await
            .unwrap_err();
        assert!(matches!(err.core_error(), Some(CoreError::InvalidQuantity { .. })));
    }

    let err = engine
        .add_order(&session, "no-such-item", 1, PaymentSource::Cash)
        .await
        .unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::ServiceItemNotFound(_))));

    assert_eq!(session.account().balance(), Money::from_minor(100_000));
    assert!(session.snapshot().orders.is_empty());
}

#[tokio::test]
async fn test_price_frozen_at_order_time() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 100_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine
        .add_order(&session, &cafe.coca.id, 2, PaymentSource::Account)
        .await
        .unwrap();

    engine.catalog().update_price(&cafe.coca.id, Money::from_minor(99_000)).await.unwrap();
    engine.catalog().lock(&cafe.coca.id).await.unwrap();

    let err = engine
        .add_order(&session, &cafe.coca.id, 1, PaymentSource::Cash)
        .await
        .unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::LockedItem(_))));

    let invoice = engine.logout(&session).await.unwrap();
    assert_eq!(invoice.order_items[0].unit_price_at_order, Money::from_minor(15_000));
    assert_eq!(invoice.order_items[0].name_snapshot, "Coca");
    assert_eq!(invoice.service_account_amount, Money::from_minor(30_000));
    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(70_000));
}

#[tokio::test]
async fn test_rate_frozen_at_login() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine.computers().update_rate(&cafe.pc1.id, Money::from_minor(60_000)).await.unwrap();

    cafe.clock.advance(Duration::minutes(30));
    let invoice = engine.logout(&session).await.unwrap();
    assert_eq!(invoice.time_amount, Money::from_minor(5_000));
}

#[tokio::test]
async fn test_mark_served() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    let order = engine
        .add_order(&session, &cafe.snack.id, 1, PaymentSource::Cash)
        .await
        .unwrap();

    let served = engine.mark_served(&session, &order.id).unwrap();
    assert_eq!(served.status, OrderStatus::Served);

    let err = engine.mark_served(&session, &order.id).unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::InvalidState { .. })));
    let err = engine.mark_served(&session, "missing").unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::OrderNotFound(_))));

    let invoice = engine.logout(&session).await.unwrap();
    assert_eq!(invoice.order_items[0].status, OrderStatus::Served);
}

// =============================================================================
// Login Rejections
// =============================================================================

#[tokio::test]
async fn test_login_rejections() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;
    customer(engine, "user2", 0).await;

    let err = engine.login("user1", "wrong", &cafe.pc1.id).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::Auth { .. })));
    let err = engine.login("ghost", "123", &cafe.pc1.id).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::Auth { .. })));
    let err = engine.login("user1", "123", "no-such-pc").await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::ComputerNotFound(_))));

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();

    let err = engine.login("user2", "123", &cafe.pc1.id).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::Occupancy { .. })));
    let err = engine.login("user1", "123", &cafe.pc2.id).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::AlreadyOnline(_))));

    engine.logout(&session).await.unwrap();
    engine.login("user2", "123", &cafe.pc1.id).await.unwrap();
}

#[tokio::test]
async fn test_inactive_account_cannot_login() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;

    engine.accounts().deactivate("user1").await.unwrap();
    let err = engine.login("user1", "123", &cafe.pc1.id).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::Auth { .. })));
}

#[tokio::test]
async fn test_active_session_queries() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;
    customer(engine, "user2", 0).await;

    let first = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    cafe.clock.advance(Duration::minutes(1));
    let second = engine.login("user2", "123", &cafe.pc2.id).await.unwrap();

    let active = engine.sessions().active_sessions();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].id(), first.id());
    assert_eq!(
        engine.sessions().active_session_for_computer(&cafe.pc2.id).unwrap().id(),
        second.id()
    );
    assert_eq!(engine.sessions().active_session_for_user("user1").unwrap().id(), first.id());
    assert_eq!(engine.context().online_usernames(), vec!["user1", "user2"]);

    engine.logout(&first).await.unwrap();
    assert!(engine.sessions().find_active(first.id()).is_none());
    assert!(engine.sessions().active_session_for_computer(&cafe.pc1.id).is_none());
    assert_eq!(engine.context().online_usernames(), vec!["user2"]);
}

// =============================================================================
// Top-ups
// =============================================================================

#[tokio::test]
async fn test_online_top_up_visible_and_persisted() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 10_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine
        .top_up("user1", &cashier(), Money::from_minor(50_000), "counter")
        .await
        .unwrap();

    assert_eq!(session.account().balance(), Money::from_minor(60_000));
    assert_eq!(
        engine.context().get("user1").unwrap().balance(),
        Money::from_minor(60_000)
    );
    assert_eq!(engine.accounts().find("user1").await.unwrap().balance, Money::from_minor(60_000));

    // The credit is spendable immediately.
    engine
        .add_order(&session, &cafe.coca.id, 2, PaymentSource::Account)
        .await
        .unwrap();

    engine.logout(&session).await.unwrap();
    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(30_000));
}

#[tokio::test]
async fn test_offline_top_up() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 1_000).await;

    let entry = engine
        .top_up("user1", &cashier(), Money::from_minor(20_000), "")
        .await
        .unwrap();
    assert_eq!(entry.amount, Money::from_minor(20_000));
    assert_eq!(entry.operator.name, "Cashier");
    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(21_000));
    assert!(!engine.context().is_online("user1"));

    engine
        .top_up("user1", &cashier(), Money::from_minor(5_000), "bonus")
        .await
        .unwrap();
    let history = engine.top_up_history("user1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].note, "bonus");
}

#[tokio::test]
async fn test_top_up_rejections() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 1_000).await;

    for amount in [0, -500] {
        let err = engine
            .top_up("user1", &cashier(), Money::from_minor(amount), "")
            .await
            .unwrap_err();
        assert!(matches!(err.core_error(), Some(CoreError::InvalidAmount(_))));
    }

    let err = engine
        .top_up("nobody", &cashier(), Money::from_minor(1_000), "")
        .await
        .unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::AccountNotFound(_))));

    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(1_000));
    assert!(engine.top_up_history("user1").await.unwrap().is_empty());
}

// =============================================================================
// Store Failures
// =============================================================================

#[derive(Debug, Default)]
struct UnavailableSessionStore;

#[async_trait]
impl SessionStore for UnavailableSessionStore {
    async fn save(&self, _session: &Session) -> StoreResult<()> {
        Err(StoreError::Unavailable("session store offline".to_string()))
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<Session>> {
        Ok(None)
    }

    async fn find_all(&self) -> StoreResult<Vec<Session>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_login_rolls_back_on_store_failure() {
    let stores = Stores::in_memory().with_sessions(Arc::new(UnavailableSessionStore));
    let cafe = cafe_with_stores(stores).await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;

    let err = engine.login("user1", "123", &cafe.pc1.id).await.unwrap_err();
    assert!(matches!(err.store_error(), Some(StoreError::Unavailable(_))));

    assert!(!engine.context().is_online("user1"));
    assert!(engine.sessions().active_sessions().is_empty());
    assert!(engine.sessions().active_session_for_computer(&cafe.pc1.id).is_none());

    // Neither the computer nor the username stayed claimed.
    let err = engine.login("user1", "123", &cafe.pc1.id).await.unwrap_err();
    assert!(err.store_error().is_some());
}

#[tokio::test]
async fn test_failed_write_back_keeps_account_online_until_retried() {
    let accounts = Arc::new(FlakyAccountStore::default());
    let cafe = cafe_with_stores(Stores::in_memory().with_accounts(accounts.clone())).await;
    let engine = &cafe.engine;
    customer(engine, "user1", 200_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine
        .add_order(&session, &cafe.coca.id, 1, PaymentSource::Account)
        .await
        .unwrap();

    accounts.set_failing(true);
    let err = engine.logout(&session).await.unwrap_err();
    assert!(matches!(err.store_error(), Some(StoreError::Unavailable(_))));

    // Session is closed but the balance lives on in the context.
    assert!(!session.is_active());
    assert!(engine.context().is_online("user1"));
    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(200_000));

    engine
        .top_up("user1", &cashier(), Money::from_minor(5_000), "")
        .await
        .unwrap();
    let err = engine.login("user1", "123", &cafe.pc2.id).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::AlreadyOnline(_))));

    accounts.set_failing(false);
    engine.write_back("user1").await.unwrap();

    assert!(!engine.context().is_online("user1"));
    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(190_000));
    engine.login("user1", "123", &cafe.pc2.id).await.unwrap();
}

#[tokio::test]
async fn test_failed_invoice_save_is_finished_by_retried_logout() {
    let invoices = Arc::new(FlakyInvoiceStore::default());
    let cafe = cafe_with_stores(Stores::in_memory().with_invoices(invoices.clone())).await;
    let engine = &cafe.engine;
    customer(engine, "user1", 200_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine
        .add_order(&session, &cafe.coca.id, 1, PaymentSource::Account)
        .await
        .unwrap();
    cafe.clock.advance(Duration::hours(1));

    invoices.set_failing(true);
    let err = engine.logout(&session).await.unwrap_err();
    assert!(matches!(err.store_error(), Some(StoreError::Unavailable(_))));

    assert!(!session.is_active());
    assert!(engine.sessions().has_pending_logout(session.id()));
    assert!(engine.sessions().active_session_for_computer(&cafe.pc1.id).is_none());
    assert!(engine.context().is_online("user1"));

    let err = engine.login("user1", "123", &cafe.pc2.id).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::AlreadyOnline(_))));

    // Still down: the pending logout survives a failed retry.
    let err = engine.logout(&session).await.unwrap_err();
    assert!(err.store_error().is_some());
    assert!(engine.sessions().has_pending_logout(session.id()));

    // The retry bills the original close, not the time of the retry.
    cafe.clock.advance(Duration::minutes(30));
    invoices.set_failing(false);
    let invoice = engine.logout(&session).await.unwrap();

    assert_eq!(invoice.billed_minutes, 60);
    assert_eq!(invoice.total_amount, Money::from_minor(25_000));
    assert!(!engine.sessions().has_pending_logout(session.id()));
    assert_eq!(
        engine.stores().invoices.find_by_id(&invoice.id).await.unwrap(),
        Some(invoice.clone())
    );
    assert_eq!(engine.stores().invoices.find_all().await.unwrap().len(), 1);
    assert_eq!(stored_balance(engine, "user1").await, Money::from_minor(185_000));
    assert!(!engine.context().is_online("user1"));

    let err = engine.logout(&session).await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::InvalidState { .. })));
    engine.login("user1", "123", &cafe.pc2.id).await.unwrap();
}

#[tokio::test]
async fn test_write_back_finishes_pending_logout() {
    let invoices = Arc::new(FlakyInvoiceStore::default());
    let cafe = cafe_with_stores(Stores::in_memory().with_invoices(invoices.clone())).await;
    let engine = &cafe.engine;
    customer(engine, "user1", 50_000).await;

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    cafe.clock.advance(Duration::minutes(30));

    invoices.set_failing(true);
    engine.logout(&session).await.unwrap_err();
    invoices.set_failing(false);

    engine.write_back("user1").await.unwrap();

    assert!(!engine.sessions().has_pending_logout(session.id()));
    assert!(!engine.context().is_online("user1"));
    let stored = engine.stores().invoices.find_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].session_id, session.id());
    assert_eq!(stored[0].time_amount, Money::from_minor(5_000));
}

#[tokio::test]
async fn test_order_rejected_when_session_totals_would_overflow() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;
    let gift = engine
        .catalog()
        .create_item("Gift card", Money::from_minor(i64::MAX), ServiceCategory::Snack)
        .await
        .unwrap();

    let session = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    engine
        .add_order(&session, &gift.id, 1, PaymentSource::Cash)
        .await
        .unwrap();

    let err = engine
        .add_order(&session, &gift.id, 1, PaymentSource::Cash)
        .await
        .unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::AmountOverflow(_))));
    assert_eq!(session.snapshot().orders.len(), 1);

    let invoice = engine.logout(&session).await.unwrap();
    assert_eq!(invoice.service_cash_amount, Money::from_minor(i64::MAX));
    assert_eq!(invoice.total_amount, Money::zero());
    assert!(!engine.context().is_online("user1"));
}

#[tokio::test]
async fn test_write_back_refused_while_session_active() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 0).await;

    engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    let err = engine.write_back("user1").await.unwrap_err();
    assert!(matches!(err.core_error(), Some(CoreError::InvalidState { .. })));
    assert!(engine.context().is_online("user1"));

    // Nothing to do for an offline account.
    engine.write_back("nobody").await.unwrap();
}

// =============================================================================
// Reporting
// =============================================================================

#[tokio::test]
async fn test_revenue_after_sessions() {
    let cafe = cafe().await;
    let engine = &cafe.engine;
    customer(engine, "user1", 100_000).await;
    customer(engine, "user2", 0).await;

    engine
        .top_up("user2", &cashier(), Money::from_minor(30_000), "")
        .await
        .unwrap();

    let first = engine.login("user1", "123", &cafe.pc1.id).await.unwrap();
    let second = engine.login("user2", "123", &cafe.pc2.id).await.unwrap();
    engine
        .add_order(&first, &cafe.coca.id, 1, PaymentSource::Account)
        .await
        .unwrap();
    engine
        .add_order(&second, &cafe.snack.id, 1, PaymentSource::Cash)
        .await
        .unwrap();

    cafe.clock.advance(Duration::minutes(90));
    engine.logout(&first).await.unwrap();
    engine.logout(&second).await.unwrap();

    let summary = engine.reporting().revenue_summary(DateRange::all()).await.unwrap();
    assert_eq!(summary.invoice_count, 2);
    assert_eq!(summary.top_up_count, 1);
    assert_eq!(summary.time_revenue, Money::from_minor(30_000));
    assert_eq!(summary.service_account, Money::from_minor(15_000));
    assert_eq!(summary.service_cash, Money::from_minor(20_000));
    assert_eq!(summary.service_total, Money::from_minor(35_000));
    assert_eq!(summary.cash_collected, Money::from_minor(50_000));

    let orders = engine.reporting().order_history(DateRange::all()).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(engine.reporting().invoices(DateRange::all()).await.unwrap().len(), 2);
    assert_eq!(engine.reporting().top_ups(DateRange::all()).await.unwrap().len(), 1);

    let other_day = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let empty = engine
        .reporting()
        .revenue_summary(DateRange::day(other_day))
        .await
        .unwrap();
    assert_eq!(empty.invoice_count, 0);
    assert_eq!(empty.cash_collected, Money::zero());
}
