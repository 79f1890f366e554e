//! Shared fixtures for the engine scenario tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use netcafe_core::{Account, Computer, Invoice, Money, Operator, ServiceCategory, ServiceItem};
use netcafe_engine::{CafeEngine, ManualClock, NewAccount};
use netcafe_store::{
    AccountStore, InvoiceStore, MemoryAccountStore, MemoryInvoiceStore, StoreError, StoreResult,
    Stores,
};

pub struct Cafe {
    pub engine: CafeEngine,
    pub clock: Arc<ManualClock>,
    pub pc1: Computer,
    pub pc2: Computer,
    pub coca: ServiceItem,
    pub snack: ServiceItem,
}

pub async fn cafe() -> Cafe {
    cafe_with_stores(Stores::in_memory()).await
}

/// A café with two 10 000/h computers, Coca at 15 000 and Snack at 20 000.
pub async fn cafe_with_stores(stores: Stores) -> Cafe {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
    ));
    let engine = CafeEngine::builder()
        .with_stores(stores)
        .with_clock(clock.clone())
        .build()
        .unwrap();

    let pc1 = engine.computers().register("PC-1", Money::from_minor(10_000)).await.unwrap();
    let pc2 = engine.computers().register("PC-2", Money::from_minor(10_000)).await.unwrap();
    let coca = engine
        .catalog()
        .create_item("Coca", Money::from_minor(15_000), ServiceCategory::Drink)
        .await
        .unwrap();
    let snack = engine
        .catalog()
        .create_item("Snack", Money::from_minor(20_000), ServiceCategory::Snack)
        .await
        .unwrap();

    Cafe {
        engine,
        clock,
        pc1,
        pc2,
        coca,
        snack,
    }
}

/// Registers `username` (password "123") with `balance`.
pub async fn customer(engine: &CafeEngine, username: &str, balance: i64) -> Account {
    engine
        .accounts()
        .register(
            NewAccount::customer(username, "123", username.to_uppercase())
                .with_balance(Money::from_minor(balance)),
        )
        .await
        .unwrap()
}

pub fn cashier() -> Operator {
    Operator::employee("emp-1", "Cashier")
}

pub async fn stored_balance(engine: &CafeEngine, username: &str) -> Money {
    engine
        .stores()
        .accounts
        .find_by_username(username)
        .await
        .unwrap()
        .unwrap()
        .balance
}

/// Account store whose saves can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyAccountStore {
    inner: MemoryAccountStore,
    failing: AtomicBool,
}

impl FlakyAccountStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountStore for FlakyAccountStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        self.inner.find_by_username(username).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, account: &Account) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("account store offline".to_string()));
        }
        self.inner.save(account).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Account>> {
        self.inner.find_all().await
    }
}

/// Invoice store whose saves can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyInvoiceStore {
    inner: MemoryInvoiceStore,
    failing: AtomicBool,
}

impl FlakyInvoiceStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl InvoiceStore for FlakyInvoiceStore {
    async fn save(&self, invoice: &Invoice) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("invoice store offline".to_string()));
        }
        self.inner.save(invoice).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Invoice>> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Invoice>> {
        self.inner.find_all().await
    }
}
