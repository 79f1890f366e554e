//! # Store Contracts
//!
//! Async persistence traits, one per entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SessionManager / OrderEngine / TopUpEngine                            │
//! │       │                                                                 │
//! │       │  stores.accounts.find_by_username("user1")                     │
//! │       ▼                                                                 │
//! │  Arc<dyn AccountStore>                                                 │
//! │  ├── find_by_username(&self, username)                                 │
//! │  ├── find_by_id(&self, id)                                             │
//! │  ├── save(&self, account)      (insert or replace by id)               │
//! │  └── find_all(&self)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MemoryStore (tests, demo) │ any durable backend                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups return `Ok(None)` when nothing matches. `save` is an upsert
//! keyed by the entity id. `find_all` returns rows in insertion order.

use async_trait::async_trait;
use netcafe_core::{Account, Computer, Invoice, ServiceItem, Session, TopUpHistory};

use crate::error::StoreResult;

pub mod memory;

/// Persistence for customer and staff accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>>;

    /// Inserts or replaces. A username taken by another id is a
    /// `UniqueViolation`.
    async fn save(&self, account: &Account) -> StoreResult<()>;

    async fn find_all(&self) -> StoreResult<Vec<Account>>;
}

/// Persistence for rentable computers.
#[async_trait]
pub trait ComputerStore: Send + Sync {
    /// Inserts or replaces. A name taken by another id is a
    /// `UniqueViolation`.
    async fn save(&self, computer: &Computer) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Computer>>;

    async fn find_all(&self) -> StoreResult<Vec<Computer>>;
}

/// Persistence for the service catalog.
#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn save(&self, item: &ServiceItem) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<ServiceItem>>;

    async fn find_all(&self) -> StoreResult<Vec<ServiceItem>>;
}

/// Persistence for sessions, saved at login and again at logout.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &Session) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Session>>;

    async fn find_all(&self) -> StoreResult<Vec<Session>>;
}

/// Persistence for invoices. Invoices are written once.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn save(&self, invoice: &Invoice) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Invoice>>;

    async fn find_all(&self) -> StoreResult<Vec<Invoice>>;
}

/// Append-only top-up audit trail.
#[async_trait]
pub trait TopUpHistoryStore: Send + Sync {
    async fn save(&self, entry: &TopUpHistory) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<TopUpHistory>>;

    async fn find_all(&self) -> StoreResult<Vec<TopUpHistory>>;
}
