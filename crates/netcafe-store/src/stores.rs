//! # Store Bundle
//!
//! `Stores` groups one handle per contract so the engine takes a single
//! value at construction.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stores::in_memory()                                                    │
//! │       │                                                                 │
//! │       ├── .with_sessions(Arc::new(MySessionStore))  ← swap one backend  │
//! │       ▼                                                                 │
//! │  CafeEngine::builder().stores(stores).build()                          │
//! │                                                                         │
//! │  Every handle is Arc<dyn Trait>; cloning Stores is cheap.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use crate::repository::memory::MemoryTable;
use crate::repository::{
    AccountStore, ComputerStore, InvoiceStore, ServiceStore, SessionStore, TopUpHistoryStore,
};

/// One handle per store contract.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub computers: Arc<dyn ComputerStore>,
    pub services: Arc<dyn ServiceStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub invoices: Arc<dyn InvoiceStore>,
    pub top_ups: Arc<dyn TopUpHistoryStore>,
}

impl Stores {
    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Stores {
            accounts: Arc::new(MemoryTable::<netcafe_core::Account>::new()),
            computers: Arc::new(MemoryTable::<netcafe_core::Computer>::new()),
            services: Arc::new(MemoryTable::<netcafe_core::ServiceItem>::new()),
            sessions: Arc::new(MemoryTable::<netcafe_core::Session>::new()),
            invoices: Arc::new(MemoryTable::<netcafe_core::Invoice>::new()),
            top_ups: Arc::new(MemoryTable::<netcafe_core::TopUpHistory>::new()),
        }
    }

    pub fn with_accounts(mut self, store: Arc<dyn AccountStore>) -> Self {
        self.accounts = store;
        self
    }

    pub fn with_computers(mut self, store: Arc<dyn ComputerStore>) -> Self {
        self.computers = store;
        self
    }

    pub fn with_services(mut self, store: Arc<dyn ServiceStore>) -> Self {
        self.services = store;
        self
    }

    pub fn with_sessions(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = store;
        self
    }

    pub fn with_invoices(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.invoices = store;
        self
    }

    pub fn with_top_ups(mut self, store: Arc<dyn TopUpHistoryStore>) -> Self {
        self.top_ups = store;
        self
    }
}

impl Default for Stores {
    fn default() -> Self {
        Stores::in_memory()
    }
}

impl fmt::Debug for Stores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcafe_core::{new_id, Computer, Money};

    #[tokio::test]
    async fn test_clones_share_backends() {
        let stores = Stores::in_memory();
        let copy = stores.clone();

        let pc = Computer {
            id: new_id(),
            name: "PC-1".to_string(),
            rate_per_hour: Money::from_minor(10_000),
            is_occupied: false,
        };
        stores.computers.save(&pc).await.unwrap();

        assert_eq!(copy.computers.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_swap_single_backend() {
        let shared = Arc::new(MemoryTable::<Computer>::new());
        let stores = Stores::in_memory().with_computers(shared.clone());

        let pc = Computer {
            id: new_id(),
            name: "PC-2".to_string(),
            rate_per_hour: Money::zero(),
            is_occupied: false,
        };
        stores.computers.save(&pc).await.unwrap();
        assert_eq!(shared.len().await, 1);
    }
}
