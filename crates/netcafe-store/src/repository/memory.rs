//! # In-Memory Stores
//!
//! `MemoryTable<T>` keeps rows in a `tokio::sync::RwLock<Vec<T>>` and
//! implements every store contract. Used by tests and the demo binary.
//!
//! Rows are cloned in and out; callers never hold a reference into the
//! table across an `.await`.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use netcafe_core::{Account, Computer, Invoice, ServiceItem, Session, TopUpHistory};

use super::{
    AccountStore, ComputerStore, InvoiceStore, ServiceStore, SessionStore, TopUpHistoryStore,
};
use crate::error::{StoreError, StoreResult};

/// An entity that can live in a [`MemoryTable`].
pub trait Row: Clone + Send + Sync + 'static {
    /// Entity name used in logs and errors.
    const ENTITY: &'static str;

    fn row_id(&self) -> &str;

    /// Secondary unique column, if any.
    fn unique_key(&self) -> Option<(&'static str, &str)> {
        None
    }
}

impl Row for Account {
    const ENTITY: &'static str = "Account";

    fn row_id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("username", &self.username))
    }
}

impl Row for Computer {
    const ENTITY: &'static str = "Computer";

    fn row_id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<(&'static str, &str)> {
        Some(("name", &self.name))
    }
}

impl Row for ServiceItem {
    const ENTITY: &'static str = "ServiceItem";

    fn row_id(&self) -> &str {
        &self.id
    }
}

impl Row for Session {
    const ENTITY: &'static str = "Session";

    fn row_id(&self) -> &str {
        &self.id
    }
}

impl Row for Invoice {
    const ENTITY: &'static str = "Invoice";

    fn row_id(&self) -> &str {
        &self.id
    }
}

impl Row for TopUpHistory {
    const ENTITY: &'static str = "TopUpHistory";

    fn row_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Table
// =============================================================================

/// Insertion-ordered in-memory table.
#[derive(Debug)]
pub struct MemoryTable<T> {
    rows: RwLock<Vec<T>>,
}

pub type MemoryAccountStore = MemoryTable<Account>;
pub type MemoryComputerStore = MemoryTable<Computer>;
pub type MemoryServiceStore = MemoryTable<ServiceItem>;
pub type MemorySessionStore = MemoryTable<Session>;
pub type MemoryInvoiceStore = MemoryTable<Invoice>;
pub type MemoryTopUpHistoryStore = MemoryTable<TopUpHistory>;

impl<T: Row> Default for MemoryTable<T> {
    fn default() -> Self {
        MemoryTable {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Row> MemoryTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn upsert(&self, row: &T) -> StoreResult<()> {
        let mut rows = self.rows.write().await;

        if let Some((field, value)) = row.unique_key() {
            let taken = rows
                .iter()
                .any(|r| r.row_id() != row.row_id() && r.unique_key() == Some((field, value)));
            if taken {
                return Err(StoreError::duplicate(field, value));
            }
        }

        match rows.iter_mut().find(|r| r.row_id() == row.row_id()) {
            Some(existing) => *existing = row.clone(),
            None => rows.push(row.clone()),
        }

        debug!(entity = T::ENTITY, id = %row.row_id(), "Saved row");
        Ok(())
    }

    async fn get(&self, id: &str) -> Option<T> {
        self.find_first(|r| r.row_id() == id).await
    }

    async fn find_first(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().await.iter().find(|r| pred(r)).cloned()
    }

    async fn all(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }
}

// =============================================================================
// Store Implementations
// =============================================================================

#[async_trait]
impl AccountStore for MemoryTable<Account> {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        Ok(self.find_first(|a| a.username == username).await)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.get(id).await)
    }

    async fn save(&self, account: &Account) -> StoreResult<()> {
        self.upsert(account).await
    }

    async fn find_all(&self) -> StoreResult<Vec<Account>> {
        Ok(self.all().await)
    }
}

/// Implements a save / find_by_id / find_all contract over a table.
macro_rules! impl_basic_store {
    ($store:ident, $entity:ty) => {
        #[async_trait]
        impl $store for MemoryTable<$entity> {
            async fn save(&self, row: &$entity) -> StoreResult<()> {
                self.upsert(row).await
            }

            async fn find_by_id(&self, id: &str) -> StoreResult<Option<$entity>> {
                Ok(self.get(id).await)
            }

            async fn find_all(&self) -> StoreResult<Vec<$entity>> {
                Ok(self.all().await)
            }
        }
    };
}

impl_basic_store!(ComputerStore, Computer);
impl_basic_store!(ServiceStore, ServiceItem);
impl_basic_store!(SessionStore, Session);
impl_basic_store!(InvoiceStore, Invoice);
impl_basic_store!(TopUpHistoryStore, TopUpHistory);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use netcafe_core::{new_id, AccountRole, Money};

    fn account(username: &str) -> Account {
        Account {
            id: new_id(),
            username: username.to_string(),
            password: "123".to_string(),
            display_name: username.to_uppercase(),
            phone: String::new(),
            balance: Money::zero(),
            role: AccountRole::Customer,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn computer(name: &str) -> Computer {
        Computer {
            id: new_id(),
            name: name.to_string(),
            rate_per_hour: Money::from_minor(10_000),
            is_occupied: false,
        }
    }

    #[tokio::test]
    async fn test_account_save_and_find() {
        let store = MemoryAccountStore::new();
        let user = account("user1");
        store.save(&user).await.unwrap();

        let by_name = store.find_by_username("user1").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(store.find_by_id(&user.id).await.unwrap(), Some(user));
        assert_eq!(store.find_by_username("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let store = MemoryAccountStore::new();
        let mut user = account("user1");
        store.save(&user).await.unwrap();

        user.balance = Money::from_minor(200_000);
        store.save(&user).await.unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, Money::from_minor(200_000));
    }

    #[tokio::test]
    async fn test_unique_username() {
        let store = MemoryAccountStore::new();
        store.save(&account("user1")).await.unwrap();

        let err = store.save(&account("user1")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { ref field, .. } if field == "username"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unique_computer_name() {
        let store = MemoryComputerStore::new();
        let mut pc = computer("PC-1");
        store.save(&pc).await.unwrap();

        pc.is_occupied = true;
        store.save(&pc).await.unwrap();
        assert!(store.save(&computer("PC-1")).await.is_err());
        assert!(store.find_by_id(&pc.id).await.unwrap().unwrap().is_occupied);
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let store = MemoryComputerStore::new();
        for i in 1..=5 {
            store.save(&computer(&format!("PC-{i}"))).await.unwrap();
        }

        let names: Vec<String> = store.find_all().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["PC-1", "PC-2", "PC-3", "PC-4", "PC-5"]);
    }
}
