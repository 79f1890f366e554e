//! # Account Context
//!
//! Registry of online accounts, keyed by username.
//!
//! ## Locking Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  AccountContext                                                         │
//! │  ├── online: Mutex<HashMap<username, Arc<AccountCell>>>                │
//! │  │     membership only; held for a map lookup, never for arithmetic    │
//! │  │                                                                      │
//! │  ├── guards: per-username tokio Mutex                                  │
//! │  │     serialises login loading, offline top-ups, logout write-back    │
//! │  │                                                                      │
//! │  └── AccountCell (one per online account)                              │
//! │        Mutex<{ account, attached }>                                    │
//! │        debit / credit are read-check-write under this lock             │
//! │                                                                         │
//! │  Lock order: session ──► account cell. Never .await while holding      │
//! │  either std mutex.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A cell is *detached* when logout or a replacing `put` removes it from
//! the registry. Detached cells refuse mutations, so a stale handle can
//! never change a balance that has already been written back to storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use netcafe_core::{Account, CoreError, CoreResult, Money};

// =============================================================================
// Account Cell
// =============================================================================

#[derive(Debug)]
struct CellState {
    account: Account,
    attached: bool,
}

/// The single in-memory instance of an online account.
#[derive(Debug)]
pub struct AccountCell {
    username: String,
    state: Mutex<CellState>,
}

/// Handle shared by the context, the session and the engines.
pub type SharedAccount = Arc<AccountCell>;

impl AccountCell {
    pub fn new(account: Account) -> Self {
        AccountCell {
            username: account.username.clone(),
            state: Mutex::new(CellState {
                account,
                attached: true,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState> {
        // Every mutation is a single assignment after its checks, so a
        // poisoned lock still guards consistent data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Copy of the account as it is right now.
    pub fn snapshot(&self) -> Account {
        self.lock().account.clone()
    }

    pub fn balance(&self) -> Money {
        self.lock().account.balance
    }

    pub fn is_attached(&self) -> bool {
        self.lock().attached
    }

    /// Subtracts `cost` if the balance covers it. Returns the new balance.
    ///
    /// On `InsufficientBalance` the balance is untouched.
    pub fn debit(&self, cost: Money) -> CoreResult<Money> {
        let mut state = self.lock();
        if !state.attached {
            return Err(CoreError::AccountDetached(self.username.clone()));
        }

        let available = state.account.balance;
        if available < cost {
            return Err(CoreError::InsufficientBalance {
                available,
                required: cost,
            });
        }

        state.account.balance = available - cost;
        Ok(state.account.balance)
    }

    /// Adds a positive `amount`. Returns the new balance.
    pub fn credit(&self, amount: Money) -> CoreResult<Money> {
        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount(amount));
        }

        let mut state = self.lock();
        if !state.attached {
            return Err(CoreError::AccountDetached(self.username.clone()));
        }

        state.account.balance = state
            .account
            .balance
            .checked_add(amount)
            .ok_or(CoreError::InvalidAmount(amount))?;
        Ok(state.account.balance)
    }

    /// Marks the cell read-only and returns the final account state.
    pub fn detach(&self) -> Account {
        let mut state = self.lock();
        state.attached = false;
        state.account.clone()
    }

    /// Undoes `detach` after a write-back that failed to persist.
    pub(crate) fn reattach(&self) {
        self.lock().attached = true;
    }
}

// =============================================================================
// Account Context
// =============================================================================

/// Online-account cache. Owned by the engine and injected where needed.
#[derive(Debug, Default)]
pub struct AccountContext {
    online: Mutex<HashMap<String, SharedAccount>>,
    guards: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn online(&self) -> MutexGuard<'_, HashMap<String, SharedAccount>> {
        self.online.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers `account`, replacing and detaching any previous cell for
    /// the same username.
    pub fn put(&self, account: Account) -> SharedAccount {
        let cell = Arc::new(AccountCell::new(account));
        let previous = self.online().insert(cell.username.clone(), cell.clone());

        if let Some(previous) = previous {
            previous.detach();
            debug!(username = %cell.username, "Replaced online account");
        }
        cell
    }

    /// Registers `account` only if its username is not online yet.
    pub fn try_register(&self, account: Account) -> CoreResult<SharedAccount> {
        let mut online = self.online();
        if online.contains_key(&account.username) {
            return Err(CoreError::AlreadyOnline(account.username));
        }

        let cell = Arc::new(AccountCell::new(account));
        online.insert(cell.username.clone(), cell.clone());
        Ok(cell)
    }

    /// The online cell for `username`. Absence is not an error.
    pub fn get(&self, username: &str) -> Option<SharedAccount> {
        self.online().get(username).cloned()
    }

    /// Unregisters and detaches the cell for `username`.
    pub fn remove(&self, username: &str) -> Option<SharedAccount> {
        let removed = self.online().remove(username);
        if let Some(cell) = &removed {
            cell.detach();
        }
        removed
    }

    /// Unregisters `cell` if it is still the registered one for its
    /// username. Returns whether it was removed.
    pub fn remove_cell(&self, cell: &SharedAccount) -> bool {
        let mut online = self.online();
        let is_current = online
            .get(cell.username())
            .is_some_and(|current| Arc::ptr_eq(current, cell));

        if is_current {
            online.remove(cell.username());
        }
        cell.detach();
        is_current
    }

    pub fn is_online(&self, username: &str) -> bool {
        self.online().contains_key(username)
    }

    /// Usernames currently online, sorted.
    pub fn online_usernames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.online().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.online().len()
    }

    pub fn is_empty(&self) -> bool {
        self.online().is_empty()
    }

    /// Waits for the handover guard of `username`.
    ///
    /// Held across store I/O by login (load and register), logout
    /// (detach and write back) and offline top-ups (load, credit, save),
    /// so those three never interleave for one account.
    pub async fn account_guard(&self, username: &str) -> AccountGuard<'_> {
        let mutex = self.guards().entry(username.to_string()).or_default().clone();
        AccountGuard {
            context: self,
            username: username.to_string(),
            guard: Some(mutex.lock_owned().await),
        }
    }

    fn guards(&self) -> MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
        self.guards.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of usernames with a live handover guard.
    pub fn guard_count(&self) -> usize {
        self.guards().len()
    }
}

/// Held handover guard for one username.
///
/// On drop the guard is released and its map entry removed, unless
/// another task already holds or waits for it.
#[derive(Debug)]
pub struct AccountGuard<'a> {
    context: &'a AccountContext,
    username: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Clones happen under this lock, so a count of one means idle.
        let mut guards = self.context.guards();
        if guards
            .get(&self.username)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            guards.remove(&self.username);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
