//! # Top-Up Engine
//!
//! Credits account balances and keeps the audit trail.
//!
//! ## Online vs Offline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount ≤ 0 ──► InvalidAmount                                          │
//! │                                                                         │
//! │  ONLINE (cell registered and attached)                                 │
//! │    credit the shared cell ──► visible to the next order check          │
//! │    persisted by the logout write-back                                  │
//! │                                                                         │
//! │  OFFLINE (not registered, or the cell was just detached by logout)     │
//! │    account guard ──► re-check context ──► load ──► credit ──► save     │
//! │                                                                         │
//! │  then: append TopUpHistory                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use netcafe_core::validation::validate_note;
use netcafe_core::{new_id, CoreError, Money, Operator, TopUpHistory};
use netcafe_store::Stores;

use crate::account_context::AccountContext;
use crate::clock::Clock;
use crate::error::EngineResult;

#[derive(Debug)]
pub struct TopUpEngine {
    context: Arc<AccountContext>,
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl TopUpEngine {
    pub fn new(context: Arc<AccountContext>, stores: Stores, clock: Arc<dyn Clock>) -> Self {
        TopUpEngine {
            context,
            stores,
            clock,
        }
    }

    /// Adds `amount` to the balance of `username`.
    ///
    /// ## Errors
    /// - `InvalidAmount`: amount is zero or negative
    /// - `AccountNotFound`: no such username
    /// - `Validation`: note too long
    /// - `Store`: persistence failed
    pub async fn top_up(
        &self,
        username: &str,
        operator: &Operator,
        amount: Money,
        note: &str,
    ) -> EngineResult<TopUpHistory> {
        if !amount.is_positive() {
            warn!(username = %username, amount = %amount, "Top-up rejected: non-positive amount");
            return Err(CoreError::InvalidAmount(amount).into());
        }
        validate_note(note)?;

        let (account_id, balance) = match self.credit_online(username, amount)? {
            Some(credited) => credited,
            None => self.credit_offline(username, amount).await?,
        };

        let entry = TopUpHistory {
            id: new_id(),
            account_id,
            username: username.to_string(),
            operator: operator.clone(),
            amount,
            note: note.to_string(),
            created_at: self.clock.now(),
        };
        self.stores.top_ups.save(&entry).await?;

        info!(
            username = %username,
            amount = %amount,
            balance = %balance,
            operator = %operator.name,
            "Top-up recorded"
        );
        Ok(entry)
    }

    /// Credits the online cell. `None` when the account is offline or its
    /// cell is being handed back to storage.
    fn credit_online(&self, username: &str, amount: Money) -> EngineResult<Option<(String, Money)>> {
        let Some(cell) = self.context.get(username) else {
            return Ok(None);
        };

        match cell.credit(amount) {
            Ok(balance) => {
                debug!(username = %username, "Credited online account");
                Ok(Some((cell.snapshot().id, balance)))
            }
            Err(CoreError::AccountDetached(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn credit_offline(&self, username: &str, amount: Money) -> EngineResult<(String, Money)> {
        let _guard = self.context.account_guard(username).await;

        // Under the guard a registered cell is always attached: logout has
        // either finished (cell gone) or failed and re-attached it.
        if let Some(cell) = self.context.get(username) {
            let balance = cell.credit(amount)?;
            return Ok((cell.snapshot().id, balance));
        }

        let mut account = self
            .stores
            .accounts
            .find_by_username(username)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(username.to_string()))?;

        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(CoreError::InvalidAmount(amount))?;
        self.stores.accounts.save(&account).await?;

        debug!(username = %username, "Credited offline account");
        Ok((account.id, account.balance))
    }

    /// Audit trail of one account, oldest first.
    pub async fn history_for(&self, username: &str) -> EngineResult<Vec<TopUpHistory>> {
        let mut entries: Vec<TopUpHistory> = self
            .stores
            .top_ups
            .find_all()
            .await?
            .into_iter()
            .filter(|t| t.username == username)
            .collect();
        entries.sort_by_key(|t| t.created_at);
        Ok(entries)
    }
}
