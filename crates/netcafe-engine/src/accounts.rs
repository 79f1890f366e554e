//! # Account Administration
//!
//! Registration, deactivation and lookup. Lookups prefer the online cell,
//! so a balance shown to staff is the live one.

use std::sync::Arc;

use tracing::{info, warn};

use netcafe_core::validation::{
    validate_display_name, validate_opening_balance, validate_password, validate_username,
};
use netcafe_core::{new_id, Account, AccountRole, CoreError, Money, ValidationError};
use netcafe_store::Stores;

use crate::account_context::AccountContext;
use crate::clock::Clock;
use crate::error::EngineResult;

/// Input for [`AccountService::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub phone: String,
    pub role: AccountRole,
    pub opening_balance: Money,
}

impl NewAccount {
    /// A customer account with a zero balance.
    pub fn customer(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        NewAccount {
            username: username.into(),
            password: password.into(),
            display_name: display_name.into(),
            phone: String::new(),
            role: AccountRole::Customer,
            opening_balance: Money::zero(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.opening_balance = balance;
        self
    }
}

#[derive(Debug)]
pub struct AccountService {
    context: Arc<AccountContext>,
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(context: Arc<AccountContext>, stores: Stores, clock: Arc<dyn Clock>) -> Self {
        AccountService {
            context,
            stores,
            clock,
        }
    }

    /// Creates an account. A taken username is a `Duplicate` validation
    /// error.
    pub async fn register(&self, new: NewAccount) -> EngineResult<Account> {
        validate_username(&new.username)?;
        validate_password(&new.password)?;
        validate_display_name(&new.display_name)?;
        validate_opening_balance(new.opening_balance)?;

        if self.stores.accounts.find_by_username(&new.username).await?.is_some() {
            return Err(ValidationError::Duplicate {
                field: "username".to_string(),
                value: new.username,
            }
            .into());
        }

        let account = Account {
            id: new_id(),
            username: new.username,
            password: new.password,
            display_name: new.display_name.trim().to_string(),
            phone: new.phone,
            balance: new.opening_balance,
            role: new.role,
            is_active: true,
            created_at: self.clock.now(),
        };
        self.stores.accounts.save(&account).await?;

        info!(username = %account.username, role = ?account.role, "Account registered");
        Ok(account)
    }

    /// Blocks future logins. Accounts are never deleted.
    ///
    /// Refused with `InvalidState` while the account is online, since the
    /// logout write-back would restore the cached flag.
    pub async fn deactivate(&self, username: &str) -> EngineResult<Account> {
        let _guard = self.context.account_guard(username).await;

        if self.context.is_online(username) {
            warn!(username = %username, "Deactivation rejected: account online");
            return Err(CoreError::InvalidState {
                entity: "account".to_string(),
                id: username.to_string(),
                reason: "account is online".to_string(),
            }
            .into());
        }

        let mut account = self.load(username).await?;
        if account.is_active {
            account.is_active = false;
            self.stores.accounts.save(&account).await?;
            info!(username = %username, "Account deactivated");
        }
        Ok(account)
    }

    /// The account with its live balance.
    pub async fn find(&self, username: &str) -> EngineResult<Account> {
        match self.context.get(username) {
            Some(cell) => Ok(cell.snapshot()),
            None => self.load(username).await,
        }
    }

    /// Every account, online balances overlaid.
    pub async fn list(&self) -> EngineResult<Vec<Account>> {
        let mut accounts = self.stores.accounts.find_all().await?;
        for account in &mut accounts {
            if let Some(cell) = self.context.get(&account.username) {
                *account = cell.snapshot();
            }
        }
        Ok(accounts)
    }

    async fn load(&self, username: &str) -> EngineResult<Account> {
        self.stores
            .accounts
            .find_by_username(username)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(username.to_string()).into())
    }
}
