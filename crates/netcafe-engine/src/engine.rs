//! # Cafe Engine
//!
//! Facade wiring every service to one `AccountContext`, one set of stores
//! and one clock.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CafeEngine                                                             │
//! │  ├── config: EngineConfig                                              │
//! │  ├── context: Arc<AccountContext> ◄──┬── SessionManager                │
//! │  │                                    ├── TopUpEngine                   │
//! │  │                                    └── AccountService                │
//! │  ├── OrderEngine (clock only: works on SessionHandle + cell)           │
//! │  ├── ServiceCatalog, ComputerService, Reporting (stores only)          │
//! │  └── stores: Stores (shared by all of the above)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use netcafe_core::{
    Invoice, InvoiceBuilder, Money, Operator, OrderItem, PaymentSource, ServiceItem, TopUpHistory,
};
use netcafe_store::Stores;

use crate::account_context::AccountContext;
use crate::accounts::AccountService;
use crate::catalog::ServiceCatalog;
use crate::clock::{Clock, SystemClock};
use crate::computers::ComputerService;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::order::OrderEngine;
use crate::reporting::Reporting;
use crate::session::{SessionHandle, SessionManager};
use crate::topup::TopUpEngine;

#[derive(Debug)]
pub struct CafeEngine {
    config: EngineConfig,
    context: Arc<AccountContext>,
    stores: Stores,
    sessions: SessionManager,
    orders: OrderEngine,
    top_ups: TopUpEngine,
    catalog: ServiceCatalog,
    accounts: AccountService,
    computers: ComputerService,
    reporting: Reporting,
}

impl CafeEngine {
    /// Default config, in-memory stores, wall clock.
    pub fn new() -> Self {
        Self::with_parts(EngineConfig::default(), Stores::in_memory(), Arc::new(SystemClock))
    }

    pub fn builder() -> CafeEngineBuilder {
        CafeEngineBuilder::new()
    }

    fn with_parts(config: EngineConfig, stores: Stores, clock: Arc<dyn Clock>) -> Self {
        let context = Arc::new(AccountContext::new());
        let invoices = InvoiceBuilder::new(config.billing_policy());

        CafeEngine {
            sessions: SessionManager::new(context.clone(), stores.clone(), clock.clone(), invoices),
            orders: OrderEngine::new(clock.clone()),
            top_ups: TopUpEngine::new(context.clone(), stores.clone(), clock.clone()),
            catalog: ServiceCatalog::new(stores.clone(), clock.clone()),
            accounts: AccountService::new(context.clone(), stores.clone(), clock),
            computers: ComputerService::new(stores.clone()),
            reporting: Reporting::new(stores.clone()),
            config,
            context,
            stores,
        }
    }

    // =========================================================================
    // Front-End Surface
    // =========================================================================

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        computer_id: &str,
    ) -> EngineResult<Arc<SessionHandle>> {
        self.sessions.login(username, password, computer_id).await
    }

    pub async fn logout(&self, session: &SessionHandle) -> EngineResult<Invoice> {
        self.sessions.logout(session).await
    }

    /// Finishes a logout of `username` that failed to persist.
    pub async fn write_back(&self, username: &str) -> EngineResult<()> {
        self.sessions.write_back(username).await
    }

    /// Orders a catalog item by id, at its current price.
    pub async fn add_order(
        &self,
        session: &SessionHandle,
        service_item_id: &str,
        quantity: i64,
        payment_source: PaymentSource,
    ) -> EngineResult<OrderItem> {
        let item = self.catalog.find(service_item_id).await?;
        self.add_order_item(session, &item, quantity, payment_source)
    }

    /// Orders an already loaded item.
    pub fn add_order_item(
        &self,
        session: &SessionHandle,
        item: &ServiceItem,
        quantity: i64,
        payment_source: PaymentSource,
    ) -> EngineResult<OrderItem> {
        Ok(self.orders.add_order(session, item, quantity, payment_source)?)
    }

    pub fn mark_served(&self, session: &SessionHandle, order_id: &str) -> EngineResult<OrderItem> {
        Ok(self.orders.mark_served(session, order_id)?)
    }

    pub async fn top_up(
        &self,
        username: &str,
        operator: &Operator,
        amount: Money,
        note: &str,
    ) -> EngineResult<TopUpHistory> {
        self.top_ups.top_up(username, operator, amount, note).await
    }

    pub async fn top_up_history(&self, username: &str) -> EngineResult<Vec<TopUpHistory>> {
        self.top_ups.history_for(username).await
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<AccountContext> {
        &self.context
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }

    pub fn computers(&self) -> &ComputerService {
        &self.computers
    }

    pub fn reporting(&self) -> &Reporting {
        &self.reporting
    }
}

impl Default for CafeEngine {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a CafeEngine with options.
#[derive(Debug, Default)]
pub struct CafeEngineBuilder {
    config: Option<EngineConfig>,
    stores: Option<Stores>,
    clock: Option<Arc<dyn Clock>>,
}

impl CafeEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the engine. The config is validated first.
    pub fn build(self) -> EngineResult<CafeEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let stores = self.stores.unwrap_or_else(Stores::in_memory);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(CafeEngine::with_parts(config, stores, clock))
    }
}
