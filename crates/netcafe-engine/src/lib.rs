//! # netcafe-engine: Session / Billing Engine for Netcafe
//!
//! Everything that happens while customers are online: login, orders,
//! top-ups, logout and the invoice, with balances kept correct under
//! concurrent access.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Front end ──► CafeEngine                                             │
//! │                  │                                                      │
//! │     ┌────────────┼──────────────┬──────────────────┐                    │
//! │     ▼            ▼              ▼                  ▼                    │
//! │  SessionManager OrderEngine  TopUpEngine   Catalog / Accounts /        │
//! │     │            │              │          Computers / Reporting       │
//! │     │            ▼              │                  │                    │
//! │     │      SessionHandle        │                  │                    │
//! │     │   (Mutex<Session>)        │                  │                    │
//! │     │            │              │                  │                    │
//! │     └──────► AccountContext ◄───┘                  │                    │
//! │             (AccountCell per online account)       │                    │
//! │                      │                             │                    │
//! │                      ▼                             ▼                    │
//! │                 netcafe-store (Stores bundle, async contracts)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`account_context`] - Online accounts and their balance locks
//! - [`session`] - Login / logout state machine
//! - [`order`] - Order placement and serving
//! - [`topup`] - Balance credits and the audit trail
//! - [`catalog`] - Service menu administration
//! - [`accounts`] - Account registration and lookup
//! - [`computers`] - Computer administration
//! - [`reporting`] - Revenue queries
//! - [`config`] - Engine configuration (TOML + env)
//! - [`clock`] - Injectable time source
//! - [`engine`] - `CafeEngine` facade and builder
//! - [`error`] - Engine error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use netcafe_engine::{CafeEngine, EngineConfig};
//! use netcafe_core::{Money, PaymentSource};
//!
//! let engine = CafeEngine::builder()
//!     .with_config(EngineConfig::load_or_default(None))
//!     .build()?;
//!
//! let session = engine.login("user1", "123", &pc1.id).await?;
//! engine.add_order(&session, &coca.id, 1, PaymentSource::Account).await?;
//! let invoice = engine.logout(&session).await?;
//! println!("Total: {}", engine.config().format_money(invoice.total_amount));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod account_context;
pub mod accounts;
pub mod catalog;
pub mod clock;
pub mod computers;
pub mod config;
pub mod engine;
pub mod error;
pub mod order;
pub mod reporting;
pub mod session;
pub mod topup;

// =============================================================================
// Re-exports
// =============================================================================

pub use account_context::{AccountCell, AccountContext, AccountGuard, SharedAccount};
pub use accounts::{AccountService, NewAccount};
pub use catalog::{CatalogFilter, ServiceCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use computers::ComputerService;
pub use config::{BillingSettings, CafeSettings, EngineConfig};
pub use engine::{CafeEngine, CafeEngineBuilder};
pub use error::{EngineError, EngineResult};
pub use order::OrderEngine;
pub use reporting::Reporting;
pub use session::{SessionHandle, SessionManager};
pub use topup::TopUpEngine;
