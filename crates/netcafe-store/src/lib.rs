//! # netcafe-store: Persistence Layer for Netcafe
//!
//! Store contracts for every entity the engine persists, plus in-memory
//! implementations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Netcafe Data Flow                                │
//! │                                                                         │
//! │  netcafe-engine (login, logout, top_up, ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  netcafe-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Stores     │    │   Contracts   │    │  MemoryTable │  │   │
//! │  │   │  (stores.rs)  │───►│ AccountStore  │◄───│  (tests and  │  │   │
//! │  │   │               │    │ SessionStore  │    │   the demo)  │  │   │
//! │  │   │ Arc<dyn ..>   │    │ InvoiceStore  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`repository`] - Store traits and the in-memory implementation
//! - [`stores`] - The `Stores` bundle handed to the engine
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust
//! use netcafe_store::Stores;
//!
//! let stores = Stores::in_memory();
//! let _accounts = stores.accounts.clone();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod repository;
pub mod stores;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use repository::memory::{
    MemoryAccountStore, MemoryComputerStore, MemoryInvoiceStore, MemoryServiceStore,
    MemorySessionStore, MemoryTable, MemoryTopUpHistoryStore,
};
pub use repository::{
    AccountStore, ComputerStore, InvoiceStore, ServiceStore, SessionStore, TopUpHistoryStore,
};
pub use stores::Stores;
