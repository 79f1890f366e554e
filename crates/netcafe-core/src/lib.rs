//! # netcafe-core: Pure Business Logic for Netcafe
//!
//! This crate is the **heart** of Netcafe. It contains the billing rules
//! of the café as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Netcafe Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Counter front end / CLI                      │   │
//! │  │    login ──► add_order ──► top_up ──► logout ──► reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               netcafe-engine (sessions, locks)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ netcafe-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  money   │ │ billing  │ │ invoice  │          │   │
//! │  │   │ Account  │ │  Money   │ │  Policy  │ │ Builder  │          │   │
//! │  │   │ Session  │ │          │ │          │ │          │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORES • NO LOCKS • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Account, Computer, Session, OrderItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`billing`] - Time billing and its rounding policy
//! - [`invoice`] - Invoice assembly over a closed session
//! - [`report`] - Revenue summary over invoices and top-ups
//!
//! ## Example Usage
//!
//! ```rust
//! use netcafe_core::billing::BillingPolicy;
//! use netcafe_core::money::Money;
//!
//! let policy = BillingPolicy::default(); // per started minute, round up
//! let rate = Money::from_minor(10_000);  // 10 000 per hour
//!
//! assert_eq!(policy.charge_for_minutes(60, rate), Money::from_minor(10_000));
//! assert_eq!(policy.charge_for_minutes(1, rate), Money::from_minor(167));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod invoice;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use billing::BillingPolicy;
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::InvoiceBuilder;
pub use money::Money;
pub use report::{DateRange, RevenueSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of usernames, display names and item names.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of the free-text note on a top-up.
pub const MAX_NOTE_LEN: usize = 500;
