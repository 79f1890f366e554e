//! # Domain Types
//!
//! Core domain types used throughout Netcafe.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Account      │   │    Computer     │   │  ServiceItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  username       │   │  name           │   │  name           │       │
//! │  │  balance        │   │  rate_per_hour  │   │  unit_price     │       │
//! │  │  role           │   │  is_occupied    │   │  is_locked      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Session      │──►│   OrderItem     │   │  TopUpHistory   │       │
//! │  │  ─────────────  │ * │  ─────────────  │   │  ─────────────  │       │
//! │  │  status         │   │  unit_price_at  │   │  operator       │       │
//! │  │  started/ended  │   │  payment_source │   │  amount, note   │       │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │ logout                                                      │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │    Invoice      │  immutable snapshot                                │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sessions copy the account and computer names (and the hourly rate) at
//! login, and order items copy the item name and unit price at order time.
//! History never changes when the catalog does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Generates a new entity identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Account
// =============================================================================

/// Role of an account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    #[default]
    Customer,
    Employee,
}

/// A registered account with a prepaid balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name, unique across the café.
    pub username: String,

    /// Stored credential. Compared by equality only; never serialised.
    #[serde(skip_serializing, default)]
    pub password: String,

    /// Name printed on invoices.
    pub display_name: String,

    pub phone: String,

    /// Prepaid balance. Never negative.
    pub balance: Money,

    pub role: AccountRole,

    /// Deactivated accounts cannot log in (accounts are never deleted).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Checks the supplied password against the stored one.
    pub fn credentials_match(&self, password: &str) -> bool {
        self.password == password
    }
}

// =============================================================================
// Computer
// =============================================================================

/// A terminal that customers rent by the hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Computer {
    pub id: String,
    pub name: String,
    /// Price of one hour of use.
    pub rate_per_hour: Money,
    /// True while an ACTIVE session runs on this machine.
    pub is_occupied: bool,
}

// =============================================================================
// Service Catalog
// =============================================================================

/// Category of a sellable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceCategory {
    Drink,
    Food,
    Snack,
    Other,
}

/// A priced item on the counter menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    pub category: ServiceCategory,
    /// Locked items cannot be newly ordered.
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

/// Where the money for an order comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentSource {
    /// Collected at the counter; never touches the account balance.
    Cash,
    /// Debited from the prepaid balance when the order is placed.
    Account,
}

/// Fulfilment status of an order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Served,
}

/// One priced purchase placed during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub session_id: String,
    pub service_item_id: String,
    /// Item name at time of order (frozen).
    pub name_snapshot: String,
    pub category: ServiceCategory,
    pub quantity: i64,
    /// Unit price at time of order (frozen).
    pub unit_price_at_order: Money,
    pub payment_source: PaymentSource,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
}

impl OrderItem {
    /// Creates a pending order item, freezing the item's current price.
    ///
    /// Callers validate the quantity first; see `OrderItem::line_cost`.
    pub fn from_service_item(
        session_id: &str,
        item: &ServiceItem,
        quantity: i64,
        payment_source: PaymentSource,
        ordered_at: DateTime<Utc>,
    ) -> Self {
        OrderItem {
            id: new_id(),
            session_id: session_id.to_string(),
            service_item_id: item.id.clone(),
            name_snapshot: item.name.clone(),
            category: item.category,
            quantity,
            unit_price_at_order: item.unit_price,
            payment_source,
            status: OrderStatus::Pending,
            ordered_at,
        }
    }

    /// Cost of `quantity` units at `unit_price`, rejecting non-positive
    /// quantities and overflow.
    pub fn line_cost(unit_price: Money, quantity: i64) -> CoreResult<Money> {
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        unit_price
            .checked_mul_quantity(quantity)
            .ok_or(CoreError::InvalidQuantity { quantity })
    }

    /// Frozen cost of this line: `unit_price_at_order × quantity`.
    #[inline]
    pub fn cost(&self) -> Money {
        self.unit_price_at_order * self.quantity
    }

    /// Like [`OrderItem::cost`], but `None` on overflow.
    #[inline]
    pub fn checked_cost(&self) -> Option<Money> {
        self.unit_price_at_order.checked_mul_quantity(self.quantity)
    }

    /// `Pending → Served`. Any other transition is rejected.
    pub fn mark_served(&mut self) -> CoreResult<()> {
        match self.status {
            OrderStatus::Pending => {
                self.status = OrderStatus::Served;
                Ok(())
            }
            OrderStatus::Served => Err(CoreError::InvalidState {
                entity: "order".to_string(),
                id: self.id.clone(),
                reason: "order already served".to_string(),
            }),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Lifecycle state of a session. One-way: `Active → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Active,
    Closed,
}

/// The billable period a customer occupies one computer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub account_id: String,
    pub username: String,
    /// Display name at login (frozen).
    pub account_name: String,
    pub computer_id: String,
    /// Computer name at login (frozen).
    pub computer_name: String,
    /// Hourly rate at login (frozen).
    pub rate_per_hour: Money,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub orders: Vec<OrderItem>,
}

impl Session {
    /// Opens a new ACTIVE session for `account` on `computer`.
    pub fn open(account: &Account, computer: &Computer, started_at: DateTime<Utc>) -> Self {
        Session {
            id: new_id(),
            account_id: account.id.clone(),
            username: account.username.clone(),
            account_name: account.display_name.clone(),
            computer_id: computer.id.clone(),
            computer_name: computer.name.clone(),
            rate_per_hour: computer.rate_per_hour,
            started_at,
            ended_at: None,
            status: SessionStatus::Active,
            orders: Vec::new(),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Fails with `InactiveSession` unless the session is still billing.
    pub fn ensure_active(&self) -> CoreResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::InactiveSession(self.id.clone()))
        }
    }

    /// Closes the session. Closing is terminal; a second call fails with
    /// `InvalidState`.
    ///
    /// An `ended_at` earlier than `started_at` (clock skew) is clamped to
    /// the start so elapsed time is never negative.
    pub fn close(&mut self, ended_at: DateTime<Utc>) -> CoreResult<()> {
        if !self.is_active() {
            return Err(CoreError::InvalidState {
                entity: "session".to_string(),
                id: self.id.clone(),
                reason: "session already closed".to_string(),
            });
        }
        self.ended_at = Some(ended_at.max(self.started_at));
        self.status = SessionStatus::Closed;
        Ok(())
    }

    /// Sum of the frozen costs of every order paid by `source`.
    ///
    /// Fails with `AmountOverflow` instead of wrapping.
    pub fn service_total(&self, source: PaymentSource) -> CoreResult<Money> {
        self.orders
            .iter()
            .filter(|o| o.payment_source == source)
            .try_fold(Money::zero(), |acc, o| {
                o.checked_cost().and_then(|cost| acc.checked_add(cost))
            })
            .ok_or_else(|| CoreError::AmountOverflow(self.id.clone()))
    }

    /// Checks that one more order costing `cost` keeps every service total
    /// (cash, account and their sum) inside the `Money` range.
    pub fn ensure_order_fits(&self, cost: Money) -> CoreResult<()> {
        let cash = self.service_total(PaymentSource::Cash)?;
        let account = self.service_total(PaymentSource::Account)?;
        cash.checked_add(account)
            .and_then(|services| services.checked_add(cost))
            .map(|_| ())
            .ok_or_else(|| CoreError::AmountOverflow(self.id.clone()))
    }

    /// Finds an order placed in this session.
    pub fn order_mut(&mut self, order_id: &str) -> CoreResult<&mut OrderItem> {
        self.orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
    }
}

// =============================================================================
// Top-ups
// =============================================================================

/// Role of the staff member crediting an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorRole {
    Employee,
    Admin,
}

/// Who performed an audited operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub role: OperatorRole,
    pub id: String,
    pub name: String,
}

impl Operator {
    pub fn employee(id: impl Into<String>, name: impl Into<String>) -> Self {
        Operator {
            role: OperatorRole::Employee,
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Append-only audit record of a balance credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUpHistory {
    pub id: String,
    pub account_id: String,
    pub username: String,
    pub operator: Operator,
    /// Always positive.
    pub amount: Money,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Invoice
// =============================================================================

/// Immutable financial summary produced once, at logout.
///
/// Built only by [`crate::invoice::InvoiceBuilder`]; fields are public for
/// reading and serialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub session_id: String,
    pub account_name: String,
    pub computer_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Elapsed time after rounding to the billing increment.
    pub billed_minutes: i64,
    pub time_amount: Money,
    pub service_cash_amount: Money,
    pub service_account_amount: Money,
    pub service_amount: Money,
    /// `time_amount + service_account_amount`. Cash-paid services were
    /// settled at the counter and are reported separately.
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub order_items: Vec<OrderItem>,
}

impl Invoice {
    /// Checks both reconciliation invariants:
    /// `service == cash + account` and `total == time + account`.
    pub fn is_reconciled(&self) -> bool {
        self.service_amount == self.service_cash_amount + self.service_account_amount
            && self.total_amount == self.time_amount + self.service_account_amount
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
