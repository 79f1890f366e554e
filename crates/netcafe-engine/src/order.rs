//! # Order Engine
//!
//! Places priced orders against an ACTIVE session.
//!
//! ## Critical Section
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lock session                                                           │
//! │    ├── session ACTIVE?             no → InactiveSession                 │
//! │    ├── item unlocked?              no → LockedItem                      │
//! │    ├── quantity > 0, no overflow?  no → InvalidQuantity                 │
//! │    ├── session totals still fit?   no → AmountOverflow                  │
//! │    ├── ACCOUNT: lock cell, balance ≥ cost?                             │
//! │    │              no → InsufficientBalance (balance untouched)         │
//! │    │              yes → debit                                           │
//! │    └── append OrderItem (Pending, price frozen)                        │
//! │  unlock                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logout closes the session under the same lock, so no order can land on
//! a session after its invoice was computed. Orders are persisted with
//! the session at logout.

use std::sync::Arc;

use tracing::{debug, warn};

use netcafe_core::{CoreError, CoreResult, OrderItem, PaymentSource, ServiceItem};

use crate::clock::Clock;
use crate::session::SessionHandle;

#[derive(Debug)]
pub struct OrderEngine {
    clock: Arc<dyn Clock>,
}

impl OrderEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        OrderEngine { clock }
    }

    /// Adds `quantity` × `item` to the session.
    ///
    /// Validation runs in a fixed order: session state, item lock,
    /// quantity, session totals, then (for `Account`) the balance. Any failure leaves the
    /// balance and the order list unchanged.
    pub fn add_order(
        &self,
        session: &SessionHandle,
        item: &ServiceItem,
        quantity: i64,
        payment_source: PaymentSource,
    ) -> CoreResult<OrderItem> {
        let mut state = session.lock();

        state.ensure_active()?;

        if item.is_locked {
            warn!(session_id = %session.id(), item = %item.name, "Order rejected: item locked");
            return Err(CoreError::LockedItem(item.name.clone()));
        }

        let cost = OrderItem::line_cost(item.unit_price, quantity)?;
        state.ensure_order_fits(cost).map_err(|err| {
            warn!(session_id = %session.id(), item = %item.name, "Order rejected: totals overflow");
            err
        })?;

        if payment_source == PaymentSource::Account {
            session.account().debit(cost).map_err(|err| {
                warn!(
                    session_id = %session.id(),
                    username = %session.username(),
                    error = %err,
                    "Order rejected"
                );
                err
            })?;
        }

        let order = OrderItem::from_service_item(
            &state.id,
            item,
            quantity,
            payment_source,
            self.clock.now(),
        );
        state.orders.push(order.clone());

        debug!(
            session_id = %session.id(),
            item = %item.name,
            quantity,
            cost = %cost,
            source = ?payment_source,
            "Order placed"
        );
        Ok(order)
    }

    /// `Pending → Served` for one order of an ACTIVE session.
    pub fn mark_served(&self, session: &SessionHandle, order_id: &str) -> CoreResult<OrderItem> {
        let mut state = session.lock();
        state.ensure_active()?;

        let order = state.order_mut(order_id)?;
        order.mark_served()?;

        debug!(session_id = %session.id(), order_id = %order_id, "Order served");
        Ok(order.clone())
    }
}
