//! # Invoice Assembly
//!
//! Builds the immutable [`Invoice`] for a closed session.
//!
//! ## Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  time_amount            = BillingPolicy::time_charge(start, end, rate) │
//! │  service_cash_amount    = Σ cost(CASH orders)                          │
//! │  service_account_amount = Σ cost(ACCOUNT orders)                       │
//! │  service_amount         = cash + account                               │
//! │  total_amount           = time + account        (cash is NOT included) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cash-paid services were settled at the counter when ordered, so they
//! appear on the invoice for reference but never in `total_amount`.

use crate::billing::BillingPolicy;
use crate::error::{CoreError, CoreResult};
use crate::types::{new_id, Invoice, PaymentSource, Session};

/// Builds invoices under a fixed billing policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceBuilder {
    policy: BillingPolicy,
}

impl InvoiceBuilder {
    pub fn new(policy: BillingPolicy) -> Self {
        InvoiceBuilder { policy }
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    /// Computes the invoice for `session`.
    ///
    /// Fails with `InvalidState` if the session is still ACTIVE and with
    /// `AmountOverflow` if a total does not fit in `Money`.
    pub fn build(&self, session: &Session) -> CoreResult<Invoice> {
        let ended_at = match (session.is_active(), session.ended_at) {
            (false, Some(ended_at)) => ended_at,
            _ => {
                return Err(CoreError::InvalidState {
                    entity: "session".to_string(),
                    id: session.id.clone(),
                    reason: "cannot invoice an active session".to_string(),
                })
            }
        };

        let billed_minutes = self.policy.billed_minutes(session.started_at, ended_at);
        let time_amount = self
            .policy
            .charge_for_minutes(billed_minutes, session.rate_per_hour);

        let service_cash_amount = session.service_total(PaymentSource::Cash)?;
        let service_account_amount = session.service_total(PaymentSource::Account)?;
        let overflow = || CoreError::AmountOverflow(session.id.clone());
        let service_amount = service_cash_amount
            .checked_add(service_account_amount)
            .ok_or_else(overflow)?;
        let total_amount = time_amount
            .checked_add(service_account_amount)
            .ok_or_else(overflow)?;

        Ok(Invoice {
            id: new_id(),
            session_id: session.id.clone(),
            account_name: session.account_name.clone(),
            computer_name: session.computer_name.clone(),
            started_at: session.started_at,
            ended_at,
            billed_minutes,
            time_amount,
            service_cash_amount,
            service_account_amount,
            service_amount,
            total_amount,
            created_at: ended_at,
            order_items: session.orders.clone(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
