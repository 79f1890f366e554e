//! # Billing Module
//!
//! Converts elapsed session time into a charge.
//!
//! ## Rounding Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  elapsed ──► minutes (round UP) ──► increments (round UP) ──► charge   │
//! │                                                                         │
//! │  61 s  ──►  2 min  ──► (increment 1)  2 min  ──► 2 × 10000 / 60 = 334  │
//! │  60 min ──► 60 min ──► (increment 15) 60 min ──► 10000                  │
//! │  0 s   ──►  0 min  ──► 0                                                │
//! │                                                                         │
//! │  The per-hour division is done in i128 and rounded UP to the next      │
//! │  minor unit, so the café never under-bills a started minute.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

const MINUTES_PER_HOUR: i128 = 60;
const MILLIS_PER_MINUTE: i64 = 60_000;

/// How elapsed time is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingPolicy {
    /// Billing granularity. Elapsed minutes are rounded up to a multiple
    /// of this value. Values below 1 behave as 1.
    pub increment_minutes: i64,

    /// Minimum billed minutes for any session that lasted longer than
    /// zero. A zero-length session is always free.
    pub minimum_minutes: i64,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        BillingPolicy {
            increment_minutes: 1,
            minimum_minutes: 0,
        }
    }
}

impl BillingPolicy {
    pub fn new(increment_minutes: i64, minimum_minutes: i64) -> Self {
        BillingPolicy {
            increment_minutes,
            minimum_minutes,
        }
    }

    /// Billable minutes between `start` and `end`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use netcafe_core::billing::BillingPolicy;
    ///
    /// let start = Utc::now();
    /// let policy = BillingPolicy::default();
    /// assert_eq!(policy.billed_minutes(start, start), 0);
    /// assert_eq!(policy.billed_minutes(start, start + Duration::seconds(61)), 2);
    /// ```
    pub fn billed_minutes(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        let elapsed_ms = (end - start).num_milliseconds();
        if elapsed_ms <= 0 {
            return 0;
        }

        let minutes = div_ceil_i64(elapsed_ms, MILLIS_PER_MINUTE);
        let increment = self.increment_minutes.max(1);
        let rounded = div_ceil_i64(minutes, increment).saturating_mul(increment);

        rounded.max(self.minimum_minutes)
    }

    /// Charge for `minutes` at `rate_per_hour`, rounded up to the minor unit.
    pub fn charge_for_minutes(&self, minutes: i64, rate_per_hour: Money) -> Money {
        if minutes <= 0 {
            return Money::zero();
        }

        let numerator = minutes as i128 * rate_per_hour.minor() as i128;
        let mut charge = numerator / MINUTES_PER_HOUR;
        if numerator % MINUTES_PER_HOUR > 0 {
            charge += 1;
        }

        Money::from_minor(i64::try_from(charge).unwrap_or(i64::MAX))
    }

    /// Time charge for a session that ran from `start` to `end`.
    pub fn time_charge(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        rate_per_hour: Money,
    ) -> Money {
        self.charge_for_minutes(self.billed_minutes(start, end), rate_per_hour)
    }
}

/// Ceiling division for a non-negative numerator and a positive divisor.
fn div_ceil_i64(n: i64, d: i64) -> i64 {
    let q = n / d;
    if n % d > 0 {
        q + 1
    } else {
        q
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
