//! # Engine Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     NETCAFE_CAFE_NAME="Cyber Game"                                     │
//! │     NETCAFE_BILLING_INCREMENT_MINUTES=15                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/netcafe/netcafe.toml (Linux)                             │
//! │     ~/Library/Application Support/com.netcafe.netcafe/netcafe.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     VND, 0 decimals, billed per started minute                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # netcafe.toml
//! [cafe]
//! name = "Cyber Game"
//! currency_code = "VND"
//! currency_decimals = 0
//!
//! [billing]
//! increment_minutes = 1
//! minimum_minutes = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use netcafe_core::{BillingPolicy, Money};

use crate::error::{EngineError, EngineResult};

/// Largest accepted `currency_decimals`.
pub const MAX_CURRENCY_DECIMALS: u8 = 4;

// =============================================================================
// Cafe Settings
// =============================================================================

/// Identity and currency of the café.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CafeSettings {
    #[serde(default = "default_cafe_name")]
    pub name: String,

    /// ISO 4217 code printed after amounts.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Minor units per major unit, as a power of ten (VND: 0, USD: 2).
    #[serde(default)]
    pub currency_decimals: u8,
}

fn default_cafe_name() -> String {
    "Netcafe".to_string()
}

fn default_currency_code() -> String {
    "VND".to_string()
}

impl Default for CafeSettings {
    fn default() -> Self {
        CafeSettings {
            name: default_cafe_name(),
            currency_code: default_currency_code(),
            currency_decimals: 0,
        }
    }
}

// =============================================================================
// Billing Settings
// =============================================================================

/// Time billing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSettings {
    /// Elapsed time is rounded up to a multiple of this many minutes.
    #[serde(default = "default_increment")]
    pub increment_minutes: i64,

    /// Floor for any session longer than zero.
    #[serde(default)]
    pub minimum_minutes: i64,
}

fn default_increment() -> i64 {
    1
}

impl Default for BillingSettings {
    fn default() -> Self {
        BillingSettings {
            increment_minutes: default_increment(),
            minimum_minutes: 0,
        }
    }
}

// =============================================================================
// Main Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub cafe: CafeSettings,

    #[serde(default)]
    pub billing: BillingSettings,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (netcafe.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.cafe.name.trim().is_empty() {
            return Err(EngineError::InvalidConfig("cafe.name must not be empty".into()));
        }

        if self.cafe.currency_code.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "cafe.currency_code must not be empty".into(),
            ));
        }

        if self.cafe.currency_decimals > MAX_CURRENCY_DECIMALS {
            return Err(EngineError::InvalidConfig(format!(
                "cafe.currency_decimals must be at most {}",
                MAX_CURRENCY_DECIMALS
            )));
        }

        if self.billing.increment_minutes < 1 {
            return Err(EngineError::InvalidConfig(
                "billing.increment_minutes must be at least 1".into(),
            ));
        }

        if self.billing.minimum_minutes < 0 {
            return Err(EngineError::InvalidConfig(
                "billing.minimum_minutes must not be negative".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a `NETCAFE_*` lookup. Unparseable numbers are
    /// logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("NETCAFE_CAFE_NAME") {
            debug!(name = %name, "Overriding cafe name from environment");
            self.cafe.name = name;
        }

        if let Some(code) = lookup("NETCAFE_CURRENCY_CODE") {
            self.cafe.currency_code = code;
        }

        if let Some(decimals) = lookup("NETCAFE_CURRENCY_DECIMALS") {
            match decimals.parse::<u8>() {
                Ok(d) => self.cafe.currency_decimals = d,
                Err(_) => warn!(value = %decimals, "Ignoring invalid NETCAFE_CURRENCY_DECIMALS"),
            }
        }

        if let Some(increment) = lookup("NETCAFE_BILLING_INCREMENT_MINUTES") {
            match increment.parse::<i64>() {
                Ok(m) => {
                    debug!(minutes = m, "Overriding billing increment from environment");
                    self.billing.increment_minutes = m;
                }
                Err(_) => warn!(value = %increment, "Ignoring invalid NETCAFE_BILLING_INCREMENT_MINUTES"),
            }
        }

        if let Some(minimum) = lookup("NETCAFE_BILLING_MINIMUM_MINUTES") {
            match minimum.parse::<i64>() {
                Ok(m) => self.billing.minimum_minutes = m,
                Err(_) => warn!(value = %minimum, "Ignoring invalid NETCAFE_BILLING_MINIMUM_MINUTES"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "netcafe", "netcafe")
            .map(|dirs| dirs.config_dir().join("netcafe.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The billing policy these settings describe.
    pub fn billing_policy(&self) -> BillingPolicy {
        BillingPolicy::new(self.billing.increment_minutes, self.billing.minimum_minutes)
    }

    /// Renders an amount for display, e.g. `"10,000 VND"` or `"12.34 USD"`.
    pub fn format_money(&self, amount: Money) -> String {
        let minor = amount.minor();
        let decimals = u32::from(self.cafe.currency_decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = (minor / divisor).unsigned_abs();
        let frac = (minor % divisor).unsigned_abs();

        let sign = if minor < 0 { "-" } else { "" };
        let whole = group_thousands(whole);

        if decimals > 0 {
            format!(
                "{}{}.{:0width$} {}",
                sign,
                whole,
                frac,
                self.cafe.currency_code,
                width = decimals as usize
            )
        } else {
            format!("{}{} {}", sign, whole, self.cafe.currency_code)
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
