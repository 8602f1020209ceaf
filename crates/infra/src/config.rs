//! Engine configuration.

use std::time::Duration;

pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(30);

pub const LEDGER_TIMEOUT_ENV: &str = "LANDREG_LEDGER_TIMEOUT_MS";
pub const PURCHASE_PRECHECK_ENV: &str = "LANDREG_PURCHASE_PRECHECK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deadline for a ledger call when the caller does not set one.
    pub ledger_timeout: Duration,
    /// Look the parcel up before submitting a purchase request. Advisory only;
    /// the ledger enforces the listing rule regardless.
    pub purchase_precheck: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
            purchase_precheck: true,
        }
    }
}

impl EngineConfig {
    /// Load from process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Invalid values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(LEDGER_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.ledger_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(
                    key = LEDGER_TIMEOUT_ENV,
                    value = %raw,
                    "invalid ledger timeout; using default"
                ),
            }
        }

        if let Some(raw) = lookup(PURCHASE_PRECHECK_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.purchase_precheck = true,
                "0" | "false" | "no" | "off" => config.purchase_precheck = false,
                _ => tracing::warn!(
                    key = PURCHASE_PRECHECK_ENV,
                    value = %raw,
                    "invalid purchase precheck flag; using default"
                ),
            }
        }

        config
    }

    pub fn with_ledger_timeout(mut self, timeout: Duration) -> Self {
        self.ledger_timeout = timeout;
        self
    }

    pub fn with_purchase_precheck(mut self, enabled: bool) -> Self {
        self.purchase_precheck = enabled;
        self
    }
}
