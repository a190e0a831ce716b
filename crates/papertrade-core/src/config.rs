use std::env;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::ledger::default_starting_balance;

/// Environment variable that relocates the data directory.
pub const HOME_ENV: &str = "PAPERTRADE_HOME";

/// File name of the ledger inside the data directory.
pub const LEDGER_FILE_NAME: &str = "portfolio.json";

/// Runtime configuration for a [`Trader`](crate::Trader) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraderConfig {
    /// Root directory for papertrade data.
    pub home: PathBuf,
    /// Path of the JSON ledger file.
    pub ledger_path: PathBuf,
    /// Balance used when no ledger file exists yet.
    pub starting_balance: Decimal,
    /// Budget for each provider HTTP request.
    pub timeout_ms: u64,
    /// Period of the portfolio refresh loop.
    pub refresh_interval: Duration,
}

impl Default for TraderConfig {
    fn default() -> Self {
        let home = resolve_home();
        let ledger_path = home.join(LEDGER_FILE_NAME);
        Self {
            home,
            ledger_path,
            starting_balance: default_starting_balance(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            refresh_interval: Duration::from_secs(60),
        }
    }
}

impl TraderConfig {
    pub fn with_ledger_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_path = path.into();
        self
    }

    pub fn with_starting_balance(mut self, balance: Decimal) -> Self {
        self.starting_balance = balance;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".papertrade");
    }

    PathBuf::from(".papertrade")
}
