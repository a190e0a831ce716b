//! Ledger persistence.
//!
//! The ledger file is a single JSON object rewritten wholesale on every
//! mutation:
//!
//! ```json
//! {"portfolio": {"AAPL": "10"}, "balance": "98101.60"}
//! ```
//!
//! Quantities and the balance are written as strings so the decimal value
//! survives exactly. Numbers are accepted on load as well.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Ledger, StoreError, Symbol};

/// Load/save contract for ledger state.
pub trait LedgerStore: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Ledger>, StoreError>;

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError>;
}

/// Stores the ledger as a JSON file at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Option<Ledger>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file yet");
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };

        let file: LedgerFile = serde_json::from_str(&raw)?;
        let ledger = file.into_ledger()?;
        tracing::debug!(
            path = %self.path.display(),
            holdings = ledger.holdings().len(),
            "loaded ledger"
        );
        Ok(Some(ledger))
    }

    fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_string(&LedgerFile::from_ledger(ledger))?;
        fs::write(&self.path, payload)?;
        tracing::info!(
            path = %self.path.display(),
            balance = %ledger.balance(),
            "saved ledger"
        );
        Ok(())
    }
}

/// On-disk shape of the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    portfolio: BTreeMap<String, NumericText>,
    balance: NumericText,
}

impl LedgerFile {
    fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            portfolio: ledger
                .holdings()
                .iter()
                .map(|(symbol, shares)| {
                    (symbol.as_str().to_owned(), NumericText::Text(shares.to_string()))
                })
                .collect(),
            balance: NumericText::Text(ledger.balance().to_string()),
        }
    }

    fn into_ledger(self) -> Result<Ledger, StoreError> {
        let balance = self.balance.to_decimal("balance")?;

        let mut holdings = BTreeMap::new();
        for (raw_symbol, raw_shares) in self.portfolio {
            let symbol = Symbol::parse(&raw_symbol).map_err(|error| {
                StoreError::corrupt(format!("invalid symbol '{raw_symbol}': {error}"))
            })?;
            let shares = raw_shares.to_shares(&raw_symbol)?;
            holdings.insert(symbol, shares);
        }

        Ok(Ledger::from_parts(balance, holdings))
    }
}

/// Decimal written as a JSON string, or a plain JSON number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NumericText {
    Text(String),
    Number(serde_json::Number),
}

impl NumericText {
    fn to_decimal(&self, field: &str) -> Result<Decimal, StoreError> {
        let text = match self {
            Self::Text(text) => text.trim().to_owned(),
            Self::Number(number) => number.to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| StoreError::corrupt(format!("{field} is not a decimal: '{text}'")))
    }

    fn to_shares(&self, symbol: &str) -> Result<u64, StoreError> {
        let value = self.to_decimal(symbol)?;
        if value.is_sign_negative() || !value.fract().is_zero() {
            return Err(StoreError::corrupt(format!(
                "share count for {symbol} must be a non-negative whole number: '{value}'"
            )));
        }
        value.to_u64().ok_or_else(|| {
            StoreError::corrupt(format!("share count for {symbol} is out of range: '{value}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn writes_strings_for_quantities_and_balance() {
        let mut holdings = BTreeMap::new();
        holdings.insert(symbol("AAPL"), 10);
        let ledger = Ledger::from_parts(Decimal::new(9_810_160, 2), holdings);

        let json = serde_json::to_string(&LedgerFile::from_ledger(&ledger)).expect("serialize");
        assert_eq!(json, r#"{"portfolio":{"AAPL":"10"},"balance":"98101.60"}"#);
    }

    #[test]
    fn accepts_numbers_and_decimal_share_text() {
        let file: LedgerFile =
            serde_json::from_str(r#"{"portfolio":{"msft":3,"X":"10.0"},"balance":1500.5}"#)
                .expect("parse");
        let ledger = file.into_ledger().expect("valid ledger");

        assert_eq!(ledger.balance(), Decimal::new(15_005, 1));
        assert_eq!(ledger.shares(&symbol("MSFT")), 3);
        assert_eq!(ledger.shares(&symbol("X")), 10);
    }

    #[test]
    fn rejects_fractional_and_negative_shares() {
        for body in [
            r#"{"portfolio":{"X":"1.5"},"balance":"1"}"#,
            r#"{"portfolio":{"X":"-2"},"balance":"1"}"#,
        ] {
            let file: LedgerFile = serde_json::from_str(body).expect("parse");
            let err = file.into_ledger().expect_err("must fail");
            assert!(matches!(err, StoreError::Corrupt { .. }), "{body}: {err}");
        }
    }

    #[test]
    fn rejects_unparseable_balance() {
        let file: LedgerFile =
            serde_json::from_str(r#"{"portfolio":{},"balance":"lots"}"#).expect("parse");
        let err = file.into_ledger().expect_err("must fail");
        assert!(err.to_string().contains("balance"));
    }
}
