//! In-memory cash balance and share holdings.
//!
//! [`Ledger`] owns the arithmetic and the two guards (sufficient funds,
//! sufficient shares). It performs no I/O and never looks up prices; the
//! [`Trader`](crate::Trader) supplies the price and persists the result.
//!
//! Invariants:
//!
//! - a buy debits exactly `price × quantity`, a sell credits exactly the same;
//! - holdings never go negative and an entry disappears when it reaches zero;
//! - a rejected operation leaves the ledger untouched.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Holding, Quantity, Symbol};

/// Cash balance a fresh ledger starts with.
pub fn default_starting_balance() -> Decimal {
    Decimal::new(100_000, 0)
}

/// Direction of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an applied buy or sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub side: Side,
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Decimal,
    /// `price × quantity`, debited on a buy and credited on a sell.
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub shares_after: u64,
}

/// Guard failures raised by [`Ledger`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Insufficient shares of {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: Symbol,
        requested: u64,
        held: u64,
    },

    #[error("amount for {quantity} shares at {price} exceeds decimal range")]
    AmountOverflow { quantity: Quantity, price: Decimal },
}

/// Cash balance plus symbol → share count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    balance: Decimal,
    holdings: BTreeMap<Symbol, u64>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(default_starting_balance())
    }
}

impl Ledger {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            balance: starting_balance,
            holdings: BTreeMap::new(),
        }
    }

    /// Rebuild a ledger from stored parts. Zero-share entries are dropped.
    pub fn from_parts(balance: Decimal, holdings: BTreeMap<Symbol, u64>) -> Self {
        let holdings = holdings
            .into_iter()
            .filter(|(_, shares)| *shares > 0)
            .collect();
        Self { balance, holdings }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn holdings(&self) -> &BTreeMap<Symbol, u64> {
        &self.holdings
    }

    pub fn holding_list(&self) -> Vec<Holding> {
        self.holdings
            .iter()
            .map(|(symbol, shares)| Holding::new(symbol.clone(), *shares))
            .collect()
    }

    pub fn shares(&self, symbol: &Symbol) -> u64 {
        self.holdings.get(symbol).copied().unwrap_or(0)
    }

    pub fn is_flat(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Check that `quantity` shares of `symbol` are held, returning the held count.
    pub fn ensure_shares(&self, symbol: &Symbol, quantity: Quantity) -> Result<u64, LedgerError> {
        let held = self.shares(symbol);
        if held < quantity.get() {
            return Err(LedgerError::InsufficientShares {
                symbol: symbol.clone(),
                requested: quantity.get(),
                held,
            });
        }
        Ok(held)
    }

    /// Debit `price × quantity` and add the shares.
    pub fn apply_buy(
        &mut self,
        symbol: &Symbol,
        quantity: Quantity,
        price: Decimal,
    ) -> Result<Fill, LedgerError> {
        let required = amount(quantity, price)?;
        if required > self.balance {
            return Err(LedgerError::InsufficientFunds {
                required,
                available: self.balance,
            });
        }

        let held = self.shares(symbol);
        let shares_after = held
            .checked_add(quantity.get())
            .ok_or(LedgerError::AmountOverflow { quantity, price })?;

        self.balance -= required;
        self.holdings.insert(symbol.clone(), shares_after);

        Ok(Fill {
            side: Side::Buy,
            symbol: symbol.clone(),
            quantity,
            price,
            amount: required,
            balance_after: self.balance,
            shares_after,
        })
    }

    /// Credit `price × quantity` and remove the shares, dropping the entry at zero.
    pub fn apply_sell(
        &mut self,
        symbol: &Symbol,
        quantity: Quantity,
        price: Decimal,
    ) -> Result<Fill, LedgerError> {
        let held = self.ensure_shares(symbol, quantity)?;
        let proceeds = amount(quantity, price)?;
        let balance_after = self
            .balance
            .checked_add(proceeds)
            .ok_or(LedgerError::AmountOverflow { quantity, price })?;

        let shares_after = held - quantity.get();
        self.balance = balance_after;
        if shares_after == 0 {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(symbol.clone(), shares_after);
        }

        Ok(Fill {
            side: Side::Sell,
            symbol: symbol.clone(),
            quantity,
            price,
            amount: proceeds,
            balance_after,
            shares_after,
        })
    }
}

fn amount(quantity: Quantity, price: Decimal) -> Result<Decimal, LedgerError> {
    price
        .checked_mul(quantity.as_decimal())
        .ok_or(LedgerError::AmountOverflow { quantity, price })
}
