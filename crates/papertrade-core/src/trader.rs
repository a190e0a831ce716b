//! Trading session: ledger + quote source + store.
//!
//! [`Trader`] is the owned object handed to whichever handler needs it. Each
//! buy or sell is a read-modify-write against the in-memory ledger:
//!
//! 1. check guards that need no price (sell only: shares held);
//! 2. fetch a fresh quote;
//! 3. apply the fill to a copy of the ledger;
//! 4. save the copy, then make it current.
//!
//! A failure at any step leaves both the in-memory ledger and the file as
//! they were.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::config::TraderConfig;
use crate::ledger::{Fill, Ledger, LedgerError, Side};
use crate::quote_source::QuoteSource;
use crate::store::{JsonFileStore, LedgerStore};
use crate::{Quantity, Quote, StoreError, Symbol, UtcDateTime, NOT_AVAILABLE};

/// Why a trade or lookup did not go through.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Unable to get stock price for {symbol}")]
    QuoteUnavailable { symbol: Symbol },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TradeError {
    /// True for the outcomes that simply block the requested action.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::QuoteUnavailable { .. } | Self::Ledger(_))
    }
}

/// Confirmation of an applied trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeReceipt {
    pub fill: Fill,
    pub message: String,
}

impl TradeReceipt {
    fn new(fill: Fill) -> Self {
        let verb = match fill.side {
            Side::Buy => "bought",
            Side::Sell => "sold",
        };
        let message = format!(
            "Successfully {verb} {} shares of {}",
            fill.quantity, fill.symbol
        );
        Self { fill, message }
    }
}

/// One row of the holdings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionLine {
    pub symbol: Symbol,
    pub shares: u64,
    pub price: Decimal,
    pub value: Decimal,
    /// Always "N/A": purchase prices are not tracked.
    pub gain_loss: String,
}

/// Balance, priced holdings and total value at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub balance: Decimal,
    pub holdings_value: Decimal,
    pub total_value: Decimal,
    pub positions: Vec<PositionLine>,
    /// Holdings left out because their quote could not be fetched.
    pub unpriced: Vec<Symbol>,
    pub as_of: UtcDateTime,
}

/// Owned paper-trading session.
pub struct Trader {
    ledger: Ledger,
    quotes: Arc<dyn QuoteSource>,
    store: Box<dyn LedgerStore>,
}

impl Trader {
    pub fn new(ledger: Ledger, quotes: Arc<dyn QuoteSource>, store: Box<dyn LedgerStore>) -> Self {
        Self {
            ledger,
            quotes,
            store,
        }
    }

    /// Load the ledger from `store`, or start a fresh one with `starting_balance`.
    pub fn load(
        store: Box<dyn LedgerStore>,
        quotes: Arc<dyn QuoteSource>,
        starting_balance: Decimal,
    ) -> Result<Self, StoreError> {
        let ledger = match store.load()? {
            Some(ledger) => ledger,
            None => {
                tracing::info!(%starting_balance, "starting a fresh ledger");
                Ledger::new(starting_balance)
            }
        };
        Ok(Self::new(ledger, quotes, store))
    }

    /// Open the JSON ledger named by `config`.
    pub fn open(config: &TraderConfig, quotes: Arc<dyn QuoteSource>) -> Result<Self, StoreError> {
        let store = JsonFileStore::new(config.ledger_path.clone());
        tracing::debug!(path = %store.path().display(), "opening ledger");
        Self::load(Box::new(store), quotes, config.starting_balance)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn balance(&self) -> Decimal {
        self.ledger.balance()
    }

    /// Fetch the full quote for display.
    pub async fn stock_info(&self, symbol: &Symbol) -> Result<Quote, TradeError> {
        match self.quotes.quote(symbol).await {
            Ok(quote) => Ok(quote),
            Err(error) => {
                tracing::warn!(
                    %symbol,
                    source = %self.quotes.id(),
                    code = error.code(),
                    error = error.message(),
                    "quote lookup failed"
                );
                Err(TradeError::QuoteUnavailable {
                    symbol: symbol.clone(),
                })
            }
        }
    }

    async fn price(&self, symbol: &Symbol) -> Result<Decimal, TradeError> {
        self.stock_info(symbol).await.map(|quote| quote.price)
    }

    pub async fn buy(
        &mut self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> Result<TradeReceipt, TradeError> {
        let price = self.price(symbol).await?;

        let mut next = self.ledger.clone();
        let fill = next.apply_buy(symbol, quantity, price)?;
        self.commit(next)?;

        tracing::info!(%symbol, %quantity, %price, amount = %fill.amount, "bought");
        Ok(TradeReceipt::new(fill))
    }

    pub async fn sell(
        &mut self,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> Result<TradeReceipt, TradeError> {
        self.ledger.ensure_shares(symbol, quantity)?;
        let price = self.price(symbol).await?;

        let mut next = self.ledger.clone();
        let fill = next.apply_sell(symbol, quantity, price)?;
        self.commit(next)?;

        tracing::info!(%symbol, %quantity, %price, amount = %fill.amount, "sold");
        Ok(TradeReceipt::new(fill))
    }

    /// Balance plus the market value of every holding that can be priced.
    ///
    /// Holdings whose quote fails, or whose value falls outside the decimal
    /// range, are left out of the sum.
    pub async fn portfolio_value(&self) -> Decimal {
        self.portfolio_report().await.total_value
    }

    /// Price every holding once and build the holdings table.
    pub async fn portfolio_report(&self) -> PortfolioReport {
        let balance = self.ledger.balance();
        let mut positions = Vec::with_capacity(self.ledger.holdings().len());
        let mut unpriced = Vec::new();
        let mut holdings_value = Decimal::ZERO;
        let mut total_value = balance;

        for holding in self.ledger.holding_list() {
            let quote = match self.stock_info(&holding.symbol).await {
                Ok(quote) => quote,
                Err(_) => {
                    unpriced.push(holding.symbol);
                    continue;
                }
            };

            let priced = quote.value_of(holding.quantity).and_then(|value| {
                Some((
                    value,
                    holdings_value.checked_add(value)?,
                    total_value.checked_add(value)?,
                ))
            });
            let Some((value, next_holdings, next_total)) = priced else {
                tracing::warn!(
                    symbol = %holding.symbol,
                    shares = holding.quantity,
                    price = %quote.price,
                    "holding value out of range; left out of the total"
                );
                unpriced.push(holding.symbol);
                continue;
            };

            holdings_value = next_holdings;
            total_value = next_total;
            positions.push(PositionLine {
                symbol: holding.symbol,
                shares: holding.quantity,
                price: quote.price,
                value,
                gain_loss: String::from(NOT_AVAILABLE),
            });
        }

        PortfolioReport {
            balance,
            holdings_value,
            total_value,
            positions,
            unpriced,
            as_of: UtcDateTime::now(),
        }
    }

    /// Re-read the ledger from the store, picking up trades made elsewhere.
    ///
    /// Keeps the current state when the store has nothing yet.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        if let Some(ledger) = self.store.load()? {
            self.ledger = ledger;
        }
        Ok(())
    }

    fn commit(&mut self, next: Ledger) -> Result<(), StoreError> {
        self.store.save(&next)?;
        self.ledger = next;
        Ok(())
    }
}
