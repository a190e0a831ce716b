//! # papertrade core
//!
//! Paper trading against a fake cash balance with live-ish quotes.
//!
//! ## Overview
//!
//! - **Ledger**: cash balance plus symbol → share count, guarded by the
//!   sufficient-funds and sufficient-shares checks
//! - **Quote lookup**: a fresh quote per request from Yahoo Finance, or a
//!   deterministic offline source
//! - **Store**: the ledger as one JSON file, rewritten after every trade
//! - **Trader**: the owned session tying the three together
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Quote sources (Yahoo, mock) |
//! | [`config`] | Data directory and session settings |
//! | [`domain`] | Symbol, Quantity, Quote, Holding, UtcDateTime |
//! | [`error`] | Validation and store errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`ledger`] | Balance and holdings arithmetic |
//! | [`quote_source`] | Quote source trait and errors |
//! | [`store`] | JSON ledger persistence |
//! | [`trader`] | Buy, sell and portfolio valuation |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use papertrade_core::{Quantity, Symbol, Trader, TraderConfig, YahooQuoteSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TraderConfig::default();
//!     let mut trader = Trader::open(&config, Arc::new(YahooQuoteSource::default()))?;
//!
//!     let receipt = trader.buy(&Symbol::parse("AAPL")?, Quantity::parse("10")?).await?;
//!     println!("{}", receipt.message);
//!     println!("portfolio value: {}", trader.portfolio_value().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Trades fail with [`TradeError`]. Three outcomes simply block the action:
//!
//! ```rust
//! use papertrade_core::{LedgerError, TradeError};
//!
//! fn explain(error: &TradeError) -> &'static str {
//!     match error {
//!         TradeError::QuoteUnavailable { .. } => "Unable to get stock price",
//!         TradeError::Ledger(LedgerError::InsufficientFunds { .. }) => "Insufficient funds",
//!         TradeError::Ledger(LedgerError::InsufficientShares { .. }) => "Insufficient shares",
//!         _ => "ledger could not be saved",
//!     }
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod ledger;
pub mod quote_source;
pub mod store;
pub mod trader;

pub use adapters::{MockQuoteSource, YahooQuoteSource};
pub use config::TraderConfig;
pub use domain::{
    decimal_from_f64, validate_currency_code, Holding, Quantity, Quote, Symbol, UtcDateTime,
    NOT_AVAILABLE,
};
pub use error::{StoreError, ValidationError};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use ledger::{default_starting_balance, Fill, Ledger, LedgerError, Side};
pub use quote_source::{ProviderId, QuoteError, QuoteErrorKind, QuoteSource};
pub use store::{JsonFileStore, LedgerStore};
pub use trader::{PortfolioReport, PositionLine, TradeError, TradeReceipt, Trader};
