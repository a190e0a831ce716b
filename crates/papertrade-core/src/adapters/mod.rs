//! Quote source implementations.
//!
//! | Source | Description |
//! |--------|-------------|
//! | [`YahooQuoteSource`] | Yahoo Finance quote endpoint over HTTP |
//! | [`MockQuoteSource`] | Deterministic offline prices for tests and `--mock` |

mod mock;
mod yahoo;

pub use mock::MockQuoteSource;
pub use yahoo::{auth_from_env, YahooQuoteSource, YAHOO_COOKIE_ENV};
