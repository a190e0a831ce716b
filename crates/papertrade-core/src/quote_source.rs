//! Quote source trait and error types.
//!
//! A [`QuoteSource`] turns a [`Symbol`] into a fresh [`Quote`]. Quotes are
//! never cached: every call reaches the provider.
//!
//! # Example
//!
//! ```rust,ignore
//! use papertrade_core::{MockQuoteSource, QuoteSource, Symbol};
//!
//! async fn show(source: &MockQuoteSource) -> Result<(), Box<dyn std::error::Error>> {
//!     let quote = source.quote(&Symbol::parse("AAPL")?).await?;
//!     println!("{}: {}", quote.symbol, quote.price);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{Quote, Symbol, ValidationError};

/// Identifier of the provider behind a quote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
    Mock,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Mock => "mock",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a failed lookup.
///
/// Kept for diagnostics; the ledger treats every kind as "quote unavailable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteErrorKind {
    /// The provider answered but knows nothing about the symbol.
    NotFound,
    /// Transport failure, non-success status or provider-side error.
    Unavailable,
    /// The provider answered with a payload that could not be used.
    Malformed,
}

/// Failed quote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteError {
    kind: QuoteErrorKind,
    message: String,
}

impl QuoteError {
    pub fn not_found(symbol: &Symbol) -> Self {
        Self {
            kind: QuoteErrorKind::NotFound,
            message: format!("no quote for symbol '{symbol}'"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: QuoteErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: QuoteErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> QuoteErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            QuoteErrorKind::NotFound => "quote.not_found",
            QuoteErrorKind::Unavailable => "quote.unavailable",
            QuoteErrorKind::Malformed => "quote.malformed",
        }
    }
}

impl Display for QuoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for QuoteError {}

impl From<ValidationError> for QuoteError {
    fn from(error: ValidationError) -> Self {
        Self::malformed(error.to_string())
    }
}

/// Market-data provider contract.
///
/// Implementations must be `Send + Sync`; the trader holds them behind an
/// `Arc` and the refresh loop shares the same instance.
pub trait QuoteSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches a fresh quote for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError`] when the network call fails, the provider does
    /// not know the symbol, or the response carries no usable price.
    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, QuoteError>> + Send + 'a>>;
}
