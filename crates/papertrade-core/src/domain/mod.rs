//! # Domain Models
//!
//! Strongly-typed values shared by the ledger and the quote sources.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`Quantity`] | Positive whole share count for one order |
//! | [`Quote`] | Price plus descriptive attributes at fetch time |
//! | [`Holding`] | Owned shares of one symbol |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates invariants, so a `Quantity` of zero or a quote with a
//! non-positive price cannot reach the ledger.

mod models;
mod quantity;
mod symbol;
mod timestamp;

pub use models::{decimal_from_f64, validate_currency_code, Holding, Quote, NOT_AVAILABLE};
pub use quantity::Quantity;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
