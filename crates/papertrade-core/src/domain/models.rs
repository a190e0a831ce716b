use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Placeholder shown where the provider has no descriptive value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Snapshot of a symbol's market price and descriptive attributes.
///
/// Quotes are fetched fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub name: String,
    pub price: Decimal,
    pub change_percent: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub currency: String,
    pub as_of: UtcDateTime,
}

impl Quote {
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        price: Decimal,
        currency: impl AsRef<str>,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        if price <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveValue { field: "price" });
        }

        let name = name.into();
        let name = if name.trim().is_empty() {
            String::from(NOT_AVAILABLE)
        } else {
            name
        };

        Ok(Self {
            symbol,
            name,
            price,
            change_percent: None,
            volume: None,
            market_cap: None,
            pe_ratio: None,
            currency: validate_currency_code(currency.as_ref())?,
            as_of,
        })
    }

    pub fn with_change_percent(mut self, change_percent: Option<f64>) -> Result<Self, ValidationError> {
        self.change_percent = validate_optional_finite("change_percent", change_percent)?;
        Ok(self)
    }

    pub fn with_volume(mut self, volume: Option<u64>) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_market_cap(mut self, market_cap: Option<f64>) -> Result<Self, ValidationError> {
        self.market_cap = validate_optional_finite("market_cap", market_cap)?;
        Ok(self)
    }

    pub fn with_pe_ratio(mut self, pe_ratio: Option<f64>) -> Result<Self, ValidationError> {
        self.pe_ratio = validate_optional_finite("pe_ratio", pe_ratio)?;
        Ok(self)
    }

    /// Market value of `shares` at this quote's price, `None` past the decimal range.
    pub fn value_of(&self, shares: u64) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(shares))
    }
}

/// Owned shares of a single symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: Symbol,
    pub quantity: u64,
}

impl Holding {
    pub fn new(symbol: Symbol, quantity: u64) -> Self {
        Self { symbol, quantity }
    }
}

/// Convert a provider float to an exact decimal through its shortest text form.
pub fn decimal_from_f64(field: &'static str, value: f64) -> Result<Decimal, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }

    let text = value.to_string();
    Decimal::from_str(&text).map_err(|_| ValidationError::InvalidAmount { value: text })
}

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<f64>, ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn validates_currency() {
        assert_eq!(
            validate_currency_code("usd").expect("must normalize"),
            "USD"
        );
        assert!(matches!(
            validate_currency_code("USDT"),
            Err(ValidationError::InvalidCurrency { .. })
        ));
    }

    #[test]
    fn provider_floats_convert_exactly() {
        let price = decimal_from_f64("price", 123.45).expect("finite");
        assert_eq!(price.to_string(), "123.45");

        let err = decimal_from_f64("price", f64::NAN).expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "price" });
    }

    #[test]
    fn quote_rejects_non_positive_price() {
        let err = Quote::new(symbol("AAPL"), "Apple", Decimal::ZERO, "USD", UtcDateTime::now())
            .expect_err("must fail");
        assert_eq!(err, ValidationError::NonPositiveValue { field: "price" });
    }

    #[test]
    fn blank_name_falls_back_to_placeholder() {
        let quote = Quote::new(symbol("AAPL"), "  ", Decimal::ONE, "usd", UtcDateTime::now())
            .expect("valid quote");
        assert_eq!(quote.name, NOT_AVAILABLE);
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn value_of_multiplies_price_by_shares() {
        let quote = Quote::new(
            symbol("MSFT"),
            "Microsoft",
            Decimal::new(4_125, 1),
            "USD",
            UtcDateTime::now(),
        )
        .expect("valid quote");
        assert_eq!(quote.value_of(4), Some(Decimal::new(1_650, 0)));
    }

    #[test]
    fn value_of_reports_overflow_as_none() {
        let quote = Quote::new(symbol("X"), "X", Decimal::MAX, "USD", UtcDateTime::now())
            .expect("valid quote");
        assert_eq!(quote.value_of(1), Some(Decimal::MAX));
        assert_eq!(quote.value_of(2), None);
    }
}
