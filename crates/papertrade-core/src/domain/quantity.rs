use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Strictly positive whole number of shares for a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Quantity(u64);

impl Quantity {
    pub fn new(shares: u64) -> Result<Self, ValidationError> {
        if shares == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        Ok(Self(shares))
    }

    /// Parse user input such as `"10"` or `" 25 "`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let shares = trimmed
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidQuantity {
                value: trimmed.to_owned(),
            })?;
        Self::new(shares)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<u64> for Quantity {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_share_counts() {
        assert_eq!(Quantity::parse(" 25 ").expect("valid").get(), 25);
    }

    #[test]
    fn rejects_zero() {
        assert_eq!(Quantity::parse("0"), Err(ValidationError::ZeroQuantity));
    }

    #[test]
    fn rejects_negative_fractional_and_text() {
        for raw in ["-5", "1.5", "ten", ""] {
            let err = Quantity::parse(raw).expect_err("must fail");
            assert!(
                matches!(err, ValidationError::InvalidQuantity { .. }),
                "unexpected error for {raw:?}: {err}"
            );
        }
    }
}
