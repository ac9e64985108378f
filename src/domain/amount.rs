//! Amount type
//!
//! Domain primitive for monetary amounts (BRL) with business rule validation.
//! Every payment, receipt and original value entering an aggregate goes
//! through `Amount`, so non-positive or sub-cent values never reach the
//! state machines.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum allowed amount (1 trillion BRL)
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Maximum decimal places (centavos)
const MAX_SCALE: u32 = 2;

/// Amount represents a validated monetary value.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - Maximum 2 decimal places
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use obra_financeiro::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(150075, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(150075, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// Trailing zeros do not count as decimal places, so `100.500` is accepted
    /// and stored as `100.50`.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 2 significant decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        let normalized = value.normalize();
        if normalized.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(normalized.scale()));
        }

        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }

        let mut value = normalized;
        value.rescale(MAX_SCALE);
        Ok(Self(value))
    }

    /// Create an Amount from whole reais.
    pub fn from_integer(value: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::from(value))
    }

    /// Round an arbitrary decimal to centavos and validate it.
    ///
    /// Used where a value is derived by division (equal splits).
    pub fn rounded(value: Decimal) -> Result<Self, AmountError> {
        Self::new(value.round_dp_with_strategy(MAX_SCALE, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Split this amount into `parts` equal shares, rounded to centavos.
    ///
    /// The rounding remainder is not redistributed.
    pub fn equal_share(&self, parts: u32) -> Result<Amount, AmountError> {
        if parts == 0 {
            return Err(AmountError::ParseError("cannot split into zero parts".to_string()));
        }
        Amount::rounded(self.0 / Decimal::from(parts))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100));
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().value(), dec!(100.00));
    }

    #[test]
    fn test_amount_zero_rejected() {
        let amount = Amount::new(Decimal::ZERO);
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(dec!(-100));
        assert!(matches!(amount, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        let amount = Amount::new(dec!(0.001));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(3))));
    }

    #[test]
    fn test_amount_trailing_zeros_ok() {
        let amount = Amount::new(dec!(100.500)).unwrap();
        assert_eq!(amount.value(), dec!(100.50));
        assert_eq!(amount.value().scale(), 2);
    }

    #[test]
    fn test_amount_overflow() {
        let amount = Amount::new(dec!(1000000000000.01));
        assert!(matches!(amount, Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_max_value_ok() {
        let amount = Amount::new(dec!(1000000000000));
        assert!(amount.is_ok());
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = "123.45".parse().unwrap();
        assert_eq!(amount.value(), dec!(123.45));

        let bad: Result<Amount, _> = "abc".parse();
        assert!(matches!(bad, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_equal_share() {
        let total = Amount::new(dec!(9000.00)).unwrap();
        assert_eq!(total.equal_share(3).unwrap().value(), dec!(3000.00));

        let total = Amount::new(dec!(10000.00)).unwrap();
        assert_eq!(total.equal_share(3).unwrap().value(), dec!(3333.33));

        assert!(total.equal_share(0).is_err());
    }

    #[test]
    fn test_amount_serde() {
        let amount: Amount = serde_json::from_str("\"250.5\"").unwrap();
        assert_eq!(amount.value(), dec!(250.50));

        let zero: Result<Amount, _> = serde_json::from_str("\"0\"");
        assert!(zero.is_err());
    }
}
