//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

use super::AmountError;

/// Broad category of a domain failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: non-positive amount, missing required field
    Validation,
    /// The aggregate's current state forbids the operation
    InvalidTransition,
}

/// Business rule violations raised by the money aggregates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid amount (zero, negative, too many decimals, or exceeds limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Missing or malformed required field
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Payment would exceed the original value
    #[error("Overpayment: amount {valor} exceeds outstanding balance {saldo}")]
    Overpayment { valor: Decimal, saldo: Decimal },

    /// Aggregate already fully paid/received
    #[error("Already settled")]
    AlreadySettled,

    /// Aggregate already cancelled
    #[error("Already cancelled")]
    AlreadyCancelled,

    /// Cancellation attempted after a (partial) payment
    #[error("Cannot cancel: {valor_pago} has already been paid")]
    AlreadyPaid { valor_pago: Decimal },
}

impl DomainError {
    pub fn overpayment(valor: Decimal, saldo: Decimal) -> Self {
        Self::Overpayment { valor, saldo }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::Overpayment { .. }
            | Self::AlreadySettled
            | Self::AlreadyCancelled
            | Self::AlreadyPaid { .. } => ErrorKind::InvalidTransition,
        }
    }

    /// Stable machine-readable code, used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "invalid_amount",
            Self::Validation(_) => "validation_error",
            Self::Overpayment { .. } => "overpayment",
            Self::AlreadySettled => "already_settled",
            Self::AlreadyCancelled => "already_cancelled",
            Self::AlreadyPaid { .. } => "already_paid",
        }
    }
}

impl From<AmountError> for DomainError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overpayment_error() {
        let err = DomainError::overpayment(Decimal::new(600, 0), Decimal::new(500, 0));

        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert!(err.to_string().contains("600"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_amount_error_is_validation() {
        let err: DomainError = AmountError::NotPositive(Decimal::ZERO).into();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), "invalid_amount");
    }

    #[test]
    fn test_already_paid_error() {
        let err = DomainError::AlreadyPaid {
            valor_pago: Decimal::new(10000, 2),
        };

        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert!(err.to_string().contains("100.00"));
    }
}
