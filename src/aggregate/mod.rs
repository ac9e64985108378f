//! Aggregate module
//!
//! Money-bearing aggregates: contas a pagar, contas a receber and billing
//! schedule lines. They are plain in-memory state machines; persistence and
//! event publication happen in the services that load them.

pub mod conta_pagar;
pub mod conta_receber;
pub mod cronograma;

pub use conta_pagar::{ContaPagar, ContaPagarEstado, NovaContaPagar};
pub use conta_receber::{ContaReceber, ContaReceberEstado, NovaContaReceber};
pub use cronograma::{CronogramaRecebimento, CronogramaRecebimentoEstado};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Amount, DomainError};

const SECONDS_PER_DAY: i64 = 86_400;

/// Read-only view shared by every aggregate that carries an original value,
/// a settled value and a due date.
pub trait TituloFinanceiro {
    fn id(&self) -> Uuid;

    /// Value the title was created with
    fn valor_original(&self) -> Decimal;

    /// Value paid or received so far
    fn valor_liquidado(&self) -> Decimal;

    fn data_vencimento(&self) -> DateTime<Utc>;

    /// Fully paid/received
    fn esta_quitado(&self) -> bool;

    /// Quitado or cancelled: no mutation accepted anymore
    fn esta_encerrado(&self) -> bool;

    fn saldo(&self) -> Decimal {
        self.valor_original() - self.valor_liquidado()
    }

    /// Share already settled, in percent (0 when the original value is 0)
    fn percentual_liquidado(&self) -> Decimal {
        let original = self.valor_original();
        if original.is_zero() {
            return Decimal::ZERO;
        }
        (self.valor_liquidado() / original * Decimal::ONE_HUNDRED).round_dp(2)
    }

    fn esta_vencido(&self, agora: DateTime<Utc>) -> bool {
        agora > self.data_vencimento() && !self.esta_encerrado()
    }

    /// Whole days past the due date, negative while not yet due
    fn dias_em_atraso(&self, agora: DateTime<Utc>) -> i64 {
        (agora - self.data_vencimento())
            .num_seconds()
            .div_euclid(SECONDS_PER_DAY)
    }
}

/// Validate a payment/receipt against what is still open.
///
/// Returns the new settled total. Callers check terminal states first.
pub(crate) fn liquidar(
    valor_original: Decimal,
    valor_liquidado: Decimal,
    valor: Decimal,
) -> Result<Decimal, DomainError> {
    let valor = Amount::new(valor)?.value();
    let saldo = valor_original - valor_liquidado;

    if valor > saldo {
        return Err(DomainError::overpayment(valor, saldo));
    }

    Ok(valor_liquidado + valor)
}

/// Trim a required text field, rejecting blank values.
pub(crate) fn texto_obrigatorio(campo: &str, valor: String) -> Result<String, DomainError> {
    let trimmed = valor.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", campo)));
    }
    Ok(trimmed.to_string())
}
