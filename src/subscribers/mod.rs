//! Choreography subscribers
//!
//! Reactions of the Accounts Payable and Accounts Receivable contexts to
//! events published by the other contexts. Registered once at start-up.
//! A reaction that fails returns its error to the bus, which logs it and
//! drops the event.

mod pagar;
mod receber;

use crate::bus::Event;
use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;

pub use pagar::vencimento_de_orcamento;

/// Default days until a payable derived from a budget falls due
pub const PRAZO_PADRAO_CONTA_PAGAR_DIAS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberConfig {
    pub prazo_padrao_conta_pagar_dias: i64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            prazo_padrao_conta_pagar_dias: PRAZO_PADRAO_CONTA_PAGAR_DIAS,
        }
    }
}

impl From<&Config> for SubscriberConfig {
    fn from(config: &Config) -> Self {
        Self {
            prazo_padrao_conta_pagar_dias: config.prazo_padrao_conta_pagar_dias,
        }
    }
}

/// Subscribe every reaction on the state's bus
pub fn register_all(state: &AppState, config: SubscriberConfig) {
    pagar::register(state, config);
    receber::register(state);

    tracing::info!("Financial choreography subscribers registered");
}

/// Downcast an event payload or fail with an internal error
fn payload<T: 'static>(event: &Event) -> Result<&T, AppError> {
    event.payload::<T>().ok_or_else(|| {
        AppError::Internal(format!("unexpected payload type on topic {}", event.name()))
    })
}
