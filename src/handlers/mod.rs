//! Application services module
//!
//! Use cases that load an aggregate, apply a transition, persist it and
//! publish the resulting events. Each service owns its repository seam and a
//! clone of the event bus.

mod apontamento_service;
mod commands;
mod conta_pagar_service;
mod conta_receber_service;
mod cronograma_service;
mod orcamento_service;


pub use apontamento_service::ApontamentoService;
pub use commands::*;
pub use conta_pagar_service::ContaPagarService;
pub use conta_receber_service::ContaReceberService;
pub use cronograma_service::CronogramaService;
pub use orcamento_service::OrcamentoService;
