//! obra_financeiro Library
//!
//! Financial core of the construction back-office: payables, receivables,
//! billing schedules and the event choreography that links them to budgets
//! and payroll. Re-exports modules for integration testing and the binary.

pub mod aggregate;
pub mod api;
pub mod bus;
pub mod config;
pub mod db;
pub mod domain;
mod error;
pub mod handlers;
pub mod jobs;
pub mod repository;
pub mod state;
pub mod subscribers;

pub use bus::{Event, EventBus};
pub use config::Config;
pub use domain::{Amount, AmountError, DomainError, OperationContext};
pub use error::{AppError, AppResult, ErrorResponse};
pub use state::{AppState, Repositorios};
