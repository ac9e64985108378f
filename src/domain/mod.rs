//! Domain module
//!
//! Core domain types and business logic.

pub mod amount;
pub mod context;
pub mod error;
pub mod events;
pub mod status;

pub use amount::{Amount, AmountError};
pub use context::OperationContext;
pub use error::{DomainError, ErrorKind};
pub use events::topics;
pub use status::{
    CategoriaContaPagar, StatusContaPagar, StatusContaReceber, StatusCronograma, TipoDocumento,
    TipoMovimentacao, UnknownVariant,
};
