//! Operation Context
//!
//! Metadata about who triggered an operation. It travels with every service
//! call and is handed, cloned, to each event subscriber so reactions can
//! attribute their own writes to the original actor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for an operation, used for attribution and tracing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContext {
    /// Acting user (X-Usuario-Id header, or the actor of the originating event)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario_id: Option<Uuid>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for work started by the system itself (scheduled jobs)
    pub fn system() -> Self {
        Self::new().with_correlation_id(Uuid::new_v4())
    }

    pub fn with_usuario(mut self, usuario_id: Uuid) -> Self {
        self.usuario_id = Some(usuario_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let usuario_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let context = OperationContext::new()
            .with_usuario(usuario_id)
            .with_correlation_id(correlation_id);

        assert_eq!(context.usuario_id, Some(usuario_id));
        assert_eq!(context.correlation_id, Some(correlation_id));
    }

    #[test]
    fn test_ensure_correlation_id() {
        let mut context = OperationContext::new();
        assert!(context.correlation_id.is_none());

        let id = context.ensure_correlation_id();
        assert_eq!(context.correlation_id, Some(id));

        // Calling again should return the same ID
        assert_eq!(context.ensure_correlation_id(), id);
    }

    #[test]
    fn test_system_context_has_no_actor() {
        let context = OperationContext::system();
        assert!(context.usuario_id.is_none());
        assert!(context.correlation_id.is_some());
    }
}
