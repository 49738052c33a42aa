//! Operation Context
//!
//! Contains metadata about the current request for tracing.

use uuid::Uuid;

/// Context for an operation, carried from the HTTP layer into the service.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Correlation ID for request tracing
    pub correlation_id: Uuid,
}

impl OperationContext {
    /// Create a context with a fresh correlation ID
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Use a caller-supplied correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
