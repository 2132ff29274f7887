//! Diagnostic sinks for recovered backend failures.

use crate::capability::BackendCapability;
use crate::error::StashError;
use std::fmt;

/// The gateway operation that was being attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A save through [`crate::StorageGateway::save`].
    Save,
    /// A read through [`crate::StorageGateway::read`].
    Read,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Save => f.write_str("save"),
            Operation::Read => f.write_str("read"),
        }
    }
}

/// Receives warnings for backend failures the gateway recovered from.
pub trait DiagnosticSink: fmt::Debug {
    /// Called once per failed backend attempt, before falling back.
    fn warn(&self, backend: BackendCapability, operation: Operation, error: &StashError);
}

/// Forwards warnings to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, backend: BackendCapability, operation: Operation, error: &StashError) {
        tracing::warn!(
            backend = %backend,
            operation = %operation,
            error = %error,
            "backend {} failed, falling back",
            operation
        );
    }
}
