//! A diagnostic sink that records every warning.

use std::cell::RefCell;
use webstash_core::{BackendCapability, DiagnosticSink, Operation, StashError};

/// One recovered backend failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The backend that failed.
    pub backend: BackendCapability,
    /// What the gateway was doing.
    pub operation: Operation,
    /// The rendered error.
    pub message: String,
    /// True if the backend answered but held no record.
    pub not_found: bool,
}

/// Records warnings in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    warnings: RefCell<Vec<Warning>>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every warning so far.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    /// Backends that warned, in order.
    pub fn backends(&self) -> Vec<BackendCapability> {
        self.warnings.borrow().iter().map(|w| w.backend).collect()
    }

    /// Number of warnings recorded.
    pub fn len(&self) -> usize {
        self.warnings.borrow().len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.warnings.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn warn(&self, backend: BackendCapability, operation: Operation, error: &StashError) {
        tracing::debug!(%backend, %operation, %error, "recorded backend warning");
        self.warnings.borrow_mut().push(Warning {
            backend,
            operation,
            message: error.to_string(),
            not_found: error.is_not_found(),
        });
    }
}
