//! Error types for gateway and backend operations.

use std::string::FromUtf8Error;
use thiserror::Error;

/// Result type for backend operations.
pub type StashResult<T> = Result<T, StashError>;

/// Errors raised by a single backend attempt.
///
/// Backend errors never escape [`crate::StorageGateway::save`] or
/// [`crate::StorageGateway::read`]; the gateway reports them to its
/// [`crate::DiagnosticSink`] and moves on to the next backend.
#[derive(Debug, Error)]
pub enum StashError {
    /// The host does not expose the native surface right now
    /// (e.g. storage access denied in a sandboxed frame).
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The host denied the requested storage quota.
    #[error("quota exceeded: requested {requested} bytes, {available} available")]
    QuotaExceeded {
        /// Bytes requested.
        requested: u64,
        /// Bytes the host was willing to grant.
        available: u64,
    },

    /// The backend holds no record for the name.
    #[error("no data stored under {name:?}")]
    NotFound {
        /// The requested name.
        name: String,
    },

    /// A native object did not offer the operations the adapter relies on.
    #[error("contract violation: {0}")]
    Contract(String),

    /// A record-store transaction failed or was aborted.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// The record store exists at a newer version than requested.
    #[error("record store {name:?} is at version {existing}, requested {requested}")]
    Version {
        /// Store name.
        name: String,
        /// Version already on the host.
        existing: u32,
        /// Version requested by the adapter.
        requested: u32,
    },

    /// A transient resource locator could not be minted or resolved.
    #[error("locator {locator:?}: {reason}")]
    Locator {
        /// The locator string.
        locator: String,
        /// Why it failed.
        reason: String,
    },

    /// An error reported by the host platform.
    #[error("host error: {0}")]
    Host(String),

    /// Stored bytes were not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
}

impl StashError {
    /// Creates a [`StashError::NotFound`] for `name`.
    pub fn not_found(name: impl Into<String>) -> Self {
        StashError::NotFound { name: name.into() }
    }

    /// Returns true if the backend answered but held no record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StashError::NotFound { .. })
    }
}
