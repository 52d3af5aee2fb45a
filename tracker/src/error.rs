//! Error types for the Kudos tracker.
//!
//! The core operates on well-formed in-memory structures supplied by the
//! host, so the failure surface is small: storage reads/writes and JSON
//! encoding. Caller misuse (resolving an unknown event, querying an empty
//! window) returns `false`/empty results rather than an error.

use thiserror::Error;

/// Errors from a [`Storage`](crate::storage::Storage) implementation.
#[derive(Error, Debug)]
pub enum StorageError {
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during ledger operations.
///
/// Routine persistence after each mutation is best-effort and never
/// surfaces through this type; it appears only on the explicit paths that
/// opt into it ([`flush`](crate::EventLedger::flush),
/// [`export`](crate::EventLedger::export)).
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The backing store rejected a read or write.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
