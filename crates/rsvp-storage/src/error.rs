//! Storage error types.

/// Errors returned by an [`EventStore`](crate::EventStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be reached or initialised.
    #[error("failed to connect to storage: {reason}")]
    Connect { reason: String },

    /// A query failed.
    #[error("storage query failed: {reason}")]
    Query { reason: String },

    /// The addressed record does not exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// A uniqueness constraint rejected the write.
    #[error("duplicate {what}")]
    Duplicate { what: String },

    /// The deployment holds more than one event row.
    #[error("expected a single event, found {count}")]
    MultipleEvents { count: usize },
}
