//! Quota Module Error Types
//!
//! Errors raised by the storage and configuration layers. The tracker's
//! public quota operations never surface these; they recover by treating the
//! ledger as empty.

/// Error types for quota operations
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// Filesystem error from a file-backed store
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted ledger could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store rejected the operation
    #[error("Storage unavailable: {0}")]
    Storage(String),

    /// Feature identifier not in the gated set
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for quota operations
pub type QuotaResult<T> = Result<T, QuotaError>;
