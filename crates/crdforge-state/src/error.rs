//! Error types for snapshot persistence

use thiserror::Error;

/// Result type for state operations
pub type Result<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateError {
    /// No snapshot stored at the address
    #[error("snapshot '{address}' not found")]
    NotFound { address: String },

    /// Create against an address that already holds a snapshot
    #[error("snapshot '{address}' already exists")]
    AlreadyExists { address: String },

    /// Address cannot be mapped onto the store's layout
    #[error("invalid snapshot address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
