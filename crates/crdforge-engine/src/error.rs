//! Engine error types

use crdforge_core::Diagnostics;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The configuration did not decode cleanly; no state may be written
    #[error("configuration is invalid: {0}")]
    Invalid(Diagnostics),

    /// YAML encoding of the value tree failed; the operation aborts with no
    /// partial output
    #[error("failed to serialize manifest: {message}")]
    Serialization { message: String },
}

impl EngineError {
    /// The diagnostics behind an `Invalid` error, if that is what this is
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Invalid(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}
