//! Error types for CRD loading and compilation

use crdforge_core::CoreError;
use thiserror::Error;

/// Result type for CRD operations
pub type Result<T> = std::result::Result<T, CrdError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CrdError {
    /// Document is not a usable CustomResourceDefinition
    #[error("Invalid CustomResourceDefinition: {message}")]
    InvalidCrd { message: String },

    /// Requested kind is not present in the catalog
    #[error("kind '{kind}' not found in catalog")]
    UnknownKind { kind: String },

    /// Requested version does not exist on the CRD
    #[error("CRD '{name}' has no version '{version}'")]
    UnknownVersion { name: String, version: String },

    /// No version of the CRD is served
    #[error("CRD '{name}' has no served version")]
    NoServedVersion { name: String },

    /// OpenAPI constraints did not compile into a JSON Schema validator
    #[error("failed to compile schema constraints: {message}")]
    SchemaCompile { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CrdError {
    /// Shorthand for an `InvalidCrd` error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidCrd {
            message: message.into(),
        }
    }
}
