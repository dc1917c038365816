//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unsupported value shape: {detail}")]
    UnsupportedShape { detail: String },

    #[error("Invalid attribute tree: {message}")]
    InvalidSchema { message: String },

    #[error("Invalid override: {message}")]
    InvalidOverride { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl CoreError {
    /// Shorthand for an `UnsupportedShape` error
    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
