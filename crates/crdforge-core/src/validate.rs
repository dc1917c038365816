//! Field validators for Kubernetes naming and formatting rules
//!
//! Validators are pure, total functions: they never panic and never perform
//! I/O. A failure is a value describing the violation; callers attach it to
//! the attribute path being decoded. All validators configured for a node
//! run independently, so one failure never masks another.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::diagnostics::DiagnosticCode;
use crate::value::Dynamic;

/// Maximum length of a DNS-1123 subdomain name
pub const MAX_NAME_LEN: usize = 253;

/// Maximum length of a label key's name segment and of a label value
pub const MAX_LABEL_SEGMENT_LEN: usize = 63;

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("DNS-1123 subdomain regex is valid")
});

static QUALIFIED_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$")
        .expect("qualified name segment regex is valid")
});

/// A single validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("'{value}' is not a valid DNS-1123 subdomain name: {reason}")]
    InvalidName { value: String, reason: String },

    #[error("label key '{key}' is invalid: {reason}")]
    InvalidLabel { key: String, reason: String },

    #[error("annotation key '{key}' is invalid: {reason}")]
    InvalidAnnotation { key: String, reason: String },

    #[error("value is not valid base64: {reason}")]
    InvalidBase64 { reason: String },
}

impl ValidatorError {
    /// The diagnostic code this failure maps to
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::InvalidName { .. } => DiagnosticCode::InvalidName,
            Self::InvalidLabel { .. } => DiagnosticCode::InvalidLabel,
            Self::InvalidAnnotation { .. } => DiagnosticCode::InvalidAnnotation,
            Self::InvalidBase64 { .. } => DiagnosticCode::InvalidBase64,
        }
    }
}

/// Validate a DNS-1123 subdomain name (resource names, namespaces)
pub fn validate_name(value: &str) -> Result<(), ValidatorError> {
    if value.is_empty() {
        return Err(ValidatorError::InvalidName {
            value: value.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if value.len() > MAX_NAME_LEN {
        return Err(ValidatorError::InvalidName {
            value: value.to_string(),
            reason: format!("must be at most {} characters", MAX_NAME_LEN),
        });
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        return Err(ValidatorError::InvalidName {
            value: value.to_string(),
            reason: "must consist of lowercase alphanumerics, '-' and '.', and start and end with an alphanumeric".to_string(),
        });
    }
    Ok(())
}

/// Validate one label key: `[prefix/]name`
///
/// The optional prefix is a DNS-1123 subdomain; the name segment is 1-63
/// characters of alphanumerics, `-`, `_` and `.`, alphanumeric at both ends.
pub fn validate_label_key(key: &str) -> Result<(), ValidatorError> {
    let invalid = |reason: String| ValidatorError::InvalidLabel {
        key: key.to_string(),
        reason,
    };

    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if name.contains('/') {
            return Err(invalid("must contain at most one '/'".to_string()));
        }
        if prefix.is_empty() || prefix.len() > MAX_NAME_LEN || !DNS1123_SUBDOMAIN.is_match(prefix) {
            return Err(invalid(
                "prefix must be a non-empty DNS-1123 subdomain".to_string(),
            ));
        }
    }

    if name.is_empty() {
        return Err(invalid("name segment must not be empty".to_string()));
    }
    if name.len() > MAX_LABEL_SEGMENT_LEN {
        return Err(invalid(format!(
            "name segment must be at most {} characters",
            MAX_LABEL_SEGMENT_LEN
        )));
    }
    if !QUALIFIED_SEGMENT.is_match(name) {
        return Err(invalid(
            "name segment must consist of alphanumerics, '-', '_' and '.', and start and end with an alphanumeric".to_string(),
        ));
    }
    Ok(())
}

/// Validate one label value: empty, or at most 63 characters of the name
/// segment grammar
pub fn validate_label_value(key: &str, value: &str) -> Result<(), ValidatorError> {
    if value.is_empty() {
        return Ok(());
    }
    let invalid = |reason: String| ValidatorError::InvalidLabel {
        key: key.to_string(),
        reason,
    };
    if value.len() > MAX_LABEL_SEGMENT_LEN {
        return Err(invalid(format!(
            "value must be at most {} characters",
            MAX_LABEL_SEGMENT_LEN
        )));
    }
    if !QUALIFIED_SEGMENT.is_match(value) {
        return Err(invalid(
            "value must consist of alphanumerics, '-', '_' and '.', and start and end with an alphanumeric".to_string(),
        ));
    }
    Ok(())
}

/// Validate a label map, failing on the first offending entry
pub fn validate_labels<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<(), ValidatorError> {
    for (key, value) in entries {
        validate_label_key(key)?;
        validate_label_value(key, value)?;
    }
    Ok(())
}

/// Validate an annotation map: keys use the label-key grammar, values are
/// unconstrained
pub fn validate_annotations<'a>(
    keys: impl IntoIterator<Item = &'a str>,
) -> Result<(), ValidatorError> {
    for key in keys {
        validate_label_key(key).map_err(|err| match err {
            ValidatorError::InvalidLabel { key, reason } => {
                ValidatorError::InvalidAnnotation { key, reason }
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Validate that a string decodes as standard padded base64
pub fn validate_base64(value: &str) -> Result<(), ValidatorError> {
    BASE64_STANDARD
        .decode(value)
        .map(|_| ())
        .map_err(|err| ValidatorError::InvalidBase64 {
            reason: err.to_string(),
        })
}

/// A validator attached to an attribute node
///
/// Shape mismatches are the decoder's concern; a validator handed a value of
/// a shape it does not understand passes, so one problem is reported once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValidator {
    /// DNS-1123 subdomain name (applies to string values)
    Name,
    /// Label map keys and values (applies to string maps)
    Labels,
    /// Annotation map keys (applies to string maps)
    Annotations,
    /// Standard padded base64 content (applies to string values)
    Base64,
}

impl FieldValidator {
    /// Run this validator against a decoded value
    pub fn check(&self, value: &Dynamic) -> Result<(), ValidatorError> {
        match self {
            Self::Name => match value.as_str() {
                Some(s) => validate_name(s),
                None => Ok(()),
            },
            Self::Base64 => match value.as_str() {
                Some(s) => validate_base64(s),
                None => Ok(()),
            },
            Self::Labels => match value.as_map() {
                Some(map) => validate_labels(
                    map.iter()
                        .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v))),
                ),
                None => Ok(()),
            },
            Self::Annotations => match value.as_map() {
                Some(map) => validate_annotations(map.keys().map(String::as_str)),
                None => Ok(()),
            },
        }
    }
}
