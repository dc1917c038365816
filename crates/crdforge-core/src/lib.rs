//! crdforge Core - foundational types for the manifest materialization pipeline
//!
//! This crate provides the types shared across crdforge:
//! - `Dynamic`: values of statically unknown shape, with lossless round-trips
//! - `FieldValidator`: Kubernetes naming and formatting checks
//! - `Diagnostics`: path-addressed validation findings
//! - `AttributeTree`: a resource kind's configurable shape, as data
//! - `ResourceKind`: the fixed group/version/kind identity of a kind

pub mod diagnostics;
pub mod error;
pub mod kind;
pub mod schema;
pub mod validate;
pub mod value;

pub use diagnostics::{AttributePath, Diagnostic, DiagnosticCode, Diagnostics, PathSegment};
pub use error::CoreError;
pub use kind::ResourceKind;
pub use schema::{
    Attribute, AttributeMode, AttributeNode, AttributeTree, ObjectNode, ScalarKind,
    COMPUTED_ATTRIBUTES,
};
pub use validate::{
    FieldValidator, ValidatorError, validate_annotations, validate_base64, validate_label_key,
    validate_label_value, validate_labels, validate_name,
};
pub use value::{Dynamic, DynamicNumber, IntOrString, parse_set_overrides};
