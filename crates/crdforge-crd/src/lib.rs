//! crdforge CRD - schema-as-data loading for the manifest pipeline
//!
//! This crate turns CustomResourceDefinition YAML into the data that drives
//! synthesis:
//! - `CrdParser` / `CrdDefinition`: structured CRD representation
//! - `compile`: one served version -> `CompiledKind` (identity + attribute
//!   tree + constraints)
//! - `ConstraintSet`: the version's OpenAPI constraints as a compiled JSON
//!   Schema validator
//! - `CrdCatalog`: bulk loading from files and directories, keyed by kind

pub mod catalog;
pub mod compile;
pub mod constraints;
pub mod definition;
pub mod error;
pub mod parser;

pub use catalog::CrdCatalog;
pub use compile::{CompiledKind, compile};
pub use constraints::ConstraintSet;
pub use definition::{
    AdditionalProperties, CrdDefinition, CrdNames, CrdScope, CrdVersion, PropertySchema,
    PropertyType,
};
pub use error::CrdError;
pub use parser::CrdParser;
