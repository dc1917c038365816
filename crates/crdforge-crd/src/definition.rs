//! Structured CustomResourceDefinition representation
//!
//! A simplified view of a CRD focused on what manifest synthesis needs: the
//! kind's identity, its versions, and each version's OpenAPI schema.

use crdforge_core::Dynamic;
use indexmap::IndexMap;

/// A parsed CustomResourceDefinition
#[derive(Debug, Clone, PartialEq)]
pub struct CrdDefinition {
    /// Full CRD name (e.g., "xrds.apiextensions.crossplane.io")
    pub name: String,
    /// API group (e.g., "apiextensions.crossplane.io")
    pub group: String,
    /// Resource scope
    pub scope: CrdScope,
    /// Resource names (kind, plural, singular, shortNames)
    pub names: CrdNames,
    /// API versions with their schemas
    pub versions: Vec<CrdVersion>,
}

impl CrdDefinition {
    /// Get the storage version
    pub fn storage_version(&self) -> Option<&CrdVersion> {
        self.versions.iter().find(|v| v.storage)
    }

    /// Get all served versions
    pub fn served_versions(&self) -> impl Iterator<Item = &CrdVersion> {
        self.versions.iter().filter(|v| v.served)
    }

    /// Look up a specific version by name
    pub fn version(&self, name: &str) -> Option<&CrdVersion> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// The version used when none is requested: the storage version if one
    /// is marked, otherwise the first served version
    pub fn default_version(&self) -> Option<&CrdVersion> {
        self.storage_version()
            .or_else(|| self.served_versions().next())
    }
}

/// CRD scope - whether resources are namespaced or cluster-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrdScope {
    #[default]
    Namespaced,
    Cluster,
}

impl std::fmt::Display for CrdScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespaced => write!(f, "Namespaced"),
            Self::Cluster => write!(f, "Cluster"),
        }
    }
}

/// CRD naming information
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrdNames {
    /// Kind (e.g., "CompositeResourceDefinition")
    pub kind: String,
    /// Plural name (e.g., "compositeresourcedefinitions")
    pub plural: String,
    /// Singular name
    pub singular: Option<String>,
    /// Short names for kubectl (e.g., ["xrd"])
    pub short_names: Vec<String>,
    /// List kind
    pub list_kind: Option<String>,
    /// Categories for grouping (e.g., ["crossplane"])
    pub categories: Vec<String>,
}

/// A single API version of a CRD
#[derive(Debug, Clone, PartialEq)]
pub struct CrdVersion {
    /// Version name (e.g., "v1", "v1beta1")
    pub name: String,
    /// Whether this version is served by the API server
    pub served: bool,
    /// Whether this is the storage version
    pub storage: bool,
    /// Whether this version is deprecated
    pub deprecated: bool,
    /// Deprecation warning message
    pub deprecation_warning: Option<String>,
    /// OpenAPI v3 schema root, if declared
    pub schema: Option<PropertySchema>,
}

/// OpenAPI v3 schema for a single property, recursively
///
/// Only the fields relevant to attribute-tree compilation and constraint
/// validation are retained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertySchema {
    /// Property type
    pub type_: PropertyType,
    /// Human-readable description
    pub description: Option<String>,
    /// Default value
    pub default: Option<Dynamic>,
    /// Format hint (e.g., "int64", "date-time")
    pub format: Option<String>,
    /// Regex pattern for strings
    pub pattern: Option<String>,
    /// Allowed values (enum)
    pub enum_values: Option<Vec<Dynamic>>,
    /// Minimum value for numbers
    pub minimum: Option<f64>,
    /// Maximum value for numbers
    pub maximum: Option<f64>,
    /// Minimum string length
    pub min_length: Option<u64>,
    /// Maximum string length
    pub max_length: Option<u64>,
    /// Minimum array items
    pub min_items: Option<u64>,
    /// Maximum array items
    pub max_items: Option<u64>,
    /// Whether array items must be unique
    pub unique_items: bool,
    /// Whether null is allowed
    pub nullable: bool,
    /// Nested object properties, declaration order preserved
    pub properties: Option<IndexMap<String, PropertySchema>>,
    /// Required nested properties
    pub required: Option<Vec<String>>,
    /// Array item schema
    pub items: Option<Box<PropertySchema>>,
    /// Additional properties for objects
    pub additional_properties: Option<AdditionalProperties>,
    /// `x-kubernetes-preserve-unknown-fields`
    pub x_preserve_unknown: bool,
    /// `x-kubernetes-int-or-string`
    pub x_int_or_string: bool,
}

impl PropertySchema {
    /// Check if this property has nested properties
    pub fn has_nested_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Check if a nested property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|r| r.iter().any(|n| n == name))
    }
}

/// Property type in an OpenAPI schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    #[default]
    Object,
    /// Unknown or unspecified type
    Unknown(String),
}

impl PropertyType {
    /// Parse from the schema's string representation
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Additional properties configuration for objects
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
    /// Additional properties are allowed (any type)
    #[default]
    Allowed,
    /// Additional properties are not allowed
    Denied,
    /// Additional properties must match a schema
    Schema(Box<PropertySchema>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(name: &str, served: bool, storage: bool) -> CrdVersion {
        CrdVersion {
            name: name.to_string(),
            served,
            storage,
            deprecated: false,
            deprecation_warning: None,
            schema: None,
        }
    }

    #[test]
    fn test_version_selection() {
        let def = CrdDefinition {
            name: "widgets.example.io".to_string(),
            group: "example.io".to_string(),
            scope: CrdScope::Namespaced,
            names: CrdNames {
                kind: "Widget".to_string(),
                plural: "widgets".to_string(),
                ..Default::default()
            },
            versions: vec![version("v1beta1", true, false), version("v1", true, true)],
        };

        assert_eq!(def.storage_version().unwrap().name, "v1");
        assert_eq!(def.default_version().unwrap().name, "v1");
        assert_eq!(def.served_versions().count(), 2);
        assert!(def.version("v2").is_none());
    }

    #[test]
    fn test_default_version_falls_back_to_served() {
        let def = CrdDefinition {
            name: "widgets.example.io".to_string(),
            group: "example.io".to_string(),
            scope: CrdScope::Cluster,
            names: CrdNames::default(),
            versions: vec![version("v1alpha1", false, false), version("v1beta1", true, false)],
        };

        assert_eq!(def.default_version().unwrap().name, "v1beta1");
    }

    #[test]
    fn test_property_type_parse() {
        assert_eq!(PropertyType::parse("string"), PropertyType::String);
        assert_eq!(PropertyType::parse("OBJECT"), PropertyType::Object);
        assert_eq!(
            PropertyType::parse("weird"),
            PropertyType::Unknown("weird".to_string())
        );
    }
}
