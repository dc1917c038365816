//! Manifest attribute trees
//!
//! An [`AttributeTree`] describes one resource kind's configurable shape as
//! data: a root object whose attributes nest scalars, objects, lists and
//! maps. Trees are compiled from CRD OpenAPI schemas at load time, so a
//! single generic decode/synthesize pipeline serves every kind.

use crate::error::{CoreError, Result};
use crate::validate::FieldValidator;
use crate::value::Dynamic;

/// Attribute names that are always computed and injected by the
/// synthesizer; user-supplied values for these are discarded.
pub const COMPUTED_ATTRIBUTES: &[&str] = &["id", "yaml", "api_version", "kind"];

/// Shape of a scalar attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Integer,
    Boolean,
    /// Integer or float, preserving the supplied form
    Number,
    /// Kubernetes int-or-string union
    IntOrString,
    /// Arbitrary shape (`x-kubernetes-preserve-unknown-fields`)
    Dynamic,
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::IntOrString => "int-or-string",
            Self::Dynamic => "dynamic",
        };
        f.write_str(s)
    }
}

/// One node of an attribute tree
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeNode {
    Scalar(ScalarKind),
    Object(ObjectNode),
    /// Homogeneous sequence of a nested node
    List(Box<AttributeNode>),
    /// String-keyed mapping to a nested node, insertion order preserved
    Map(Box<AttributeNode>),
}

impl AttributeNode {
    pub fn string() -> Self {
        Self::Scalar(ScalarKind::String)
    }

    pub fn integer() -> Self {
        Self::Scalar(ScalarKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::Scalar(ScalarKind::Boolean)
    }

    pub fn number() -> Self {
        Self::Scalar(ScalarKind::Number)
    }

    pub fn int_or_string() -> Self {
        Self::Scalar(ScalarKind::IntOrString)
    }

    pub fn dynamic() -> Self {
        Self::Scalar(ScalarKind::Dynamic)
    }

    pub fn list(item: AttributeNode) -> Self {
        Self::List(Box::new(item))
    }

    pub fn map(value: AttributeNode) -> Self {
        Self::Map(Box::new(value))
    }

    pub fn object(node: ObjectNode) -> Self {
        Self::Object(node)
    }
}

/// Whether an attribute must, may, or cannot be supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    Required,
    Optional,
    /// Produced by the synthesizer; user input for it is discarded
    Computed,
}

/// A named attribute of an object node
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name, unique within the enclosing object
    pub name: String,
    /// Shape of the attribute's value
    pub node: AttributeNode,
    /// Required / optional / computed
    pub mode: AttributeMode,
    /// Field validators to run against decoded values
    pub validators: Vec<FieldValidator>,
    /// Default applied when an optional attribute is absent
    pub default: Option<Dynamic>,
}

impl Attribute {
    pub fn required(name: impl Into<String>, node: AttributeNode) -> Self {
        Self::new(name, node, AttributeMode::Required)
    }

    pub fn optional(name: impl Into<String>, node: AttributeNode) -> Self {
        Self::new(name, node, AttributeMode::Optional)
    }

    pub fn computed(name: impl Into<String>, node: AttributeNode) -> Self {
        Self::new(name, node, AttributeMode::Computed)
    }

    fn new(name: impl Into<String>, node: AttributeNode, mode: AttributeMode) -> Self {
        Self {
            name: name.into(),
            node,
            mode,
            validators: Vec::new(),
            default: None,
        }
    }

    /// Attach a field validator
    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Attach a default value
    pub fn with_default(mut self, default: Dynamic) -> Self {
        self.default = Some(default);
        self
    }
}

/// An ordered set of named attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    attributes: Vec<Attribute>,
}

impl ObjectNode {
    /// Build an object node, rejecting duplicate attribute names
    pub fn new(attributes: Vec<Attribute>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for attribute in &attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(CoreError::InvalidSchema {
                    message: format!("duplicate attribute '{}'", attribute.name),
                });
            }
        }
        Ok(Self { attributes })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of all attributes, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
}

/// A complete attribute tree for one resource kind
///
/// The root is always an object carrying the computed `id`, `yaml`,
/// `api_version` and `kind` attributes ahead of the kind's own shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTree {
    root: ObjectNode,
}

impl AttributeTree {
    /// Wrap a root object, enforcing the computed-attribute invariant
    pub fn new(root: ObjectNode) -> Result<Self> {
        for name in COMPUTED_ATTRIBUTES {
            match root.get(name) {
                Some(attribute) if attribute.mode == AttributeMode::Computed => {}
                Some(_) => {
                    return Err(CoreError::InvalidSchema {
                        message: format!("root attribute '{}' must be computed", name),
                    });
                }
                None => {
                    return Err(CoreError::InvalidSchema {
                        message: format!("root object is missing computed attribute '{}'", name),
                    });
                }
            }
        }
        Ok(Self { root })
    }

    /// Build a resource root from kind-specific attributes, prepending the
    /// computed quartet
    pub fn for_resource(attributes: Vec<Attribute>) -> Result<Self> {
        let mut all = vec![
            Attribute::computed("id", AttributeNode::integer()),
            Attribute::computed("yaml", AttributeNode::string()),
            Attribute::computed("api_version", AttributeNode::string()),
            Attribute::computed("kind", AttributeNode::string()),
        ];
        all.extend(attributes);
        Self::new(ObjectNode::new(all)?)
    }

    pub fn root(&self) -> &ObjectNode {
        &self.root
    }
}
