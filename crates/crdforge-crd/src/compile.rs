//! Attribute-tree compilation
//!
//! Turns one served version of a parsed CRD into everything the synthesizer
//! needs: the kind's fixed identity, the attribute tree driving decode, and
//! the compiled OpenAPI constraints.

use crdforge_core::{
    Attribute, AttributeNode, AttributeTree, FieldValidator, ObjectNode, ResourceKind,
};

use crate::constraints::{ConstraintSet, json_schema_for_root};
use crate::definition::{
    AdditionalProperties, CrdDefinition, CrdScope, CrdVersion, PropertySchema, PropertyType,
};
use crate::error::{CrdError, Result};

/// Root-level schema properties that never become configurable attributes:
/// the first two are injected by the synthesizer, metadata is replaced by
/// the standard metadata attribute, and status is server-owned.
const SKIPPED_ROOT_PROPERTIES: &[&str] = &["apiVersion", "kind", "metadata", "status"];

/// A CRD version compiled for synthesis
#[derive(Debug)]
pub struct CompiledKind {
    /// Fixed group/version/kind identity stamped onto every manifest
    pub kind: ResourceKind,
    /// Resource scope (drives whether metadata carries a namespace)
    pub scope: CrdScope,
    /// The configurable shape, as data
    pub tree: AttributeTree,
    /// Compiled OpenAPI constraints
    pub constraints: ConstraintSet,
}

/// Compile one version of a CRD
///
/// With `version: None` the storage version is used, falling back to the
/// first served version.
pub fn compile(def: &CrdDefinition, version: Option<&str>) -> Result<CompiledKind> {
    let version = resolve_version(def, version)?;

    let kind = ResourceKind::new(def.group.clone(), version.name.clone(), def.names.kind.clone());

    let mut attributes = vec![metadata_attribute(def.scope)?];
    attributes.extend(root_attributes(version)?);

    let tree = AttributeTree::for_resource(attributes)?;

    let constraints = match &version.schema {
        Some(schema) => ConstraintSet::compile(&json_schema_for_root(schema))?,
        None => ConstraintSet::unconstrained()?,
    };

    Ok(CompiledKind {
        kind,
        scope: def.scope,
        tree,
        constraints,
    })
}

fn resolve_version<'a>(def: &'a CrdDefinition, requested: Option<&str>) -> Result<&'a CrdVersion> {
    match requested {
        Some(name) => def.version(name).ok_or_else(|| CrdError::UnknownVersion {
            name: def.name.clone(),
            version: name.to_string(),
        }),
        None => def.default_version().ok_or_else(|| CrdError::NoServedVersion {
            name: def.name.clone(),
        }),
    }
}

/// The standard metadata attribute shared by every kind
///
/// CRD schemas leave metadata unspecified; its shape and validators come
/// from Kubernetes object-meta conventions instead.
fn metadata_attribute(scope: CrdScope) -> Result<Attribute> {
    let mut fields = vec![
        Attribute::required("name", AttributeNode::string()).with_validator(FieldValidator::Name),
    ];
    if scope == CrdScope::Namespaced {
        fields.push(
            Attribute::optional("namespace", AttributeNode::string())
                .with_validator(FieldValidator::Name),
        );
    }
    fields.push(
        Attribute::optional("labels", AttributeNode::map(AttributeNode::string()))
            .with_validator(FieldValidator::Labels),
    );
    fields.push(
        Attribute::optional("annotations", AttributeNode::map(AttributeNode::string()))
            .with_validator(FieldValidator::Annotations),
    );

    Ok(Attribute::optional(
        "metadata",
        AttributeNode::object(ObjectNode::new(fields)?),
    ))
}

/// Kind-specific attributes from the version's root schema properties
fn root_attributes(version: &CrdVersion) -> Result<Vec<Attribute>> {
    let Some(schema) = &version.schema else {
        // Schemaless CRD: accept an arbitrary spec.
        return Ok(vec![Attribute::optional("spec", AttributeNode::dynamic())]);
    };

    let Some(properties) = &schema.properties else {
        return Ok(vec![Attribute::optional("spec", AttributeNode::dynamic())]);
    };

    let mut attributes = Vec::new();
    for (name, prop) in properties {
        if SKIPPED_ROOT_PROPERTIES.contains(&name.as_str()) {
            continue;
        }
        attributes.push(attribute_from_property(name, prop, schema.is_required(name))?);
    }
    Ok(attributes)
}

fn attribute_from_property(
    name: &str,
    prop: &PropertySchema,
    required: bool,
) -> Result<Attribute> {
    let node = node_from_property(prop)?;
    let mut attribute = if required {
        Attribute::required(name, node)
    } else {
        Attribute::optional(name, node)
    };
    if let Some(default) = &prop.default {
        attribute = attribute.with_default(default.clone());
    }
    Ok(attribute)
}

/// Map an OpenAPI property onto an attribute node (recursive)
fn node_from_property(prop: &PropertySchema) -> Result<AttributeNode> {
    if prop.x_int_or_string {
        return Ok(AttributeNode::int_or_string());
    }
    if prop.x_preserve_unknown {
        return Ok(AttributeNode::dynamic());
    }

    let node = match &prop.type_ {
        PropertyType::String => AttributeNode::string(),
        PropertyType::Integer => AttributeNode::integer(),
        PropertyType::Boolean => AttributeNode::boolean(),
        PropertyType::Number => AttributeNode::number(),
        PropertyType::Array => {
            let item = match &prop.items {
                Some(items) => node_from_property(items)?,
                None => AttributeNode::dynamic(),
            };
            AttributeNode::list(item)
        }
        PropertyType::Object => {
            if let Some(properties) = &prop.properties {
                let mut attributes = Vec::with_capacity(properties.len());
                for (name, nested) in properties {
                    attributes.push(attribute_from_property(
                        name,
                        nested,
                        prop.is_required(name),
                    )?);
                }
                AttributeNode::object(ObjectNode::new(attributes)?)
            } else if let Some(AdditionalProperties::Schema(value_schema)) =
                &prop.additional_properties
            {
                AttributeNode::map(node_from_property(value_schema)?)
            } else {
                // An object that declares neither properties nor a value
                // schema tells us nothing about its shape.
                AttributeNode::dynamic()
            }
        }
        PropertyType::Unknown(_) => AttributeNode::dynamic(),
    };
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CrdParser;
    use crdforge_core::{AttributeMode, ScalarKind};

    const CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.io
spec:
  group: example.io
  scope: Namespaced
  names:
    kind: Widget
    plural: widgets
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          required:
            - spec
          properties:
            spec:
              type: object
              required:
                - size
              properties:
                size:
                  type: integer
                replicas:
                  type: integer
                  default: 1
                port:
                  x-kubernetes-int-or-string: true
                payload:
                  type: object
                  x-kubernetes-preserve-unknown-fields: true
                limits:
                  type: object
                  additionalProperties:
                    type: string
                ratio:
                  type: number
"#;

    fn widget() -> CompiledKind {
        let def = CrdParser::parse(CRD).unwrap();
        compile(&def, None).unwrap()
    }

    #[test]
    fn test_kind_identity() {
        let compiled = widget();
        assert_eq!(compiled.kind.api_version(), "example.io/v1");
        assert_eq!(compiled.kind.kind, "Widget");
        assert_eq!(compiled.scope, CrdScope::Namespaced);
    }

    #[test]
    fn test_root_shape() {
        let compiled = widget();
        let root = compiled.tree.root();

        let names: Vec<&str> = root.names().collect();
        assert_eq!(names, ["id", "yaml", "api_version", "kind", "metadata", "spec"]);
        assert_eq!(root.get("spec").unwrap().mode, AttributeMode::Required);
        assert_eq!(root.get("metadata").unwrap().mode, AttributeMode::Optional);
    }

    #[test]
    fn test_metadata_validators() {
        let compiled = widget();
        let metadata = compiled.tree.root().get("metadata").unwrap();
        let AttributeNode::Object(object) = &metadata.node else {
            panic!("metadata is not an object");
        };

        assert_eq!(
            object.get("name").unwrap().validators,
            vec![FieldValidator::Name]
        );
        assert!(object.get("namespace").is_some());
        assert_eq!(
            object.get("labels").unwrap().validators,
            vec![FieldValidator::Labels]
        );
        assert_eq!(
            object.get("annotations").unwrap().validators,
            vec![FieldValidator::Annotations]
        );
    }

    #[test]
    fn test_cluster_scope_has_no_namespace() {
        let yaml = CRD.replace("scope: Namespaced", "scope: Cluster");
        let def = CrdParser::parse(&yaml).unwrap();
        let compiled = compile(&def, None).unwrap();

        let metadata = compiled.tree.root().get("metadata").unwrap();
        let AttributeNode::Object(object) = &metadata.node else {
            panic!("metadata is not an object");
        };
        assert!(object.get("namespace").is_none());
    }

    #[test]
    fn test_spec_node_mapping() {
        let compiled = widget();
        let spec = compiled.tree.root().get("spec").unwrap();
        let AttributeNode::Object(object) = &spec.node else {
            panic!("spec is not an object");
        };

        assert_eq!(object.get("size").unwrap().mode, AttributeMode::Required);
        assert_eq!(object.get("size").unwrap().node, AttributeNode::integer());

        let replicas = object.get("replicas").unwrap();
        assert_eq!(replicas.mode, AttributeMode::Optional);
        assert!(replicas.default.is_some());

        assert_eq!(
            object.get("port").unwrap().node,
            AttributeNode::Scalar(ScalarKind::IntOrString)
        );
        assert_eq!(
            object.get("payload").unwrap().node,
            AttributeNode::Scalar(ScalarKind::Dynamic)
        );
        assert_eq!(
            object.get("limits").unwrap().node,
            AttributeNode::map(AttributeNode::string())
        );
        assert_eq!(object.get("ratio").unwrap().node, AttributeNode::number());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let def = CrdParser::parse(CRD).unwrap();
        let result = compile(&def, Some("v9"));
        assert!(matches!(result, Err(CrdError::UnknownVersion { .. })));
    }

    #[test]
    fn test_schemaless_version_gets_dynamic_spec() {
        let yaml = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: blobs.example.io
spec:
  group: example.io
  names:
    kind: Blob
    plural: blobs
  versions:
    - name: v1
      served: true
      storage: true
"#;
        let def = CrdParser::parse(yaml).unwrap();
        let compiled = compile(&def, None).unwrap();

        let spec = compiled.tree.root().get("spec").unwrap();
        assert_eq!(spec.node, AttributeNode::Scalar(ScalarKind::Dynamic));
        assert_eq!(spec.mode, AttributeMode::Optional);
    }
}
