//! CRD YAML parser
//!
//! Parses CustomResourceDefinition manifests into structured
//! [`CrdDefinition`]s. Parsing goes through the core `Dynamic` value so
//! property declaration order survives into the compiled attribute tree.

use crdforge_core::Dynamic;
use indexmap::IndexMap;

use crate::definition::{
    AdditionalProperties, CrdDefinition, CrdNames, CrdScope, CrdVersion, PropertySchema,
    PropertyType,
};
use crate::error::{CrdError, Result};

/// Parser for CRD YAML manifests
pub struct CrdParser;

impl CrdParser {
    /// Parse a single-document CRD YAML manifest
    pub fn parse(yaml: &str) -> Result<CrdDefinition> {
        let value = Dynamic::from_yaml_str(yaml)
            .map_err(|e| CrdError::invalid(format!("not valid YAML: {}", e)))?;
        Self::parse_value(&value)
    }

    /// Check whether a parsed document looks like a CRD at all
    pub fn is_crd(value: &Dynamic) -> bool {
        value.get("kind").and_then(Dynamic::as_str) == Some("CustomResourceDefinition")
    }

    /// Parse from an already loaded document
    pub fn parse_value(value: &Dynamic) -> Result<CrdDefinition> {
        let kind = value
            .get("kind")
            .and_then(Dynamic::as_str)
            .ok_or_else(|| CrdError::invalid("missing 'kind' field"))?;

        if kind != "CustomResourceDefinition" {
            return Err(CrdError::invalid(format!(
                "expected CustomResourceDefinition, got {}",
                kind
            )));
        }

        let name = value
            .get("metadata.name")
            .and_then(Dynamic::as_str)
            .ok_or_else(|| CrdError::invalid("missing 'metadata.name' field"))?
            .to_string();

        let spec = value
            .get("spec")
            .ok_or_else(|| CrdError::invalid("missing 'spec' field"))?;

        let group = spec
            .get("group")
            .and_then(Dynamic::as_str)
            .ok_or_else(|| CrdError::invalid("missing 'spec.group' field"))?
            .to_string();

        let scope = match spec.get("scope").and_then(Dynamic::as_str) {
            Some("Cluster") => CrdScope::Cluster,
            _ => CrdScope::Namespaced,
        };

        let names = Self::parse_names(spec.get("names"))?;
        let versions = Self::parse_versions(spec.get("versions"))?;

        Ok(CrdDefinition {
            name,
            group,
            scope,
            names,
            versions,
        })
    }

    fn parse_names(names: Option<&Dynamic>) -> Result<CrdNames> {
        let names = names.ok_or_else(|| CrdError::invalid("missing 'spec.names' field"))?;

        Ok(CrdNames {
            kind: names
                .get("kind")
                .and_then(Dynamic::as_str)
                .unwrap_or_default()
                .to_string(),
            plural: names
                .get("plural")
                .and_then(Dynamic::as_str)
                .unwrap_or_default()
                .to_string(),
            singular: names
                .get("singular")
                .and_then(Dynamic::as_str)
                .map(String::from),
            short_names: string_list(names.get("shortNames")),
            list_kind: names
                .get("listKind")
                .and_then(Dynamic::as_str)
                .map(String::from),
            categories: string_list(names.get("categories")),
        })
    }

    fn parse_versions(versions: Option<&Dynamic>) -> Result<Vec<CrdVersion>> {
        let versions = versions
            .and_then(Dynamic::as_list)
            .ok_or_else(|| CrdError::invalid("missing 'spec.versions' array"))?;

        versions.iter().map(Self::parse_version).collect()
    }

    fn parse_version(version: &Dynamic) -> Result<CrdVersion> {
        let name = version
            .get("name")
            .and_then(Dynamic::as_str)
            .ok_or_else(|| CrdError::invalid("version missing 'name' field"))?
            .to_string();

        let served = version
            .get("served")
            .and_then(Dynamic::as_bool)
            .unwrap_or(true);

        let storage = version
            .get("storage")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        let deprecated = version
            .get("deprecated")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        let deprecation_warning = version
            .get("deprecationWarning")
            .and_then(Dynamic::as_str)
            .map(String::from);

        let schema = version
            .get("schema.openAPIV3Schema")
            .map(Self::parse_property);

        Ok(CrdVersion {
            name,
            served,
            storage,
            deprecated,
            deprecation_warning,
            schema,
        })
    }

    /// Parse a single schema property (recursive)
    fn parse_property(prop: &Dynamic) -> PropertySchema {
        let type_ = prop
            .get("type")
            .and_then(Dynamic::as_str)
            .map(PropertyType::parse)
            .unwrap_or_default();

        let description = prop
            .get("description")
            .and_then(Dynamic::as_str)
            .map(String::from);

        let default = prop.get("default").cloned();

        let format = prop.get("format").and_then(Dynamic::as_str).map(String::from);

        let pattern = prop
            .get("pattern")
            .and_then(Dynamic::as_str)
            .map(String::from);

        let enum_values = prop
            .get("enum")
            .and_then(Dynamic::as_list)
            .map(|items| items.to_vec());

        let minimum = prop.get("minimum").and_then(Dynamic::as_f64);
        let maximum = prop.get("maximum").and_then(Dynamic::as_f64);

        let min_length = unsigned(prop.get("minLength"));
        let max_length = unsigned(prop.get("maxLength"));
        let min_items = unsigned(prop.get("minItems"));
        let max_items = unsigned(prop.get("maxItems"));

        let unique_items = prop
            .get("uniqueItems")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        let nullable = prop
            .get("nullable")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        let properties = prop.get("properties").and_then(Dynamic::as_map).map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), Self::parse_property(v)))
                .collect::<IndexMap<_, _>>()
        });

        let required = prop.get("required").and_then(Dynamic::as_list).map(|items| {
            items
                .iter()
                .filter_map(Dynamic::as_str)
                .map(String::from)
                .collect()
        });

        let items = prop
            .get("items")
            .map(|v| Box::new(Self::parse_property(v)));

        let additional_properties = prop.get("additionalProperties").map(|v| match v {
            Dynamic::Bool(true) => AdditionalProperties::Allowed,
            Dynamic::Bool(false) => AdditionalProperties::Denied,
            other => AdditionalProperties::Schema(Box::new(Self::parse_property(other))),
        });

        let x_preserve_unknown = prop
            .get("x-kubernetes-preserve-unknown-fields")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        let x_int_or_string = prop
            .get("x-kubernetes-int-or-string")
            .and_then(Dynamic::as_bool)
            .unwrap_or(false);

        PropertySchema {
            type_,
            description,
            default,
            format,
            pattern,
            enum_values,
            minimum,
            maximum,
            min_length,
            max_length,
            min_items,
            max_items,
            unique_items,
            nullable,
            properties,
            required,
            items,
            additional_properties,
            x_preserve_unknown,
            x_int_or_string,
        }
    }
}

fn string_list(value: Option<&Dynamic>) -> Vec<String> {
    value
        .and_then(Dynamic::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(Dynamic::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn unsigned(value: Option<&Dynamic>) -> Option<u64> {
    value
        .and_then(Dynamic::as_i64)
        .and_then(|i| u64::try_from(i).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CRD: &str = r#"
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
    singular: widget
    shortNames:
      - wdg
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
                  minimum: 1
                  maximum: 64
                tier:
                  type: string
                  enum:
                    - standard
                    - premium
                port:
                  x-kubernetes-int-or-string: true
                payload:
                  type: object
                  x-kubernetes-preserve-unknown-fields: true
                tags:
                  type: array
                  items:
                    type: string
                limits:
                  type: object
                  additionalProperties:
                    type: string
            status:
              type: object
    - name: v1beta1
      served: true
      storage: false
      deprecated: true
      deprecationWarning: "example.io/v1beta1 is deprecated, use v1"
      schema:
        openAPIV3Schema:
          type: object
"#;

    #[test]
    fn test_parse_crd() {
        let def = CrdParser::parse(SAMPLE_CRD).unwrap();

        assert_eq!(def.name, "widgets.example.io");
        assert_eq!(def.group, "example.io");
        assert_eq!(def.scope, CrdScope::Namespaced);
        assert_eq!(def.names.kind, "Widget");
        assert_eq!(def.names.plural, "widgets");
        assert_eq!(def.names.short_names, vec!["wdg"]);
        assert_eq!(def.versions.len(), 2);
    }

    #[test]
    fn test_parse_versions() {
        let def = CrdParser::parse(SAMPLE_CRD).unwrap();

        let v1 = &def.versions[0];
        assert_eq!(v1.name, "v1");
        assert!(v1.served);
        assert!(v1.storage);
        assert!(!v1.deprecated);

        let v1beta1 = &def.versions[1];
        assert!(v1beta1.deprecated);
        assert_eq!(
            v1beta1.deprecation_warning,
            Some("example.io/v1beta1 is deprecated, use v1".to_string())
        );
    }

    #[test]
    fn test_parse_schema_properties() {
        let def = CrdParser::parse(SAMPLE_CRD).unwrap();
        let schema = def.versions[0].schema.as_ref().unwrap();

        assert!(schema.is_required("spec"));
        let props = schema.properties.as_ref().unwrap();
        let spec = &props["spec"];

        let spec_props = spec.properties.as_ref().unwrap();
        // Declaration order is preserved
        let names: Vec<&String> = spec_props.keys().collect();
        assert_eq!(names, ["size", "tier", "port", "payload", "tags", "limits"]);

        let size = &spec_props["size"];
        assert_eq!(size.type_, PropertyType::Integer);
        assert_eq!(size.minimum, Some(1.0));
        assert_eq!(size.maximum, Some(64.0));
        assert!(spec.is_required("size"));
        assert!(!spec.is_required("tier"));

        let tier = &spec_props["tier"];
        assert_eq!(tier.enum_values.as_ref().unwrap().len(), 2);

        assert!(spec_props["port"].x_int_or_string);
        assert!(spec_props["payload"].x_preserve_unknown);

        let tags = &spec_props["tags"];
        assert_eq!(tags.type_, PropertyType::Array);
        assert_eq!(tags.items.as_ref().unwrap().type_, PropertyType::String);

        match spec_props["limits"].additional_properties.as_ref().unwrap() {
            AdditionalProperties::Schema(s) => assert_eq!(s.type_, PropertyType::String),
            other => panic!("unexpected additionalProperties: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_crd() {
        let yaml = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: test
"#;
        let result = CrdParser::parse(yaml);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("expected CustomResourceDefinition")
        );
    }

    #[test]
    fn test_parse_cluster_scope() {
        let yaml = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: gadgets.example.io
spec:
  group: example.io
  scope: Cluster
  names:
    kind: Gadget
    plural: gadgets
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
"#;
        let def = CrdParser::parse(yaml).unwrap();
        assert_eq!(def.scope, CrdScope::Cluster);
    }
}
