//! OpenAPI constraint validation
//!
//! A CRD version's OpenAPI constraints (patterns, enums, ranges, lengths)
//! are converted into a standard JSON Schema, compiled once, and run against
//! decoded configurations. Violations surface as path-addressed diagnostics
//! alongside the field validators; they never abort sibling checks.

use crdforge_core::{AttributePath, Diagnostic, DiagnosticCode, Diagnostics, Dynamic};
use serde_json::{Value as JsonValue, json};

use crate::definition::{AdditionalProperties, PropertySchema, PropertyType};
use crate::error::{CrdError, Result};

/// Compiled constraint checker for one CRD version
pub struct ConstraintSet {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSet").finish_non_exhaustive()
    }
}

impl ConstraintSet {
    /// Compile a JSON Schema document into a cached validator
    pub fn compile(schema: &JsonValue) -> Result<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| CrdError::SchemaCompile {
                message: e.to_string(),
            })?;
        Ok(Self { validator })
    }

    /// An always-passing constraint set, for versions without a schema
    pub fn unconstrained() -> Result<Self> {
        Self::compile(&json!({}))
    }

    /// Check a decoded configuration, appending one diagnostic per violation
    pub fn check(&self, value: &Dynamic, diagnostics: &mut Diagnostics) {
        let instance = value.to_json();
        if self.validator.is_valid(&instance) {
            return;
        }

        for error in self.validator.iter_errors(&instance) {
            let path = AttributePath::from_pointer(&error.instance_path.to_string());
            diagnostics.push(Diagnostic::new(
                path,
                DiagnosticCode::SchemaViolation,
                format_violation(&error),
            ));
        }
    }
}

/// Format a violation into a user-friendly message
fn format_violation(error: &jsonschema::ValidationError) -> String {
    error.to_string().replace('"', "'")
}

/// Build the JSON Schema used for constraint checking from a version's root
/// property schema
///
/// The schema covers only user-configurable roots: `apiVersion`, `kind`,
/// `metadata` and `status` are stripped, since the first two are injected
/// and the latter two are validated elsewhere or not at all.
pub fn json_schema_for_root(root: &PropertySchema) -> JsonValue {
    let mut schema = serde_json::Map::new();
    schema.insert("type".into(), json!("object"));

    let skipped = ["apiVersion", "kind", "metadata", "status"];

    if let Some(props) = &root.properties {
        let mut json_props = serde_json::Map::new();
        for (name, prop) in props {
            if skipped.contains(&name.as_str()) {
                continue;
            }
            json_props.insert(name.clone(), json_schema_for_property(prop));
        }
        schema.insert("properties".into(), JsonValue::Object(json_props));
    }

    if let Some(required) = &root.required {
        let kept: Vec<JsonValue> = required
            .iter()
            .filter(|name| !skipped.contains(&name.as_str()))
            .map(|name| json!(name))
            .collect();
        if !kept.is_empty() {
            schema.insert("required".into(), JsonValue::Array(kept));
        }
    }

    JsonValue::Object(schema)
}

/// Convert one property schema into a JSON Schema fragment (recursive)
fn json_schema_for_property(prop: &PropertySchema) -> JsonValue {
    // Unknown-shape and union fields carry no statically checkable
    // constraints beyond the union itself.
    if prop.x_preserve_unknown {
        return json!({});
    }
    if prop.x_int_or_string {
        return json!({ "type": ["integer", "string"] });
    }

    let mut schema = serde_json::Map::new();

    let type_str = match prop.type_ {
        PropertyType::String => Some("string"),
        PropertyType::Integer => Some("integer"),
        PropertyType::Number => Some("number"),
        PropertyType::Boolean => Some("boolean"),
        PropertyType::Array => Some("array"),
        PropertyType::Object => Some("object"),
        PropertyType::Unknown(_) => None,
    };
    if let Some(type_str) = type_str {
        if prop.nullable {
            schema.insert("type".into(), json!([type_str, "null"]));
        } else {
            schema.insert("type".into(), json!(type_str));
        }
    }

    if let Some(pattern) = &prop.pattern {
        schema.insert("pattern".into(), json!(pattern));
    }
    if let Some(enum_values) = &prop.enum_values {
        let values: Vec<JsonValue> = enum_values.iter().map(Dynamic::to_json).collect();
        schema.insert("enum".into(), JsonValue::Array(values));
    }
    if let Some(minimum) = prop.minimum {
        schema.insert("minimum".into(), json!(minimum));
    }
    if let Some(maximum) = prop.maximum {
        schema.insert("maximum".into(), json!(maximum));
    }
    if let Some(min_length) = prop.min_length {
        schema.insert("minLength".into(), json!(min_length));
    }
    if let Some(max_length) = prop.max_length {
        schema.insert("maxLength".into(), json!(max_length));
    }
    if let Some(min_items) = prop.min_items {
        schema.insert("minItems".into(), json!(min_items));
    }
    if let Some(max_items) = prop.max_items {
        schema.insert("maxItems".into(), json!(max_items));
    }
    if prop.unique_items {
        schema.insert("uniqueItems".into(), json!(true));
    }

    if let Some(props) = &prop.properties {
        let mut json_props = serde_json::Map::new();
        for (name, nested) in props {
            json_props.insert(name.clone(), json_schema_for_property(nested));
        }
        schema.insert("properties".into(), JsonValue::Object(json_props));
    }
    if let Some(required) = &prop.required {
        if !required.is_empty() {
            schema.insert(
                "required".into(),
                JsonValue::Array(required.iter().map(|n| json!(n)).collect()),
            );
        }
    }

    if let Some(items) = &prop.items {
        schema.insert("items".into(), json_schema_for_property(items));
    }

    match &prop.additional_properties {
        Some(AdditionalProperties::Denied) => {
            schema.insert("additionalProperties".into(), json!(false));
        }
        Some(AdditionalProperties::Schema(nested)) => {
            schema.insert(
                "additionalProperties".into(),
                json_schema_for_property(nested),
            );
        }
        Some(AdditionalProperties::Allowed) | None => {}
    }

    JsonValue::Object(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CrdParser;

    fn compiled_from(yaml: &str) -> ConstraintSet {
        let def = CrdParser::parse(yaml).unwrap();
        let schema = def.versions[0].schema.as_ref().unwrap();
        ConstraintSet::compile(&json_schema_for_root(schema)).unwrap()
    }

    const CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.io
spec:
  group: example.io
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
                host:
                  type: string
                  pattern: "^[a-z.]+$"
"#;

    #[test]
    fn test_valid_configuration_passes() {
        let constraints = compiled_from(CRD);
        let config = Dynamic::from_yaml_str("spec:\n  size: 8\n  tier: standard\n").unwrap();

        let mut diags = Diagnostics::new();
        constraints.check(&config, &mut diags);
        assert!(diags.is_empty(), "unexpected: {}", diags.summary());
    }

    #[test]
    fn test_violations_are_path_addressed() {
        let constraints = compiled_from(CRD);
        let config =
            Dynamic::from_yaml_str("spec:\n  size: 100\n  tier: deluxe\n  host: UPPER\n").unwrap();

        let mut diags = Diagnostics::new();
        constraints.check(&config, &mut diags);

        assert_eq!(diags.len(), 3);
        let paths: Vec<String> = diags.iter().map(|d| d.path.to_string()).collect();
        assert!(paths.contains(&"spec.size".to_string()));
        assert!(paths.contains(&"spec.tier".to_string()));
        assert!(paths.contains(&"spec.host".to_string()));
        assert!(diags.iter().all(|d| d.code == DiagnosticCode::SchemaViolation));
    }

    #[test]
    fn test_missing_required_root() {
        let constraints = compiled_from(CRD);
        let config = Dynamic::object();

        let mut diags = Diagnostics::new();
        constraints.check(&config, &mut diags);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_unconstrained_accepts_anything() {
        let constraints = ConstraintSet::unconstrained().unwrap();
        let config = Dynamic::from_yaml_str("anything:\n  goes: [1, two, 3.0]\n").unwrap();

        let mut diags = Diagnostics::new();
        constraints.check(&config, &mut diags);
        assert!(diags.is_empty());
    }
}
