//! Configuration decoding
//!
//! Walks a user-supplied configuration against an attribute tree, producing
//! the value tree that will be serialized plus every diagnostic found along
//! the way. Decoding never stops at the first problem: siblings keep
//! decoding so a single pass reports the whole picture.

use crdforge_core::{
    Attribute, AttributeMode, AttributeNode, AttributePath, AttributeTree, Diagnostic,
    DiagnosticCode, Diagnostics, Dynamic, DynamicNumber, ObjectNode, ScalarKind,
};
use indexmap::IndexMap;

use crate::suggestions::find_closest;

/// Root-level configuration keys that are silently discarded rather than
/// reported as unknown: the wire-format spelling of the injected pair.
const DISCARDED_ROOT_KEYS: &[&str] = &["apiVersion"];

/// Outcome of decoding one configuration
#[derive(Debug)]
pub struct DecodeResult {
    /// The decoded value tree, in attribute declaration order. Attributes
    /// that failed to decode are absent.
    pub value: IndexMap<String, Dynamic>,
    /// Everything wrong with the configuration
    pub diagnostics: Diagnostics,
}

impl DecodeResult {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Decode a configuration against a tree
///
/// The root must be a map (or null, treated as empty). Values supplied for
/// computed attributes are discarded without comment - the synthesizer owns
/// them.
pub fn decode(tree: &AttributeTree, config: &Dynamic) -> DecodeResult {
    let mut diagnostics = Diagnostics::new();
    let path = AttributePath::root();

    let value = match config {
        Dynamic::Map(map) => decode_object(
            tree.root(),
            map,
            &path,
            DISCARDED_ROOT_KEYS,
            &mut diagnostics,
        ),
        Dynamic::Null => decode_object(
            tree.root(),
            &IndexMap::new(),
            &path,
            DISCARDED_ROOT_KEYS,
            &mut diagnostics,
        ),
        other => {
            diagnostics.push(Diagnostic::new(
                path,
                DiagnosticCode::TypeMismatch,
                format!("expected map, found {}", other.shape_name()),
            ));
            IndexMap::new()
        }
    };

    DecodeResult { value, diagnostics }
}

fn decode_object(
    node: &ObjectNode,
    map: &IndexMap<String, Dynamic>,
    path: &AttributePath,
    discarded: &[&str],
    diagnostics: &mut Diagnostics,
) -> IndexMap<String, Dynamic> {
    let mut decoded = IndexMap::new();

    for attribute in node.attributes() {
        // Computed attributes are produced, never consumed; whatever the
        // configuration says about them is dropped.
        if attribute.mode == AttributeMode::Computed {
            continue;
        }

        let child_path = path.attribute(&attribute.name);
        match map.get(&attribute.name) {
            None | Some(Dynamic::Null) => {
                apply_absent(attribute, &child_path, &mut decoded, diagnostics);
            }
            Some(value) => {
                if let Some(value) = decode_node(&attribute.node, value, &child_path, diagnostics) {
                    run_validators(attribute, &value, &child_path, diagnostics);
                    decoded.insert(attribute.name.clone(), value);
                }
            }
        }
    }

    for key in map.keys() {
        if node.get(key).is_some() || discarded.contains(&key.as_str()) {
            continue;
        }
        let configurable = node
            .attributes()
            .iter()
            .filter(|a| a.mode != AttributeMode::Computed)
            .map(|a| a.name.as_str());
        let mut diagnostic = Diagnostic::new(
            path.attribute(key),
            DiagnosticCode::UnknownAttribute,
            format!("unknown attribute '{}'", key),
        );
        if let Some(suggestion) = find_closest(key, configurable) {
            diagnostic = diagnostic.with_suggestion(format!("did you mean '{}'?", suggestion));
        }
        diagnostics.push(diagnostic);
    }

    decoded
}

fn apply_absent(
    attribute: &Attribute,
    path: &AttributePath,
    decoded: &mut IndexMap<String, Dynamic>,
    diagnostics: &mut Diagnostics,
) {
    match attribute.mode {
        AttributeMode::Required => {
            diagnostics.push(Diagnostic::new(
                path.clone(),
                DiagnosticCode::MissingRequired,
                "required attribute is missing",
            ));
        }
        AttributeMode::Optional => {
            if let Some(default) = &attribute.default {
                decoded.insert(attribute.name.clone(), default.clone());
            }
            // Absent without a default: omitted from output entirely.
        }
        AttributeMode::Computed => {}
    }
}

fn run_validators(
    attribute: &Attribute,
    value: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) {
    // Every configured validator runs; one failure never masks another.
    for validator in &attribute.validators {
        if let Err(error) = validator.check(value) {
            diagnostics.push(Diagnostic::new(path.clone(), error.code(), error.to_string()));
        }
    }
}

fn decode_node(
    node: &AttributeNode,
    value: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) -> Option<Dynamic> {
    match node {
        AttributeNode::Scalar(kind) => decode_scalar(*kind, value, path, diagnostics),
        AttributeNode::Object(object) => match value.as_map() {
            Some(map) => Some(Dynamic::Map(decode_object(
                object,
                map,
                path,
                &[],
                diagnostics,
            ))),
            None => {
                push_mismatch(diagnostics, path, "map", value);
                None
            }
        },
        AttributeNode::List(item_node) => match value.as_list() {
            Some(items) => {
                let decoded: Vec<Dynamic> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        decode_node(item_node, item, &path.index(i), diagnostics)
                    })
                    .collect();
                Some(Dynamic::List(decoded))
            }
            None => {
                push_mismatch(diagnostics, path, "list", value);
                None
            }
        },
        AttributeNode::Map(value_node) => match value.as_map() {
            Some(map) => {
                let mut decoded = IndexMap::new();
                for (key, entry) in map {
                    if let Some(entry) =
                        decode_node(value_node, entry, &path.key(key), diagnostics)
                    {
                        decoded.insert(key.clone(), entry);
                    }
                }
                Some(Dynamic::Map(decoded))
            }
            None => {
                push_mismatch(diagnostics, path, "map", value);
                None
            }
        },
    }
}

fn decode_scalar(
    kind: ScalarKind,
    value: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) -> Option<Dynamic> {
    let ok = match kind {
        ScalarKind::Dynamic => true,
        ScalarKind::String => matches!(value, Dynamic::String(_)),
        ScalarKind::Integer => matches!(value, Dynamic::Number(DynamicNumber::Int(_))),
        ScalarKind::Boolean => matches!(value, Dynamic::Bool(_)),
        ScalarKind::Number => matches!(value, Dynamic::Number(_)),
        ScalarKind::IntOrString => matches!(
            value,
            Dynamic::Number(DynamicNumber::Int(_)) | Dynamic::String(_)
        ),
    };

    if ok {
        Some(value.clone())
    } else {
        push_mismatch(diagnostics, path, &kind.to_string(), value);
        None
    }
}

fn push_mismatch(
    diagnostics: &mut Diagnostics,
    path: &AttributePath,
    expected: &str,
    found: &Dynamic,
) {
    diagnostics.push(Diagnostic::new(
        path.clone(),
        DiagnosticCode::TypeMismatch,
        format!("expected {}, found {}", expected, found.shape_name()),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdforge_core::{Attribute, AttributeTree, FieldValidator, ObjectNode};

    fn tree() -> AttributeTree {
        let metadata = ObjectNode::new(vec![
            Attribute::required("name", AttributeNode::string())
                .with_validator(FieldValidator::Name),
            Attribute::optional("labels", AttributeNode::map(AttributeNode::string()))
                .with_validator(FieldValidator::Labels),
        ])
        .unwrap();

        let spec = ObjectNode::new(vec![
            Attribute::required("size", AttributeNode::integer()),
            Attribute::optional("replicas", AttributeNode::integer())
                .with_default(Dynamic::int(1)),
            Attribute::optional("tags", AttributeNode::list(AttributeNode::string())),
            Attribute::optional("port", AttributeNode::int_or_string()),
            Attribute::optional("payload", AttributeNode::dynamic()),
        ])
        .unwrap();

        AttributeTree::for_resource(vec![
            Attribute::optional("metadata", AttributeNode::object(metadata)),
            Attribute::required("spec", AttributeNode::object(spec)),
        ])
        .unwrap()
    }

    fn decode_yaml(yaml: &str) -> DecodeResult {
        let config = Dynamic::from_yaml_str(yaml).unwrap();
        decode(&tree(), &config)
    }

    #[test]
    fn test_clean_decode() {
        let result = decode_yaml(
            r#"
metadata:
  name: sample
spec:
  size: 4
  tags: [a, b]
  port: http
"#,
        );

        assert!(result.is_clean(), "unexpected: {}", result.diagnostics.summary());
        assert_eq!(
            result.value.get("metadata").and_then(|m| m.get("name")).and_then(Dynamic::as_str),
            Some("sample")
        );
        // Default applied for absent attribute with one
        assert_eq!(
            result.value.get("spec").and_then(|s| s.get("replicas")).and_then(Dynamic::as_i64),
            Some(1)
        );
        // Absent attribute without a default is omitted, not null
        assert!(result.value.get("spec").and_then(|s| s.get("payload")).is_none());
    }

    #[test]
    fn test_computed_attributes_discarded() {
        let result = decode_yaml(
            r#"
api_version: fake/v0
kind: Impostor
id: 42
yaml: bogus
apiVersion: fake/v0
metadata:
  name: sample
spec:
  size: 4
"#,
        );

        assert!(result.is_clean(), "unexpected: {}", result.diagnostics.summary());
        assert!(result.value.get("kind").is_none());
        assert!(result.value.get("id").is_none());
    }

    #[test]
    fn test_missing_required() {
        let result = decode_yaml("metadata:\n  name: sample\n");
        assert_eq!(result.diagnostics.len(), 1);
        let diagnostic = result.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.code, DiagnosticCode::MissingRequired);
        assert_eq!(diagnostic.path.to_string(), "spec");
    }

    #[test]
    fn test_sibling_diagnostics_accumulate() {
        let result = decode_yaml(
            r#"
metadata:
  name: Not-A-Valid-Name
  labels:
    "bad key": x
spec:
  size: big
"#,
        );

        let codes: Vec<DiagnosticCode> = result.diagnostics.iter().map(|d| d.code).collect();
        assert!(codes.contains(&DiagnosticCode::InvalidName));
        assert!(codes.contains(&DiagnosticCode::InvalidLabel));
        assert!(codes.contains(&DiagnosticCode::TypeMismatch));
    }

    #[test]
    fn test_unknown_attribute_gets_suggestion() {
        let result = decode_yaml(
            r#"
metadata:
  name: sample
spec:
  size: 4
  replcas: 3
"#,
        );

        let diagnostic = result
            .diagnostics
            .iter()
            .find(|d| d.code == DiagnosticCode::UnknownAttribute)
            .expect("expected an unknown-attribute diagnostic");
        assert_eq!(diagnostic.path.to_string(), "spec.replcas");
        assert_eq!(diagnostic.suggestion.as_deref(), Some("did you mean 'replicas'?"));
    }

    #[test]
    fn test_list_items_are_path_addressed() {
        let result = decode_yaml(
            r#"
metadata:
  name: sample
spec:
  size: 4
  tags: [ok, 7]
"#,
        );

        let diagnostic = result.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.path.to_string(), "spec.tags[1]");
        assert_eq!(diagnostic.code, DiagnosticCode::TypeMismatch);
    }

    #[test]
    fn test_int_or_string_accepts_both_forms() {
        for port in ["port: 8080", "port: http"] {
            let yaml = format!("metadata:\n  name: s\nspec:\n  size: 1\n  {}\n", port);
            let result = decode_yaml(&yaml);
            assert!(result.is_clean(), "{} should decode", port);
        }

        let result = decode_yaml("metadata:\n  name: s\nspec:\n  size: 1\n  port: [8080]\n");
        assert!(!result.is_clean());
    }

    #[test]
    fn test_null_root_reports_required() {
        let result = decode(&tree(), &Dynamic::Null);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics.iter().next().unwrap().code,
            DiagnosticCode::MissingRequired
        );
    }

    #[test]
    fn test_scalar_root_rejected() {
        let result = decode(&tree(), &Dynamic::string("nope"));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics.iter().next().unwrap().code,
            DiagnosticCode::TypeMismatch
        );
    }
}
