//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Configuration diagnostics grouped under the kind they apply to
//! - JSON diagnostic output for machine consumption
//! - Attribute tree rendering for the `schema` command

use console::style;
use crdforge_core::{
    AttributeMode, AttributeNode, AttributeTree, Diagnostics, FieldValidator, ObjectNode,
};

/// Display diagnostics grouped under a heading
pub fn display_diagnostics(heading: &str, diagnostics: &Diagnostics) {
    println!();
    println!("{}", style(heading).cyan().bold());

    for diagnostic in diagnostics.iter() {
        println!(
            "  {} {} at {}",
            style("✗").red(),
            diagnostic.message,
            style(&diagnostic.path).dim()
        );
        if let Some(suggestion) = &diagnostic.suggestion {
            println!("    {} {}", style("hint:").blue(), suggestion);
        }
    }

    println!();
    println!("{} {}", style("✗").red().bold(), diagnostics.summary());
}

/// Diagnostics as a JSON value for `--json` output
pub fn diagnostics_json(diagnostics: &Diagnostics) -> serde_json::Value {
    serde_json::json!(
        diagnostics
            .iter()
            .map(|d| {
                serde_json::json!({
                    "path": d.path.to_string(),
                    "code": d.code.as_str(),
                    "message": d.message,
                    "suggestion": d.suggestion,
                })
            })
            .collect::<Vec<_>>()
    )
}

/// Render an attribute tree as indented text
pub fn render_tree(tree: &AttributeTree) -> String {
    let mut out = String::new();
    render_object(tree.root(), 0, &mut out);
    out
}

fn render_object(object: &ObjectNode, depth: usize, out: &mut String) {
    for attribute in object.attributes() {
        let indent = "  ".repeat(depth);
        let mode = match attribute.mode {
            AttributeMode::Required => "required",
            AttributeMode::Optional => "optional",
            AttributeMode::Computed => "computed",
        };
        out.push_str(&format!(
            "{}{}: {} ({})",
            indent,
            attribute.name,
            describe(&attribute.node),
            mode
        ));
        if !attribute.validators.is_empty() {
            let names: Vec<&str> = attribute.validators.iter().map(validator_name).collect();
            out.push_str(&format!(" [{}]", names.join(", ")));
        }
        out.push('\n');

        if let Some(nested) = nested_object(&attribute.node) {
            render_object(nested, depth + 1, out);
        }
    }
}

fn describe(node: &AttributeNode) -> String {
    match node {
        AttributeNode::Scalar(kind) => kind.to_string(),
        AttributeNode::Object(_) => "object".to_string(),
        AttributeNode::List(item) => format!("list of {}", describe(item)),
        AttributeNode::Map(value) => format!("map of {}", describe(value)),
    }
}

/// The object to recurse into, if the node nests one (directly or through
/// lists/maps)
fn nested_object(node: &AttributeNode) -> Option<&ObjectNode> {
    match node {
        AttributeNode::Object(object) => Some(object),
        AttributeNode::List(item) => nested_object(item),
        AttributeNode::Map(value) => nested_object(value),
        AttributeNode::Scalar(_) => None,
    }
}

fn validator_name(validator: &FieldValidator) -> &'static str {
    match validator {
        FieldValidator::Name => "name",
        FieldValidator::Labels => "labels",
        FieldValidator::Annotations => "annotations",
        FieldValidator::Base64 => "base64",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdforge_core::Attribute;

    #[test]
    fn test_render_tree() {
        let metadata = ObjectNode::new(vec![
            Attribute::required("name", AttributeNode::string())
                .with_validator(FieldValidator::Name),
            Attribute::optional("labels", AttributeNode::map(AttributeNode::string()))
                .with_validator(FieldValidator::Labels),
        ])
        .unwrap();
        let spec = ObjectNode::new(vec![
            Attribute::required("size", AttributeNode::integer()),
            Attribute::optional("tags", AttributeNode::list(AttributeNode::string())),
        ])
        .unwrap();
        let tree = AttributeTree::for_resource(vec![
            Attribute::optional("metadata", AttributeNode::object(metadata)),
            Attribute::required("spec", AttributeNode::object(spec)),
        ])
        .unwrap();

        let rendered = render_tree(&tree);
        assert!(rendered.contains("id: integer (computed)"));
        assert!(rendered.contains("metadata: object (optional)"));
        assert!(rendered.contains("  name: string (required) [name]"));
        assert!(rendered.contains("  labels: map of string (optional) [labels]"));
        assert!(rendered.contains("  size: integer (required)"));
        assert!(rendered.contains("  tags: list of string (optional)"));
    }
}
