//! Path-addressed configuration diagnostics
//!
//! Validation failures are diagnostics, not errors: every check attaches its
//! finding to the attribute path it inspected and decoding carries on, so a
//! single pass reports everything wrong with a configuration. The enclosing
//! operation fails once, afterwards, if any diagnostic was recorded.

use std::fmt;

/// One segment of an attribute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named attribute of an object node
    Attribute(String),
    /// A position within a list node
    Index(usize),
    /// A key within a map node
    Key(String),
}

/// Location of a value within a configuration tree
///
/// Displays as `spec.ports[0].name` / `metadata.labels["app"]`; the empty
/// path displays as `(root)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributePath {
    segments: Vec<PathSegment>,
}

impl AttributePath {
    /// The root path
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend with a named attribute segment
    pub fn attribute(&self, name: impl Into<String>) -> Self {
        self.extended(PathSegment::Attribute(name.into()))
    }

    /// Extend with a list index segment
    pub fn index(&self, index: usize) -> Self {
        self.extended(PathSegment::Index(index))
    }

    /// Extend with a map key segment
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.extended(PathSegment::Key(key.into()))
    }

    fn extended(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Parse a JSON pointer (`/spec/ports/0/port`) into a path
    ///
    /// Purely numeric segments become list indices; everything else becomes
    /// an attribute segment.
    pub fn from_pointer(pointer: &str) -> Self {
        let segments = pointer
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let unescaped = part.replace("~1", "/").replace("~0", "~");
                match unescaped.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Attribute(unescaped),
                }
            })
            .collect();
        Self { segments }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Attribute(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Key(key) => write!(f, "[\"{}\"]", key)?,
            }
        }
        Ok(())
    }
}

/// Category of a diagnostic finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiagnosticCode {
    InvalidName,
    InvalidLabel,
    InvalidAnnotation,
    InvalidBase64,
    UnsupportedShape,
    SchemaViolation,
    UnknownAttribute,
    MissingRequired,
    TypeMismatch,
}

impl DiagnosticCode {
    /// Stable string form, used in machine-readable output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_name",
            Self::InvalidLabel => "invalid_label",
            Self::InvalidAnnotation => "invalid_annotation",
            Self::InvalidBase64 => "invalid_base64",
            Self::UnsupportedShape => "unsupported_shape",
            Self::SchemaViolation => "schema_violation",
            Self::UnknownAttribute => "unknown_attribute",
            Self::MissingRequired => "missing_required",
            Self::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding against a configuration value
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Where the offending value lives
    pub path: AttributePath,
    /// What kind of problem this is
    pub code: DiagnosticCode,
    /// Human-readable description
    pub message: String,
    /// Optional fix-it hint (e.g. a closest-match attribute name)
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(path: AttributePath, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Attach a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// An accumulating set of diagnostics
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Summary line: "3 problems at 2 attributes"
    pub fn summary(&self) -> String {
        let paths: std::collections::HashSet<String> =
            self.items.iter().map(|d| d.path.to_string()).collect();
        let problem_word = if self.items.len() == 1 { "problem" } else { "problems" };
        let attr_word = if paths.len() == 1 { "attribute" } else { "attributes" };
        format!(
            "{} {} at {} {}",
            self.items.len(),
            problem_word,
            paths.len(),
            attr_word
        )
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = AttributePath::root()
            .attribute("spec")
            .attribute("ports")
            .index(0)
            .attribute("name");
        assert_eq!(path.to_string(), "spec.ports[0].name");

        let labels = AttributePath::root()
            .attribute("metadata")
            .attribute("labels")
            .key("app");
        assert_eq!(labels.to_string(), "metadata.labels[\"app\"]");

        assert_eq!(AttributePath::root().to_string(), "(root)");
    }

    #[test]
    fn test_path_from_pointer() {
        let path = AttributePath::from_pointer("/spec/ports/0/port");
        assert_eq!(path.to_string(), "spec.ports[0].port");

        assert!(AttributePath::from_pointer("").is_root());
    }

    #[test]
    fn test_summary() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());

        let path = AttributePath::root().attribute("spec");
        diags.push(Diagnostic::new(
            path.clone(),
            DiagnosticCode::TypeMismatch,
            "expected integer",
        ));
        diags.push(Diagnostic::new(
            path,
            DiagnosticCode::SchemaViolation,
            "out of range",
        ));

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.summary(), "2 problems at 1 attribute");
    }
}
