//! Resource kind identity

use serde::{Deserialize, Serialize};

/// Fixed identity of a resource kind: API group, version, and kind
///
/// The synthesizer stamps these onto every manifest it produces, overwriting
/// anything the configuration supplied for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKind {
    /// API group (empty for the core group)
    pub group: String,
    /// API version (e.g. "v1", "v1beta1")
    pub version: String,
    /// Kind (e.g. "CompositeResourceDefinition")
    pub kind: String,
}

impl ResourceKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// The `apiVersion` string used in a kind's yaml
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version() {
        let kind = ResourceKind::new("apiextensions.crossplane.io", "v1", "CompositeResourceDefinition");
        assert_eq!(kind.api_version(), "apiextensions.crossplane.io/v1");

        let core = ResourceKind::new("", "v1", "ConfigMap");
        assert_eq!(core.api_version(), "v1");
    }

    #[test]
    fn test_display() {
        let kind = ResourceKind::new("example.io", "v1", "Widget");
        assert_eq!(kind.to_string(), "example.io/v1/Widget");
    }
}
