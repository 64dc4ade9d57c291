//! Core constants and small shared types.

use serde_json::Value;

/// Namespace of the people annotation vocabulary.
pub const PEOPLE_NAMESPACE: &str = "http://namespaces.plone.org/supermodel/people";

/// Prefix the people namespace is bound to in written documents.
pub const PEOPLE_PREFIX: &str = "people";

/// Namespace of the host schema vocabulary (`model`, `schema`, `field`).
pub const SCHEMA_NAMESPACE: &str = "http://namespaces.plone.org/supermodel/schema";

/// Detail panel position used when a `details` tag has no `position`.
pub const DEFAULT_POSITION: &str = "left";

/// Tagged value keys stored on a [`Schema`](crate::Schema).
pub mod keys {
    pub const TITLE_FIELDS: &str = "people.title_fields";
    pub const ORDER: &str = "people.order";
    pub const COLUMNS: &str = "people.columns";
    pub const SELECTABLE: &str = "people.selectable";
    pub const DETAILS: &str = "people.details";
}

/// Element and attribute names of the people vocabulary.
pub mod tags {
    pub const TITLE: &str = "title";
    pub const ORDER: &str = "order";
    pub const DETAILS: &str = "details";
    pub const COLUMNS: &str = "columns";
    pub const COLUMN: &str = "column";
    pub const ITEM: &str = "item";
    pub const POSITION: &str = "position";
    pub const SELECTABLE: &str = "selectable";
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A namespace URI bound to a prefix.
///
/// Constructed once and handed to the codec; the binding is declared on every
/// schema node the codec writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNamespace {
    pub prefix: String,
    pub uri: String,
}

impl XmlNamespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// The people vocabulary binding (`people` → [`PEOPLE_NAMESPACE`]).
    pub fn people() -> Self {
        Self::new(PEOPLE_PREFIX, PEOPLE_NAMESPACE)
    }
}

impl Default for XmlNamespace {
    fn default() -> Self {
        Self::people()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn people_namespace_binding() {
        let ns = XmlNamespace::default();
        assert_eq!(ns.prefix, "people");
        assert_eq!(ns.uri, PEOPLE_NAMESPACE);
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!(["x"])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
        assert_eq!(json_type_name(&json!(1)), "number");
    }
}
