//! # JSON-LD keywords and node classification
//!
//! Expanded JSON-LD trees are plain `serde_json::Value`s. These helpers name
//! the keywords the transform reads and classify the objects it walks.

use serde_json::{Map, Value};

/// Node identifier keyword.
pub const ID: &str = "@id";
/// Literal value keyword.
pub const VALUE: &str = "@value";
/// Node type / literal datatype keyword.
pub const TYPE: &str = "@type";
/// Literal language tag keyword.
pub const LANGUAGE: &str = "@language";
/// Graph container keyword.
pub const GRAPH: &str = "@graph";
/// List container keyword.
pub const LIST: &str = "@list";
/// Set container keyword.
pub const SET: &str = "@set";
/// Context keyword.
pub const CONTEXT: &str = "@context";

/// Prefix of a blank-node label.
pub const BLANK_NODE_PREFIX: &str = "_:";

/// Returns the label part of a blank-node identifier (`_:b0` → `b0`).
pub fn blank_label(id: &str) -> Option<&str> {
    id.strip_prefix(BLANK_NODE_PREFIX)
}

/// Whether `id` is a blank-node identifier.
pub fn is_blank(id: &str) -> bool {
    id.starts_with(BLANK_NODE_PREFIX)
}

/// Whether an object is a value object (`{"@value": ...}`).
pub fn is_value_object(obj: &Map<String, Value>) -> bool {
    obj.contains_key(VALUE)
}

/// Whether an object is a node object that may carry an `@id`.
///
/// Value objects and list/set containers cannot be identified.
pub fn is_node_object(obj: &Map<String, Value>) -> bool {
    !obj.contains_key(VALUE) && !obj.contains_key(LIST) && !obj.contains_key(SET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn blank_label_strips_prefix() {
        assert_eq!(blank_label("_:b0"), Some("b0"));
        assert_eq!(blank_label("http://example.org/x"), None);
    }

    #[test]
    fn classifies_objects() {
        assert!(is_value_object(&obj(json!({"@value": "x"}))));
        assert!(!is_node_object(&obj(json!({"@value": "x"}))));
        assert!(!is_node_object(&obj(json!({"@list": []}))));
        assert!(is_node_object(&obj(json!({"@graph": []}))));
        assert!(is_node_object(&obj(json!({"http://schema.org/name": []}))));
    }
}
