//! JSON output serialization for expression trees.
//!
//! Trees are printed in one of three forms:
//!
//! - **Compact** via [`to_json()`] - minimal whitespace, fields in tree order,
//!   suitable for handing back to the SQL front end
//! - **Pretty** via [`to_json_pretty()`] - 2-space indentation, fields in tree order
//! - **Canonical** via [`to_canonical_json()`] - compact with object keys sorted;
//!   the byte string fingerprints are computed from
//!
//! # Examples
//!
//! ```
//! use sqlprune::{Fields, Node};
//! use sqlprune::output::{to_canonical_json, to_json};
//!
//! let node = Node::object(Fields::new().with("type", "COLUMN_REF").with("alias", ""));
//!
//! assert_eq!(to_json(&node), r#"{"type":"COLUMN_REF","alias":""}"#);
//! assert_eq!(to_canonical_json(&node), r#"{"alias":"","type":"COLUMN_REF"}"#);
//! ```

use crate::node::Node;

/// Converts a tree into a `serde_json` value, fields in tree order unless
/// `sort_keys` is set.
pub fn to_value(node: &Node, sort_keys: bool) -> serde_json::Value {
    match node {
        Node::Null => serde_json::Value::Null,
        Node::Boolean(b) => serde_json::Value::Bool(*b),
        Node::Number(n) => serde_json::Value::Number(n.clone()),
        Node::String(s) => serde_json::Value::String(s.clone()),
        Node::Array(items) => {
            serde_json::Value::Array(items.iter().map(|item| to_value(item, sort_keys)).collect())
        }
        Node::Object(fields) => {
            let mut entries: Vec<_> = fields.iter().collect();
            if sort_keys {
                entries.sort_by(|a, b| a.0.cmp(b.0));
            }
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), to_value(value, sort_keys)))
                    .collect(),
            )
        }
    }
}

/// Compact JSON with fields in tree order.
pub fn to_json(node: &Node) -> String {
    to_value(node, false).to_string()
}

/// Pretty-printed JSON with fields in tree order.
pub fn to_json_pretty(node: &Node) -> String {
    format!("{:#}", to_value(node, false))
}

/// Compact JSON with object keys sorted; equal trees always print the same bytes.
pub fn to_canonical_json(node: &Node) -> String {
    to_value(node, true).to_string()
}
