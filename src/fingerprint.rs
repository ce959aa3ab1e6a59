//! Query fingerprints.
//!
//! Two queries that differ only in their literal values share a fingerprint:
//! every VARCHAR, INTEGER and DECIMAL constant is replaced with a placeholder
//! and the source positions recorded by the parser are cleared before the
//! tree is hashed. Constants of other types (DATE, TIMESTAMP, BOOLEAN, ...)
//! are hashed as written. Common table expressions are hashed as written too.

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::matcher::is_constant;
use crate::node::{Fields, Node};
use crate::output::to_canonical_json;
use crate::statement::ensure_parsed;
use crate::transform::try_transform;

/// Replaces literal payloads with placeholders and clears `query_location`.
pub fn canonicalize(tree: &Node) -> Result<Node> {
    let replaced = try_transform(tree, is_constant, canonical_constant)?;
    Ok(clear_query_locations(&replaced))
}

fn canonical_constant(constant: &Node) -> Result<Node> {
    let payload = constant.require("value")?;
    if payload.get("is_null").and_then(Node::as_bool) == Some(true) {
        return Ok(constant.clone());
    }
    let type_node = payload.require("type")?;
    let payload = match type_node.get("id").and_then(Node::as_str) {
        Some("VARCHAR") => payload.with_field("value", Node::from("?"))?,
        Some("INTEGER") => payload.with_field("value", Node::from(-1))?,
        Some("DECIMAL") => {
            let type_info = type_node
                .require("type_info")?
                .with_field("width", Node::from(1))?
                .with_field("scale", Node::from(1))?;
            payload
                .with_field("value", Node::from(-1))?
                .with_field("type", type_node.with_field("type_info", type_info)?)?
        }
        _ => return Ok(constant.clone()),
    };
    constant.with_field("value", payload)
}

fn clear_query_locations(node: &Node) -> Node {
    match node {
        Node::Object(fields) => Node::object(
            fields
                .iter()
                .map(|(key, value)| {
                    let value = if key == "query_location" {
                        Node::from(0)
                    } else {
                        clear_query_locations(value)
                    };
                    (key.to_string(), value)
                })
                .collect::<Fields>(),
        ),
        Node::Array(items) => Node::array(items.iter().map(clear_query_locations).collect()),
        other => other.clone(),
    }
}

/// SHA-256 of the canonical form of a parse result, as lowercase hex.
///
/// # Examples
///
/// ```
/// use sqlprune::cli::parse_tree;
/// use sqlprune::fingerprint::fingerprint;
///
/// let tree = |value: i64| {
///     parse_tree(&format!(
///         r#"{{"error":false,"statements":[{{"node":{{"type":"SELECT_NODE",
///             "where_clause":{{"class":"CONSTANT","type":"VALUE_CONSTANT","alias":"",
///             "query_location":30,"value":{{"type":{{"id":"INTEGER","type_info":null}},
///             "is_null":false,"value":{}}}}}}}}}]}}"#,
///         value
///     ))
///     .unwrap()
/// };
///
/// let a = fingerprint(&tree(1)).unwrap();
/// assert_eq!(a, fingerprint(&tree(2)).unwrap());
/// assert_eq!(a.len(), 64);
/// ```
pub fn fingerprint(tree: &Node) -> Result<String> {
    ensure_parsed(tree)?;
    let canonical = canonicalize(tree)?;
    let digest = Sha256::digest(to_canonical_json(&canonical).as_bytes());
    let fingerprint = hex::encode(digest);
    tracing::debug!(%fingerprint, "computed fingerprint");
    Ok(fingerprint)
}
