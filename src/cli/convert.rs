//! JSON <-> Node conversion utilities

use crate::{output, Fields, Node};

/// Convert serde_json::Value to Node
pub fn json_to_node(v: serde_json::Value) -> Node {
    match v {
        serde_json::Value::Null => Node::Null,
        serde_json::Value::Bool(b) => Node::Boolean(b),
        serde_json::Value::Number(n) => Node::Number(n),
        serde_json::Value::String(s) => Node::String(s),
        serde_json::Value::Array(arr) => Node::array(arr.into_iter().map(json_to_node).collect()),
        serde_json::Value::Object(obj) => Node::object(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_node(v)))
                .collect::<Fields>(),
        ),
    }
}

/// Convert Node to serde_json::Value
pub fn node_to_json(node: &Node) -> serde_json::Value {
    output::to_value(node, false)
}

/// Parse a serialized tree
pub fn parse_tree(text: &str) -> Result<Node, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(json_to_node(value))
}
