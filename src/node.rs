use std::sync::Arc;

use serde_json::Number;

use crate::error::{Error, Result};

/// A node of a serialized SQL expression tree.
///
/// Trees arrive from the external SQL front end as JSON. Every JSON shape is
/// representable, so nodes the rewriter knows nothing about pass through
/// untouched. Objects and arrays are reference counted: a rewrite builds new
/// parents and shares every unchanged subtree with its input.
///
/// # Examples
///
/// ```
/// use sqlprune::{Fields, Node};
///
/// let column = Node::object(
///     Fields::new()
///         .with("class", "COLUMN_REF")
///         .with("type", "COLUMN_REF")
///         .with("column_names", Node::array(vec![Node::from("dt")])),
/// );
///
/// assert_eq!(column.class(), Some("COLUMN_REF"));
/// assert_eq!(column.get("column_names").and_then(|n| n.as_array()).map(|a| a.len()), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Number, kept exactly as serialized (`query_location` can exceed `i64`)
    Number(Number),

    /// UTF-8 string
    String(String),

    /// Ordered sequence of nodes
    Array(Arc<[Node]>),

    /// Ordered field mapping
    Object(Arc<Fields>),
}

/// The ordered fields of an object node.
///
/// Field order is preserved as parsed so that a tree printed back to the
/// external front end looks like the one it produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields {
    entries: Vec<(String, Node)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Node>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Sets `key`, replacing an existing value in place or appending a new field.
    pub fn insert(&mut self, key: &str, value: Node) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Node)> for Fields {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(&k, v);
        }
        fields
    }
}

impl Node {
    pub fn object(fields: Fields) -> Self {
        Node::Object(Arc::new(fields))
    }

    pub fn array(items: Vec<Node>) -> Self {
        Node::Array(items.into())
    }

    /// Field lookup; `None` for non-objects and missing fields.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Field lookup treating an explicit JSON null as absent.
    pub fn get_present(&self, key: &str) -> Option<&Node> {
        self.get(key).filter(|n| !n.is_null())
    }

    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Node::Object(fields) => Some(fields.as_ref()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items.as_ref()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Scalars terminate every traversal.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Node::Array(_) | Node::Object(_))
    }

    /// The `class` half of the discriminator pair.
    pub fn class(&self) -> Option<&str> {
        self.get("class").and_then(Node::as_str)
    }

    /// The `type` half of the discriminator pair.
    pub fn node_type(&self) -> Option<&str> {
        self.get("type").and_then(Node::as_str)
    }

    /// Required field lookup for rewrites that cannot continue without it.
    pub fn require(&self, key: &str) -> Result<&Node> {
        self.get_present(key).ok_or_else(|| {
            Error::MalformedTree(format!(
                "{} node is missing required field '{}'",
                self.describe(),
                key
            ))
        })
    }

    /// Returns a copy of this object with `key` set to `value`.
    ///
    /// Only the field list is copied; every other field still shares its
    /// subtree with `self`.
    pub fn with_field(&self, key: &str, value: Node) -> Result<Node> {
        match self {
            Node::Object(fields) => {
                let mut fields = fields.as_ref().clone();
                fields.insert(key, value);
                Ok(Node::object(fields))
            }
            other => Err(Error::MalformedTree(format!(
                "cannot set field '{}' on {}",
                key,
                other.describe()
            ))),
        }
    }

    /// The sub-nodes a search descends into when this node does not match.
    ///
    /// `children` wins over `child`, which wins over the `left`/`right` pair.
    /// Objects without any of these conventions expose every field value,
    /// arrays expose their elements and scalars expose nothing.
    pub fn traversal_children(&self) -> Vec<&Node> {
        match self {
            Node::Array(items) => items.iter().collect(),
            Node::Object(fields) => {
                if let Some(children) = fields.get("children") {
                    return match children {
                        Node::Array(items) => items.iter().collect(),
                        Node::Null => Vec::new(),
                        other => vec![other],
                    };
                }
                if let Some(child) = fields.get("child") {
                    return vec![child];
                }
                if let (Some(left), Some(right)) = (fields.get("left"), fields.get("right")) {
                    return vec![left, right];
                }
                fields.values().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Node::Null => "null".to_string(),
            Node::Boolean(_) => "boolean".to_string(),
            Node::Number(_) => "number".to_string(),
            Node::String(_) => "string".to_string(),
            Node::Array(items) => format!("array of {}", items.len()),
            Node::Object(_) => match (self.class(), self.node_type()) {
                (Some(class), Some(ty)) => format!("{}/{}", class, ty),
                (None, Some(ty)) => ty.to_string(),
                (Some(class), None) => class.to_string(),
                (None, None) => "object".to_string(),
            },
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Boolean(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::array(items)
    }
}

impl From<Fields> for Node {
    fn from(fields: Fields) -> Self {
        Node::object(fields)
    }
}
