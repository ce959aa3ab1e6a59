//! Structural predicates over [`Node`]s.
//!
//! Each predicate looks at one node's discriminator pair or shape and never
//! at its surroundings, so any of them can be handed to
//! [`find`](crate::transform::find) or [`transform`](crate::transform::transform).

use crate::expr::kind::{ConjunctionOp, Kind};
use crate::expr::vocabulary::*;
use crate::node::Node;

/// Matches nodes whose `class` equals `class`.
pub fn is_class(class: &str) -> impl Fn(&Node) -> bool + '_ {
    move |node| node.class() == Some(class)
}

/// Matches nodes whose `type` equals `ty`.
pub fn is_type(ty: &str) -> impl Fn(&Node) -> bool + '_ {
    move |node| node.node_type() == Some(ty)
}

/// Matches nodes carrying exactly this discriminator pair.
///
/// # Examples
///
/// ```
/// use sqlprune::expr::builder::varchar;
/// use sqlprune::matcher::is_class_and_type;
///
/// let matches = is_class_and_type("CONSTANT", "VALUE_CONSTANT");
/// assert!(matches(&varchar("x")));
/// ```
pub fn is_class_and_type<'a>(class: &'a str, ty: &'a str) -> impl Fn(&Node) -> bool + 'a {
    move |node| node.class() == Some(class) && node.node_type() == Some(ty)
}

pub fn is_constant(node: &Node) -> bool {
    node.kind() == Kind::Constant
}

pub fn is_reference(node: &Node) -> bool {
    node.kind() == Kind::ColumnRef
}

/// Any `COMPARISON` node, whatever its operator.
pub fn is_comparison(node: &Node) -> bool {
    node.class() == Some(COMPARISON_CLASS)
}

pub fn is_conjunction_and(node: &Node) -> bool {
    node.kind() == Kind::Conjunction(ConjunctionOp::And)
}

pub fn is_conjunction_or(node: &Node) -> bool {
    node.kind() == Kind::Conjunction(ConjunctionOp::Or)
}

/// An `AND` without children: the canonical always-true predicate.
pub fn is_empty_conjunction_and(node: &Node) -> bool {
    is_conjunction_and(node)
        && node
            .get("children")
            .and_then(Node::as_array)
            .is_none_or(|children| children.is_empty())
}

pub fn is_cast(node: &Node) -> bool {
    node.kind() == Kind::Cast
}

/// A cast applied directly to a column reference.
pub fn is_reference_cast(node: &Node) -> bool {
    is_cast(node) && node.get("child").is_some_and(is_reference)
}

pub fn is_select(node: &Node) -> bool {
    node.kind() == Kind::Select
}

pub fn is_subquery(node: &Node) -> bool {
    node.kind() == Kind::Subquery
}

pub fn is_case(node: &Node) -> bool {
    node.kind() == Kind::Case
}

pub fn is_function(node: &Node) -> bool {
    node.kind() == Kind::Function
}
