use std::convert::Infallible;

use crate::error::{Error, Result};
use crate::matcher::{is_constant, is_reference, is_reference_cast, is_subquery};
use crate::node::Node;

/// Depth-first, pre-order search for nodes matching `predicate`.
///
/// A matching node is collected and its subtree is not searched any further.
/// Otherwise the search descends into the node's
/// [traversal children](Node::traversal_children). Results come back in
/// traversal order.
///
/// # Examples
///
/// ```
/// use sqlprune::expr::builder::{and2, equal, reference, varchar};
/// use sqlprune::matcher::is_reference;
/// use sqlprune::transform::find;
///
/// let predicate = and2(
///     equal(reference(&["c1"]), varchar("10")),
///     equal(reference(&["p"]), varchar("50")),
/// );
/// assert_eq!(find(&predicate, is_reference).len(), 2);
/// ```
pub fn find<P>(node: &Node, predicate: P) -> Vec<&Node>
where
    P: Fn(&Node) -> bool,
{
    let mut found = Vec::new();
    find_recursive(node, &predicate, &mut found);
    found
}

fn find_recursive<'a>(node: &'a Node, predicate: &dyn Fn(&Node) -> bool, found: &mut Vec<&'a Node>) {
    if predicate(node) {
        found.push(node);
        return;
    }
    for child in node.traversal_children() {
        find_recursive(child, predicate, found);
    }
}

/// Pre-order rewrite of every node matching `predicate`.
///
/// A matching node is replaced by `rewrite(node)` and its original subtree
/// is not visited. Objects and arrays are rebuilt around replaced
/// descendants; subtrees without a match are shared with the input.
pub fn transform<P, R>(node: &Node, predicate: P, mut rewrite: R) -> Node
where
    P: Fn(&Node) -> bool,
    R: FnMut(&Node) -> Node,
{
    match try_transform(node, predicate, |n| Ok::<_, Infallible>(rewrite(n))) {
        Ok(node) => node,
        Err(never) => match never {},
    }
}

/// Fallible [`transform`]: the first error from `rewrite` aborts the whole
/// rewrite and is returned as is.
pub fn try_transform<P, R, E>(node: &Node, predicate: P, mut rewrite: R) -> std::result::Result<Node, E>
where
    P: Fn(&Node) -> bool,
    R: FnMut(&Node) -> std::result::Result<Node, E>,
{
    let rewritten = transform_recursive(node, &predicate, &mut rewrite)?;
    Ok(rewritten.unwrap_or_else(|| node.clone()))
}

/// `Ok(None)` means the subtree came through unchanged.
fn transform_recursive<E>(
    node: &Node,
    predicate: &dyn Fn(&Node) -> bool,
    rewrite: &mut dyn FnMut(&Node) -> std::result::Result<Node, E>,
) -> std::result::Result<Option<Node>, E> {
    if predicate(node) {
        return rewrite(node).map(Some);
    }

    match node {
        Node::Array(items) => {
            let mut changed = Vec::with_capacity(items.len());
            for item in items.iter() {
                changed.push(transform_recursive(item, predicate, rewrite)?);
            }
            if changed.iter().all(Option::is_none) {
                return Ok(None);
            }
            let rebuilt = items
                .iter()
                .zip(changed)
                .map(|(old, new)| new.unwrap_or_else(|| old.clone()))
                .collect();
            Ok(Some(Node::array(rebuilt)))
        }

        Node::Object(fields) => {
            let mut changed = Vec::with_capacity(fields.len());
            for value in fields.values() {
                changed.push(transform_recursive(value, predicate, rewrite)?);
            }
            if changed.iter().all(Option::is_none) {
                return Ok(None);
            }
            let rebuilt = fields
                .iter()
                .zip(changed)
                .map(|((key, old), new)| (key.to_string(), new.unwrap_or_else(|| old.clone())))
                .collect();
            Ok(Some(Node::object(rebuilt)))
        }

        _ => Ok(None),
    }
}

/// Every column reference, in traversal order.
pub fn collect_references(node: &Node) -> Vec<&Node> {
    find(node, is_reference)
}

/// Every constant, in traversal order.
pub fn collect_literals(node: &Node) -> Vec<&Node> {
    find(node, is_constant)
}

/// Every cast whose child is a column reference.
pub fn collect_reference_casts(node: &Node) -> Vec<&Node> {
    find(node, is_reference_cast)
}

pub fn collect_subqueries(node: &Node) -> Vec<&Node> {
    find(node, is_subquery)
}

/// The name segments of a column reference (`["c", "x"]` for `c.x`).
pub fn column_names(reference: &Node) -> Result<Vec<String>> {
    let names = reference.require("column_names")?.as_array().ok_or_else(|| {
        Error::MalformedTree("column_names must be an array".to_string())
    })?;
    if names.is_empty() {
        return Err(Error::MalformedTree("column reference without a name".to_string()));
    }
    names
        .iter()
        .map(|name| {
            name.as_str().map(str::to_string).ok_or_else(|| {
                Error::MalformedTree(format!("column name must be a string, got {}", name.describe()))
            })
        })
        .collect()
}
