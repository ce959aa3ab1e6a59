//! Accessors for serialized statements.
//!
//! A serialized parse result looks like
//! `{"error": false, "statements": [{"node": {"type": "SELECT_NODE", ...}}]}`.
//! A failed parse sets `error` to true and carries an `error_message`.

use crate::error::{Error, Result};
use crate::expr::kind::{CompareOp, Kind};
use crate::expr::vocabulary::{BASE_TABLE_TYPE, TABLE_FUNCTION_TYPE};
use crate::matcher::{is_constant, is_reference};
use crate::node::Node;
use crate::transform::column_names;
use crate::types::{DataType, PartitionColumn};

/// Rejects a tree the front end flagged as a failed parse.
pub fn ensure_parsed(tree: &Node) -> Result<()> {
    if tree.get("error").and_then(Node::as_bool) == Some(true) {
        let message = tree
            .get("error_message")
            .and_then(Node::as_str)
            .unwrap_or("unknown parser error");
        return Err(Error::Parser(message.to_string()));
    }
    Ok(())
}

/// The statement bodies (`statements[*].node`) of a parse result.
pub fn statements(tree: &Node) -> Result<Vec<&Node>> {
    ensure_parsed(tree)?;
    statement_entries(tree)?
        .iter()
        .map(|entry| entry.require("node"))
        .collect()
}

fn statement_entries(tree: &Node) -> Result<&[Node]> {
    tree.require("statements")?
        .as_array()
        .ok_or_else(|| Error::MalformedTree("statements must be an array".to_string()))
}

/// One parse result per statement; the other top-level fields are kept.
pub fn split_statements(tree: &Node) -> Result<Vec<Node>> {
    ensure_parsed(tree)?;
    statement_entries(tree)?
        .iter()
        .map(|entry| tree.with_field("statements", Node::array(vec![entry.clone()])))
        .collect()
}

pub fn first_statement_node(tree: &Node) -> Result<&Node> {
    statements(tree)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedTree("parse result contains no statements".to_string()))
}

/// The WHERE clause of a select node, if it has one.
pub fn where_clause(node: &Node) -> Option<&Node> {
    node.get_present("where_clause")
}

pub fn with_where_clause(node: &Node, where_clause: Node) -> Result<Node> {
    node.with_field("where_clause", where_clause)
}

pub fn from_table(node: &Node) -> Option<&Node> {
    node.get_present("from_table")
}

pub fn with_from_table(node: &Node, from_table: Node) -> Result<Node> {
    node.with_field("from_table", from_table)
}

/// Name of the table function in the FROM clause (`read_parquet`, `read_delta`, ...).
pub fn table_function(node: &Node) -> Option<String> {
    table_function_call(node)
        .and_then(|f| f.get("function_name"))
        .and_then(Node::as_str)
        .map(str::to_string)
}

fn table_function_call(node: &Node) -> Option<&Node> {
    let from = from_table(node)?;
    if from.node_type() != Some(TABLE_FUNCTION_TYPE) {
        return None;
    }
    from.get_present("function")
}

/// The path the statement reads from.
///
/// For a table function this is its first constant string argument; for a
/// base table it is the table name.
pub fn table_path(node: &Node) -> Option<String> {
    let from = from_table(node)?;
    match from.node_type() {
        Some(BASE_TABLE_TYPE) => from.get("table_name").and_then(Node::as_str).map(str::to_string),
        Some(TABLE_FUNCTION_TYPE) => table_function_arguments(node)
            .iter()
            .find(|arg| is_constant(arg))
            .and_then(|arg| constant_string(arg))
            .map(str::to_string),
        _ => None,
    }
}

fn table_function_arguments(node: &Node) -> &[Node] {
    table_function_call(node)
        .and_then(|f| f.get("children"))
        .and_then(Node::as_array)
        .unwrap_or(&[])
}

fn constant_string(constant: &Node) -> Option<&str> {
    constant.get("value")?.get("value")?.as_str()
}

/// Partition columns declared with `hive_types = {'dt': DATE, ...}`.
///
/// Each `struct_pack` entry carries the column name as its alias. The type
/// is written either as a bare identifier (serialized as a column reference)
/// or as a string constant.
pub fn hive_types(node: &Node) -> Result<Vec<PartitionColumn>> {
    let named = table_function_arguments(node).iter().find(|arg| {
        arg.kind() == Kind::Comparison(CompareOp::Equal)
            && arg.get("left").is_some_and(|left| {
                is_reference(left)
                    && column_names(left).is_ok_and(|names| names == ["hive_types"])
            })
    });
    let pack = match named {
        Some(named) => named.require("right")?,
        None => return Ok(Vec::new()),
    };
    let entries = pack.require("children")?.as_array().ok_or_else(|| {
        Error::MalformedTree("hive_types must be a struct literal".to_string())
    })?;

    let mut columns = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry
            .get("alias")
            .and_then(Node::as_str)
            .filter(|alias| !alias.is_empty())
            .ok_or_else(|| Error::MalformedTree("hive_types entry without a column name".to_string()))?;
        let type_name = if is_reference(entry) {
            reference_name(entry)?
        } else if let Some(s) = constant_string(entry) {
            s.to_string()
        } else {
            return Err(Error::UnsupportedShape(format!(
                "hive_types entry '{}' must name a type, got {}",
                name,
                entry.describe()
            )));
        };
        columns.push(PartitionColumn::new(name, DataType::parse(&type_name)?));
    }
    Ok(columns)
}

/// Dotted name of a column reference (`c.x`).
pub fn reference_name(reference: &Node) -> Result<String> {
    Ok(column_names(reference)?.join("."))
}
