//! Partition pruning for Hive-style directory layouts
//! (`base/dt=2024-01-01/p=50/part-0.parquet`).
//!
//! The WHERE clause of a query is reduced to the predicates that only touch
//! partition columns, then evaluated against the partition values decoded
//! from every listed file's path.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::evaluator::PartitionEvaluator;
use crate::expr::builder::{conjunction, true_literal};
use crate::expr::kind::ConjunctionOp;
use crate::listing::{FileLister, FileStatus};
use crate::matcher::{is_comparison, is_conjunction_and, is_select};
use crate::node::Node;
use crate::statement::{where_clause, with_where_clause};
use crate::transform::{collect_references, collect_subqueries, column_names, try_transform};
use crate::types::PartitionColumn;
use crate::value::Value;

/// Directory value Hive writes for a NULL partition.
pub const DEFAULT_PARTITION_NAME: &str = "__HIVE_DEFAULT_PARTITION__";

/// Replaces every WHERE predicate that touches a non-partition column with
/// an always-true literal.
///
/// A statement without a WHERE clause comes back unchanged.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use sqlprune::expr::builder::{and2, equal, reference, true_literal, varchar};
/// use sqlprune::hive::partition_filter;
///
/// let partitions: HashSet<String> = ["dt", "p"].iter().map(|s| s.to_string()).collect();
/// let filter = and2(
///     equal(reference(&["c1"]), varchar("10")),
///     equal(reference(&["p"]), varchar("50")),
/// );
///
/// let pruned = partition_filter(&filter, &partitions);
/// assert_eq!(
///     pruned,
///     and2(true_literal(), equal(reference(&["p"]), varchar("50"))),
/// );
/// ```
pub fn remove_non_partition_predicates(statement: &Node, partitions: &HashSet<String>) -> Result<Node> {
    match where_clause(statement) {
        Some(filter) => with_where_clause(statement, partition_filter(filter, partitions)),
        None => Ok(statement.clone()),
    }
}

/// The partition-only form of a WHERE clause.
///
/// Only the top level is inspected: each child of an `AND` is kept when it
/// is a safe comparison and replaced otherwise, a bare comparison is kept or
/// replaced as a whole, and any other shape becomes an always-true literal.
pub fn partition_filter(filter: &Node, partitions: &HashSet<String>) -> Node {
    if is_conjunction_and(filter) {
        let children = filter
            .get("children")
            .and_then(Node::as_array)
            .unwrap_or(&[])
            .iter()
            .map(|child| keep_or_replace(child, partitions))
            .collect();
        return conjunction(ConjunctionOp::And, children);
    }
    if is_comparison(filter) {
        return keep_or_replace(filter, partitions);
    }
    tracing::debug!(shape = %filter.describe(), "dropping predicate of unsupported shape");
    true_literal()
}

fn keep_or_replace(predicate: &Node, partitions: &HashSet<String>) -> Node {
    if is_comparison(predicate) && only_partition_columns(predicate, partitions) {
        predicate.clone()
    } else {
        tracing::debug!(predicate = %predicate.describe(), "dropping non-partition predicate");
        true_literal()
    }
}

/// True when the comparison references at least one column and every
/// reference is a plain partition column name.
fn only_partition_columns(comparison: &Node, partitions: &HashSet<String>) -> bool {
    if !collect_subqueries(comparison).is_empty() {
        return false;
    }
    let references = collect_references(comparison);
    !references.is_empty()
        && references.iter().all(|reference| match column_names(reference) {
            Ok(names) => names.len() == 1 && partitions.contains(&names[0]),
            Err(_) => false,
        })
}

/// Applies [`remove_non_partition_predicates`] to every SELECT node of a
/// parse result.
pub fn remove_non_partition_predicates_in_query(tree: &Node, partitions: &HashSet<String>) -> Result<Node> {
    try_transform(tree, is_select, |select| remove_non_partition_predicates(select, partitions))
}

/// Hive special characters that are percent-encoded in partition directory names.
fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{01}'..='\u{1F}'
            | '"'
            | '#'
            | '%'
            | '\''
            | '*'
            | '/'
            | ':'
            | '='
            | '?'
            | '\\'
            | '\u{7F}'
            | '{'
            | '['
            | ']'
            | '^'
    )
}

/// Percent-encodes a partition value the way Hive writes directory names.
pub fn escape_path_name(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escape(c) {
            escaped.push_str(&format!("%{:02X}", u32::from(c)));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Decodes `%XX` escapes in a partition directory value.
///
/// A `%` that is not followed by two hex digits is copied literally.
///
/// # Examples
///
/// ```
/// use sqlprune::hive::unescape_path_name;
///
/// assert_eq!(unescape_path_name("a%3Db"), "a=b");
/// assert_eq!(unescape_path_name("100%"), "100%");
/// assert_eq!(unescape_path_name("%zz"), "%zz");
/// ```
pub fn unescape_path_name(path: &str) -> String {
    let chars = path.chars().collect::<Vec<_>>();
    let mut result = String::with_capacity(path.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%'
            && let Some(code) = chars
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(char::is_ascii_hexdigit))
                .and_then(|hex| u8::from_str_radix(&hex.iter().collect::<String>(), 16).ok())
        {
            result.push(char::from(code));
            i += 3;
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }
    result
}

/// Lists the files of a Hive-partitioned table and keeps the ones whose
/// partition values can satisfy a filter.
///
/// # Examples
///
/// ```no_run
/// use sqlprune::hive::HivePartitionPruning;
/// use sqlprune::listing::LocalFileLister;
/// use sqlprune::types::PartitionColumn;
///
/// let lister = LocalFileLister::default();
/// let pruning = HivePartitionPruning::new(&lister);
/// let partitions = vec![PartitionColumn::parse("dt:DATE").unwrap()];
/// let files = pruning.prune_files("/data/events", None, &partitions).unwrap();
/// println!("{} files", files.len());
/// ```
pub struct HivePartitionPruning<'a> {
    lister: &'a dyn FileLister,
}

impl<'a> HivePartitionPruning<'a> {
    pub fn new(lister: &'a dyn FileLister) -> Self {
        HivePartitionPruning { lister }
    }

    /// Prunes using the WHERE clause of a select node.
    pub fn prune_statement(
        &self,
        base_path: &str,
        statement: &Node,
        partitions: &[PartitionColumn],
    ) -> Result<Vec<FileStatus>> {
        self.prune_files(base_path, where_clause(statement), partitions)
    }

    /// Files under `base_path` that may hold rows matching `filter`.
    ///
    /// `partitions` lists the partition directories from the outermost in.
    /// Without partitions every file directly under `base_path` is returned.
    /// A file is dropped only when its partition values make the filter
    /// definitely false; values that fail to parse keep the file.
    pub fn prune_files(
        &self,
        base_path: &str,
        filter: Option<&Node>,
        partitions: &[PartitionColumn],
    ) -> Result<Vec<FileStatus>> {
        let base_path = base_directory(base_path);
        let listed = self.lister.list(base_path, partitions.len())?;
        if partitions.is_empty() {
            return Ok(listed.into_iter().map(|file| file.status).collect());
        }

        let names = partitions.iter().map(|p| p.name.clone()).collect::<HashSet<_>>();
        let predicate = match filter {
            Some(filter) => partition_filter(filter, &names),
            None => true_literal(),
        };

        let total = listed.len();
        let mut kept = Vec::new();
        for file in listed {
            match partition_row(&file.partitions, partitions) {
                Some(row) => {
                    if PartitionEvaluator::new(&row).evaluate(&predicate) != Some(false) {
                        kept.push(file.status);
                    }
                }
                None => {
                    tracing::warn!(path = %file.status.path, "partition values could not be read, keeping file");
                    kept.push(file.status);
                }
            }
        }
        tracing::info!(base_path, total, kept = kept.len(), "pruned hive partitions");
        Ok(kept)
    }
}

/// The directory part of a glob such as `data/t/*/*.parquet`.
fn base_directory(path: &str) -> &str {
    match path.find("/*") {
        Some(index) => &path[..index],
        None => path,
    }
}

/// Typed partition values of one file; `None` when any value fails to parse.
fn partition_row(segments: &[String], partitions: &[PartitionColumn]) -> Option<HashMap<String, Value>> {
    if segments.len() < partitions.len() {
        return None;
    }
    let mut row = HashMap::with_capacity(partitions.len());
    for (column, raw) in partitions.iter().zip(segments) {
        let value = unescape_path_name(raw);
        let typed = if value == DEFAULT_PARTITION_NAME {
            Value::Null
        } else {
            match Value::parse(&value, &column.data_type) {
                Ok(typed) => typed,
                Err(e) => {
                    tracing::debug!(column = %column.name, error = %e, "unparseable partition value");
                    return None;
                }
            }
        };
        row.insert(column.name.clone(), typed);
    }
    Some(row)
}
