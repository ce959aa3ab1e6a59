//! Partition pruning against per-file min/max statistics.
//!
//! A statistics table holds one row per data file with the minimum and
//! maximum of each tracked column (`min_c1`, `max_c1`, ...). A predicate on
//! the data table is rewritten into a predicate on the statistics table that
//! is true for every file that may contain a matching row:
//!
//! ```text
//! c1 <= 10   =>  CASE WHEN min_c1 IS NULL THEN true ELSE CAST(min_c1 AS INTEGER) <= CAST(10 AS INTEGER) END
//! c1 >= 10   =>  CASE WHEN max_c1 IS NULL THEN true ELSE CAST(max_c1 AS INTEGER) >= CAST(10 AS INTEGER) END
//! c1 = 10    =>  both of the above, joined with AND
//! ```
//!
//! A file without statistics for the column always passes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::builder::{and2, base_table, cast_as, greater_eq, if_expr, is_null, less_eq, reference, true_literal};
use crate::expr::kind::{CompareOp, Kind};
use crate::matcher::{is_comparison, is_conjunction_and, is_constant, is_reference, is_select};
use crate::node::Node;
use crate::statement::{from_table, where_clause, with_from_table, with_where_clause};
use crate::transform::{collect_literals, collect_references, column_names, try_transform};
use crate::types::{DataType, PartitionColumn};

/// Statistics columns of one data column.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsColumn {
    pub min: String,
    pub max: String,
    pub data_type: DataType,
}

/// Where the statistics of each data column live.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsMapping {
    pub stats_table: String,
    columns: HashMap<String, StatsColumn>,
}

impl StatsMapping {
    pub fn new(stats_table: &str) -> Self {
        StatsMapping {
            stats_table: stats_table.to_string(),
            columns: HashMap::new(),
        }
    }

    pub fn with_column(mut self, name: &str, column: StatsColumn) -> Self {
        self.columns.insert(name.to_string(), column);
        self
    }

    /// Maps every column `c` to `min_c`/`max_c`.
    pub fn with_default_names(stats_table: &str, columns: &[PartitionColumn]) -> Self {
        columns.iter().fold(StatsMapping::new(stats_table), |mapping, column| {
            mapping.with_column(
                &column.name,
                StatsColumn {
                    min: format!("min_{}", column.name),
                    max: format!("max_{}", column.name),
                    data_type: column.data_type.clone(),
                },
            )
        })
    }

    pub fn get(&self, column: &str) -> Option<&StatsColumn> {
        self.columns.get(column)
    }
}

/// JSON form of a [`StatsMapping`].
///
/// ```json
/// {"stats_table": "t_stats", "columns": [{"name": "c1", "data_type": "INTEGER"}]}
/// ```
///
/// `min` and `max` default to `min_<name>` and `max_<name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    pub stats_table: String,
    pub columns: Vec<StatsColumnConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsColumnConfig {
    pub name: String,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl StatsConfig {
    pub fn into_mapping(self) -> Result<StatsMapping> {
        let mut mapping = StatsMapping::new(&self.stats_table);
        for column in self.columns {
            let data_type = DataType::parse(&column.data_type)?;
            let stats = StatsColumn {
                min: column.min.unwrap_or_else(|| format!("min_{}", column.name)),
                max: column.max.unwrap_or_else(|| format!("max_{}", column.name)),
                data_type,
            };
            mapping = mapping.with_column(&column.name, stats);
        }
        Ok(mapping)
    }
}

/// Which side a comparison between a column and a literal bounds the column from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `c < lit`, `c <= lit`, `lit > c`, `lit >= c`
    Upper,
    /// `c > lit`, `c >= lit`, `lit < c`, `lit <= c`
    Lower,
    /// `c = lit`, `lit = c`
    Both,
    /// Anything else, including `<>`
    Neither,
}

/// Classifies a comparison between one column reference and one constant.
pub fn classify_bound(comparison: &Node) -> Bound {
    let op = match comparison.kind() {
        Kind::Comparison(op) => op,
        _ => return Bound::Neither,
    };
    let (left, right) = match (comparison.get("left"), comparison.get("right")) {
        (Some(left), Some(right)) => (left, right),
        _ => return Bound::Neither,
    };
    let op = if is_reference(left) && is_constant(right) {
        op
    } else if is_constant(left) && is_reference(right) {
        op.mirror()
    } else {
        return Bound::Neither;
    };
    match op {
        CompareOp::LessThan | CompareOp::LessThanOrEqual => Bound::Upper,
        CompareOp::GreaterThan | CompareOp::GreaterThanOrEqual => Bound::Lower,
        CompareOp::Equal => Bound::Both,
        CompareOp::NotEqual => Bound::Neither,
    }
}

/// True for comparisons that bound their column from above, equality included.
pub fn is_upper_bound(comparison: &Node) -> bool {
    matches!(classify_bound(comparison), Bound::Upper | Bound::Both)
}

/// True for comparisons that bound their column from below, equality included.
pub fn is_lower_bound(comparison: &Node) -> bool {
    matches!(classify_bound(comparison), Bound::Lower | Bound::Both)
}

/// `CASE WHEN min IS NULL THEN true ELSE CAST(min AS T) <= CAST(literal AS T) END`
///
/// A file can hold a value at or below `literal` only if its minimum is.
pub fn upper_bound_predicate(min_column: &str, literal: &Node, data_type: &DataType) -> Result<Node> {
    let min = reference(&[min_column]);
    Ok(if_expr(
        is_null(min.clone()),
        true_literal(),
        less_eq(cast_as(min, data_type)?, cast_as(literal.clone(), data_type)?),
    ))
}

/// `CASE WHEN max IS NULL THEN true ELSE CAST(max AS T) >= CAST(literal AS T) END`
///
/// A file can hold a value at or above `literal` only if its maximum is.
pub fn lower_bound_predicate(max_column: &str, literal: &Node, data_type: &DataType) -> Result<Node> {
    let max = reference(&[max_column]);
    Ok(if_expr(
        is_null(max.clone()),
        true_literal(),
        greater_eq(cast_as(max, data_type)?, cast_as(literal.clone(), data_type)?),
    ))
}

/// Rewrites one comparison into a statistics predicate.
///
/// Anything that is not a comparison between exactly one mapped,
/// single-segment column and exactly one constant becomes an always-true
/// literal.
///
/// # Examples
///
/// ```
/// use sqlprune::expr::builder::{equal, reference, true_literal, varchar};
/// use sqlprune::stats::{rewrite_comparison, StatsMapping};
/// use sqlprune::types::{DataType, PartitionColumn};
///
/// let mapping = StatsMapping::with_default_names(
///     "t_stats",
///     &[PartitionColumn::new("c1", DataType::Varchar)],
/// );
///
/// let rewritten = rewrite_comparison(&equal(reference(&["c1"]), varchar("a")), &mapping);
/// assert_ne!(rewritten, true_literal());
///
/// let unmapped = rewrite_comparison(&equal(reference(&["c2"]), varchar("a")), &mapping);
/// assert_eq!(unmapped, true_literal());
/// ```
pub fn rewrite_comparison(comparison: &Node, mapping: &StatsMapping) -> Node {
    match try_rewrite_comparison(comparison, mapping) {
        Ok(Some(rewritten)) => rewritten,
        Ok(None) => {
            tracing::debug!(predicate = %comparison.describe(), "no statistics rewrite, keeping all files");
            true_literal()
        }
        Err(e) => {
            tracing::debug!(error = %e, "statistics rewrite failed, keeping all files");
            true_literal()
        }
    }
}

fn try_rewrite_comparison(comparison: &Node, mapping: &StatsMapping) -> Result<Option<Node>> {
    if !is_comparison(comparison) {
        return Ok(None);
    }
    let references = collect_references(comparison);
    let literals = collect_literals(comparison);
    let (reference, literal) = match (references.as_slice(), literals.as_slice()) {
        ([reference], [literal]) => (*reference, *literal),
        _ => return Ok(None),
    };
    let column = match column_names(reference)?.as_slice() {
        [name] => name.clone(),
        _ => return Ok(None),
    };
    let stats = match mapping.get(&column) {
        Some(stats) => stats,
        None => return Ok(None),
    };

    let rewritten = match classify_bound(comparison) {
        Bound::Upper => upper_bound_predicate(&stats.min, literal, &stats.data_type)?,
        Bound::Lower => lower_bound_predicate(&stats.max, literal, &stats.data_type)?,
        Bound::Both => and2(
            lower_bound_predicate(&stats.max, literal, &stats.data_type)?,
            upper_bound_predicate(&stats.min, literal, &stats.data_type)?,
        ),
        Bound::Neither => return Ok(None),
    };
    Ok(Some(rewritten))
}

/// Rewrites every child of an `AND` on its own.
pub fn rewrite_conjunction(conjunction: &Node, mapping: &StatsMapping) -> Result<Node> {
    let children = conjunction
        .get("children")
        .and_then(Node::as_array)
        .unwrap_or(&[])
        .iter()
        .map(|child| rewrite_comparison(child, mapping))
        .collect::<Vec<_>>();
    conjunction.with_field("children", Node::array(children))
}

/// The statistics form of a whole WHERE clause.
pub fn rewrite_filter(filter: &Node, mapping: &StatsMapping) -> Result<Node> {
    if is_conjunction_and(filter) {
        rewrite_conjunction(filter, mapping)
    } else if is_comparison(filter) {
        Ok(rewrite_comparison(filter, mapping))
    } else {
        tracing::debug!(shape = %filter.describe(), "unsupported filter shape, keeping all files");
        Ok(true_literal())
    }
}

/// Points a select node at the statistics table and rewrites its WHERE clause.
pub fn replace_min_max_in_query(statement: &Node, mapping: &StatsMapping) -> Result<Node> {
    let from = from_table(statement).ok_or_else(|| {
        Error::MalformedTree(format!("{} has no FROM clause", statement.describe()))
    })?;
    let retargeted = if from.node_type() == Some(crate::expr::vocabulary::BASE_TABLE_TYPE) {
        from.with_field("table_name", Node::from(mapping.stats_table.as_str()))?
    } else {
        base_table(&mapping.stats_table)
    };
    let statement = with_from_table(statement, retargeted)?;
    match where_clause(&statement) {
        Some(filter) => {
            let rewritten = rewrite_filter(filter, mapping)?;
            with_where_clause(&statement, rewritten)
        }
        None => Ok(statement),
    }
}

/// Applies [`replace_min_max_in_query`] to every SELECT node of a parse result.
pub fn replace_min_max_in_tree(tree: &Node, mapping: &StatsMapping) -> Result<Node> {
    try_transform(tree, is_select, |select| replace_min_max_in_query(select, mapping))
}
