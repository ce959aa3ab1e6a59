//! Partition pruning for Delta tables.
//!
//! The Delta log already knows the partition values of every file, so pruning
//! only has to translate the WHERE clause into the predicate form a Delta scan
//! accepts. The scan itself is an external collaborator ([`DeltaScan`]).

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::expr::kind::{CompareOp, ConjunctionOp, Kind};
use crate::listing::FileStatus;
use crate::matcher::is_empty_conjunction_and;
use crate::node::Node;
use crate::statement::where_clause;
use crate::transform::column_names;
use crate::types::DataType;
use crate::value::Value;

/// A predicate in the form a Delta scan filters partitions with.
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaPredicate {
    /// A (possibly dotted) column name
    Column(String),

    Literal(Value),

    Comparison {
        op: CompareOp,
        left: Box<DeltaPredicate>,
        right: Box<DeltaPredicate>,
    },

    Not(Box<DeltaPredicate>),

    And(Box<DeltaPredicate>, Box<DeltaPredicate>),

    Or(Box<DeltaPredicate>, Box<DeltaPredicate>),
}

impl DeltaPredicate {
    pub fn comparison(op: CompareOp, left: DeltaPredicate, right: DeltaPredicate) -> Self {
        DeltaPredicate::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluates the predicate against a file's partition values.
    ///
    /// `None` when the result is unknown (a column missing from `row`,
    /// incomparable operands); NULL operands make a comparison false.
    pub fn matches(&self, row: &HashMap<String, Value>) -> Option<bool> {
        match self {
            DeltaPredicate::Literal(Value::Boolean(b)) => Some(*b),
            DeltaPredicate::Comparison { op, left, right } => {
                let left = left.value(row)?;
                let right = right.value(row)?;
                if left.is_null() || right.is_null() {
                    return Some(false);
                }
                let ordering = left.compare(&right)?;
                Some(match op {
                    CompareOp::Equal => ordering.is_eq(),
                    CompareOp::NotEqual => ordering.is_ne(),
                    CompareOp::LessThan => ordering.is_lt(),
                    CompareOp::GreaterThan => ordering.is_gt(),
                    CompareOp::LessThanOrEqual => ordering.is_le(),
                    CompareOp::GreaterThanOrEqual => ordering.is_ge(),
                })
            }
            DeltaPredicate::Not(inner) => inner.matches(row).map(|b| !b),
            DeltaPredicate::And(left, right) => match (left.matches(row), right.matches(row)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            DeltaPredicate::Or(left, right) => match (left.matches(row), right.matches(row)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            DeltaPredicate::Column(name) => match row.get(name) {
                Some(Value::Boolean(b)) => Some(*b),
                _ => None,
            },
            DeltaPredicate::Literal(_) => None,
        }
    }

    fn value(&self, row: &HashMap<String, Value>) -> Option<Value> {
        match self {
            DeltaPredicate::Column(name) => row.get(name).cloned(),
            DeltaPredicate::Literal(value) => Some(value.clone()),
            predicate => predicate.matches(row).map(Value::Boolean),
        }
    }
}

impl fmt::Display for DeltaPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaPredicate::Column(name) => write!(f, "column({})", name),
            DeltaPredicate::Literal(Value::String(s)) => write!(f, "'{}'", s),
            DeltaPredicate::Literal(value) => write!(f, "{}", value),
            DeltaPredicate::Comparison { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            DeltaPredicate::Not(inner) => write!(f, "NOT({})", inner),
            DeltaPredicate::And(left, right) => write!(f, "({} AND {})", left, right),
            DeltaPredicate::Or(left, right) => write!(f, "({} OR {})", left, right),
        }
    }
}

/// Translates a WHERE clause into a [`DeltaPredicate`].
///
/// Constants, column references, comparisons, AND/OR conjunctions and casts
/// of constants are supported. `<>` becomes `NOT(=)`. Conjunctions with more
/// than two children are folded from the left, and an empty `AND` is the
/// literal `true`.
///
/// # Examples
///
/// ```
/// use sqlprune::delta::{to_delta_predicate, DeltaPredicate};
/// use sqlprune::expr::builder::{equal, reference, varchar};
/// use sqlprune::expr::CompareOp;
/// use sqlprune::value::Value;
///
/// let predicate = to_delta_predicate(&equal(reference(&["p"]), varchar("x"))).unwrap();
/// assert_eq!(
///     predicate,
///     DeltaPredicate::comparison(
///         CompareOp::Equal,
///         DeltaPredicate::Column("p".to_string()),
///         DeltaPredicate::Literal(Value::String("x".to_string())),
///     )
/// );
/// ```
pub fn to_delta_predicate(node: &Node) -> Result<DeltaPredicate> {
    match node.kind() {
        Kind::Constant => Ok(DeltaPredicate::Literal(Value::from_constant(node)?)),
        Kind::ColumnRef => Ok(DeltaPredicate::Column(column_names(node)?.join("."))),
        Kind::Comparison(op) => {
            let left = to_delta_predicate(node.require("left")?)?;
            let right = to_delta_predicate(node.require("right")?)?;
            match op {
                CompareOp::NotEqual => Ok(DeltaPredicate::Not(Box::new(DeltaPredicate::comparison(
                    CompareOp::Equal,
                    left,
                    right,
                )))),
                op => Ok(DeltaPredicate::comparison(op, left, right)),
            }
        }
        Kind::Conjunction(op) => to_conjunction(op, node),
        Kind::Cast => to_literal_cast(node).map(DeltaPredicate::Literal),
        _ => Err(Error::UnsupportedShape(format!(
            "{} has no Delta predicate form",
            node.describe()
        ))),
    }
}

fn to_conjunction(op: ConjunctionOp, node: &Node) -> Result<DeltaPredicate> {
    let children = node.get("children").and_then(Node::as_array).unwrap_or(&[]);
    let mut translated = children.iter().map(to_delta_predicate);
    let first = match translated.next() {
        Some(first) => first?,
        None => return Ok(DeltaPredicate::Literal(Value::Boolean(op == ConjunctionOp::And))),
    };
    translated.try_fold(first, |acc, next| {
        let next = Box::new(next?);
        Ok(match op {
            ConjunctionOp::And => DeltaPredicate::And(Box::new(acc), next),
            ConjunctionOp::Or => DeltaPredicate::Or(Box::new(acc), next),
        })
    })
}

/// Folds `CAST(constant AS T)` (possibly nested) into a typed literal.
fn to_literal_cast(cast: &Node) -> Result<Value> {
    let child = cast.require("child")?;
    let value = match child.kind() {
        Kind::Constant => Value::from_constant(child)?,
        Kind::Cast => to_literal_cast(child)?,
        _ => {
            return Err(Error::UnsupportedShape(format!(
                "only constants can be cast in a Delta predicate, got {}",
                child.describe()
            )));
        }
    };
    let target = DataType::from_type_node(cast.require("cast_type")?)?;
    value.cast(&target)
}

/// Scans a Delta table's log for the files matching a partition predicate.
pub trait DeltaScan {
    /// All live files of the table when `predicate` is `None`.
    fn scan(&self, base_path: &str, predicate: Option<&DeltaPredicate>) -> Result<Vec<FileStatus>>;
}

pub struct DeltaPartitionPruning<'a> {
    scan: &'a dyn DeltaScan,
}

impl<'a> DeltaPartitionPruning<'a> {
    pub fn new(scan: &'a dyn DeltaScan) -> Self {
        DeltaPartitionPruning { scan }
    }

    pub fn prune_statement(&self, base_path: &str, statement: &Node) -> Result<Vec<FileStatus>> {
        self.prune_files(base_path, where_clause(statement))
    }

    /// Files of the table at `base_path` that may hold rows matching `filter`.
    ///
    /// A missing or empty filter scans everything. A filter with no Delta
    /// form also scans everything; a literal that fails to convert is an
    /// error.
    pub fn prune_files(&self, base_path: &str, filter: Option<&Node>) -> Result<Vec<FileStatus>> {
        let filter = filter.filter(|f| !is_empty_conjunction_and(f));
        let predicate = match filter.map(to_delta_predicate).transpose() {
            Ok(predicate) => predicate,
            Err(Error::UnsupportedShape(reason)) => {
                tracing::warn!(%reason, "filter has no Delta form, scanning all files");
                None
            }
            Err(e) => return Err(e),
        };
        if let Some(predicate) = &predicate {
            tracing::debug!(%predicate, "scanning with partition predicate");
        }
        let files = self.scan.scan(base_path, predicate.as_ref())?;
        tracing::info!(base_path, files = files.len(), "pruned delta partitions");
        Ok(files)
    }
}
