use std::collections::HashMap;

use crate::{
    expr::{
        kind::{CompareOp, ConjunctionOp, Kind},
        vocabulary::{OPERATOR_CLASS, OPERATOR_TYPE_IS_NOT_NULL, OPERATOR_TYPE_IS_NULL, OPERATOR_TYPE_NOT},
    },
    node::Node,
    transform::column_names,
    types::DataType,
    value::Value,
};

/// Evaluates a pruned predicate against the partition values of one file.
///
/// Evaluation is three-valued like SQL: a comparison with a NULL operand is
/// NULL, `AND` is false as soon as one side is false and `OR` is true as soon
/// as one side is true. On top of that, any shape the evaluator does not
/// understand (a function call, a column missing from the row, a cast that
/// fails) is *unknown*. Callers keep a file whose predicate is unknown.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use sqlprune::evaluator::PartitionEvaluator;
/// use sqlprune::expr::builder::{equal, reference, varchar};
/// use sqlprune::value::Value;
///
/// let mut row = HashMap::new();
/// row.insert("p".to_string(), Value::String("50".to_string()));
///
/// let evaluator = PartitionEvaluator::new(&row);
/// assert_eq!(evaluator.evaluate(&equal(reference(&["p"]), varchar("50"))), Some(true));
/// assert_eq!(evaluator.evaluate(&equal(reference(&["p"]), varchar("51"))), Some(false));
/// assert_eq!(evaluator.evaluate(&equal(reference(&["c1"]), varchar("51"))), None);
/// ```
pub struct PartitionEvaluator<'a> {
    /// Typed partition values of the file, by column name
    row: &'a HashMap<String, Value>,
}

impl<'a> PartitionEvaluator<'a> {
    pub fn new(row: &'a HashMap<String, Value>) -> Self {
        PartitionEvaluator { row }
    }

    /// `Some(true)`/`Some(false)` when the predicate has a definite result
    /// (NULL counts as false), `None` when it is unknown.
    pub fn evaluate(&self, predicate: &Node) -> Option<bool> {
        match self.eval(predicate) {
            Some(Value::Boolean(b)) => Some(b),
            Some(Value::Null) => Some(false),
            Some(other) => {
                tracing::trace!(value = %other, "predicate evaluated to a non-boolean");
                None
            }
            None => None,
        }
    }

    /// Evaluates any expression node. `None` means unknown, `Some(Value::Null)`
    /// is SQL NULL.
    pub fn eval(&self, node: &Node) -> Option<Value> {
        match node.kind() {
            Kind::Constant => Value::from_constant(node).ok(),
            Kind::ColumnRef => self.eval_reference(node),
            Kind::Cast => self.eval_cast(node),
            Kind::Comparison(op) => self.eval_comparison(op, node),
            Kind::Conjunction(op) => self.eval_conjunction(op, node),
            Kind::Case => self.eval_case(node),
            _ if node.class() == Some(OPERATOR_CLASS) => self.eval_operator(node),
            _ => None,
        }
    }

    fn eval_reference(&self, node: &Node) -> Option<Value> {
        match column_names(node).ok()?.as_slice() {
            [name] => self.row.get(name).cloned(),
            _ => None,
        }
    }

    fn eval_cast(&self, node: &Node) -> Option<Value> {
        let value = self.eval(node.get("child")?)?;
        let target = DataType::from_type_node(node.get("cast_type")?).ok()?;
        value.cast(&target).ok()
    }

    fn eval_comparison(&self, op: CompareOp, node: &Node) -> Option<Value> {
        let left = self.eval(node.get("left")?)?;
        let right = self.eval(node.get("right")?)?;
        if left.is_null() || right.is_null() {
            return Some(Value::Null);
        }
        // untyped string literals take the type of the other side
        let left_typed = left.coerce_like(&right)?;
        let right_typed = right.coerce_like(&left)?;
        let ordering = left_typed.compare(&right_typed)?;
        let result = match op {
            CompareOp::Equal => ordering.is_eq(),
            CompareOp::NotEqual => ordering.is_ne(),
            CompareOp::LessThan => ordering.is_lt(),
            CompareOp::GreaterThan => ordering.is_gt(),
            CompareOp::LessThanOrEqual => ordering.is_le(),
            CompareOp::GreaterThanOrEqual => ordering.is_ge(),
        };
        Some(Value::Boolean(result))
    }

    fn eval_conjunction(&self, op: ConjunctionOp, node: &Node) -> Option<Value> {
        // `dominant` short-circuits: false for AND, true for OR
        let dominant = op == ConjunctionOp::Or;
        let mut unknown = false;
        let mut null = false;
        for child in node.get("children").and_then(Node::as_array).unwrap_or(&[]) {
            match self.eval(child) {
                Some(Value::Boolean(b)) if b == dominant => return Some(Value::Boolean(dominant)),
                Some(Value::Boolean(_)) => {}
                Some(Value::Null) => null = true,
                _ => unknown = true,
            }
        }
        if unknown {
            None
        } else if null {
            Some(Value::Null)
        } else {
            Some(Value::Boolean(!dominant))
        }
    }

    fn eval_case(&self, node: &Node) -> Option<Value> {
        for check in node.get("case_checks")?.as_array()? {
            match self.eval(check.get("when_expr")?)? {
                Value::Boolean(true) => return self.eval(check.get("then_expr")?),
                Value::Boolean(false) | Value::Null => {}
                _ => return None,
            }
        }
        match node.get_present("else_expr") {
            Some(otherwise) => self.eval(otherwise),
            None => Some(Value::Null),
        }
    }

    fn eval_operator(&self, node: &Node) -> Option<Value> {
        let operand = match node.get("children")?.as_array()? {
            [operand] => self.eval(operand)?,
            _ => return None,
        };
        match node.node_type()? {
            OPERATOR_TYPE_IS_NULL => Some(Value::Boolean(operand.is_null())),
            OPERATOR_TYPE_IS_NOT_NULL => Some(Value::Boolean(!operand.is_null())),
            OPERATOR_TYPE_NOT => match operand {
                Value::Boolean(b) => Some(Value::Boolean(!b)),
                Value::Null => Some(Value::Null),
                _ => None,
            },
            _ => None,
        }
    }
}
