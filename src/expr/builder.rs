//! Constructors for synthetic expression nodes.
//!
//! Rewrites never patch a node in place; they build a replacement with these
//! functions. Every object produced here carries `class`, `type`, an empty
//! `alias` and `query_location` 0, so the external printer accepts it like a
//! parsed node.
//!
//! # Examples
//!
//! ```
//! use sqlprune::expr::builder::{equal, reference, varchar};
//! use sqlprune::expr::Kind;
//!
//! let predicate = equal(reference(&["p"]), varchar("50"));
//! assert!(matches!(predicate.kind(), Kind::Comparison(_)));
//! ```

use crate::error::{Error, Result};
use crate::expr::kind::{CompareOp, ConjunctionOp};
use crate::expr::vocabulary::*;
use crate::node::{Fields, Node};
use crate::types::DataType;

fn expression(class: &str, ty: &str) -> Fields {
    Fields::new()
        .with("class", class)
        .with("type", ty)
        .with("alias", "")
        .with("query_location", 0)
}

fn type_object(id: &str) -> Node {
    Node::object(Fields::new().with("id", id).with("type_info", Node::Null))
}

fn value_constant(type_node: Node, value: Node) -> Node {
    let is_null = value.is_null();
    let mut payload = Fields::new().with("type", type_node).with("is_null", is_null);
    if !is_null {
        payload.insert("value", value);
    }
    Node::object(expression(CONSTANT_CLASS, CONSTANT_TYPE).with("value", Node::object(payload)))
}

/// A column reference; `["c", "x"]` is the struct field `c.x`.
pub fn reference<S: AsRef<str>>(path: &[S]) -> Node {
    let names = path
        .iter()
        .map(|segment| Node::from(segment.as_ref()))
        .collect::<Vec<_>>();
    Node::object(expression(COLUMN_REF_CLASS, COLUMN_REF_TYPE).with("column_names", Node::array(names)))
}

/// A constant whose type is picked from the JSON scalar.
///
/// Strings become VARCHAR, booleans BOOLEAN, integers INTEGER (BIGINT when
/// they do not fit 32 bits), other numbers DOUBLE and null a NULL constant.
/// Arrays and objects have no literal form.
pub fn constant(value: Node) -> Result<Node> {
    let id = match &value {
        Node::Null => return Ok(null_constant()),
        Node::String(_) => "VARCHAR",
        Node::Boolean(_) => "BOOLEAN",
        Node::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => "INTEGER",
            Some(_) => "BIGINT",
            None => "DOUBLE",
        },
        other => {
            return Err(Error::UnsupportedShape(format!(
                "cannot build a constant from {}",
                other.describe()
            )));
        }
    };
    Ok(value_constant(type_object(id), value))
}

/// A VARCHAR constant.
pub fn varchar(value: &str) -> Node {
    value_constant(type_object("VARCHAR"), Node::from(value))
}

/// A constant with an explicit type; `value` is written as given.
pub fn typed_constant(value: Node, data_type: &DataType) -> Node {
    value_constant(data_type.to_type_node(), value)
}

pub fn null_constant() -> Node {
    value_constant(type_object("NULL"), Node::Null)
}

/// `CAST(child AS type_id)` for a type without type parameters.
pub fn cast(child: Node, type_id: &str) -> Node {
    cast_node(child, type_object(type_id))
}

/// `CAST(child AS data_type)`; an untyped target is rejected.
pub fn cast_as(child: Node, data_type: &DataType) -> Result<Node> {
    if *data_type == DataType::Null {
        return Err(Error::UnsupportedShape("cannot cast to an unknown type".to_string()));
    }
    Ok(cast_node(child, data_type.to_type_node()))
}

fn cast_node(child: Node, cast_type: Node) -> Node {
    Node::object(
        expression(CAST_CLASS, CAST_TYPE_OPERATOR)
            .with("child", child)
            .with("cast_type", cast_type)
            .with("try_cast", false),
    )
}

pub fn comparison(op: CompareOp, left: Node, right: Node) -> Node {
    Node::object(
        expression(COMPARISON_CLASS, op.as_type())
            .with("left", left)
            .with("right", right),
    )
}

pub fn equal(left: Node, right: Node) -> Node {
    comparison(CompareOp::Equal, left, right)
}

pub fn less_eq(left: Node, right: Node) -> Node {
    comparison(CompareOp::LessThanOrEqual, left, right)
}

pub fn greater_eq(left: Node, right: Node) -> Node {
    comparison(CompareOp::GreaterThanOrEqual, left, right)
}

/// A conjunction over any number of children.
pub fn conjunction(op: ConjunctionOp, children: Vec<Node>) -> Node {
    Node::object(expression(CONJUNCTION_CLASS, op.as_type()).with("children", Node::array(children)))
}

pub fn and2(left: Node, right: Node) -> Node {
    conjunction(ConjunctionOp::And, vec![left, right])
}

pub fn or2(left: Node, right: Node) -> Node {
    conjunction(ConjunctionOp::Or, vec![left, right])
}

/// `child IS NULL`
pub fn is_null(child: Node) -> Node {
    Node::object(expression(OPERATOR_CLASS, OPERATOR_TYPE_IS_NULL).with("children", Node::array(vec![child])))
}

/// `CASE WHEN condition THEN then ELSE otherwise END`
pub fn if_expr(condition: Node, then: Node, otherwise: Node) -> Node {
    let check = Node::object(
        Fields::new()
            .with("when_expr", condition)
            .with("then_expr", then),
    );
    Node::object(
        expression(CASE_CLASS, CASE_TYPE_EXPR)
            .with("case_checks", Node::array(vec![check]))
            .with("else_expr", otherwise),
    )
}

/// `CAST('t' AS BOOLEAN)`, the predicate that keeps everything.
pub fn true_literal() -> Node {
    cast(varchar("t"), "BOOLEAN")
}

/// `CAST('f' AS BOOLEAN)`
pub fn false_literal() -> Node {
    cast(varchar("f"), "BOOLEAN")
}

/// A `BASE_TABLE` FROM entry reading `table_name`.
pub fn base_table(table_name: &str) -> Node {
    Node::object(
        Fields::new()
            .with("type", BASE_TABLE_TYPE)
            .with("alias", "")
            .with("sample", Node::Null)
            .with("query_location", 0)
            .with("schema_name", "")
            .with("table_name", table_name)
            .with("column_name_alias", Node::array(Vec::new()))
            .with("catalog_name", ""),
    )
}

/// A plain (non-aggregate, non-operator) function call.
pub fn function(name: &str, schema: &str, catalog: &str, children: Vec<Node>) -> Node {
    let order_bys = Node::object(
        Fields::new()
            .with("type", "ORDER_MODIFIER")
            .with("orders", Node::array(Vec::new())),
    );
    Node::object(
        expression(FUNCTION_CLASS, FUNCTION_TYPE)
            .with("function_name", name)
            .with("schema", schema)
            .with("children", Node::array(children))
            .with("filter", Node::Null)
            .with("order_bys", order_bys)
            .with("distinct", false)
            .with("is_operator", false)
            .with("export_state", false)
            .with("catalog", catalog),
    )
}
