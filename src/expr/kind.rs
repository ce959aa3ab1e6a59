use crate::expr::vocabulary::*;
use crate::node::Node;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equal (`=`)
    Equal,
    /// Not equal (`<>`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessThanOrEqual,
    /// Greater than or equal (`>=`)
    GreaterThanOrEqual,
}

impl CompareOp {
    pub fn from_type(ty: &str) -> Option<Self> {
        match ty {
            COMPARE_TYPE_EQUAL => Some(CompareOp::Equal),
            COMPARE_TYPE_NOT_EQUAL => Some(CompareOp::NotEqual),
            COMPARE_TYPE_LESSTHAN => Some(CompareOp::LessThan),
            COMPARE_TYPE_GREATERTHAN => Some(CompareOp::GreaterThan),
            COMPARE_TYPE_LESSTHANOREQUALTO => Some(CompareOp::LessThanOrEqual),
            COMPARE_TYPE_GREATERTHANOREQUALTO => Some(CompareOp::GreaterThanOrEqual),
            _ => None,
        }
    }

    /// The serialized `type` discriminator.
    pub fn as_type(self) -> &'static str {
        match self {
            CompareOp::Equal => COMPARE_TYPE_EQUAL,
            CompareOp::NotEqual => COMPARE_TYPE_NOT_EQUAL,
            CompareOp::LessThan => COMPARE_TYPE_LESSTHAN,
            CompareOp::GreaterThan => COMPARE_TYPE_GREATERTHAN,
            CompareOp::LessThanOrEqual => COMPARE_TYPE_LESSTHANOREQUALTO,
            CompareOp::GreaterThanOrEqual => COMPARE_TYPE_GREATERTHANOREQUALTO,
        }
    }

    /// The operator that gives the same result with its operands swapped
    /// (`10 > a` is `a < 10`).
    pub fn mirror(self) -> Self {
        match self {
            CompareOp::LessThan => CompareOp::GreaterThan,
            CompareOp::GreaterThan => CompareOp::LessThan,
            CompareOp::LessThanOrEqual => CompareOp::GreaterThanOrEqual,
            CompareOp::GreaterThanOrEqual => CompareOp::LessThanOrEqual,
            op => op,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "<>",
            CompareOp::LessThan => "<",
            CompareOp::GreaterThan => ">",
            CompareOp::LessThanOrEqual => "<=",
            CompareOp::GreaterThanOrEqual => ">=",
        }
    }
}

/// Conjunction operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConjunctionOp {
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

impl ConjunctionOp {
    pub fn from_type(ty: &str) -> Option<Self> {
        match ty {
            CONJUNCTION_TYPE_AND => Some(ConjunctionOp::And),
            CONJUNCTION_TYPE_OR => Some(ConjunctionOp::Or),
            _ => None,
        }
    }

    pub fn as_type(self) -> &'static str {
        match self {
            ConjunctionOp::And => CONJUNCTION_TYPE_AND,
            ConjunctionOp::Or => CONJUNCTION_TYPE_OR,
        }
    }
}

/// Semantic kind of a node, read from its discriminator pair.
///
/// Anything the rewriter has no rule for is `Opaque`; opaque nodes are
/// still traversed through their child fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// `CONSTANT`/`VALUE_CONSTANT`
    Constant,
    /// `COLUMN_REF`/`COLUMN_REF`
    ColumnRef,
    /// `COMPARISON` with a recognized comparison type
    Comparison(CompareOp),
    /// `CONJUNCTION` with AND/OR
    Conjunction(ConjunctionOp),
    /// `CAST`/`OPERATOR_CAST`
    Cast,
    /// `CASE`/`CASE_EXPR`
    Case,
    /// `FUNCTION`/`FUNCTION`
    Function,
    /// `SUBQUERY`/`SUBQUERY`
    Subquery,
    /// A `SELECT_NODE` statement body (it has a `type` but no `class`)
    Select,
    /// Everything else
    Opaque,
}

impl Kind {
    pub fn of(node: &Node) -> Kind {
        let ty = match node.node_type() {
            Some(ty) => ty,
            None => return Kind::Opaque,
        };
        match node.class() {
            Some(CONSTANT_CLASS) if ty == CONSTANT_TYPE => Kind::Constant,
            Some(COLUMN_REF_CLASS) if ty == COLUMN_REF_TYPE => Kind::ColumnRef,
            Some(COMPARISON_CLASS) => CompareOp::from_type(ty)
                .map(Kind::Comparison)
                .unwrap_or(Kind::Opaque),
            Some(CONJUNCTION_CLASS) => ConjunctionOp::from_type(ty)
                .map(Kind::Conjunction)
                .unwrap_or(Kind::Opaque),
            Some(CAST_CLASS) if ty == CAST_TYPE_OPERATOR => Kind::Cast,
            Some(CASE_CLASS) if ty == CASE_TYPE_EXPR => Kind::Case,
            Some(FUNCTION_CLASS) if ty == FUNCTION_TYPE => Kind::Function,
            Some(SUBQUERY_CLASS) if ty == SUBQUERY_TYPE => Kind::Subquery,
            None if ty == SELECT_NODE_TYPE => Kind::Select,
            _ => Kind::Opaque,
        }
    }
}

impl Node {
    /// Shorthand for [`Kind::of`].
    pub fn kind(&self) -> Kind {
        Kind::of(self)
    }
}
