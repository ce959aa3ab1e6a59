//! Discriminator strings of the external front end's tree serialization.
//!
//! These are matched against, never invented: every value here is what the
//! serializer writes into a node's `class` or `type` field.

pub const CONSTANT_CLASS: &str = "CONSTANT";
pub const CONSTANT_TYPE: &str = "VALUE_CONSTANT";

pub const COLUMN_REF_CLASS: &str = "COLUMN_REF";
pub const COLUMN_REF_TYPE: &str = "COLUMN_REF";

pub const COMPARISON_CLASS: &str = "COMPARISON";
pub const COMPARE_TYPE_EQUAL: &str = "COMPARE_EQUAL";
pub const COMPARE_TYPE_NOT_EQUAL: &str = "COMPARE_NOTEQUAL";
pub const COMPARE_TYPE_LESSTHAN: &str = "COMPARE_LESSTHAN";
pub const COMPARE_TYPE_GREATERTHAN: &str = "COMPARE_GREATERTHAN";
pub const COMPARE_TYPE_LESSTHANOREQUALTO: &str = "COMPARE_LESSTHANOREQUALTO";
pub const COMPARE_TYPE_GREATERTHANOREQUALTO: &str = "COMPARE_GREATERTHANOREQUALTO";

pub const CONJUNCTION_CLASS: &str = "CONJUNCTION";
pub const CONJUNCTION_TYPE_AND: &str = "CONJUNCTION_AND";
pub const CONJUNCTION_TYPE_OR: &str = "CONJUNCTION_OR";

pub const CAST_CLASS: &str = "CAST";
pub const CAST_TYPE_OPERATOR: &str = "OPERATOR_CAST";

pub const CASE_CLASS: &str = "CASE";
pub const CASE_TYPE_EXPR: &str = "CASE_EXPR";

pub const OPERATOR_CLASS: &str = "OPERATOR";
pub const OPERATOR_TYPE_IS_NULL: &str = "OPERATOR_IS_NULL";
pub const OPERATOR_TYPE_IS_NOT_NULL: &str = "OPERATOR_IS_NOT_NULL";
pub const OPERATOR_TYPE_NOT: &str = "OPERATOR_NOT";

pub const FUNCTION_CLASS: &str = "FUNCTION";
pub const FUNCTION_TYPE: &str = "FUNCTION";

pub const SUBQUERY_CLASS: &str = "SUBQUERY";
pub const SUBQUERY_TYPE: &str = "SUBQUERY";

pub const SELECT_NODE_TYPE: &str = "SELECT_NODE";

pub const BASE_TABLE_TYPE: &str = "BASE_TABLE";
pub const TABLE_FUNCTION_TYPE: &str = "TABLE_FUNCTION";
