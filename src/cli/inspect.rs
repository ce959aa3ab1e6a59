//! Commands that inspect a tree without pruning it

use super::{read_tree, CliError, CommandResult};
use crate::fingerprint::{canonicalize, fingerprint};
use crate::statement::statements;
use crate::types::infer_schema;

/// Options for the fingerprint, canonicalize and schema commands
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Serialized parse result
    pub input: Option<String>,
}

/// `{"fingerprint": "<sha-256 hex>"}`
pub fn execute_fingerprint(options: &InspectOptions) -> Result<CommandResult, CliError> {
    let tree = read_tree(options.input.as_ref())?;
    let digest = fingerprint(&tree)?;
    Ok(CommandResult::Json(serde_json::json!({ "fingerprint": digest })))
}

/// The tree with its literals replaced by placeholders
pub fn execute_canonicalize(options: &InspectOptions) -> Result<CommandResult, CliError> {
    let tree = read_tree(options.input.as_ref())?;
    crate::statement::ensure_parsed(&tree)?;
    Ok(CommandResult::Tree(canonicalize(&tree)?))
}

/// One inferred schema per statement: `{"schemas": ["STRUCT(...)", ...]}`
pub fn execute_schema(options: &InspectOptions) -> Result<CommandResult, CliError> {
    let tree = read_tree(options.input.as_ref())?;
    let schemas = statements(&tree)?
        .into_iter()
        .map(|statement| infer_schema(statement).map(|schema| schema.to_sql()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CommandResult::Json(serde_json::json!({ "schemas": schemas })))
}
