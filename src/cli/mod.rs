//! CLI support for sqlprune
//!
//! Provides programmatic access to the `sqlprune` commands so they can be
//! embedded in other tools. Every command takes serialized parse results
//! (the JSON the SQL front end produces) and answers with JSON.

mod convert;
mod inspect;
mod plan;
mod prune;

pub use convert::{json_to_node, node_to_json, parse_tree};
pub use inspect::{execute_canonicalize, execute_fingerprint, execute_schema, InspectOptions};
pub use plan::{execute_splits, SplitsOptions};
pub use prune::{execute_prune_hive, execute_prune_stats, PruneHiveOptions, PruneStatsOptions};

use std::io;

use crate::Node;

/// Result of a CLI command
#[derive(Debug)]
pub enum CommandResult {
    /// A rewritten tree, printed with the tree printer
    Tree(Node),
    /// Any other JSON answer
    Json(serde_json::Value),
}

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Rewrite or pruning error
    Prune(crate::Error),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// A command line value that could not be used
    InvalidArgument(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Prune(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No input provided. Use --input or pipe JSON to stdin."),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Prune(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        CliError::Prune(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Parses the required tree input of a command.
fn read_tree(input: Option<&String>) -> Result<Node, CliError> {
    let text = input.ok_or(CliError::NoInput)?;
    Ok(parse_tree(text)?)
}
