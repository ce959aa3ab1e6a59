//! Pack a file listing into splits

use super::{CliError, CommandResult};
use crate::listing::FileStatus;
use crate::planner::plan_splits;

/// Options for the splits command
#[derive(Debug, Clone, Default)]
pub struct SplitsOptions {
    /// JSON array of `{"path", "size", "last_modified"}` objects
    pub input: Option<String>,
    /// Split size threshold in bytes
    pub max_split_size: u64,
}

/// `[[file, ...], ...]` ordered by modification time
pub fn execute_splits(options: &SplitsOptions) -> Result<CommandResult, CliError> {
    if options.max_split_size == 0 {
        return Err(CliError::InvalidArgument(
            "--max-split-size must be positive".to_string(),
        ));
    }
    let text = options.input.as_ref().ok_or(CliError::NoInput)?;
    let files: Vec<FileStatus> = serde_json::from_str(text)?;
    let splits = plan_splits(files, options.max_split_size);
    Ok(CommandResult::Json(serde_json::to_value(splits)?))
}
