//! Rewrite a query for partition pruning

use std::collections::HashSet;

use super::{read_tree, CliError, CommandResult};
use crate::hive::remove_non_partition_predicates_in_query;
use crate::stats::{replace_min_max_in_tree, StatsConfig, StatsMapping};
use crate::types::PartitionColumn;

/// Options for the prune-hive command
#[derive(Debug, Clone, Default)]
pub struct PruneHiveOptions {
    /// Serialized parse result
    pub input: Option<String>,
    /// Partition columns as `name` or `name:TYPE`
    pub partitions: Vec<String>,
}

/// Options for the prune-stats command
#[derive(Debug, Clone, Default)]
pub struct PruneStatsOptions {
    /// Serialized parse result
    pub input: Option<String>,
    /// Contents of a [`StatsConfig`] JSON file
    pub config: Option<String>,
    /// Columns as `name:TYPE`, mapped to `min_<name>`/`max_<name>`
    pub columns: Vec<String>,
    /// Statistics table; overrides the one in the config
    pub stats_table: Option<String>,
}

const DEFAULT_STATS_TABLE: &str = "stats";

/// Removes predicates on non-partition columns from every SELECT.
pub fn execute_prune_hive(options: &PruneHiveOptions) -> Result<CommandResult, CliError> {
    if options.partitions.is_empty() {
        return Err(CliError::InvalidArgument(
            "at least one --partition is required".to_string(),
        ));
    }
    let names = options
        .partitions
        .iter()
        .map(|spec| PartitionColumn::parse(spec).map(|column| column.name))
        .collect::<Result<HashSet<_>, _>>()?;

    let tree = read_tree(options.input.as_ref())?;
    crate::statement::ensure_parsed(&tree)?;
    Ok(CommandResult::Tree(remove_non_partition_predicates_in_query(&tree, &names)?))
}

/// Rewrites every SELECT into a query over the statistics table.
pub fn execute_prune_stats(options: &PruneStatsOptions) -> Result<CommandResult, CliError> {
    let mapping = stats_mapping(options)?;
    let tree = read_tree(options.input.as_ref())?;
    crate::statement::ensure_parsed(&tree)?;
    Ok(CommandResult::Tree(replace_min_max_in_tree(&tree, &mapping)?))
}

fn stats_mapping(options: &PruneStatsOptions) -> Result<StatsMapping, CliError> {
    match (&options.config, options.columns.is_empty()) {
        (Some(config), true) => {
            let mut config: StatsConfig = serde_json::from_str(config)?;
            if let Some(table) = &options.stats_table {
                config.stats_table = table.clone();
            }
            Ok(config.into_mapping()?)
        }
        (None, false) => {
            let columns = options
                .columns
                .iter()
                .map(|spec| PartitionColumn::parse(spec))
                .collect::<Result<Vec<_>, _>>()?;
            let table = options.stats_table.as_deref().unwrap_or(DEFAULT_STATS_TABLE);
            Ok(StatsMapping::with_default_names(table, &columns))
        }
        (Some(_), false) => Err(CliError::InvalidArgument(
            "use either --config or --column, not both".to_string(),
        )),
        (None, true) => Err(CliError::InvalidArgument(
            "either --config or at least one --column is required".to_string(),
        )),
    }
}
