//! Split planning: choose the files a query reads and group them into
//! size-bounded units of parallel work.

use crate::delta::{DeltaPartitionPruning, DeltaScan};
use crate::error::{Error, Result};
use crate::expr::builder::{function, varchar};
use crate::hive::HivePartitionPruning;
use crate::listing::{FileLister, FileStatus};
use crate::node::Node;
use crate::statement::{first_statement_node, from_table, hive_types, table_function, table_path, with_from_table};

/// Packs files into splits in the order given.
///
/// Files are added to the current split until its total size exceeds
/// `max_split_size`; the file that crosses the limit stays in the split it
/// overflowed. A single file larger than the limit therefore forms a split
/// of its own.
///
/// # Examples
///
/// ```
/// use sqlprune::listing::FileStatus;
/// use sqlprune::planner::pack_splits;
///
/// let files: Vec<_> = [30, 40, 50, 10, 5]
///     .iter()
///     .enumerate()
///     .map(|(i, size)| FileStatus::new(&format!("f{i}"), *size, i as i64))
///     .collect();
///
/// let sizes: Vec<Vec<u64>> = pack_splits(files, 60)
///     .iter()
///     .map(|split| split.iter().map(|f| f.size).collect())
///     .collect();
/// assert_eq!(sizes, vec![vec![30, 40], vec![50, 10, 5]]);
/// ```
pub fn pack_splits(files: Vec<FileStatus>, max_split_size: u64) -> Vec<Vec<FileStatus>> {
    let mut splits = Vec::new();
    let mut current = Vec::new();
    let mut current_size: u64 = 0;
    for file in files {
        current_size = current_size.saturating_add(file.size);
        current.push(file);
        if current_size > max_split_size {
            tracing::trace!(files = current.len(), bytes = current_size, "closing split");
            splits.push(std::mem::take(&mut current));
            current_size = 0;
        }
    }
    if !current.is_empty() {
        splits.push(current);
    }
    splits
}

/// Sorts files by modification time (stable) and packs them with [`pack_splits`].
pub fn plan_splits(mut files: Vec<FileStatus>, max_split_size: u64) -> Vec<Vec<FileStatus>> {
    files.sort_by_key(|file| file.last_modified);
    pack_splits(files, max_split_size)
}

/// Plans splits for a query, pruning with the collaborator that matches
/// its table function.
pub struct SplitPlanner<'a> {
    lister: &'a dyn FileLister,
    scan: &'a dyn DeltaScan,
}

impl<'a> SplitPlanner<'a> {
    pub fn new(lister: &'a dyn FileLister, scan: &'a dyn DeltaScan) -> Self {
        SplitPlanner { lister, scan }
    }

    /// The files the first statement of `tree` reads, in splits of at most
    /// roughly `max_split_size` bytes.
    ///
    /// `read_parquet` tables are pruned Hive-style using the partition
    /// columns declared with `hive_types`; `read_delta` tables are pruned
    /// through the Delta log. Any other source is rejected.
    pub fn splits(&self, tree: &Node, max_split_size: u64) -> Result<Vec<Vec<FileStatus>>> {
        let statement = first_statement_node(tree)?;
        let function = table_function(statement).ok_or_else(|| {
            Error::UnsupportedShape("split planning needs a table function in the FROM clause".to_string())
        })?;
        let path = table_path(statement)
            .ok_or_else(|| Error::MalformedTree(format!("{} has no path argument", function)))?;

        let files = match function.as_str() {
            "read_parquet" => {
                let partitions = hive_types(statement)?;
                HivePartitionPruning::new(self.lister).prune_statement(&path, statement, &partitions)?
            }
            "read_delta" => DeltaPartitionPruning::new(self.scan).prune_statement(&path, statement)?,
            other => {
                return Err(Error::UnsupportedShape(format!(
                    "cannot plan splits for table function {}",
                    other
                )));
            }
        };

        let splits = plan_splits(files, max_split_size);
        tracing::info!(%path, splits = splits.len(), max_split_size, "planned splits");
        Ok(splits)
    }
}

/// Points the FROM clause of a select node at an explicit list of files:
/// `FROM read_parquet(list_value('a', 'b', ...))`.
///
/// `read_delta` becomes `read_parquet`; other table functions keep their name.
/// Any other argument of the original call is dropped.
pub fn replace_path_in_from_clause<S: AsRef<str>>(statement: &Node, paths: &[S]) -> Result<Node> {
    let from = from_table(statement)
        .ok_or_else(|| Error::MalformedTree(format!("{} has no FROM clause", statement.describe())))?;
    let name = match table_function(statement) {
        Some(name) if name == "read_delta" => "read_parquet".to_string(),
        Some(name) => name,
        None => {
            return Err(Error::UnsupportedShape(
                "the FROM clause is not a table function".to_string(),
            ));
        }
    };

    let list = function(
        "list_value",
        "main",
        "",
        paths.iter().map(|path| varchar(path.as_ref())).collect(),
    );
    let call = function(&name, "", "", vec![list]);
    with_from_table(statement, from.with_field("function", call)?)
}

