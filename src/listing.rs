//! Data files and the collaborators that list them.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A data file selected for reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Milliseconds since the Unix epoch
    pub last_modified: i64,
}

impl FileStatus {
    pub fn new(path: &str, size: u64, last_modified: i64) -> Self {
        FileStatus {
            path: path.to_string(),
            size,
            last_modified,
        }
    }
}

/// A listed file together with the raw (still escaped) values of its
/// partition directories, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedFile {
    pub status: FileStatus,
    pub partitions: Vec<String>,
}

/// Lists the data files under a Hive-partitioned directory.
pub trait FileLister {
    /// Files exactly `partition_depth` directories below `base_path`.
    fn list(&self, base_path: &str, partition_depth: usize) -> Result<Vec<ListedFile>>;
}

/// Lists files on the local file system.
#[derive(Debug, Clone)]
pub struct LocalFileLister {
    /// Only files with this extension are listed
    extension: String,
}

impl LocalFileLister {
    pub fn new(extension: &str) -> Self {
        LocalFileLister {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }
}

impl Default for LocalFileLister {
    fn default() -> Self {
        LocalFileLister::new("parquet")
    }
}

impl FileLister for LocalFileLister {
    fn list(&self, base_path: &str, partition_depth: usize) -> Result<Vec<ListedFile>> {
        let mut files = Vec::new();
        self.walk(Path::new(base_path), base_path, partition_depth, &mut files)?;
        files.sort_by(|a, b| a.status.path.cmp(&b.status.path));
        tracing::debug!(base_path, partition_depth, files = files.len(), "listed files");
        Ok(files)
    }
}

impl LocalFileLister {
    fn walk(&self, dir: &Path, base_path: &str, remaining: usize, files: &mut Vec<ListedFile>) -> Result<()> {
        for entry in read_dir(dir)? {
            let metadata = entry.metadata().map_err(|e| listing_error(&entry, e))?;
            if metadata.is_dir() {
                if remaining > 0 {
                    self.walk(&entry, base_path, remaining - 1, files)?;
                }
                continue;
            }
            if remaining > 0 || entry.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let path = entry.to_string_lossy().to_string();
            let last_modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
                .unwrap_or(0);
            let depth = partition_depth_of(base_path, &path);
            files.push(ListedFile {
                partitions: extract_partition_segments(base_path, &path, depth)?,
                status: FileStatus::new(&path, metadata.len(), last_modified),
            });
        }
        Ok(())
    }
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| listing_error(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry.map_err(|e| listing_error(dir, e))?.path());
    }
    Ok(paths)
}

fn listing_error(path: &Path, e: std::io::Error) -> Error {
    Error::Listing {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    }
}

fn relative_segments<'a>(base_path: &str, path: &'a str) -> Vec<&'a str> {
    let base = base_path.trim_end_matches('/');
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative.split('/').filter(|s| !s.is_empty()).collect()
}

fn partition_depth_of(base_path: &str, path: &str) -> usize {
    relative_segments(base_path, path).len().saturating_sub(1)
}

/// The raw values of the first `depth` `key=value` directories of `path`
/// below `base_path`.
///
/// # Examples
///
/// ```
/// use sqlprune::listing::extract_partition_segments;
///
/// let segments = extract_partition_segments(
///     "/data/t",
///     "/data/t/dt=2024-01-01/p=100%25/part-0.parquet",
///     2,
/// )
/// .unwrap();
/// assert_eq!(segments, vec!["2024-01-01", "100%25"]);
/// ```
pub fn extract_partition_segments(base_path: &str, path: &str, depth: usize) -> Result<Vec<String>> {
    let segments = relative_segments(base_path, path);
    let directories = &segments[..segments.len().saturating_sub(1)];
    if directories.len() < depth {
        return Err(Error::Listing {
            path: path.to_string(),
            message: format!("expected {} partition directories, found {}", depth, directories.len()),
        });
    }
    directories[..depth]
        .iter()
        .map(|directory| {
            directory
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(_, value)| value.to_string())
                .ok_or_else(|| Error::Listing {
                    path: path.to_string(),
                    message: format!("directory '{}' is not a key=value partition", directory),
                })
        })
        .collect()
}
