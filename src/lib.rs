pub mod cli;
pub mod delta;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod fingerprint;
pub mod hive;
pub mod listing;
pub mod matcher;
pub mod node;
pub mod output;
pub mod planner;
pub mod statement;
pub mod stats;
pub mod transform;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use evaluator::PartitionEvaluator;
pub use expr::{CompareOp, ConjunctionOp, Kind};
pub use fingerprint::{canonicalize, fingerprint};
pub use listing::{FileLister, FileStatus, ListedFile, LocalFileLister};
pub use node::{Fields, Node};
pub use output::{to_canonical_json, to_json, to_json_pretty};
pub use planner::{plan_splits, SplitPlanner};
pub use transform::{find, transform, try_transform};
pub use types::{DataType, PartitionColumn};
pub use value::Value;
