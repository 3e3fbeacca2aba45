//! Engine module: classification, merging, parallel dispatch, snapshots and the CLI.

pub mod arg_parser;
pub mod classify;
pub mod cli;
pub mod merge;
pub mod parallel;
pub mod progress;
pub mod snapshot;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands};
pub use classify::{BucketRule, BucketSet, ContentClassifier, MagicClassifier};
pub use cli::handle_run;
pub use merge::merge_trees;
pub use parallel::{DispatchEvent, build_parallel};
pub use snapshot::{from_json, load, save, to_json};
pub use tools::path_relative_to;
