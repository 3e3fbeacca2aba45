//! Public and internal types for the dmaudit API and pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::engine::classify::BucketSet;
use crate::report::SortKey;
use crate::utils::config::{DEFAULT_LEVEL, DispatchLimits, PackagePaths};

/// Relative path used for the audit root itself.
pub const ROOT_REL_PATH: &str = ".";

/// Aggregated state of one directory and everything below it.
///
/// Counters always cover every descendant; `children` only holds the subdirectories that were
/// retained by the reporting cutoff. Counters change only through the merge operations in
/// [`crate::engine::merge`] and file accounting during a walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectorySummary {
    /// Path relative to the audit root, `/`-separated. The root is `"."`.
    pub rel_path: String,
    /// Distance from the audit root (root = 0).
    pub depth: usize,
    /// Bytes in this directory and all descendants.
    pub total_size: u64,
    /// Bytes per classification bucket. Every node of one tree carries the same keys.
    pub classified: BTreeMap<String, u64>,
    /// Non-directory entries in this directory and all descendants.
    pub file_count: u64,
    /// Newest modification time (epoch seconds) of any descendant file; 0 when none.
    pub last_modified: i64,
    pub children: Vec<DirectorySummary>,
}

impl DirectorySummary {
    /// Zero-valued summary carrying one zeroed counter per bucket name.
    pub fn new<'a, I>(rel_path: impl Into<String>, depth: usize, bucket_names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            rel_path: rel_path.into(),
            depth,
            total_size: 0,
            classified: bucket_names
                .into_iter()
                .map(|name| (name.to_string(), 0))
                .collect(),
            file_count: 0,
            last_modified: 0,
            children: Vec::new(),
        }
    }

    /// Bytes in `bucket`, or 0 if the tree does not track it.
    pub fn classified_size(&self, bucket: &str) -> u64 {
        self.classified.get(bucket).copied().unwrap_or(0)
    }

    /// Last path component, or `"."` for the root.
    pub fn name(&self) -> &str {
        self.rel_path.rsplit('/').next().unwrap_or(&self.rel_path)
    }

    /// Resolve this node's relative path against `base` (e.g. where a loaded snapshot was taken).
    pub fn absolute_path(&self, base: &Path) -> PathBuf {
        if self.rel_path == ROOT_REL_PATH {
            base.to_path_buf()
        } else {
            base.join(&self.rel_path)
        }
    }

    /// Number of nodes in the retained tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DirectorySummary::node_count)
            .sum::<usize>()
    }

    /// Find a retained descendant (or self) by relative path.
    pub fn find(&self, rel_path: &str) -> Option<&DirectorySummary> {
        if self.rel_path == rel_path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(rel_path))
    }
}

/// Lib-only options for [`audit_dir`](crate::audit_dir).
#[derive(Clone, Debug)]
pub struct AuditOpts {
    /// Deepest level whose children are still retained in the tree (root = 0).
    pub level: usize,
    /// Classify file content into buckets (reads the head of every file; slower).
    pub classify: bool,
    /// Worker count for a parallel audit. `None` walks sequentially.
    pub workers: Option<usize>,
    /// Classification buckets. Counters for these exist on every node even when `classify` is off.
    pub buckets: BucketSet,
}

impl Default for AuditOpts {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            classify: false,
            workers: None,
            buckets: BucketSet::default(),
        }
    }
}

impl From<&Opts> for AuditOpts {
    fn from(o: &Opts) -> Self {
        AuditOpts {
            level: o.level,
            classify: o.check_mimetype,
            workers: o.parallel.then_some(o.workers),
            buckets: o.buckets.clone(),
        }
    }
}

/// Full options (CLI). Use [`AuditOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Number of levels of nesting to report.
    pub level: usize,
    pub sort_by: SortKey,
    pub reverse: bool,
    /// Report per-bucket content stats (reads file headers; slower).
    pub check_mimetype: bool,
    /// Split the audit across a worker pool, one unit per top-level subdirectory.
    pub parallel: bool,
    /// Pool size when `parallel` is set.
    pub workers: usize,
    /// Where the JSON snapshot is written. `None` skips persisting.
    pub output: Option<PathBuf>,
    /// Debug logging, per-diagnostic listing and a progress bar for parallel runs.
    pub verbose: bool,
    pub buckets: BucketSet,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            sort_by: SortKey::default(),
            reverse: false,
            check_mimetype: false,
            parallel: false,
            workers: DispatchLimits::DEFAULT_WORKERS,
            output: Some(PathBuf::from(PackagePaths::get().output_filename())),
            verbose: false,
            buckets: BucketSet::default(),
        }
    }
}
