//! dmaudit: directory tree audit engine. Aggregates size, file count, last write time and
//! content-type buckets per directory, sequentially or on a worker pool.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::AuditError;
pub use pipeline::{Diagnostic, DiagnosticKind, Diagnostics};

use log::debug;
use std::path::Path;

use crate::engine::classify::BucketSet;
use crate::pipeline::BuildContext;

/// Result alias used by the top-level dmaudit API
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// A finished audit: the tree plus every non-fatal problem met along the way.
#[derive(Clone, Debug)]
pub struct Audit {
    pub tree: DirectorySummary,
    pub diagnostics: Diagnostics,
}

/// Single entry point: audit `root` with `opts`.
///
/// `opts.workers: None` walks sequentially; `Some(n)` dispatches one unit per top-level
/// subdirectory onto a pool of `n` workers. Per-entry failures never fail the call; they are
/// returned in [`Audit::diagnostics`]. Fails when `root` is not a directory or the pool cannot
/// start.
pub fn audit_dir(root: &Path, opts: &AuditOpts) -> Result<Audit> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    let (tree, diagnostics) = pipeline::run_audit(root, opts, None)?;
    Ok(Audit { tree, diagnostics })
}

/// Walk `path`, which sits `current_depth` levels below `root`, with the default buckets.
/// Children are retained for nodes shallower than `cutoff`.
pub fn build(
    path: &Path,
    root: &Path,
    cutoff: usize,
    current_depth: usize,
    classify: bool,
) -> (DirectorySummary, Diagnostics) {
    let ctx = BuildContext::new(root, cutoff, BucketSet::default()).classify(classify);
    let mut diagnostics = Diagnostics::default();
    let tree = pipeline::build_tree(path, &ctx, current_depth, &mut diagnostics);
    (tree, diagnostics)
}

/// Parallel counterpart of [`build`] for the whole of `root`, using `workers` threads.
pub fn build_parallel(
    root: &Path,
    cutoff: usize,
    classify: bool,
    workers: usize,
) -> std::result::Result<(DirectorySummary, Diagnostics), AuditError> {
    let ctx = BuildContext::new(root, cutoff, BucketSet::default()).classify(classify);
    engine::parallel::build_parallel(&ctx, workers, None)
}
