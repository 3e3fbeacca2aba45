use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::engine::parallel::{DispatchEvent, build_parallel};
use crate::engine::tools::canonicalize_root;
use crate::pipeline::{BuildContext, Diagnostics, build_tree};
use crate::utils::config::DispatchLimits;
use crate::{AuditOpts, DirectorySummary};

/// Canonicalize `root`, build the walk context from `opts` and run a sequential or parallel audit.
/// `on_event` only fires for parallel runs.
pub fn run_audit(
    root: &Path,
    opts: &AuditOpts,
    on_event: Option<&dyn Fn(DispatchEvent<'_>)>,
) -> Result<(DirectorySummary, Diagnostics)> {
    let root = canonicalize_root(root)?;
    let ctx = BuildContext::new(&root, opts.level, opts.buckets.clone()).classify(opts.classify);
    debug!("Auditing {} ({:?})", root.display(), ctx);

    let (tree, diagnostics) = match opts.workers {
        Some(requested) => {
            let limits = DispatchLimits::current();
            let workers = requested.max(limits.floor);
            debug!(
                "Parallel audit: {} workers requested, {} threads available",
                workers, limits.all_threads
            );
            build_parallel(&ctx, workers, on_event)?
        }
        None => {
            let mut diagnostics = Diagnostics::default();
            let tree = build_tree(&root, &ctx, 0, &mut diagnostics);
            (tree, diagnostics)
        }
    };

    debug!(
        "Audit finished: {} bytes, {} files, {} retained nodes, {} diagnostics",
        tree.total_size,
        tree.file_count,
        tree.node_count(),
        diagnostics.len()
    );
    Ok((tree, diagnostics))
}
