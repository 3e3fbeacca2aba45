//! Parallel dispatcher: split the audit root into one unit per immediate subdirectory, walk the
//! units on a fixed-size worker pool, and fold the results on the calling thread.
//!
//! Units share nothing mutable. Each returns its own summary and diagnostics through the result
//! channel, so the channel is the only synchronization point. Counter folding is order
//! independent, so totals match a sequential walk whatever order units finish in.

use crossbeam_channel::bounded;
use log::debug;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use crate::pipeline::{BuildContext, DiagnosticKind, Diagnostics, account_file, build_tree};
use crate::utils::fd_limit::workers_given_fd_limit;
use crate::{AuditError, DirectorySummary};

/// Coordinator-side progress of a parallel audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchEvent<'a> {
    /// Units were enumerated and are about to be submitted.
    Planned { units: usize },
    /// One unit was folded into the root.
    UnitDone { rel_path: &'a str },
}

/// What a worker sends back for one unit.
struct UnitResult {
    path: PathBuf,
    outcome: std::thread::Result<(DirectorySummary, Diagnostics)>,
}

/// Audit `ctx.root` with up to `workers` threads. Returns the root summary and every diagnostic
/// recorded by the coordinator and the units.
///
/// Files directly in the root are accounted by the coordinator. Fails only when the worker pool
/// cannot be started.
pub fn build_parallel(
    ctx: &BuildContext,
    workers: usize,
    on_event: Option<&dyn Fn(DispatchEvent<'_>)>,
) -> Result<(DirectorySummary, Diagnostics), AuditError> {
    let mut diagnostics = Diagnostics::default();
    let mut root = ctx.new_summary(&ctx.root, 0);

    let units = plan_units(ctx, &mut root, &mut diagnostics);
    if let Some(f) = on_event {
        f(DispatchEvent::Planned { units: units.len() });
    }
    if units.is_empty() {
        return Ok((root, diagnostics));
    }

    let workers = workers_given_fd_limit(workers).min(units.len());
    debug!(
        "Dispatching {} units across {} workers",
        units.len(),
        workers
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("{}-unit-{}", env!("CARGO_PKG_NAME"), i))
        .build()?;

    let (result_tx, result_rx) = bounded::<UnitResult>(units.len());
    for unit in &units {
        let result_tx = result_tx.clone();
        let ctx = ctx.clone();
        let path = unit.clone();
        pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut unit_diagnostics = Diagnostics::default();
                let summary = build_tree(&path, &ctx, 1, &mut unit_diagnostics);
                (summary, unit_diagnostics)
            }));
            let _ = result_tx.send(UnitResult { path, outcome });
        });
    }
    // Dropping the last sender closes the channel once every unit has reported.
    drop(result_tx);

    let mut pending: HashSet<PathBuf> = units.iter().cloned().collect();
    for UnitResult { path, outcome } in result_rx.iter() {
        pending.remove(&path);
        let subtree = match outcome {
            Ok((summary, unit_diagnostics)) => {
                diagnostics.extend(unit_diagnostics);
                summary
            }
            Err(payload) => {
                diagnostics.record(
                    DiagnosticKind::WorkerUnitFailure,
                    &path,
                    panic_message(payload.as_ref()),
                );
                ctx.new_summary(&path, 1)
            }
        };
        if let Some(f) = on_event {
            f(DispatchEvent::UnitDone {
                rel_path: &subtree.rel_path,
            });
        }
        root.attach(subtree, ctx.cutoff);
    }

    for path in units.iter().filter(|p| pending.contains(*p)) {
        diagnostics.record(
            DiagnosticKind::WorkerUnitFailure,
            path,
            "worker exited without reporting",
        );
        root.attach(ctx.new_summary(path, 1), ctx.cutoff);
    }

    Ok((root, diagnostics))
}

/// List the root once: account its files into `root`, return its subdirectories as units.
fn plan_units(
    ctx: &BuildContext,
    root: &mut DirectorySummary,
    diagnostics: &mut Diagnostics,
) -> Vec<PathBuf> {
    let read_dir = match std::fs::read_dir(&ctx.root) {
        Ok(rd) => rd,
        Err(e) => {
            diagnostics.record(DiagnosticKind::DirectoryListFailure, &ctx.root, e);
            return Vec::new();
        }
    };

    let mut units = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                diagnostics.record(DiagnosticKind::EntryStatFailure, &ctx.root, e);
                continue;
            }
        };
        let path = entry.path();
        // DirEntry::file_type and DirEntry::metadata do not follow symlinks.
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => units.push(path),
            Ok(_) => match entry.metadata() {
                Ok(meta) => account_file(root, &path, &meta, ctx, diagnostics),
                Err(e) => diagnostics.record(DiagnosticKind::EntryStatFailure, &path, e),
            },
            Err(e) => diagnostics.record(DiagnosticKind::EntryStatFailure, &path, e),
        }
    }
    units
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("unit panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("unit panicked: {s}")
    } else {
        "unit panicked".to_string()
    }
}
