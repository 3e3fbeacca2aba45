//! Tree builder: one walk of a directory subtree folded into a [`DirectorySummary`].
//!
//! walkdir runs with `contents_first`, so every directory is yielded after everything beneath
//! it. Directories being walked sit on an explicit stack of accumulators; when a directory's own
//! entry arrives its accumulator is complete and is attached to its parent. There is no call
//! stack recursion, so very deep trees only cost heap.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::DirectorySummary;
use crate::utils::config::WALK_MAX_OPEN;

use super::context::BuildContext;
use super::error_handler::{DiagnosticKind, Diagnostics};
use super::metadata::account_file;

/// Walk the directory at `path` (sitting at `depth` below the audit root) and return its summary.
///
/// Never fails: an unreadable directory contributes a zero-valued summary, an unreadable entry
/// contributes nothing, and each such event is recorded in `diagnostics`. Symlinks are never
/// followed below `path`.
pub fn build_tree(
    path: &Path,
    ctx: &BuildContext,
    depth: usize,
    diagnostics: &mut Diagnostics,
) -> DirectorySummary {
    let mut acc = Accumulator::new(ctx, depth);

    let walker = WalkDir::new(path)
        .follow_links(false)
        .contents_first(true)
        .max_open(WALK_MAX_OPEN);

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                let err_path = err.path().unwrap_or(path).to_path_buf();
                let kind = if err.depth() == 0 || is_real_dir(&err_path) {
                    DiagnosticKind::DirectoryListFailure
                } else {
                    DiagnosticKind::EntryStatFailure
                };
                let msg = match err.io_error() {
                    Some(io) => io.to_string(),
                    None => err.to_string(),
                };
                diagnostics.record(kind, &err_path, msg);
                continue;
            }
        };

        let walk_depth = entry.depth();
        let is_dir = entry.file_type().is_dir();

        if walk_depth == 0 && !is_dir {
            // A symlinked root is yielded up front and walked through; anything else is not a
            // directory we can audit.
            if entry.path().is_dir() {
                continue;
            }
            diagnostics.record(
                DiagnosticKind::DirectoryListFailure,
                entry.path(),
                "not a directory",
            );
            return ctx.new_summary(path, depth);
        }

        if is_dir {
            acc.close_dir(entry.path(), walk_depth);
            continue;
        }

        match entry.metadata() {
            Ok(meta) => {
                acc.align(entry.path(), walk_depth);
                if let Some(frame) = acc.stack.last_mut() {
                    account_file(&mut frame.summary, entry.path(), &meta, ctx, diagnostics);
                }
            }
            Err(err) => {
                let msg = match err.io_error() {
                    Some(io) => io.to_string(),
                    None => err.to_string(),
                };
                diagnostics.record(DiagnosticKind::EntryStatFailure, entry.path(), msg);
            }
        }
    }

    acc.finish()
        .unwrap_or_else(|| ctx.new_summary(path, depth))
}

fn is_real_dir(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// A directory whose contents are still arriving.
struct Frame {
    path: PathBuf,
    summary: DirectorySummary,
}

/// Stack of open directories; `stack[i]` is the directory at walk depth `i`.
struct Accumulator<'a> {
    ctx: &'a BuildContext,
    base_depth: usize,
    stack: Vec<Frame>,
    done: Option<DirectorySummary>,
}

impl<'a> Accumulator<'a> {
    fn new(ctx: &'a BuildContext, base_depth: usize) -> Self {
        Self {
            ctx,
            base_depth,
            stack: Vec::new(),
            done: None,
        }
    }

    /// Make `path`'s parent the top frame: close frames deeper than `walk_depth`, open any
    /// ancestors of `path` that have no frame yet.
    fn align(&mut self, path: &Path, walk_depth: usize) {
        while self.stack.len() > walk_depth {
            self.close_top();
        }
        while self.stack.len() < walk_depth {
            let level = self.stack.len();
            let Some(dir) = path.ancestors().nth(walk_depth - level) else {
                break;
            };
            let summary = self.ctx.new_summary(dir, self.base_depth + level);
            self.stack.push(Frame {
                path: dir.to_path_buf(),
                summary,
            });
        }
    }

    /// A directory's own entry arrived: everything beneath it has been seen.
    fn close_dir(&mut self, path: &Path, walk_depth: usize) {
        while self.stack.len() > walk_depth + 1 {
            self.close_top();
        }
        let is_top = self.stack.len() == walk_depth + 1
            && self.stack.last().is_some_and(|f| f.path == path);
        let opened = if is_top {
            self.stack.pop().map(|f| f.summary)
        } else {
            None
        };
        let summary = match opened {
            Some(summary) => summary,
            None => {
                // Empty or unreadable directory: nothing beneath it opened a frame.
                self.align(path, walk_depth);
                self.ctx.new_summary(path, self.base_depth + walk_depth)
            }
        };
        self.attach_to_parent(summary);
    }

    fn close_top(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.attach_to_parent(frame.summary);
        }
    }

    fn attach_to_parent(&mut self, summary: DirectorySummary) {
        match self.stack.last_mut() {
            Some(parent) => parent.summary.attach(summary, self.ctx.cutoff),
            None => match self.done.as_mut() {
                Some(done) => done.absorb(&summary),
                None => self.done = Some(summary),
            },
        }
    }

    /// Close whatever is still open and hand back the walk root's summary.
    fn finish(mut self) -> Option<DirectorySummary> {
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.done
    }
}
