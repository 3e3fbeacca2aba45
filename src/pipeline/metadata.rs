use std::fs::Metadata;
use std::path::Path;

use crate::DirectorySummary;
use crate::engine::tools::system_time_secs;

use super::context::BuildContext;
use super::error_handler::{DiagnosticKind, Diagnostics};

/// Account one non-directory entry into `summary`: size, count, last write and (when enabled)
/// its classification bucket. `meta` must come from a call that does not follow symlinks.
pub fn account_file(
    summary: &mut DirectorySummary,
    path: &Path,
    meta: &Metadata,
    ctx: &BuildContext,
    diagnostics: &mut Diagnostics,
) {
    let size = meta.len();
    summary.total_size += size;
    summary.file_count += 1;
    if let Ok(modified) = meta.modified() {
        summary.touch(system_time_secs(modified));
    }

    // Symlinks, fifos and sockets are counted but have no content of their own to sniff.
    let Some(classifier) = ctx.classifier.as_ref().filter(|_| meta.is_file()) else {
        return;
    };
    match classifier.try_classify(path) {
        Ok(label) => {
            if let Some(bucket) = ctx.buckets.bucket_for(&label) {
                *summary.classified.entry(bucket.to_string()).or_insert(0) += size;
            }
        }
        Err(e) => diagnostics.record(DiagnosticKind::ClassificationFailure, path, e),
    }
}
