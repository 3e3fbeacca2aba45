//! Non-fatal failures collected during an audit, and how the CLI surfaces them.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Category of a recoverable failure. None of these abort an audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// One entry's metadata could not be read; that entry contributes nothing.
    EntryStatFailure,
    /// A directory could not be listed; it contributes a zero-valued subtree.
    DirectoryListFailure,
    /// Content sniffing failed or the file was empty; the file counts, but in no bucket.
    ClassificationFailure,
    /// A parallel unit failed as a whole; treated like a directory listing failure.
    WorkerUnitFailure,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::EntryStatFailure => "stat",
            DiagnosticKind::DirectoryListFailure => "list",
            DiagnosticKind::ClassificationFailure => "classify",
            DiagnosticKind::WorkerUnitFailure => "worker",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: PathBuf,
    pub message: String,
}

/// Collector for [`Diagnostic`]s. Each walk owns one; parallel units hand theirs back to the
/// coordinator, which appends them in completion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn record(&mut self, kind: DiagnosticKind, path: &Path, message: impl fmt::Display) {
        self.entries.push(Diagnostic {
            kind,
            path: path.to_path_buf(),
            message: message.to_string(),
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Per-kind totals, in a stable order.
    pub fn counts(&self) -> BTreeMap<DiagnosticKind, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.entries {
            *counts.entry(d.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// One-line summary with per-kind totals, e.g. `3 non-fatal problems (list: 1, classify: 2)`.
/// Classification failures are counted here but their files still contribute to the totals.
pub fn summary_line(diagnostics: &Diagnostics) -> String {
    let breakdown = diagnostics
        .counts()
        .iter()
        .map(|(kind, n)| format!("{kind}: {n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let noun = if diagnostics.len() == 1 {
        "problem"
    } else {
        "problems"
    };
    format!("{} non-fatal {} ({})", diagnostics.len(), noun, breakdown)
}

/// Log a summary of non-fatal problems. With `verbose`, also list each diagnostic.
/// Call once the audit has finished.
pub fn report_diagnostics(diagnostics: &Diagnostics, verbose: bool) {
    if diagnostics.is_empty() {
        debug!("No non-fatal problems");
        return;
    }
    warn!("{}", summary_line(diagnostics));
    if verbose {
        for d in diagnostics.iter() {
            eprintln!("  [{}] {}: {}", d.kind, d.path.display(), d.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_counts_by_kind() {
        let mut diags = Diagnostics::default();
        let classify = DiagnosticKind::ClassificationFailure;
        diags.record(classify, Path::new("a/empty.txt"), "file is empty");
        diags.record(DiagnosticKind::DirectoryListFailure, Path::new("b"), "permission denied");
        diags.record(classify, Path::new("a/x.bin"), "file is empty");
        assert_eq!(
            summary_line(&diags),
            "3 non-fatal problems (list: 1, classify: 2)"
        );
    }

    #[test]
    fn test_summary_line_singular() {
        let mut diags = Diagnostics::default();
        diags.record(DiagnosticKind::EntryStatFailure, Path::new("gone"), "not found");
        assert_eq!(summary_line(&diags), "1 non-fatal problem (stat: 1)");
    }
}
