//! Build context: the read-only settings every walk (sequential or per worker unit) shares.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::DirectorySummary;
use crate::engine::classify::{BucketSet, ContentClassifier, MagicClassifier};
use crate::engine::tools::rel_path_label;

/// Immutable walk settings. Cheap to clone; workers each hold a clone.
#[derive(Clone)]
pub struct BuildContext {
    /// Audit root; every node's `rel_path` is relative to it.
    pub root: PathBuf,
    /// Nodes with `depth < cutoff` retain their children.
    pub cutoff: usize,
    /// Set when classification is enabled for the run.
    pub classifier: Option<Arc<dyn ContentClassifier>>,
    pub buckets: Arc<BucketSet>,
}

impl BuildContext {
    /// Context without classification; nodes still carry zeroed counters for `buckets`.
    pub fn new(root: &Path, cutoff: usize, buckets: BucketSet) -> Self {
        Self {
            root: root.to_path_buf(),
            cutoff,
            classifier: None,
            buckets: Arc::new(buckets),
        }
    }

    /// Enable classification with the magic-byte classifier.
    pub fn classify(self, enabled: bool) -> Self {
        if enabled {
            self.with_classifier(Arc::new(MagicClassifier))
        } else {
            Self {
                classifier: None,
                ..self
            }
        }
    }

    pub fn with_classifier(self, classifier: Arc<dyn ContentClassifier>) -> Self {
        Self {
            classifier: Some(classifier),
            ..self
        }
    }

    /// Zero-valued summary for the directory at `path`, labelled relative to the root.
    pub fn new_summary(&self, path: &Path, depth: usize) -> DirectorySummary {
        DirectorySummary::new(rel_path_label(path, &self.root), depth, self.buckets.names())
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("cutoff", &self.cutoff)
            .field("classify", &self.classifier.is_some())
            .field("buckets", &self.buckets)
            .finish()
    }
}
