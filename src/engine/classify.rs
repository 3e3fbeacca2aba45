//! Content classification: sniff a file's MIME label and map labels onto named buckets.
//!
//! Sniffing never aborts an audit. [`ContentClassifier::try_classify`] reports why a file could
//! not be sniffed so the walk can record it; [`ContentClassifier::classify`] folds every failure
//! into [`UNKNOWN_MIME`].

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::utils::config::{SNIFF_HEADER_BYTES, TEXT_MIME, UNKNOWN_MIME};

/// MIME labels counted as compressed or archived data.
pub const COMPRESSED_MIMETYPES: &[&str] = &[
    "application/x-bzip2",
    "application/gzip",
    "application/x-gzip",
    "application/x-lzip",
    "application/x-lzma",
    "application/x-lzop",
    "application/x-snappy-framed",
    "application/x-xz",
    "application/zstd",
    "application/x-compress",
    "application/x-7z-compressed",
    "application/x-ace-compressed",
    "application/x-astrotite-afa",
    "application/x-alz-compressed",
    "application/vnd.android.package-archive",
    "application/octet-stream",
    "application/x-freearc",
    "application/x-arj",
    "application/x-b1",
    "application/vnd.ms-cab-compressed",
    "application/x-cfs-compressed",
    "application/x-dar",
    "application/x-dgc-compressed",
    "application/x-apple-diskimage",
    "application/x-gca-compressed",
    "application/java-archive",
    "application/x-lzh",
    "application/x-lzx",
    "application/vnd.rar",
    "application/x-rar-compressed",
    "application/x-stuffit",
    "application/x-gtar",
    "application/x-ms-wim",
    "application/x-xar",
    "application/zip",
    "application/x-zoo",
];

/// Why a file could not be sniffed.
#[derive(Debug, thiserror::Error)]
pub enum SniffError {
    #[error("file is empty")]
    Empty,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Content-type detection used by the walk when classification is enabled.
///
/// Implementations are shared across worker threads.
pub trait ContentClassifier: Send + Sync {
    /// Best-effort MIME label for the file at `path`.
    fn try_classify(&self, path: &Path) -> Result<String, SniffError>;

    /// Like [`try_classify`](Self::try_classify) but never fails: any problem yields [`UNKNOWN_MIME`].
    fn classify(&self, path: &Path) -> String {
        self.try_classify(path)
            .unwrap_or_else(|_| UNKNOWN_MIME.to_string())
    }
}

/// Magic-byte classifier: reads the head of the file and matches known signatures with `infer`.
/// Content with no signature that decodes as UTF-8 (and has no NUL bytes) is [`TEXT_MIME`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MagicClassifier;

impl ContentClassifier for MagicClassifier {
    fn try_classify(&self, path: &Path) -> Result<String, SniffError> {
        let header = read_header(path, SNIFF_HEADER_BYTES)?;
        if header.is_empty() {
            return Err(SniffError::Empty);
        }
        Ok(sniff_bytes(&header).to_string())
    }
}

/// Read up to `limit` bytes from the start of `path`.
fn read_header(path: &Path, limit: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Label for a (non-empty) file header.
pub fn sniff_bytes(header: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(header) {
        return kind.mime_type();
    }
    if looks_like_text(header) {
        TEXT_MIME
    } else {
        UNKNOWN_MIME
    }
}

fn looks_like_text(header: &[u8]) -> bool {
    if header.contains(&0) {
        return false;
    }
    match std::str::from_utf8(header) {
        Ok(_) => true,
        // Header cut in the middle of a multi-byte character.
        Err(e) => e.error_len().is_none(),
    }
}

/// A named classification bucket: a label matches when it starts with any prefix or equals any
/// listed MIME type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BucketRule {
    pub name: String,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub mime_types: BTreeSet<String>,
}

impl BucketRule {
    pub fn with_prefix(name: &str, prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            prefixes: vec![prefix.to_string()],
            mime_types: BTreeSet::new(),
        }
    }

    pub fn with_mime_types(name: &str, mime_types: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            prefixes: Vec::new(),
            mime_types: mime_types.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        self.mime_types.contains(label) || self.prefixes.iter().any(|p| label.starts_with(p))
    }
}

/// Ordered bucket rules. A label lands in the first bucket that matches, or in none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketSet {
    rules: Vec<BucketRule>,
}

impl Default for BucketSet {
    /// `text` (any `text/*` label) and `compressed` ([`COMPRESSED_MIMETYPES`]).
    fn default() -> Self {
        Self::new(vec![
            BucketRule::with_prefix("text", "text/"),
            BucketRule::with_mime_types("compressed", COMPRESSED_MIMETYPES),
        ])
    }
}

impl BucketSet {
    /// Later rules with a name already seen are dropped so every bucket name is unique.
    pub fn new(rules: Vec<BucketRule>) -> Self {
        let mut seen = BTreeSet::new();
        let rules = rules
            .into_iter()
            .filter(|r| seen.insert(r.name.clone()))
            .collect();
        Self { rules }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn bucket_for(&self, label: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.matches(label))
            .map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_error_messages() {
        assert_eq!(SniffError::Empty.to_string(), "file is empty");
        let err: SniffError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, SniffError::Io(_)));
        assert_eq!(err.to_string(), "denied");
    }

    #[test]
    fn test_empty_file_is_sniff_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        File::create(&path).unwrap();
        assert!(matches!(
            MagicClassifier.try_classify(&path),
            Err(SniffError::Empty)
        ));
        assert!(matches!(
            MagicClassifier.try_classify(&dir.path().join("missing")),
            Err(SniffError::Io(_))
        ));
    }

    #[test]
    fn test_sniff_gzip() {
        let gz = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(sniff_bytes(&gz), "application/gzip");
    }

    #[test]
    fn test_sniff_plain_text() {
        assert_eq!(sniff_bytes(b"ACGTACGTNNNN\n>chr1\n"), TEXT_MIME);
    }

    #[test]
    fn test_sniff_text_cut_mid_character() {
        // "é" is 0xC3 0xA9; drop the continuation byte.
        assert_eq!(sniff_bytes(&[b'a', b'b', 0xC3]), TEXT_MIME);
    }

    #[test]
    fn test_sniff_binary_is_unknown() {
        assert_eq!(sniff_bytes(&[0x00, 0x01, 0x02, 0xff, 0xfe]), UNKNOWN_MIME);
    }

    #[test]
    fn test_default_buckets() {
        let set = BucketSet::default();
        assert_eq!(set.bucket_for("text/x-python"), Some("text"));
        assert_eq!(set.bucket_for("application/gzip"), Some("compressed"));
        assert_eq!(set.bucket_for("application/x-gzip"), Some("compressed"));
        assert_eq!(set.bucket_for(UNKNOWN_MIME), None);
        assert_eq!(set.bucket_for("image/png"), None);
    }

    #[test]
    fn test_first_matching_bucket_wins() {
        let set = BucketSet::new(vec![
            BucketRule::with_prefix("any_app", "application/"),
            BucketRule::with_mime_types("compressed", &["application/zip"]),
        ]);
        assert_eq!(set.bucket_for("application/zip"), Some("any_app"));
    }

    #[test]
    fn test_duplicate_bucket_names_dropped() {
        let set = BucketSet::new(vec![
            BucketRule::with_prefix("text", "text/"),
            BucketRule::with_prefix("text", "application/"),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.bucket_for("application/json"), None);
    }
}
