//! Path and timestamp utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::ROOT_REL_PATH;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Normalize a relative path for snapshots: forward slashes, `"."` for the empty path.
pub fn path_to_snapshot_string(rel: &Path) -> String {
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() {
        ROOT_REL_PATH.to_string()
    } else {
        s
    }
}

/// Snapshot label for `path` under the audit `root`. Paths outside the root keep their full form.
pub fn rel_path_label(path: &Path, root: &Path) -> String {
    match path_relative_to(path, root) {
        Some(rel) => path_to_snapshot_string(&rel),
        None => path_to_snapshot_string(path),
    }
}

/// Whole seconds since the epoch; negative for times before 1970.
pub fn system_time_secs(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

/// Canonicalize the audit root and require it to be a directory.
pub fn canonicalize_root(path: &Path) -> Result<PathBuf> {
    let root = path
        .canonicalize()
        .with_context(|| format!("canonicalize {}", path.display()))?;
    if !root.is_dir() {
        return Err(crate::AuditError::NotADirectory(root).into());
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_canonicalize_root_resolves_relative_parts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let root = canonicalize_root(&dir.path().join("sub").join("..")).unwrap();
        assert!(root.is_absolute());
        assert_eq!(root, dir.path().canonicalize().unwrap());
        assert!(!root.ends_with(".."));
    }

    #[test]
    fn test_rel_path_label_root_is_dot() {
        let root = PathBuf::from("/data/run1");
        assert_eq!(rel_path_label(&root, &root), ".");
    }

    #[test]
    fn test_rel_path_label_nested() {
        let root = PathBuf::from("/data/run1");
        let path = PathBuf::from("/data/run1/l1_d1/l2_d1");
        assert_eq!(rel_path_label(&path, &root), "l1_d1/l2_d1");
    }

    #[test]
    fn test_snapshot_string_normalizes_backslashes() {
        assert_eq!(
            path_to_snapshot_string(&PathBuf::from("l1_d1\\l2_d1")),
            "l1_d1/l2_d1"
        );
    }

    #[test]
    fn test_system_time_secs_before_epoch() {
        let t = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(system_time_secs(t), -10);
        assert_eq!(
            system_time_secs(UNIX_EPOCH + Duration::from_millis(1_500)),
            1
        );
    }
}
