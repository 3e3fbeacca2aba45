//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    output_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                output_filename: "tree.json".to_string(),
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Default JSON snapshot written by `report`.
    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    /// Per-directory settings file looked up in the audited directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Reporting ----

/// Levels of nesting retained in the tree when none is requested.
pub const DEFAULT_LEVEL: usize = 2;

// ---- Worker pool ----

/// Pool sizing for parallel audits.
#[derive(Clone, Copy, Debug)]
pub struct DispatchLimits {
    /// Available threads (from rayon); set by [`DispatchLimits::current()`].
    pub all_threads: usize,
    /// Smallest pool we will run.
    pub floor: usize,
}

impl Default for DispatchLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_WORKERS,
        }
    }
}

impl DispatchLimits {
    pub const DEFAULT_WORKERS: usize = 4;
    pub const FLOOR_WORKERS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }
}

// ---- Walking ----

/// Directory handles a single walker keeps open at once (walkdir `max_open`).
/// Deeper trees are still walked; older handles are closed and their entries buffered.
pub const WALK_MAX_OPEN: usize = 10;

// ---- Classification ----

/// Bytes read from the head of a file for content sniffing. 8 KiB.
pub const SNIFF_HEADER_BYTES: usize = 8 * 1024;

/// Label returned when content could not be identified.
pub const UNKNOWN_MIME: &str = "unknown/unknown";

/// Label for unmatched content that decodes as UTF-8 without NUL bytes.
pub const TEXT_MIME: &str = "text/plain";

