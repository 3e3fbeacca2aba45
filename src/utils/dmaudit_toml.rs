//! Load `.dmaudit.toml` from the audited directory (CLI only). Lib callers pass [`AuditOpts`](crate::AuditOpts) directly.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::engine::classify::{BucketRule, BucketSet};
use crate::report::SortKey;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DmauditToml {
    #[serde(default)]
    settings: SettingsSection,
    /// When present, replaces the built-in bucket set.
    buckets: Option<Vec<BucketRule>>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    level: Option<usize>,
    sort_by: Option<SortKey>,
    reverse: Option<bool>,
    check_mimetype: Option<bool>,
    parallel: Option<bool>,
    workers: Option<usize>,
    output: Option<String>,
    verbose: Option<bool>,
}

/// Read the settings file from `dir`. `Ok(None)` when there is no such file; an unreadable or
/// invalid file is an error naming the path.
pub(crate) fn read_dmaudit_toml(dir: &Path) -> anyhow::Result<Option<DmauditToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let file = parse_dmaudit_toml(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(file))
}

pub(crate) fn parse_dmaudit_toml(s: &str) -> Result<DmauditToml, toml::de::Error> {
    toml::from_str(s)
}

impl DmauditToml {
    /// Bucket set from the `[[buckets]]` tables, if the file has any.
    pub(crate) fn buckets(&self) -> Option<BucketSet> {
        self.buckets.as_ref().map(|rules| BucketSet::new(rules.clone()))
    }
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &DmauditToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, level => level);
    apply_file_opt!(s, opts, sort_by => sort_by);
    apply_file_opt!(s, opts, reverse => reverse);
    apply_file_opt!(s, opts, check_mimetype => check_mimetype);
    apply_file_opt!(s, opts, parallel => parallel);
    apply_file_opt!(s, opts, workers => workers);
    apply_file_opt!(s, opts, verbose => verbose);
    if let Some(ref p) = s.output {
        opts.output = Some(PathBuf::from(p));
    }
    if let Some(buckets) = file.buckets() {
        opts.buckets = buckets;
    }
}
