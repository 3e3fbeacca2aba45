//! CLI command handlers: `report` audits and persists, `show` prints a snapshot, `mimetype`
//! sniffs one file.

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

use crate::engine::arg_parser::{Cli, Commands, ReportArgs, ShowArgs, SortArgs};
use crate::engine::classify::{BucketSet, ContentClassifier, MagicClassifier};
use crate::engine::parallel::DispatchEvent;
use crate::engine::progress::{close_progress_bar, create_progress_bar, on_dispatch_event};
use crate::engine::snapshot;
use crate::engine::tools::canonicalize_root;
use crate::pipeline::{report_diagnostics, run_audit};
use crate::report::print_report;
use crate::utils::dmaudit_toml::{apply_file_to_opts, read_dmaudit_toml};
use crate::utils::logger::Colors;
use crate::utils::setup_logging;
use crate::{AuditOpts, Opts};

/// Overwrite opts field from a CLI flag when given.
macro_rules! apply_cli_opt {
    ($args:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $args.$field {
            $opts.$field = v;
        }
    };
}

fn apply_sort_args(sort: &SortArgs, opts: &mut Opts) {
    apply_cli_opt!(sort, opts, sort_by);
    apply_cli_opt!(sort, opts, reverse);
}

/// Defaults, then `.dmaudit.toml` in the audited directory, then CLI flags.
/// Runs before logging exists, so a bad settings file is handed back for the caller to log.
fn setup_opts(args: &ReportArgs) -> (Opts, Option<anyhow::Error>) {
    let mut opts = Opts::default();
    let file_error = match read_dmaudit_toml(&args.dir) {
        Ok(Some(file)) => {
            apply_file_to_opts(&file, &mut opts);
            None
        }
        Ok(None) => None,
        Err(e) => Some(e),
    };
    apply_cli_opt!(args, opts, level);
    apply_cli_opt!(args, opts, check_mimetype);
    apply_cli_opt!(args, opts, parallel);
    apply_cli_opt!(args, opts, workers);
    apply_cli_opt!(args, opts, verbose);
    apply_sort_args(&args.sort, &mut opts);
    if let Some(ref out) = args.output {
        opts.output = Some(out.clone());
    }
    (opts, file_error)
}

/// Buckets from `.dmaudit.toml` in `dir`, or the built-in set.
fn configured_buckets(dir: &Path) -> BucketSet {
    match read_dmaudit_toml(dir) {
        Ok(file) => file.and_then(|f| f.buckets()).unwrap_or_default(),
        Err(e) => {
            warn!("{e:#}; using built-in buckets");
            BucketSet::default()
        }
    }
}

pub fn handle_run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Report(args) => handle_report(args),
        Commands::Show(args) => handle_show(args),
        Commands::Mimetype { file } => handle_mimetype(file),
    }
}

fn print_field(label: &str, value: &str) {
    println!("{:<18}: {}", label, value.color(Colors::VALUE));
}

fn handle_report(args: &ReportArgs) -> Result<()> {
    let (opts, file_error) = setup_opts(args);
    setup_logging(opts.verbose);
    if let Some(e) = file_error {
        warn!("{e:#}; settings file ignored");
    }
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let start = Instant::now();
    print_field("dmaudit version", env!("CARGO_PKG_VERSION"));
    let root = canonicalize_root(&args.dir)?;
    print_field("Auditing directory", &root.display().to_string());

    let audit_opts = AuditOpts::from(&opts);
    let bar = (opts.verbose && opts.parallel).then(|| create_progress_bar("Directories"));
    let on_event = |event: DispatchEvent<'_>| {
        if let Some(pb) = &bar {
            on_dispatch_event(pb, event);
        }
    };
    let hook: Option<&dyn Fn(DispatchEvent<'_>)> = bar.is_some().then_some(&on_event);
    let (tree, diagnostics) = run_audit(&root, &audit_opts, hook)?;
    if let Some(pb) = &bar {
        close_progress_bar(pb);
    }

    print_field("Time in seconds", &format!("{:.2}", start.elapsed().as_secs_f64()));
    println!();
    report_diagnostics(&diagnostics, opts.verbose);
    print_report(&tree, opts.sort_by, opts.reverse, opts.check_mimetype);

    if let Some(ref out) = opts.output {
        snapshot::save(&tree, out)
            .with_context(|| format!("write snapshot {}", out.display()))?;
        info!("Snapshot written to {}", out.display());
    }
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<()> {
    let mut opts = Opts::default();
    apply_sort_args(&args.sort, &mut opts);
    setup_logging(opts.verbose);

    let tree = snapshot::load(&args.snapshot)
        .with_context(|| format!("load snapshot {}", args.snapshot.display()))?;
    let show_buckets = tree.classified.values().any(|&bytes| bytes > 0);
    print_report(&tree, opts.sort_by, opts.reverse, show_buckets);
    Ok(())
}

fn handle_mimetype(file: &Path) -> Result<()> {
    setup_logging(false);
    let cwd = std::env::current_dir().context("current directory")?;
    let buckets = configured_buckets(&cwd);
    let label = MagicClassifier.classify(file);
    let bucket = buckets.bucket_for(&label).unwrap_or("none");
    println!("{label} bucket={bucket}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::DEFAULT_LEVEL;
    use clap::Parser;

    fn report_args(argv: &[&str]) -> ReportArgs {
        let mut full = vec!["dmaudit", "report"];
        full.extend_from_slice(argv);
        let cli = Cli::try_parse_from(full).unwrap();
        match cli.command {
            Commands::Report(args) => args,
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_bad_settings_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".dmaudit.toml"), "[settings]\nlevel = \"three\"\n")
            .unwrap();
        let dir_arg = dir.path().to_str().unwrap();
        let (opts, file_error) = setup_opts(&report_args(&[dir_arg, "-r"]));
        let err = file_error.expect("invalid settings file must surface");
        assert!(format!("{err:#}").contains(".dmaudit.toml"));
        assert_eq!(opts.level, DEFAULT_LEVEL);
        assert!(opts.reverse);
    }

    #[test]
    fn test_settings_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".dmaudit.toml"),
            "[settings]\nlevel = 5\nparallel = true\n",
        )
        .unwrap();
        let dir_arg = dir.path().to_str().unwrap();
        let (opts, file_error) = setup_opts(&report_args(&[dir_arg, "-l", "1"]));
        assert!(file_error.is_none());
        assert_eq!(opts.level, 1);
        assert!(opts.parallel);
    }

    #[test]
    fn test_configured_buckets_from_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".dmaudit.toml"),
            "[[buckets]]\nname = \"images\"\nprefixes = [\"image/\"]\n",
        )
        .unwrap();
        let buckets = configured_buckets(dir.path());
        assert_eq!(buckets.bucket_for("image/png"), Some("images"));
        assert_eq!(buckets.bucket_for("text/plain"), None);
    }

    #[test]
    fn test_configured_buckets_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(configured_buckets(dir.path()), BucketSet::default());
    }
}
