use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::report::SortKey;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Data management audit tool: where the bytes are, how old they are, how much is compressed.
#[derive(Clone, Parser)]
#[command(name = "dmaudit", version)]
#[command(about = "Audit a directory tree: size, file count, last write and content mix per directory.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Audit DIR, print the report and write a JSON snapshot.
    Report(ReportArgs),
    /// Print the report of a previously written JSON snapshot.
    Show(ShowArgs),
    /// Print the perceived mimetype of FILE and the bucket it counts toward.
    Mimetype {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Sorting flags shared by `report` and `show`.
#[derive(Clone, Debug, clap::Args)]
pub struct SortArgs {
    /// Attribute to sort sibling directories by. Default: size.
    #[arg(long, short = 's', value_enum)]
    pub sort_by: Option<SortKey>,

    /// Reverse the sort order.
    #[arg(long, short = 'r', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub reverse: Option<bool>,
}

#[derive(Clone, Debug, clap::Args)]
pub struct ReportArgs {
    /// Directory to audit. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Number of levels of nesting to report. Default: 2.
    #[arg(long, short = 'l')]
    pub level: Option<usize>,

    #[command(flatten)]
    pub sort: SortArgs,

    /// Report the share of each content bucket (reads the head of every file; slower).
    #[arg(long, short = 'm', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub check_mimetype: Option<bool>,

    /// Audit top-level subdirectories on a worker pool.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub parallel: Option<bool>,

    /// Worker pool size for --parallel. Default: 4.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Where to write the JSON snapshot. Default: tree.json.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

#[derive(Clone, Debug, clap::Args)]
pub struct ShowArgs {
    /// Snapshot written by `report`.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    #[command(flatten)]
    pub sort: SortArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flags() {
        let cli = Cli::try_parse_from([
            "dmaudit", "report", "/data", "-l", "3", "-s", "num_files", "-r", "-p", "-w", "8",
        ])
        .unwrap();
        let Commands::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.dir, PathBuf::from("/data"));
        assert_eq!(args.level, Some(3));
        assert_eq!(args.sort.sort_by, Some(SortKey::NumFiles));
        assert_eq!(args.sort.reverse, Some(true));
        assert_eq!(args.parallel, Some(true));
        assert_eq!(args.workers, Some(8));
        assert_eq!(args.check_mimetype, None);
    }

    #[test]
    fn test_unknown_sort_key_rejected() {
        assert!(Cli::try_parse_from(["dmaudit", "report", "-s", "owner"]).is_err());
    }
}
