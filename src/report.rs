//! Terminal report of a finished tree: sorted pre-order traversal, one line per retained node.

use chrono::{Local, TimeZone};
use colored::Colorize;
use serde::Deserialize;
use std::cmp::Ordering;

use crate::DirectorySummary;
use crate::utils::logger::Colors;

/// Attribute siblings are ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Total bytes; largest first unless reversed.
    #[default]
    Size,
    /// Last write time.
    Mtime,
    /// Relative path.
    Name,
    /// Number of files.
    #[value(name = "num_files")]
    NumFiles,
}

impl SortKey {
    fn compare(self, a: &DirectorySummary, b: &DirectorySummary) -> Ordering {
        match self {
            SortKey::Size => a.total_size.cmp(&b.total_size),
            SortKey::Mtime => a.last_modified.cmp(&b.last_modified),
            SortKey::Name => a.rel_path.cmp(&b.rel_path),
            SortKey::NumFiles => a.file_count.cmp(&b.file_count),
        }
    }

    /// Size reads best biggest-first, so `reverse` flips it to ascending.
    fn descending(self, reverse: bool) -> bool {
        (self == SortKey::Size) != reverse
    }
}

/// Nodes of `tree` in report order: parent before children, siblings stably sorted by `key`.
pub fn ordered(tree: &DirectorySummary, key: SortKey, reverse: bool) -> Vec<&DirectorySummary> {
    let descending = key.descending(reverse);
    let mut out = Vec::with_capacity(tree.node_count());
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        out.push(node);
        let mut children: Vec<&DirectorySummary> = node.children.iter().collect();
        children.sort_by(|a, b| {
            let ord = key.compare(a, b);
            if descending { ord.reverse() } else { ord }
        });
        stack.extend(children.into_iter().rev());
    }
    out
}

/// Human size with binary units, fixed width: `{:6.1}{unit:3}`.
pub fn sizeof_fmt(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB"];
    let mut num = bytes as f64;
    for unit in UNITS {
        if num < 1024.0 {
            return format!("{num:6.1}{unit:3}");
        }
        num /= 1024.0;
    }
    format!("{num:6.1}{:3}", "YiB")
}

/// Local calendar date of an epoch timestamp, `%Y-%m-%d`.
pub fn date_fmt(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).earliest() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "----------".to_string(),
    }
}

/// Column header matching [`format_line`]. Pass the bucket names when shares are shown.
pub fn header(buckets: Option<&[&str]>) -> String {
    let mut line = String::from("    Total ");
    for name in buckets.unwrap_or_default() {
        line.push_str(&format!("{:>11} ", capitalize(name)));
    }
    line.push_str(" #files Last write");
    line
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Share of `part` in `total` as a colored `{:>5.1}%` column, or `NA` for an empty node.
fn share_column(part: u64, total: u64) -> String {
    if total == 0 {
        return format!("{:>11} ", "NA");
    }
    let pct = 100.0 * part as f64 / total as f64;
    let color = if pct > 67.0 {
        Colors::SHARE_HIGH
    } else if pct > 33.0 {
        Colors::SHARE_MID
    } else {
        Colors::SHARE_LOW
    };
    format!("{} ", format!("{pct:>10.1}%").color(color))
}

/// One report line for `node`. With `buckets`, adds a share column per bucket.
pub fn format_line(node: &DirectorySummary, buckets: Option<&[&str]>) -> String {
    let mut line = format!("{} ", sizeof_fmt(node.total_size));
    for name in buckets.unwrap_or_default() {
        line.push_str(&share_column(node.classified_size(name), node.total_size));
    }
    line.push_str(&format!("{:7} {} ", node.file_count, date_fmt(node.last_modified)));

    let color = Colors::for_depth(node.depth);
    if node.depth != 0 {
        line.push_str(&Colors::paint(color, &format!("{} ", "-".repeat(node.depth))));
    }
    line.push_str(&Colors::paint(color, node.name()));
    line
}

/// Header plus every line of the report, in order.
pub fn render(
    tree: &DirectorySummary,
    key: SortKey,
    reverse: bool,
    show_buckets: bool,
) -> Vec<String> {
    let names: Vec<&str> = tree.classified.keys().map(String::as_str).collect();
    let buckets = show_buckets.then_some(names.as_slice());
    let mut lines = vec![Colors::paint(Some(Colors::HEADER), &header(buckets))];
    lines.extend(
        ordered(tree, key, reverse)
            .into_iter()
            .map(|node| format_line(node, buckets)),
    );
    lines
}

pub fn print_report(tree: &DirectorySummary, key: SortKey, reverse: bool, show_buckets: bool) {
    for line in render(tree, key, reverse, show_buckets) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(rel: &str, depth: usize, size: u64, files: u64, mtime: i64) -> DirectorySummary {
        let mut n = DirectorySummary::new(rel, depth, ["compressed"]);
        n.total_size = size;
        n.file_count = files;
        n.last_modified = mtime;
        n
    }

    fn sample() -> DirectorySummary {
        let mut root = node(".", 0, 0, 0, 0);
        let mut b = node("b", 1, 0, 0, 0);
        b.attach(node("b/y", 2, 5, 1, 10), 9);
        b.attach(node("b/x", 2, 50, 1, 20), 9);
        root.attach(node("a", 1, 10, 3, 30), 9);
        root.attach(b, 9);
        root.attach(node("c", 1, 30, 2, 5), 9);
        root
    }

    fn paths(nodes: Vec<&DirectorySummary>) -> Vec<&str> {
        nodes.into_iter().map(|n| n.rel_path.as_str()).collect()
    }

    #[test]
    fn test_size_is_largest_first() {
        let tree = sample();
        assert_eq!(
            paths(ordered(&tree, SortKey::Size, false)),
            [".", "b", "b/x", "b/y", "c", "a"]
        );
        assert_eq!(
            paths(ordered(&tree, SortKey::Size, true)),
            [".", "a", "c", "b", "b/y", "b/x"]
        );
    }

    #[test]
    fn test_name_and_num_files_ascending() {
        let tree = sample();
        assert_eq!(
            paths(ordered(&tree, SortKey::Name, false)),
            [".", "a", "b", "b/x", "b/y", "c"]
        );
        assert_eq!(
            paths(ordered(&tree, SortKey::NumFiles, false)),
            [".", "b", "b/y", "b/x", "c", "a"]
        );
    }

    #[test]
    fn test_ordering_does_not_touch_tree() {
        let tree = sample();
        let before = tree.clone();
        let _ = ordered(&tree, SortKey::Mtime, true);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_sizeof_fmt_units() {
        assert_eq!(sizeof_fmt(0), "   0.0B  ");
        assert_eq!(sizeof_fmt(1536), "   1.5KiB");
        assert_eq!(sizeof_fmt(3 * 1024 * 1024), "   3.0MiB");
    }

    #[test]
    fn test_header_lists_buckets() {
        assert_eq!(header(None), "    Total  #files Last write");
        assert_eq!(
            header(Some(&["compressed"][..])),
            "    Total  Compressed  #files Last write"
        );
    }

    #[test]
    fn test_format_line_plain() {
        colored::control::set_override(false);
        let line = format_line(&node("l1_d1/l2_d1", 2, 108, 9, 0), None);
        assert!(line.starts_with(" 108.0B         9 "));
        assert!(line.ends_with(" -- l2_d1"));
    }

    #[test]
    fn test_empty_node_share_is_na() {
        colored::control::set_override(false);
        let line = format_line(&node(".", 0, 0, 0, 0), Some(&["compressed"][..]));
        assert!(line.contains("         NA "));
    }
}
