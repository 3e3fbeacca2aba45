//! Folding summaries together.
//!
//! Counter folding is a sum (sizes, buckets, file counts) and a max (`last_modified`), so it is
//! associative and order independent. Only the order of `children` depends on fold order.

use std::collections::BTreeSet;

use crate::DirectorySummary;

impl DirectorySummary {
    /// Raise `last_modified` to `timestamp` if newer.
    pub fn touch(&mut self, timestamp: i64) {
        if timestamp > self.last_modified {
            self.last_modified = timestamp;
        }
    }

    /// Fold `other`'s counters into `self` without retaining it as a child.
    pub fn absorb(&mut self, other: &DirectorySummary) {
        self.total_size += other.total_size;
        self.file_count += other.file_count;
        for (bucket, bytes) in &other.classified {
            *self.classified.entry(bucket.clone()).or_insert(0) += bytes;
        }
        self.touch(other.last_modified);
    }

    /// Fold `from`'s counters into `self` and keep `from` as a child.
    pub fn merge(&mut self, from: DirectorySummary) {
        self.absorb(&from);
        self.children.push(from);
    }

    /// Fold a finished child in, retaining it only while `self` is shallower than `cutoff`.
    pub fn attach(&mut self, child: DirectorySummary, cutoff: usize) {
        if self.depth < cutoff {
            self.merge(child);
        } else {
            self.absorb(&child);
        }
    }
}

/// New summary labelled `rel_path` at `depth` with every tree merged in and retained.
///
/// For combining independently rooted partial audits; the caller picks the parent's label. The
/// result tracks the union of the inputs' buckets.
pub fn merge_trees<I>(rel_path: impl Into<String>, depth: usize, trees: I) -> DirectorySummary
where
    I: IntoIterator<Item = DirectorySummary>,
{
    let mut trees: Vec<DirectorySummary> = trees.into_iter().collect();
    let names: BTreeSet<String> = trees
        .iter()
        .flat_map(|t| t.classified.keys().cloned())
        .collect();
    let mut merged = DirectorySummary::new(rel_path, depth, names.iter().map(String::as_str));
    for tree in &mut trees {
        fill_buckets(tree, &names);
    }
    for tree in trees {
        merged.merge(tree);
    }
    merged
}

fn fill_buckets(node: &mut DirectorySummary, names: &BTreeSet<String>) {
    for name in names {
        node.classified.entry(name.clone()).or_insert(0);
    }
    for child in &mut node.children {
        fill_buckets(child, names);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(rel: &str, size: u64, files: u64, touched: i64, compressed: u64) -> DirectorySummary {
        let mut s = DirectorySummary::new(rel, 1, ["compressed"]);
        s.total_size = size;
        s.file_count = files;
        s.last_modified = touched;
        s.classified.insert("compressed".into(), compressed);
        s
    }

    #[test]
    fn test_attach_below_cutoff_retains_child() {
        let mut root = DirectorySummary::new(".", 0, ["compressed"]);
        root.attach(leaf("a", 10, 1, 5, 0), 1);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.total_size, 10);
    }

    #[test]
    fn test_attach_at_cutoff_only_aggregates() {
        let mut root = DirectorySummary::new(".", 0, ["compressed"]);
        root.attach(leaf("a", 10, 1, 5, 3), 0);
        assert!(root.children.is_empty());
        assert_eq!(root.total_size, 10);
        assert_eq!(root.file_count, 1);
        assert_eq!(root.last_modified, 5);
        assert_eq!(root.classified_size("compressed"), 3);
    }

    #[test]
    fn test_touch_never_decreases() {
        let mut s = DirectorySummary::new(".", 0, []);
        s.touch(100);
        s.touch(50);
        assert_eq!(s.last_modified, 100);
        s.touch(-5);
        assert_eq!(s.last_modified, 100);
    }

    #[test]
    fn test_merge_trees_unions_buckets() {
        let mut a = DirectorySummary::new("a", 1, ["text"]);
        a.total_size = 4;
        let b = leaf("b", 6, 2, 9, 6);
        let merged = merge_trees(".", 0, [a, b]);
        assert_eq!(merged.total_size, 10);
        assert_eq!(merged.classified_size("compressed"), 6);
        for child in &merged.children {
            assert!(child.classified.contains_key("text"));
            assert!(child.classified.contains_key("compressed"));
        }
    }
}
