//! JSON snapshots of an audit tree.
//!
//! One object per node, nested under `subdirectories`. Bucket counters are flattened into
//! `size_in_bytes_<bucket>` keys. Loading is strict: every field is required, and the bucket keys
//! present on the root must appear on (and only on) every descendant.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::{AuditError, DirectorySummary};

const PATH: &str = "path";
const LEVEL: &str = "level";
const SIZE: &str = "size_in_bytes";
const BUCKET_PREFIX: &str = "size_in_bytes_";
const NUM_FILES: &str = "num_files";
const LAST_TOUCHED: &str = "last_touched";
const SUBDIRECTORIES: &str = "subdirectories";

/// Node label used in errors that happen before any node could be read.
const DOCUMENT: &str = "<document>";

#[derive(Serialize)]
struct SummaryRecord<'a> {
    path: &'a str,
    level: usize,
    size_in_bytes: u64,
    #[serde(flatten)]
    buckets: BTreeMap<String, u64>,
    num_files: u64,
    last_touched: i64,
    subdirectories: Vec<SummaryRecord<'a>>,
}

impl<'a> From<&'a DirectorySummary> for SummaryRecord<'a> {
    fn from(node: &'a DirectorySummary) -> Self {
        SummaryRecord {
            path: &node.rel_path,
            level: node.depth,
            size_in_bytes: node.total_size,
            buckets: node
                .classified
                .iter()
                .map(|(name, bytes)| (format!("{BUCKET_PREFIX}{name}"), *bytes))
                .collect(),
            num_files: node.file_count,
            last_touched: node.last_modified,
            subdirectories: node.children.iter().map(SummaryRecord::from).collect(),
        }
    }
}

/// Encode `tree` as pretty-printed JSON.
pub fn to_json(tree: &DirectorySummary) -> Result<String, AuditError> {
    Ok(serde_json::to_string_pretty(&SummaryRecord::from(tree))?)
}

/// Decode a tree written by [`to_json`] (or by earlier releases using the same field names).
pub fn from_json(text: &str) -> Result<DirectorySummary, AuditError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| AuditError::malformed(DOCUMENT, "json", e.to_string()))?;
    let root = value
        .as_object()
        .ok_or_else(|| AuditError::malformed(DOCUMENT, "<root>", "is not an object"))?;
    let buckets: Vec<String> = root
        .keys()
        .filter_map(|k| k.strip_prefix(BUCKET_PREFIX))
        .map(str::to_string)
        .collect();
    read_node(&value, None, &buckets, DOCUMENT)
}

/// Write `tree` to `path` as JSON.
pub fn save(tree: &DirectorySummary, path: &Path) -> Result<(), AuditError> {
    let text = to_json(tree)?;
    std::fs::write(path, text).map_err(|e| AuditError::io(path, e))
}

/// Read a JSON snapshot from `path`.
pub fn load(path: &Path) -> Result<DirectorySummary, AuditError> {
    let text = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;
    from_json(&text)
}

fn read_node(
    value: &Value,
    parent_level: Option<usize>,
    buckets: &[String],
    location: &str,
) -> Result<DirectorySummary, AuditError> {
    let obj = value
        .as_object()
        .ok_or_else(|| AuditError::malformed(location, "<node>", "is not an object"))?;

    let rel_path = field(obj, location, PATH)?
        .as_str()
        .ok_or_else(|| AuditError::malformed(location, PATH, "must be a string"))?;
    let node = rel_path;

    let depth = usize::try_from(read_u64(obj, node, LEVEL)?)
        .map_err(|_| AuditError::malformed(node, LEVEL, "is out of range"))?;
    if let Some(parent) = parent_level
        && depth != parent + 1
    {
        return Err(AuditError::malformed(
            node,
            LEVEL,
            format!("is {depth}, expected {}", parent + 1),
        ));
    }

    let mut classified = BTreeMap::new();
    for name in buckets {
        let key = format!("{BUCKET_PREFIX}{name}");
        classified.insert(name.clone(), read_u64(obj, node, &key)?);
    }
    if let Some(extra) = obj.keys().find(|k| {
        k.strip_prefix(BUCKET_PREFIX)
            .is_some_and(|name| !buckets.iter().any(|b| b == name))
    }) {
        return Err(AuditError::malformed(
            node,
            extra.as_str(),
            "is not a bucket tracked by the root",
        ));
    }

    let subdirectories = field(obj, node, SUBDIRECTORIES)?
        .as_array()
        .ok_or_else(|| AuditError::malformed(node, SUBDIRECTORIES, "must be an array"))?;
    let children = subdirectories
        .iter()
        .enumerate()
        .map(|(i, child)| {
            let location = format!("{node}/{SUBDIRECTORIES}[{i}]");
            read_node(child, Some(depth), buckets, &location)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DirectorySummary {
        rel_path: rel_path.to_string(),
        depth,
        total_size: read_u64(obj, node, SIZE)?,
        classified,
        file_count: read_u64(obj, node, NUM_FILES)?,
        last_modified: read_i64(obj, node, LAST_TOUCHED)?,
        children,
    })
}

fn field<'a>(obj: &'a Map<String, Value>, node: &str, name: &str) -> Result<&'a Value, AuditError> {
    obj.get(name)
        .ok_or_else(|| AuditError::malformed(node, name, "is missing"))
}

fn read_u64(obj: &Map<String, Value>, node: &str, name: &str) -> Result<u64, AuditError> {
    field(obj, node, name)?
        .as_u64()
        .ok_or_else(|| AuditError::malformed(node, name, "must be a non-negative integer"))
}

fn read_i64(obj: &Map<String, Value>, node: &str, name: &str) -> Result<i64, AuditError> {
    field(obj, node, name)?
        .as_i64()
        .ok_or_else(|| AuditError::malformed(node, name, "must be an integer"))
}
