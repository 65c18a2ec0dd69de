//! JSON call-tree output.
//!
//! Same tree as the HTML renderer, as nested objects:
//! `{ "count": 2, "name": "main", "called": [ ... ] }`, where a cut cycle is
//! the plain string `"Backlink: <name>"`.
//!
//! Call chains can be tens of thousands of frames deep, so nothing here
//! recurses on the call stack per tree level: documents are built with an
//! explicit stack, serde runs under `serde_stacker`, and entries drop
//! iteratively.

use crate::aggregator::registry::{backref_title, Edge, Node, NodeId, Registry};
use crate::aggregator::sorter::CallForest;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::debug;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::mem;
use std::path::Path;

/// Top-level JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the document was generated
    pub generated_at: String,

    /// One entry per root, in frequency order
    pub roots: Vec<TreeEntry>,
}

/// One rendered edge target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TreeEntry {
    Call {
        count: u64,
        name: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        called: Vec<TreeEntry>,
    },
    Backref(String),
}

impl Drop for TreeEntry {
    fn drop(&mut self) {
        let TreeEntry::Call { called, .. } = self else {
            return;
        };
        if called.is_empty() {
            return;
        }

        // Flatten the subtree so every entry is dropped with no children left
        let mut pending = mem::take(called);
        while let Some(mut entry) = pending.pop() {
            if let TreeEntry::Call { called, .. } = &mut entry {
                pending.append(called);
            }
        }
    }
}

// Nested `called` arrays must be read straight through the deserializer;
// untagged buffering would recurse once per level outside the stack guard.
impl<'de> Deserialize<'de> for TreeEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TreeEntryVisitor)
    }
}

struct TreeEntryVisitor;

impl<'de> Visitor<'de> for TreeEntryVisitor {
    type Value = TreeEntry;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a call entry object or a back-reference string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<TreeEntry, E> {
        Ok(TreeEntry::Backref(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<TreeEntry, E> {
        Ok(TreeEntry::Backref(value))
    }

    fn visit_map<A>(self, mut map: A) -> Result<TreeEntry, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut count: Option<u64> = None;
        let mut name: Option<String> = None;
        let mut called: Option<Vec<TreeEntry>> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "count" => {
                    if count.is_some() {
                        return Err(de::Error::duplicate_field("count"));
                    }
                    count = Some(map.next_value()?);
                }
                "name" => {
                    if name.is_some() {
                        return Err(de::Error::duplicate_field("name"));
                    }
                    name = Some(map.next_value()?);
                }
                "called" => {
                    if called.is_some() {
                        return Err(de::Error::duplicate_field("called"));
                    }
                    called = Some(map.next_value()?);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(TreeEntry::Call {
            count: count.ok_or_else(|| de::Error::missing_field("count"))?,
            name: name.ok_or_else(|| de::Error::missing_field("name"))?,
            called: called.unwrap_or_default(),
        })
    }
}

/// Build the JSON document for a linearized forest
///
/// **Public** - pure given `generated_at`
pub fn to_document(forest: &CallForest, generated_at: impl Into<String>) -> TreeDocument {
    TreeDocument {
        version: SCHEMA_VERSION.to_string(),
        generated_at: generated_at.into(),
        roots: entries_for_roots(forest.registry(), forest.roots()),
    }
}

/// A node whose entry is still collecting its children
struct PendingEntry<'a> {
    node: &'a Node,
    next: usize,
    called: Vec<TreeEntry>,
}

impl<'a> PendingEntry<'a> {
    fn new(node: &'a Node) -> Self {
        Self {
            node,
            next: 0,
            called: Vec::with_capacity(node.children.len()),
        }
    }

    fn finish(self) -> TreeEntry {
        TreeEntry::Call {
            count: self.node.count,
            name: self.node.display_name(),
            called: self.called,
        }
    }
}

/// Build every root's entry bottom-up with an explicit stack
///
/// **Private** - helper for [`to_document`]
fn entries_for_roots(registry: &Registry, roots: &[NodeId]) -> Vec<TreeEntry> {
    let mut entries = Vec::with_capacity(roots.len());

    for &root in roots {
        let mut stack = vec![PendingEntry::new(registry.node(root))];

        while let Some(top) = stack.last_mut() {
            let node = top.node;
            match node.children.get(top.next) {
                Some(Edge::Call(child)) => {
                    top.next += 1;
                    stack.push(PendingEntry::new(registry.node(*child)));
                }
                Some(Edge::Backref { name }) => {
                    top.next += 1;
                    top.called.push(TreeEntry::Backref(backref_title(name)));
                }
                None => {
                    if let Some(done) = stack.pop() {
                        let target = match stack.last_mut() {
                            Some(parent) => &mut parent.called,
                            None => &mut entries,
                        };
                        target.push(done.finish());
                    }
                }
            }
        }
    }

    entries
}

/// Serialize a document as compact JSON
///
/// Compact because indentation grows with depth and would make deep trees
/// quadratic in size.
pub fn render_json(document: &TreeDocument) -> Result<String, OutputError> {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::new(&mut buffer);
    document
        .serialize(serde_stacker::Serializer::new(&mut serializer))
        .map_err(OutputError::SerializationFailed)?;
    buffer.push(b'\n');

    String::from_utf8(buffer).map_err(OutputError::InvalidEncoding)
}

/// Read a tree document back from a JSON file
///
/// **Public** - useful for inspection and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_tree_json(input_path: impl AsRef<Path>) -> Result<TreeDocument, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading tree document from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;

    let mut deserializer = serde_json::Deserializer::from_reader(BufReader::new(file));
    deserializer.disable_recursion_limit();
    let document = TreeDocument::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
        .map_err(OutputError::SerializationFailed)?;
    deserializer.end().map_err(OutputError::SerializationFailed)?;

    debug!(
        "Tree document loaded: version {}, {} roots",
        document.version,
        document.roots.len()
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{linearize, sort_by_frequency};
    use serde_json::json;
    use std::io::Write;

    /// Entries in a subtree, markers included
    fn subtree_size(entry: &TreeEntry) -> usize {
        let mut size = 0;
        let mut pending = vec![entry];
        while let Some(entry) = pending.pop() {
            size += 1;
            if let TreeEntry::Call { called, .. } = entry {
                pending.extend(called.iter());
            }
        }
        size
    }

    /// Number of nested `Call` levels along the first child of each entry
    fn chain_depth(entry: &TreeEntry) -> usize {
        let mut depth = 0;
        let mut current = Some(entry);
        while let Some(TreeEntry::Call { called, .. }) = current {
            depth += 1;
            current = called.first();
        }
        depth
    }

    fn deep_chain_forest(len: usize) -> CallForest {
        let mut registry = Registry::new();
        let ids: Vec<NodeId> = (0..len)
            .map(|i| registry.observe(&format!("#f{}", i)))
            .collect();
        for pair in ids.windows(2) {
            registry.link(pair[0], pair[1]);
        }
        registry.link(ids[len - 1], ids[0]);
        registry.mark_root(ids[0]);

        let mut forest = sort_by_frequency(registry);
        linearize(&mut forest);
        forest
    }

    #[test]
    fn test_document_shape() {
        let mut registry = Registry::new();
        let a = registry.observe("#A");
        let b = registry.observe("#B");
        registry.link(b, a);
        registry.link(a, b);
        registry.mark_root(b);

        let mut forest = sort_by_frequency(registry);
        linearize(&mut forest);

        let document = to_document(&forest, "2024-01-01T00:00:00Z");
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(
            value,
            json!({
                "version": SCHEMA_VERSION,
                "generated_at": "2024-01-01T00:00:00Z",
                "roots": [
                    {
                        "count": 1,
                        "name": "B",
                        "called": [
                            { "count": 1, "name": "A", "called": ["Backlink: B"] }
                        ]
                    }
                ]
            })
        );
        assert_eq!(subtree_size(&document.roots[0]), 3);
    }

    #[test]
    fn test_leaf_omits_called() {
        let entry = TreeEntry::Call {
            count: 3,
            name: "leaf".to_string(),
            called: Vec::new(),
        };
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({"count": 3, "name": "leaf"}));
    }

    #[test]
    fn test_entries_parse_back() {
        let parsed: Vec<TreeEntry> =
            serde_json::from_value(json!([{"count": 1, "name": "x"}, "Backlink: y"])).unwrap();

        assert_eq!(
            parsed,
            vec![
                TreeEntry::Call {
                    count: 1,
                    name: "x".to_string(),
                    called: Vec::new()
                },
                TreeEntry::Backref("Backlink: y".to_string()),
            ]
        );
    }

    #[test]
    fn test_entry_missing_count_is_rejected() {
        let result: Result<TreeEntry, _> = serde_json::from_value(json!({"name": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_deep_chain_round_trips() {
        let forest = deep_chain_forest(50_000);

        let document = to_document(&forest, "2024-01-01T00:00:00Z");
        assert_eq!(chain_depth(&document.roots[0]), 50_000);
        assert_eq!(subtree_size(&document.roots[0]), 50_001);

        let json = render_json(&document).unwrap();
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();

        let loaded = read_tree_json(temp_file.path()).unwrap();
        assert_eq!(loaded.roots.len(), 1);
        assert_eq!(chain_depth(&loaded.roots[0]), 50_000);
        assert_eq!(subtree_size(&loaded.roots[0]), 50_001);
    }

    #[test]
    fn test_trailing_content_is_rejected() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file
            .write_all(br#"{"version":"1.0.0","generated_at":"x","roots":[]} []"#)
            .unwrap();

        assert!(matches!(
            read_tree_json(temp_file.path()),
            Err(OutputError::SerializationFailed(_))
        ));
    }
}
