//! Frame registry: one node per distinct frame identifier.
//!
//! Nodes live in an arena and are referenced by [`NodeId`]. Every other
//! component (scanner, sorter, linearizer, renderers) goes through the
//! registry instead of holding node state of its own.

use crate::parser::frame::display_name;
use crate::utils::config::BACKREF_PREFIX;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::collections::HashMap;

/// Index of a node in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outgoing edge of a node
///
/// **Public** - consumed by the linearizer and both renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    /// Normal call edge
    Call(NodeId),

    /// Cyclic edge, cut at the point of detection. Carries the target's name.
    Backref { name: String },
}

impl Edge {
    /// Target node of a normal call edge
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Edge::Call(id) => Some(*id),
            Edge::Backref { .. } => None,
        }
    }
}

/// One distinct call frame
#[derive(Debug, Clone)]
pub struct Node {
    /// Frame identifier (the full frame line)
    pub name: String,

    /// Number of frame lines with this identifier
    pub count: u64,

    /// Frames seen adjacent to this one, in first-observation order
    pub associations: IndexSet<NodeId>,

    /// Sorted view of `associations`, filled in by the frequency sorter
    pub children: Vec<Edge>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            count: 1,
            associations: IndexSet::new(),
            children: Vec::new(),
        }
    }

    /// Human-readable frame name (marker stripped)
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }

    /// Title shown for this node: `calls: <count>, <name>`
    pub fn title(&self) -> String {
        format!("calls: {}, {}", self.count, self.display_name())
    }
}

/// Text a back-reference marker renders as
pub fn backref_title(name: &str) -> String {
    format!("{}{}", BACKREF_PREFIX, display_name(name))
}

/// Registry of all frames seen during a run, plus the root set
#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
    roots: IndexMap<String, NodeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the node for `name`, bumping its count, or create it with count 1
    ///
    /// **Public** - called by the scanner for every frame line
    pub fn observe(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.by_name.get(name) {
            self.nodes[id.0].count += 1;
            return id;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name.to_string()));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Record `to` as associated with `from`. Idempotent.
    pub fn link(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from.0].associations.insert(to);
    }

    /// Register a node as a root. Re-marking keeps the first position.
    pub fn mark_root(&mut self, id: NodeId) {
        let name = &self.nodes[id.0].name;
        if !self.roots.contains_key(name) {
            debug!("New root: {}", name);
            self.roots.insert(name.clone(), id);
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.id_of(name).map(|id| self.node(id))
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Roots in the order they were first registered
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.values().copied()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.roots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_creates_then_counts() {
        let mut registry = Registry::new();
        let a = registry.observe("#A");
        let again = registry.observe("#A");
        let b = registry.observe("#B");

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.node(a).count, 2);
        assert_eq!(registry.node(b).count, 1);
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut registry = Registry::new();
        let a = registry.observe("#A");
        let b = registry.observe("#B");

        registry.link(a, b);
        registry.link(a, b);

        assert_eq!(registry.node(a).associations.len(), 1);
        assert!(registry.node(b).associations.is_empty());
    }

    #[test]
    fn test_mark_root_keeps_first_position() {
        let mut registry = Registry::new();
        let a = registry.observe("#A");
        let b = registry.observe("#B");

        registry.mark_root(b);
        registry.mark_root(a);
        registry.mark_root(b);

        let roots: Vec<NodeId> = registry.roots().collect();
        assert_eq!(roots, vec![b, a]);
    }

    #[test]
    fn test_titles() {
        let mut registry = Registry::new();
        let id = registry.observe("#main\t loop");
        registry.observe("#main\t loop");

        assert_eq!(registry.node(id).title(), "calls: 2, main loop");
        assert_eq!(backref_title("#main\t loop"), "Backlink: main loop");
    }
}
