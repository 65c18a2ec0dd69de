//! Frequency ordering of edges and roots.
//!
//! Children and roots are sorted by descending occurrence count. The sort is
//! stable, so equal counts keep first-observation order: the order a frame was
//! first linked into `associations`, or first registered as a root.

use super::registry::{Edge, NodeId, Registry};
use log::debug;

/// Registry with materialized children and a sorted root sequence
///
/// **Public** - input of the linearizer and the renderers
#[derive(Debug)]
pub struct CallForest {
    registry: Registry,
    roots: Vec<NodeId>,
}

impl CallForest {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Roots in descending count order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }
}

/// Materialize every node's children and order the roots by frequency
///
/// **Public** - main entry point for sorting
pub fn sort_by_frequency(mut registry: Registry) -> CallForest {
    let counts: Vec<u64> = registry.iter().map(|(_, node)| node.count).collect();
    let count_of = |id: &NodeId| counts[id.index()];

    let mut edges = 0usize;
    for node in registry.nodes_mut() {
        let mut targets: Vec<NodeId> = node.associations.iter().copied().collect();
        targets.sort_by(|a, b| count_of(b).cmp(&count_of(a)));
        edges += targets.len();
        node.children = targets.into_iter().map(Edge::Call).collect();
    }

    let mut roots: Vec<NodeId> = registry.roots().collect();
    roots.sort_by(|a, b| count_of(b).cmp(&count_of(a)));

    debug!(
        "Sorted {} edges across {} nodes, {} roots",
        edges,
        counts.len(),
        roots.len()
    );

    CallForest { registry, roots }
}
