//! Cycle elimination over the sorted call graph.
//!
//! Each root gets an independent depth-first walk. A child edge pointing at a
//! node that is already on the current path is rewritten, in place, into a
//! [`Edge::Backref`] marker and not followed. Rewrites persist on the shared
//! node, so once every root has been walked the graph reachable from the roots
//! is acyclic and the renderers can follow every call edge.
//!
//! Nodes reached through several non-cyclic paths are expanded once per path.
//! A dense DAG with shared descendants therefore costs time exponential in its
//! depth; realistic call graphs have bounded fan-out, and the walk logs a
//! warning once the visit count passes [`VISIT_WARN_THRESHOLD`].

use super::registry::{Edge, NodeId, Registry};
use super::sorter::CallForest;
use crate::utils::config::VISIT_WARN_THRESHOLD;
use log::{debug, warn};

/// Counters collected by [`linearize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearizeStats {
    /// Number of root walks
    pub walks: usize,

    /// Node entries across all walks
    pub visits: u64,

    /// Edges rewritten into back-reference markers
    pub backrefs: usize,
}

/// Set of nodes on the current depth-first path
///
/// Owned by one `linearize` call and never stored on the nodes, so marks
/// cannot outlive it. Every root's walk leaves it empty again.
#[derive(Debug)]
struct ActivePath {
    active: Vec<bool>,
    depth: usize,
}

impl ActivePath {
    fn new(node_count: usize) -> Self {
        Self {
            active: vec![false; node_count],
            depth: 0,
        }
    }

    fn enter(&mut self, id: NodeId) {
        self.active[id.index()] = true;
        self.depth += 1;
    }

    fn leave(&mut self, id: NodeId) {
        self.active[id.index()] = false;
        self.depth -= 1;
    }

    fn contains(&self, id: NodeId) -> bool {
        self.active[id.index()]
    }

    fn is_empty(&self) -> bool {
        self.depth == 0
    }
}

/// Rewrite cyclic edges into back-reference markers, root by root
///
/// **Public** - run once after sorting, before rendering
pub fn linearize(forest: &mut CallForest) -> LinearizeStats {
    let roots = forest.roots().to_vec();
    let registry = forest.registry_mut();
    let mut stats = LinearizeStats::default();
    let mut warned = false;

    let mut path = ActivePath::new(registry.len());

    for root in roots {
        walk(registry, root, &mut path, &mut stats);
        debug_assert!(path.is_empty(), "active path not unwound after walk");
        stats.walks += 1;

        if !warned && stats.visits > VISIT_WARN_THRESHOLD {
            warn!(
                "Linearization visited {} nodes so far; shared call paths are expanding heavily",
                stats.visits
            );
            warned = true;
        }
    }

    debug!(
        "Linearized {} roots: {} visits, {} back-references",
        stats.walks, stats.visits, stats.backrefs
    );

    stats
}

/// Iterative depth-first walk from `root`
///
/// **Private** - one walk of [`linearize`]
fn walk(registry: &mut Registry, root: NodeId, path: &mut ActivePath, stats: &mut LinearizeStats) {
    // (node, index of the next child edge to look at)
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    path.enter(root);
    stats.visits += 1;

    while let Some(&(node, index)) = stack.last() {
        let target = match registry.node(node).children.get(index) {
            None => {
                stack.pop();
                path.leave(node);
                continue;
            }
            Some(edge) => edge.target(),
        };

        if let Some(top) = stack.last_mut() {
            top.1 += 1;
        }

        let Some(target) = target else {
            continue;
        };

        if path.contains(target) {
            let name = registry.node(target).name.clone();
            registry.node_mut(node).children[index] = Edge::Backref { name };
            stats.backrefs += 1;
        } else {
            path.enter(target);
            stack.push((target, 0));
            stats.visits += 1;
        }
    }
}
