//! Aggregation of scanned frames into an acyclic call forest.
//!
//! This module transforms scanned traces into:
//! - A frame registry (one node per frame, with counts and associations)
//! - A frequency-ordered forest of roots and children
//! - A cycle-free graph, with cyclic edges cut into back-reference markers

pub mod linearizer;
pub mod registry;
pub mod sorter;

// Re-export main types and functions
pub use linearizer::{linearize, LinearizeStats};
pub use registry::{Edge, Node, NodeId, Registry};
pub use sorter::{sort_by_frequency, CallForest};
