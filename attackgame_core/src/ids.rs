//! Identifiers for graph nodes and edges.

use serde::{Deserialize, Serialize};

/// Identifier of a node in a dependency graph.
///
/// Ids are positive and dense within one graph-construction session, which
/// lets game states be rendered as compact bit strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Identifier of an edge in a dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl NodeId {
    /// Returns the raw id.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl EdgeId {
    /// Returns the raw id.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Hands out monotonically increasing node and edge ids.
///
/// One allocator belongs to one graph-construction session. Two graphs built
/// from two fresh allocators get identical ids, which is what deterministic
/// fixtures rely on.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_node: u32,
    next_edge: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first node and edge ids are 1.
    pub fn new() -> Self {
        Self {
            next_node: 1,
            next_edge: 1,
        }
    }

    /// Returns the next unused node id.
    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Returns the next unused edge id.
    pub fn next_edge_id(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        id
    }

    /// Restarts numbering at 1 for a new, independent graph build.
    pub fn reset(&mut self) {
        self.next_node = 1;
        self.next_edge = 1;
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
