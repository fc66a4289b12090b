//! Game states: which nodes of the graph are currently active.

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of active nodes at one time step.
///
/// Identity is the sorted set of node ids, so two states are equal exactly
/// when their active sets are equal. States are always valid map keys; there
/// is no separate "finalize" step after mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameState {
    active: BTreeSet<NodeId>,
}

impl GameState {
    /// Creates a state with no active nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state from the given active nodes.
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            active: nodes.into_iter().collect(),
        }
    }

    /// Marks a node active. Returns false if it already was.
    pub fn activate(&mut self, node: NodeId) -> bool {
        self.active.insert(node)
    }

    /// Marks a node inactive. Returns false if it was not active.
    pub fn deactivate(&mut self, node: NodeId) -> bool {
        self.active.remove(&node)
    }

    pub fn is_active(&self, node: NodeId) -> bool {
        self.active.contains(&node)
    }

    /// Active nodes in ascending id order.
    pub fn active_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.active.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Highest active node id, if any.
    pub fn max_active(&self) -> Option<NodeId> {
        self.active.iter().next_back().copied()
    }

    /// Renders the state as a bit string: character `i - 1` is `'1'` when
    /// node `i` is active, up to the highest active id. The empty state
    /// renders as an empty string.
    pub fn canonical_id(&self) -> String {
        let Some(max) = self.max_active() else {
            return String::new();
        };
        (1..=max.get())
            .map(|i| if self.active.contains(&NodeId(i)) { '1' } else { '0' })
            .collect()
    }
}

impl FromIterator<NodeId> for GameState {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self::from_nodes(iter)
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, node) in self.active.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", node)?;
        }
        write!(f, "]")
    }
}
