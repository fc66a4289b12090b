//! Attacker and defender actions for one time step.

use crate::error::{GameError, Result};
use crate::graph::DependencyGraph;
use crate::ids::{EdgeId, NodeId};
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Nodes the attacker attempts this step, with the edges used for each.
///
/// AND nodes are attempted directly and carry an empty edge set. OR nodes
/// are attempted through one or more incoming edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackerAction {
    attempts: BTreeMap<NodeId, BTreeSet<EdgeId>>,
}

impl AttackerAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts an AND node.
    pub fn attack_and_node(&mut self, node: NodeId) {
        self.attempts.entry(node).or_default();
    }

    /// Attempts an OR node through the given edges (merged with any edges
    /// already listed for it).
    pub fn attack_or_node(&mut self, node: NodeId, edges: impl IntoIterator<Item = EdgeId>) {
        self.attempts.entry(node).or_default().extend(edges);
    }

    /// Attempted nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.attempts.keys().copied()
    }

    /// Attempted nodes with their edge sets, in id order.
    pub fn attempts(&self) -> impl Iterator<Item = (NodeId, &BTreeSet<EdgeId>)> + '_ {
        self.attempts.iter().map(|(n, e)| (*n, e))
    }

    /// Edges used for `node`, if the node is attempted.
    pub fn edges_for(&self, node: NodeId) -> Option<&BTreeSet<EdgeId>> {
        self.attempts.get(&node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.attempts.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Checks the action against the graph and the state it is taken from.
    ///
    /// Every node must exist and be inactive in `prev`. AND nodes may not
    /// list edges; OR node edges must exist and enter that node.
    pub fn validate(&self, graph: &DependencyGraph, prev: &GameState) -> Result<()> {
        for (&node_id, edges) in &self.attempts {
            let node = graph.require_node(node_id)?;
            if prev.is_active(node_id) {
                return Err(GameError::AlreadyActive(node_id));
            }
            if node.is_and() && !edges.is_empty() {
                return Err(GameError::EdgesOnAndNode(node_id));
            }
            for &edge_id in edges {
                let edge = graph.require_edge(edge_id)?;
                if edge.target != node_id {
                    return Err(GameError::EdgeTargetMismatch {
                        edge: edge_id,
                        node: node_id,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Nodes the defender disables this step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefenderAction {
    disabled: BTreeSet<NodeId>,
}

impl DefenderAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(&mut self, node: NodeId) {
        self.disabled.insert(node);
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.disabled.contains(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.disabled.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.disabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disabled.is_empty()
    }

    /// Every disabled node must exist in the graph.
    pub fn validate(&self, graph: &DependencyGraph) -> Result<()> {
        for &node in &self.disabled {
            graph.require_node(node)?;
        }
        Ok(())
    }
}

impl FromIterator<NodeId> for DefenderAction {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            disabled: iter.into_iter().collect(),
        }
    }
}
