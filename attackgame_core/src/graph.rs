//! The dependency graph: a DAG of AND/OR nodes over which the game is played.
//!
//! A [`DependencyGraph`] is immutable once built. Construction goes through
//! [`GraphBuilder`], which rejects malformed input up front:
//!
//! - empty graphs, duplicate ids, dangling edge endpoints, self loops
//! - cycles
//! - roots (in-degree zero) that are not AND nodes
//! - probabilities outside [0, 1], payoffs on non-target nodes
//!
//! Iteration order over nodes and edges is always ascending id order, which
//! keeps seeded simulations reproducible.

use crate::edge::Edge;
use crate::error::{GameError, Result};
use crate::ids::{EdgeId, NodeId};
use crate::node::Node;
use crate::state::GameState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// GRAPH
// =============================================================================

/// A validated, acyclic dependency graph.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    incoming: BTreeMap<NodeId, Vec<EdgeId>>,
    outgoing: BTreeMap<NodeId, Vec<EdgeId>>,
    target_set: BTreeSet<NodeId>,
    root_set: BTreeSet<NodeId>,
    min_cut_set: BTreeSet<EdgeId>,
    topological_order: Vec<NodeId>,
}

impl DependencyGraph {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Looks up a node, failing with [`GameError::UnknownNode`].
    pub fn require_node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(GameError::UnknownNode(id))
    }

    /// Looks up an edge, failing with [`GameError::UnknownEdge`].
    pub fn require_edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges.get(&id).ok_or(GameError::UnknownEdge(id))
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// All edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.incoming.get(&id).map_or(0, Vec::len)
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.outgoing.get(&id).map_or(0, Vec::len)
    }

    /// Edges entering `id`.
    pub fn incoming_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(move |e| self.edges.get(e))
    }

    /// Edges leaving `id`.
    pub fn outgoing_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(move |e| self.edges.get(e))
    }

    /// Direct predecessors of `id`.
    pub fn parents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming_edges(id).map(|e| e.source)
    }

    /// Direct successors of `id`.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing_edges(id).map(|e| e.target)
    }

    /// Every node from which `id` is reachable (excluding `id`).
    pub fn ancestors(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.reach(id, |g, n| g.parents(n).collect())
    }

    /// Every node reachable from `id` (excluding `id`).
    pub fn descendants(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.reach(id, |g, n| g.children(n).collect())
    }

    fn reach<F>(&self, start: NodeId, next: F) -> BTreeSet<NodeId>
    where
        F: Fn(&Self, NodeId) -> Vec<NodeId>,
    {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = next(self, start).into();
        while let Some(n) = queue.pop_front() {
            if seen.insert(n) {
                queue.extend(next(self, n));
            }
        }
        seen
    }

    /// Goal nodes (role = target).
    pub fn target_set(&self) -> &BTreeSet<NodeId> {
        &self.target_set
    }

    /// Entry points: nodes without incoming edges. All are AND nodes.
    pub fn root_set(&self) -> &BTreeSet<NodeId> {
        &self.root_set
    }

    /// Precomputed min-cut edges, supplied at build time.
    pub fn min_cut_set(&self) -> &BTreeSet<EdgeId> {
        &self.min_cut_set
    }

    pub fn topological_order(&self) -> &[NodeId] {
        &self.topological_order
    }

    /// Whether the attacker may attempt `id` given the active nodes in
    /// `state`: all parents active for AND nodes (vacuously true for roots),
    /// at least one active parent for OR nodes.
    pub fn is_enabled(&self, id: NodeId, state: &GameState) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if node.is_and() {
            self.parents(id).all(|p| state.is_active(p))
        } else {
            self.parents(id).any(|p| state.is_active(p))
        }
    }

    /// Inactive nodes the attacker may attempt next, in id order.
    pub fn attack_candidates(&self, state: &GameState) -> Vec<NodeId> {
        self.nodes
            .keys()
            .copied()
            .filter(|&id| !state.is_active(id) && self.is_enabled(id, state))
            .collect()
    }

    /// Incoming edges of an OR node whose source is active in `state`.
    /// Empty for AND nodes and for nodes that are already active.
    pub fn enabling_edges(&self, id: NodeId, state: &GameState) -> Vec<EdgeId> {
        match self.nodes.get(&id) {
            Some(node) if node.is_or() && !state.is_active(id) => self
                .incoming_edges(id)
                .filter(|e| state.is_active(e.source))
                .map(|e| e.id)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Serializable description of this graph.
    pub fn to_spec(&self) -> GraphSpec {
        GraphSpec {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            min_cut: self.min_cut_set.iter().copied().collect(),
        }
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Collects nodes and edges and validates them into a [`DependencyGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    min_cut: Vec<EdgeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Records the min-cut edges computed by an external max-flow pass.
    pub fn set_min_cut(&mut self, edges: impl IntoIterator<Item = EdgeId>) -> &mut Self {
        self.min_cut = edges.into_iter().collect();
        self
    }

    /// Validates the collected parts and builds the graph.
    ///
    /// Topological positions are (re)assigned from a Kahn ordering that
    /// breaks ties by ascending node id.
    pub fn build(&self) -> Result<DependencyGraph> {
        if self.nodes.is_empty() {
            return Err(GameError::EmptyGraph);
        }

        let mut nodes = BTreeMap::new();
        for node in &self.nodes {
            if node.id.get() == 0 {
                return Err(GameError::ZeroNodeId);
            }
            node.validate()?;
            if nodes.insert(node.id, node.clone()).is_some() {
                return Err(GameError::DuplicateNode(node.id));
            }
        }

        let mut edges = BTreeMap::new();
        let mut incoming: BTreeMap<NodeId, Vec<EdgeId>> = BTreeMap::new();
        let mut outgoing: BTreeMap<NodeId, Vec<EdgeId>> = BTreeMap::new();
        for edge in &self.edges {
            if edge.id.get() == 0 {
                return Err(GameError::ZeroEdgeId);
            }
            edge.validate()?;
            for endpoint in [edge.source, edge.target] {
                if !nodes.contains_key(&endpoint) {
                    return Err(GameError::UnknownNode(endpoint));
                }
            }
            if edges.insert(edge.id, edge.clone()).is_some() {
                return Err(GameError::DuplicateEdge(edge.id));
            }
        }
        // Insert adjacency in edge id order so iteration is deterministic.
        for edge in edges.values() {
            incoming.entry(edge.target).or_default().push(edge.id);
            outgoing.entry(edge.source).or_default().push(edge.id);
        }

        let topological_order = kahn_order(&nodes, &edges, &incoming)?;
        for (position, id) in topological_order.iter().enumerate() {
            if let Some(node) = nodes.get_mut(id) {
                node.topological_position = position;
            }
        }

        let root_set: BTreeSet<NodeId> = nodes
            .keys()
            .copied()
            .filter(|id| incoming.get(id).map_or(true, Vec::is_empty))
            .collect();
        if let Some(bad) = root_set.iter().find(|id| !nodes[*id].is_and()) {
            return Err(GameError::NonAndRoot(*bad));
        }

        let target_set = nodes
            .values()
            .filter(|n| n.is_target())
            .map(|n| n.id)
            .collect();

        let mut min_cut_set = BTreeSet::new();
        for id in &self.min_cut {
            if !edges.contains_key(id) {
                return Err(GameError::UnknownEdge(*id));
            }
            min_cut_set.insert(*id);
        }

        Ok(DependencyGraph {
            nodes,
            edges,
            incoming,
            outgoing,
            target_set,
            root_set,
            min_cut_set,
            topological_order,
        })
    }
}

fn kahn_order(
    nodes: &BTreeMap<NodeId, Node>,
    edges: &BTreeMap<EdgeId, Edge>,
    incoming: &BTreeMap<NodeId, Vec<EdgeId>>,
) -> Result<Vec<NodeId>> {
    let mut remaining: BTreeMap<NodeId, usize> = nodes
        .keys()
        .map(|id| (*id, incoming.get(id).map_or(0, Vec::len)))
        .collect();
    let mut children: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for edge in edges.values() {
        children.entry(edge.source).or_default().push(edge.target);
    }

    let mut ready: BTreeSet<NodeId> = remaining
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(id) = ready.pop_first() {
        order.push(id);
        for child in children.get(&id).into_iter().flatten() {
            if let Some(deg) = remaining.get_mut(child) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(*child);
                }
            }
        }
    }

    // Nodes left with unresolved parents sit on or behind a cycle.
    if let Some((stuck, _)) = remaining.iter().find(|(_, deg)| **deg > 0) {
        return Err(GameError::CyclicGraph(*stuck));
    }
    Ok(order)
}

// =============================================================================
// SERIALIZED FORM
// =============================================================================

/// Plain description of a graph, as produced by an external generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    pub nodes: Vec<Node>,

    #[serde(default)]
    pub edges: Vec<Edge>,

    #[serde(default)]
    pub min_cut: Vec<EdgeId>,
}

impl GraphSpec {
    /// Validates the description into a graph.
    pub fn build(&self) -> Result<DependencyGraph> {
        let mut builder = GraphBuilder::new();
        for node in &self.nodes {
            builder.add_node(node.clone());
        }
        for edge in &self.edges {
            builder.add_edge(edge.clone());
        }
        builder.set_min_cut(self.min_cut.iter().copied());
        builder.build()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;

    /// root(AND) -> mid(OR) -> goal(AND, target), plus root -> goal.
    fn sample_graph() -> (DependencyGraph, [NodeId; 3], [EdgeId; 3]) {
        let mut ids = IdAllocator::new();
        let (root, mid, goal) = (ids.next_node_id(), ids.next_node_id(), ids.next_node_id());
        let (e1, e2, e3) = (ids.next_edge_id(), ids.next_edge_id(), ids.next_edge_id());

        let mut builder = GraphBuilder::new();
        builder
            .add_node(Node::and(root).with_activation(-1.0, 0.8))
            .add_node(Node::or(mid))
            .add_node(Node::and(goal).with_target(10.0, -10.0).with_activation(-2.0, 0.5))
            .add_edge(Edge::new(e1, root, mid).with_activation(-0.5, 0.6))
            .add_edge(Edge::new(e2, mid, goal))
            .add_edge(Edge::new(e3, root, goal))
            .set_min_cut([e2]);
        (builder.build().unwrap(), [root, mid, goal], [e1, e2, e3])
    }

    #[test]
    fn test_derived_sets() {
        let (graph, [root, mid, goal], [_, e2, _]) = sample_graph();
        assert_eq!(graph.root_set().iter().copied().collect::<Vec<_>>(), vec![root]);
        assert_eq!(graph.target_set().iter().copied().collect::<Vec<_>>(), vec![goal]);
        assert!(graph.min_cut_set().contains(&e2));
        assert_eq!(graph.topological_order(), &[root, mid, goal]);
        assert_eq!(graph.node(goal).unwrap().topological_position, 2);
    }

    #[test]
    fn test_degrees_and_reachability() {
        let (graph, [root, mid, goal], _) = sample_graph();
        assert_eq!(graph.in_degree(goal), 2);
        assert_eq!(graph.out_degree(root), 2);
        assert_eq!(graph.in_degree(root), 0);
        assert_eq!(graph.ancestors(goal), [root, mid].into_iter().collect());
        assert_eq!(graph.descendants(root), [mid, goal].into_iter().collect());
        assert!(graph.descendants(goal).is_empty());
    }

    #[test]
    fn test_enabled_and_candidates() {
        let (graph, [root, mid, goal], [e1, _, _]) = sample_graph();
        let empty = GameState::new();
        assert_eq!(graph.attack_candidates(&empty), vec![root]);

        let after_root = GameState::from_nodes([root]);
        assert!(graph.is_enabled(mid, &after_root));
        // goal is AND: needs both root and mid
        assert!(!graph.is_enabled(goal, &after_root));
        assert_eq!(graph.attack_candidates(&after_root), vec![mid]);
        assert_eq!(graph.enabling_edges(mid, &after_root), vec![e1]);
        assert!(graph.enabling_edges(goal, &after_root).is_empty());

        let both = GameState::from_nodes([root, mid]);
        assert_eq!(graph.attack_candidates(&both), vec![goal]);
    }

    #[test]
    fn test_rejects_empty_graph() {
        assert_eq!(GraphBuilder::new().build().unwrap_err(), GameError::EmptyGraph);
    }

    #[test]
    fn test_rejects_or_root() {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::or(NodeId(1)));
        assert_eq!(builder.build().unwrap_err(), GameError::NonAndRoot(NodeId(1)));
    }

    #[test]
    fn test_rejects_cycle() {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(Node::and(NodeId(1)))
            .add_node(Node::and(NodeId(2)))
            .add_node(Node::or(NodeId(3)))
            .add_edge(Edge::new(EdgeId(1), NodeId(1), NodeId(2)))
            .add_edge(Edge::new(EdgeId(2), NodeId(2), NodeId(3)))
            .add_edge(Edge::new(EdgeId(3), NodeId(3), NodeId(2)));
        assert!(matches!(builder.build(), Err(GameError::CyclicGraph(_))));
    }

    #[test]
    fn test_rejects_dangling_and_duplicate() {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(Node::and(NodeId(1)))
            .add_edge(Edge::new(EdgeId(1), NodeId(1), NodeId(9)));
        assert_eq!(builder.build().unwrap_err(), GameError::UnknownNode(NodeId(9)));

        let mut builder = GraphBuilder::new();
        builder.add_node(Node::and(NodeId(1))).add_node(Node::and(NodeId(1)));
        assert_eq!(builder.build().unwrap_err(), GameError::DuplicateNode(NodeId(1)));
    }

    #[test]
    fn test_rejects_zero_ids() {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::and(NodeId(0)));
        assert_eq!(builder.build().unwrap_err(), GameError::ZeroNodeId);

        let mut builder = GraphBuilder::new();
        builder
            .add_node(Node::and(NodeId(1)))
            .add_node(Node::or(NodeId(2)))
            .add_edge(Edge::new(EdgeId(0), NodeId(1), NodeId(2)));
        assert_eq!(builder.build().unwrap_err(), GameError::ZeroEdgeId);
    }

    #[test]
    fn test_rejects_unknown_min_cut_edge() {
        let mut builder = GraphBuilder::new();
        builder.add_node(Node::and(NodeId(1))).set_min_cut([EdgeId(4)]);
        assert_eq!(builder.build().unwrap_err(), GameError::UnknownEdge(EdgeId(4)));
    }

    #[test]
    fn test_spec_json_round_trip() {
        let (graph, _, _) = sample_graph();
        let json = graph.to_spec().to_json().unwrap();
        let rebuilt = GraphSpec::from_json(&json).unwrap().build().unwrap();
        assert_eq!(rebuilt.node_count(), 3);
        assert_eq!(rebuilt.edge_count(), 3);
        assert_eq!(rebuilt.min_cut_set(), graph.min_cut_set());
    }
}
