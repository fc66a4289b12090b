//! Built-in dependency graphs for the CLI and tests.

use attackgame_core::{DependencyGraph, Edge, GraphBuilder, IdAllocator, Node, Result};

/// Fixture identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureId {
    /// One AND root that is also the only target
    SingleRoot,

    /// root(AND) -> OR -> target(AND)
    Chain,

    /// Two roots feeding an OR node, AND target behind both
    Diamond,

    /// Seven nodes in three layers, two targets
    Layered,
}

impl FixtureId {
    /// Returns a list of all fixtures.
    pub fn all() -> Vec<FixtureId> {
        vec![
            FixtureId::SingleRoot,
            FixtureId::Chain,
            FixtureId::Diamond,
            FixtureId::Layered,
        ]
    }

    /// Returns the fixture name.
    pub fn name(&self) -> &'static str {
        match self {
            FixtureId::SingleRoot => "single_root",
            FixtureId::Chain => "chain",
            FixtureId::Diamond => "diamond",
            FixtureId::Layered => "layered",
        }
    }

    /// Returns a description of the fixture.
    pub fn description(&self) -> &'static str {
        match self {
            FixtureId::SingleRoot => "Single AND root, sure activation, reward 5 / penalty -3",
            FixtureId::Chain => "Three-node chain: entry point, OR pivot, AND target",
            FixtureId::Diamond => "Two entry points joined by an OR node before the target",
            FixtureId::Layered => "Two roots, three intermediate nodes, two targets",
        }
    }

    /// Builds the graph. Every call uses a fresh id allocator, so ids are
    /// identical across builds.
    pub fn build(&self) -> Result<DependencyGraph> {
        let mut ids = IdAllocator::new();
        let mut builder = GraphBuilder::new();
        match self {
            FixtureId::SingleRoot => {
                let root = ids.next_node_id();
                builder.add_node(
                    Node::and(root)
                        .with_target(5.0, -3.0)
                        .with_activation(-1.0, 1.0)
                        .with_disable_cost(-0.5)
                        .with_alert_probs(0.9, 0.1),
                );
            }
            FixtureId::Chain => {
                let (entry, pivot, goal) = (ids.next_node_id(), ids.next_node_id(), ids.next_node_id());
                builder
                    .add_node(Node::and(entry).with_activation(-0.5, 0.9).with_disable_cost(-0.4).with_alert_probs(0.8, 0.1))
                    .add_node(Node::or(pivot).with_disable_cost(-0.6).with_alert_probs(0.7, 0.2))
                    .add_node(
                        Node::and(goal)
                            .with_target(10.0, -10.0)
                            .with_activation(-1.0, 0.6)
                            .with_disable_cost(-1.0)
                            .with_alert_probs(0.9, 0.05),
                    )
                    .add_edge(Edge::new(ids.next_edge_id(), entry, pivot).with_activation(-0.3, 0.7))
                    .add_edge(Edge::new(ids.next_edge_id(), pivot, goal));
            }
            FixtureId::Diamond => {
                let (a, b, join, goal) = (
                    ids.next_node_id(),
                    ids.next_node_id(),
                    ids.next_node_id(),
                    ids.next_node_id(),
                );
                let (a_join, b_join, b_goal, join_goal) = (
                    ids.next_edge_id(),
                    ids.next_edge_id(),
                    ids.next_edge_id(),
                    ids.next_edge_id(),
                );
                builder
                    .add_node(Node::and(a).with_activation(-0.2, 0.8).with_disable_cost(-0.3).with_alert_probs(0.8, 0.1))
                    .add_node(Node::and(b).with_activation(-0.4, 0.6).with_disable_cost(-0.3).with_alert_probs(0.8, 0.1))
                    .add_node(Node::or(join).with_disable_cost(-0.5).with_alert_probs(0.75, 0.15))
                    .add_node(
                        Node::and(goal)
                            .with_target(8.0, -12.0)
                            .with_activation(-1.5, 0.5)
                            .with_disable_cost(-1.2)
                            .with_alert_probs(0.95, 0.05),
                    )
                    .add_edge(Edge::new(a_join, a, join).with_activation(-0.3, 0.5))
                    .add_edge(Edge::new(b_join, b, join).with_activation(-0.2, 0.4))
                    .add_edge(Edge::new(b_goal, b, goal))
                    .add_edge(Edge::new(join_goal, join, goal))
                    .set_min_cut([b_goal, join_goal]);
            }
            FixtureId::Layered => {
                let n: Vec<_> = (0..7).map(|_| ids.next_node_id()).collect();
                builder
                    .add_node(Node::and(n[0]).with_activation(-0.3, 0.8).with_disable_cost(-0.2).with_alert_probs(0.7, 0.1))
                    .add_node(Node::and(n[1]).with_activation(-0.5, 0.7).with_disable_cost(-0.2).with_alert_probs(0.7, 0.1))
                    .add_node(Node::or(n[2]).with_disable_cost(-0.4).with_alert_probs(0.8, 0.15))
                    .add_node(Node::and(n[3]).with_activation(-0.6, 0.5).with_disable_cost(-0.4).with_alert_probs(0.6, 0.1))
                    .add_node(Node::or(n[4]).with_disable_cost(-0.4).with_alert_probs(0.8, 0.2))
                    .add_node(
                        Node::and(n[5])
                            .with_target(12.0, -15.0)
                            .with_activation(-1.0, 0.4)
                            .with_disable_cost(-1.0)
                            .with_alert_probs(0.9, 0.05),
                    )
                    .add_node(
                        Node::or(n[6])
                            .with_target(6.0, -8.0)
                            .with_disable_cost(-0.8)
                            .with_alert_probs(0.85, 0.05),
                    );
                let links = [
                    (0, 2, -0.2, 0.6),
                    (1, 2, -0.3, 0.5),
                    (0, 3, 0.0, 0.0),
                    (1, 4, -0.4, 0.3),
                    (3, 4, -0.2, 0.6),
                    (2, 5, 0.0, 0.0),
                    (3, 5, 0.0, 0.0),
                    (4, 6, -0.5, 0.5),
                    (2, 6, -0.6, 0.4),
                ];
                for (from, to, cost, prob) in links {
                    builder.add_edge(Edge::new(ids.next_edge_id(), n[from], n[to]).with_activation(cost, prob));
                }
            }
        }
        builder.build()
    }
}

impl std::fmt::Display for FixtureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for FixtureId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single_root" | "singleroot" | "single" => Ok(FixtureId::SingleRoot),
            "chain" => Ok(FixtureId::Chain),
            "diamond" => Ok(FixtureId::Diamond),
            "layered" => Ok(FixtureId::Layered),
            _ => Err(format!("Unknown fixture: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attackgame_core::{EdgeId, NodeId};

    #[test]
    fn test_all_fixtures_build() {
        for fixture in FixtureId::all() {
            let graph = fixture.build().unwrap();
            assert!(!graph.target_set().is_empty(), "{} has no target", fixture);
            assert!(graph.root_set().iter().all(|r| graph.node(*r).unwrap().is_and()));
        }
    }

    #[test]
    fn test_fixture_ids_are_stable() {
        let a = FixtureId::Diamond.build().unwrap();
        let b = FixtureId::Diamond.build().unwrap();
        assert_eq!(
            a.nodes().map(|n| n.id).collect::<Vec<_>>(),
            b.nodes().map(|n| n.id).collect::<Vec<_>>()
        );
        assert_eq!(a.edge(EdgeId(1)).unwrap().target, NodeId(3));
        assert_eq!(a.min_cut_set().len(), 2);
    }

    #[test]
    fn test_parse_names() {
        for fixture in FixtureId::all() {
            assert_eq!(fixture.name().parse::<FixtureId>(), Ok(fixture));
        }
        assert!("nope".parse::<FixtureId>().is_err());
    }
}
