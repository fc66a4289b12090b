//! Error types for the attack-graph game model.

use crate::ids::{EdgeId, NodeId};
use thiserror::Error;

/// Precondition violations detected by the model, the oracle or the
/// simulation loop.
///
/// None of these are transient: there is no I/O in the engine, so every
/// variant describes a programming or configuration mistake that the caller
/// must fix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// A probability parameter lies outside [0, 1] or is not finite
    #[error("Invalid probability for {field}: {value}")]
    InvalidProbability { field: String, value: f64 },

    /// A payoff or cost parameter is not finite
    #[error("Invalid parameter {field}: {value}")]
    InvalidParameter { field: String, value: f64 },

    /// A node id is not part of the graph
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// An edge id is not part of the graph
    #[error("Unknown edge: {0}")]
    UnknownEdge(EdgeId),

    /// The same node id was added twice
    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeId),

    /// The same edge id was added twice
    #[error("Duplicate edge: {0}")]
    DuplicateEdge(EdgeId),

    /// A graph must contain at least one node
    #[error("Dependency graph is empty")]
    EmptyGraph,

    /// The dependency graph contains a directed cycle
    #[error("Dependency graph contains a cycle through node {0}")]
    CyclicGraph(NodeId),

    /// An edge connects a node to itself
    #[error("Self-loop on node {0}")]
    SelfLoop(NodeId),

    /// Every root must be an AND node
    #[error("Root node {0} is not an AND node")]
    NonAndRoot(NodeId),

    /// Node ids start at 1; 0 is never assigned
    #[error("Node id 0 is reserved")]
    ZeroNodeId,

    /// Edge ids start at 1; 0 is never assigned
    #[error("Edge id 0 is reserved")]
    ZeroEdgeId,

    /// Reward or penalty set on a node that is not a target
    #[error("Node {0} carries target payoffs but is not a target")]
    NonTargetPayoff(NodeId),

    /// Attacker tried to activate a node that is already active
    #[error("Attacker action targets already active node {0}")]
    AlreadyActive(NodeId),

    /// Attacker listed edges for an AND node
    #[error("AND node {0} cannot be attacked through edges")]
    EdgesOnAndNode(NodeId),

    /// Attacker used an edge that does not point at the attacked node
    #[error("Edge {edge} does not enter node {node}")]
    EdgeTargetMismatch { edge: EdgeId, node: NodeId },

    /// Discount factor must lie in (0, 1]
    #[error("Invalid discount factor: {0}")]
    InvalidDiscount(f64),

    /// Belief weights must be finite and non-negative
    #[error("Invalid belief weight: {0}")]
    InvalidWeight(f64),

    /// Normalization of a belief with no mass
    #[error("Belief has zero total weight")]
    EmptyBelief,

    /// An observation does not match the graph it is evaluated against
    #[error("Observation mismatch: {0}")]
    ObservationMismatch(String),

    /// Aggregate payoffs queried before any episode finished
    #[error("No episodes have been recorded")]
    NoEpisodes,
}

impl GameError {
    /// Creates a probability error for the named parameter.
    pub fn probability(field: impl Into<String>, value: f64) -> Self {
        Self::InvalidProbability {
            field: field.into(),
            value,
        }
    }

    /// Checks that `value` is a finite probability.
    pub fn check_probability(field: &str, value: f64) -> Result<()> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(Self::probability(field, value))
        }
    }
}

/// Result alias used throughout the model.
pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_probability_bounds() {
        assert!(GameError::check_probability("p", 0.0).is_ok());
        assert!(GameError::check_probability("p", 1.0).is_ok());
        assert!(GameError::check_probability("p", -0.01).is_err());
        assert!(GameError::check_probability("p", 1.5).is_err());
        assert!(GameError::check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::probability("pos_alert_given_active", 2.0);
        assert_eq!(err.to_string(), "Invalid probability for pos_alert_given_active: 2");

        let err = GameError::AlreadyActive(NodeId(3));
        assert_eq!(err.to_string(), "Attacker action targets already active node 3");
    }
}
