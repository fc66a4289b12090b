//! Directed edges of the dependency graph.

use crate::error::{GameError, Result};
use crate::ids::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Kind of an edge. Virtual edges come from graph generation helpers and
/// behave exactly like normal ones during simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    #[default]
    Normal,
    Virtual,
}

/// A dependency `source -> target`.
///
/// The attacker cost and probability only matter when `target` is an OR
/// node; AND nodes use their own parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,

    #[serde(default)]
    pub kind: EdgeKind,

    pub source: NodeId,

    pub target: NodeId,

    /// Attacker payoff for attempting this edge
    #[serde(default)]
    pub attacker_activation_cost: f64,

    /// Success probability of an attempt through this edge
    #[serde(default)]
    pub attacker_activation_prob: f64,
}

impl Edge {
    /// Creates a normal edge with zero cost and probability.
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            kind: EdgeKind::Normal,
            source,
            target,
            attacker_activation_cost: 0.0,
            attacker_activation_prob: 0.0,
        }
    }

    /// Sets the attacker's cost and success probability on this edge.
    pub fn with_activation(mut self, cost: f64, prob: f64) -> Self {
        self.attacker_activation_cost = cost;
        self.attacker_activation_prob = prob;
        self
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.source == self.target {
            return Err(GameError::SelfLoop(self.source));
        }
        GameError::check_probability("edge attacker_activation_prob", self.attacker_activation_prob)?;
        if !self.attacker_activation_cost.is_finite() {
            return Err(GameError::InvalidParameter {
                field: format!("attacker_activation_cost of edge {}", self.id),
                value: self.attacker_activation_cost,
            });
        }
        Ok(())
    }
}
