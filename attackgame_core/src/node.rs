//! Nodes of the dependency graph and their static parameters.

use crate::error::{GameError, Result};
use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

/// Whether a node is one of the attacker's goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Target,
    NonTarget,
}

/// Activation logic of a node.
///
/// * `And`: the attacker activates the node itself, with the node's own
///   success probability, once every parent is active.
/// * `Or`: the attacker activates the node through one or more incoming
///   edges whose source is active; each edge carries its own probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationType {
    And,
    Or,
}

/// A node (asset or exploit) of the dependency graph.
///
/// Parameters are fixed once the graph is built. Payoff-related values are
/// signed contributions: rewards are usually positive, penalties and costs
/// usually negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node id
    pub id: NodeId,

    /// Target or not
    pub role: NodeRole,

    /// AND / OR activation logic
    pub activation: ActivationType,

    /// Attacker payoff per time step while active (targets only)
    #[serde(default)]
    pub attacker_reward: f64,

    /// Defender payoff per time step while active (targets only)
    #[serde(default)]
    pub defender_penalty: f64,

    /// Defender payoff for disabling this node once
    #[serde(default)]
    pub defender_disable_cost: f64,

    /// Attacker payoff for attempting this node (AND nodes only)
    #[serde(default)]
    pub attacker_activation_cost: f64,

    /// Success probability of an attempt on this node (AND nodes only)
    #[serde(default)]
    pub attacker_activation_prob: f64,

    /// P(alert | node active)
    #[serde(default)]
    pub pos_alert_given_active: f64,

    /// P(alert | node inactive)
    #[serde(default)]
    pub pos_alert_given_inactive: f64,

    /// Position in the topological order, assigned when the graph is built
    #[serde(default)]
    pub topological_position: usize,
}

impl Node {
    /// Creates a non-target node with all numeric parameters at zero.
    pub fn new(id: NodeId, activation: ActivationType) -> Self {
        Self {
            id,
            role: NodeRole::NonTarget,
            activation,
            attacker_reward: 0.0,
            defender_penalty: 0.0,
            defender_disable_cost: 0.0,
            attacker_activation_cost: 0.0,
            attacker_activation_prob: 0.0,
            pos_alert_given_active: 0.0,
            pos_alert_given_inactive: 0.0,
            topological_position: 0,
        }
    }

    /// Shorthand for an AND node.
    pub fn and(id: NodeId) -> Self {
        Self::new(id, ActivationType::And)
    }

    /// Shorthand for an OR node.
    pub fn or(id: NodeId) -> Self {
        Self::new(id, ActivationType::Or)
    }

    /// Marks the node as a target with the given payoffs.
    pub fn with_target(mut self, attacker_reward: f64, defender_penalty: f64) -> Self {
        self.role = NodeRole::Target;
        self.attacker_reward = attacker_reward;
        self.defender_penalty = defender_penalty;
        self
    }

    /// Sets the defender's disable cost.
    pub fn with_disable_cost(mut self, cost: f64) -> Self {
        self.defender_disable_cost = cost;
        self
    }

    /// Sets the attacker's activation cost and success probability.
    pub fn with_activation(mut self, cost: f64, prob: f64) -> Self {
        self.attacker_activation_cost = cost;
        self.attacker_activation_prob = prob;
        self
    }

    /// Sets the sensor true/false positive rates.
    pub fn with_alert_probs(mut self, given_active: f64, given_inactive: f64) -> Self {
        self.pos_alert_given_active = given_active;
        self.pos_alert_given_inactive = given_inactive;
        self
    }

    pub fn is_target(&self) -> bool {
        self.role == NodeRole::Target
    }

    pub fn is_and(&self) -> bool {
        self.activation == ActivationType::And
    }

    pub fn is_or(&self) -> bool {
        self.activation == ActivationType::Or
    }

    /// Probability that the sensor on this node fires given its true state.
    pub fn alert_probability(&self, active: bool) -> f64 {
        if active {
            self.pos_alert_given_active
        } else {
            self.pos_alert_given_inactive
        }
    }

    /// Checks probability ranges and the target-only payoff rule.
    pub fn validate(&self) -> Result<()> {
        GameError::check_probability("attacker_activation_prob", self.attacker_activation_prob)?;
        GameError::check_probability("pos_alert_given_active", self.pos_alert_given_active)?;
        GameError::check_probability("pos_alert_given_inactive", self.pos_alert_given_inactive)?;

        let payoffs = [
            ("attacker_reward", self.attacker_reward),
            ("defender_penalty", self.defender_penalty),
            ("defender_disable_cost", self.defender_disable_cost),
            ("attacker_activation_cost", self.attacker_activation_cost),
        ];
        if let Some((field, value)) = payoffs.iter().find(|(_, v)| !v.is_finite()) {
            return Err(GameError::InvalidParameter {
                field: format!("{} of node {}", field, self.id),
                value: *value,
            });
        }

        if !self.is_target() && (self.attacker_reward != 0.0 || self.defender_penalty != 0.0) {
            return Err(GameError::NonTargetPayoff(self.id));
        }
        Ok(())
    }
}
