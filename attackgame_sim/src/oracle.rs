//! Stochastic oracle for the game.
//!
//! The oracle defines the game's randomness:
//! - State transitions (attacker attempts vs. defender disables)
//! - Sensor alerts (per-node Bernoulli given the true state)
//! - Exact likelihoods of both, for belief updates
//!
//! Samplers and likelihoods share one probability model, so for every
//! `(prev, attack, defend)` the likelihood of `next` is exactly the
//! frequency with which the sampler produces `next`. All randomness comes
//! from the RNG passed in; the oracle itself holds no state besides the graph.

use attackgame_core::{
    AttackerAction, DefenderAction, DefenderObservation, DependencyGraph, EdgeId, GameError,
    GameState, NodeId, Result, SecurityAlert,
};
use rand::Rng;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Attempt budget of the deduplicating sampler.
pub const MAX_SAMPLING_ATTEMPTS: usize = 200;

/// How [`GameOracle::sample_transitions`] treats repeated states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Keep only distinct states, giving up after [`MAX_SAMPLING_ATTEMPTS`] draws
    Distinct,
    /// Return exactly `count` independent draws, duplicates included
    Independent,
}

/// Output of [`GameOracle::sample_transitions`].
///
/// In [`SamplingMode::Distinct`] the sampler may run out of attempts before
/// finding `requested` distinct states; check [`TransitionSamples::is_complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSamples {
    /// Sampled states in draw order
    pub states: Vec<GameState>,

    /// How many states were asked for
    pub requested: usize,
}

impl TransitionSamples {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// True when as many states as requested were produced.
    pub fn is_complete(&self) -> bool {
        self.states.len() >= self.requested
    }

    /// Number of requested states that could not be produced.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.states.len())
    }
}

/// The oracle, bound to one dependency graph.
#[derive(Debug, Clone, Copy)]
pub struct GameOracle<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> GameOracle<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g DependencyGraph {
        self.graph
    }

    /// Probability that an attempt on `node` through `edges` succeeds.
    ///
    /// AND nodes use their own probability. OR nodes succeed when at least
    /// one edge trial succeeds: `1 - Π(1 - p_e)`, which is 0 for no edges.
    pub fn enable_probability(&self, node: NodeId, edges: &BTreeSet<EdgeId>) -> Result<f64> {
        let node = self.graph.require_node(node)?;
        if node.is_and() {
            return Ok(node.attacker_activation_prob);
        }
        let mut all_fail = 1.0;
        for &edge_id in edges {
            let edge = self.graph.require_edge(edge_id)?;
            all_fail *= 1.0 - edge.attacker_activation_prob;
        }
        Ok(1.0 - all_fail)
    }

    fn check_inputs(
        &self,
        prev: &GameState,
        attack: &AttackerAction,
        defend: &DefenderAction,
    ) -> Result<()> {
        for node in prev.active_nodes() {
            self.graph.require_node(node)?;
        }
        attack.validate(self.graph, prev)?;
        defend.validate(self.graph)
    }

    /// Samples the state that follows `prev`.
    ///
    /// - previously active nodes stay active unless disabled
    /// - disabled nodes are never active afterwards
    /// - each attempted, non-disabled node becomes active with its enable
    ///   probability (one uniform draw per node, in id order)
    pub fn sample_transition<R: Rng + ?Sized>(
        &self,
        prev: &GameState,
        attack: &AttackerAction,
        defend: &DefenderAction,
        rng: &mut R,
    ) -> Result<GameState> {
        self.check_inputs(prev, attack, defend)?;
        self.draw_transition(prev, attack, defend, rng)
    }

    fn draw_transition<R: Rng + ?Sized>(
        &self,
        prev: &GameState,
        attack: &AttackerAction,
        defend: &DefenderAction,
        rng: &mut R,
    ) -> Result<GameState> {
        let mut next: GameState = prev.active_nodes().filter(|n| !defend.contains(*n)).collect();

        for (node, edges) in attack.attempts() {
            if defend.contains(node) {
                continue;
            }
            let p = self.enable_probability(node, edges)?;
            if rng.gen::<f64>() < p {
                next.activate(node);
            }
        }
        Ok(next)
    }

    /// Draws up to `count` successor states.
    ///
    /// In [`SamplingMode::Distinct`] only unseen states are kept and the
    /// sampler stops after [`MAX_SAMPLING_ATTEMPTS`] draws, so the result
    /// may be short. In [`SamplingMode::Independent`] exactly `count` draws
    /// are returned.
    pub fn sample_transitions<R: Rng + ?Sized>(
        &self,
        prev: &GameState,
        attack: &AttackerAction,
        defend: &DefenderAction,
        rng: &mut R,
        count: usize,
        mode: SamplingMode,
    ) -> Result<TransitionSamples> {
        self.check_inputs(prev, attack, defend)?;

        let mut states = Vec::with_capacity(count);
        match mode {
            SamplingMode::Independent => {
                for _ in 0..count {
                    states.push(self.draw_transition(prev, attack, defend, rng)?);
                }
            }
            SamplingMode::Distinct => {
                let mut seen = HashSet::new();
                let mut attempts = 0;
                while states.len() < count && attempts < MAX_SAMPLING_ATTEMPTS {
                    attempts += 1;
                    let next = self.draw_transition(prev, attack, defend, rng)?;
                    if seen.insert(next.clone()) {
                        states.push(next);
                    }
                }
                if states.len() < count {
                    debug!(
                        "Distinct sampling stopped at {}/{} states after {} attempts",
                        states.len(),
                        count,
                        attempts
                    );
                }
            }
        }

        Ok(TransitionSamples {
            states,
            requested: count,
        })
    }

    /// Exact probability that [`GameOracle::sample_transition`] turns `prev`
    /// into `next` under the given actions.
    ///
    /// Zero when a surviving node is missing from `next`, when a disabled
    /// node is active in `next`, or when `next` contains a node that was
    /// neither active before nor attempted. Otherwise the product over
    /// attempted, non-disabled nodes of `p` (now active) or `1 - p` (still
    /// inactive).
    pub fn transition_likelihood(
        &self,
        defend: &DefenderAction,
        attack: &AttackerAction,
        prev: &GameState,
        next: &GameState,
    ) -> Result<f64> {
        self.check_inputs(prev, attack, defend)?;
        for node in next.active_nodes() {
            self.graph.require_node(node)?;
        }

        let survives_missing = prev
            .active_nodes()
            .any(|n| !defend.contains(n) && !next.is_active(n));
        let disabled_active = defend.nodes().any(|n| next.is_active(n));
        let unexplained = next
            .active_nodes()
            .any(|n| !prev.is_active(n) && !attack.contains(n));
        if survives_missing || disabled_active || unexplained {
            return Ok(0.0);
        }

        let mut likelihood = 1.0;
        for (node, edges) in attack.attempts() {
            if defend.contains(node) {
                continue;
            }
            let p = self.enable_probability(node, edges)?;
            likelihood *= if next.is_active(node) { p } else { 1.0 - p };
        }
        Ok(likelihood)
    }

    /// Samples one alert per node (in id order) given the true `state`.
    pub fn sample_observation<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        rng: &mut R,
    ) -> DefenderObservation {
        self.graph
            .nodes()
            .map(|node| {
                let p = node.alert_probability(state.is_active(node.id));
                SecurityAlert::new(node.id, rng.gen::<f64>() < p)
            })
            .collect()
    }

    /// Exact probability of `observation` given the true `state`: the
    /// product of the per-alert Bernoulli probabilities.
    pub fn observation_likelihood(
        &self,
        state: &GameState,
        observation: &DefenderObservation,
    ) -> Result<f64> {
        let mut seen = HashSet::with_capacity(observation.len());
        let mut likelihood = 1.0;
        for alert in observation.alerts() {
            if !seen.insert(alert.node) {
                return Err(GameError::ObservationMismatch(format!(
                    "duplicate alert for node {}",
                    alert.node
                )));
            }
            let node = self.graph.require_node(alert.node)?;
            let p = node.alert_probability(state.is_active(alert.node));
            likelihood *= if alert.alert { p } else { 1.0 - p };
        }
        Ok(likelihood)
    }
}
