//! Simple reference strategies.
//!
//! These are used by the CLI and the tests. Real strategies (equilibrium,
//! min-cut or learned policies) implement the same traits elsewhere.

use crate::oracle::{GameOracle, SamplingMode};
use crate::policy::{AttackerPolicy, DefenderPolicy};
use attackgame_core::{
    AttackerAction, DefenderAction, DefenderBelief, DefenderObservation, DependencyGraph,
    GameError, GameState, Result,
};
use rand::{Rng, RngCore};
use std::collections::BTreeMap;
use tracing::trace;

// =============================================================================
// ATTACKER
// =============================================================================

/// Attempts every enabled, inactive node independently with a fixed
/// probability. OR nodes are attempted through all of their enabling edges.
#[derive(Debug, Clone)]
pub struct UniformAttacker {
    attack_prob: f64,
}

impl UniformAttacker {
    pub fn new(attack_prob: f64) -> Result<Self> {
        GameError::check_probability("attack_prob", attack_prob)?;
        Ok(Self { attack_prob })
    }

    pub fn attack_prob(&self) -> f64 {
        self.attack_prob
    }
}

impl AttackerPolicy for UniformAttacker {
    fn sample_action(
        &self,
        graph: &DependencyGraph,
        state: &GameState,
        _time_step: usize,
        _horizon: usize,
        rng: &mut dyn RngCore,
    ) -> Result<AttackerAction> {
        let mut action = AttackerAction::new();
        for node_id in graph.attack_candidates(state) {
            if rng.gen::<f64>() >= self.attack_prob {
                continue;
            }
            let node = graph.require_node(node_id)?;
            if node.is_and() {
                action.attack_and_node(node_id);
            } else {
                action.attack_or_node(node_id, graph.enabling_edges(node_id, state));
            }
        }
        Ok(action)
    }

    fn name(&self) -> &str {
        "UniformAttacker"
    }
}

// =============================================================================
// DEFENDERS
// =============================================================================

/// Never disables anything and never revises its belief.
#[derive(Debug, Clone, Default)]
pub struct PassiveDefender;

impl DefenderPolicy for PassiveDefender {
    fn sample_action(
        &self,
        _graph: &DependencyGraph,
        _time_step: usize,
        _horizon: usize,
        _belief: &DefenderBelief,
        _rng: &mut dyn RngCore,
    ) -> Result<DefenderAction> {
        Ok(DefenderAction::new())
    }

    fn update_belief(
        &self,
        _graph: &DependencyGraph,
        belief: &DefenderBelief,
        _action: &DefenderAction,
        _observation: &DefenderObservation,
        _time_step: usize,
        _horizon: usize,
        _rng: &mut dyn RngCore,
    ) -> Result<DefenderBelief> {
        Ok(belief.clone())
    }

    fn name(&self) -> &str {
        "PassiveDefender"
    }
}

/// Disables every node whose belief marginal reaches `threshold`.
///
/// The belief is tracked with a particle filter built on the oracle: for
/// each particle an attack is drawn from an assumed attacker model, distinct
/// successors are sampled, and each successor is weighted by
/// `weight · P(next | prev, actions) · P(observation | next)`. The heaviest
/// `max_particles` states are kept and normalized.
#[derive(Debug, Clone)]
pub struct ThresholdDefender {
    threshold: f64,
    attacker_model: UniformAttacker,
    samples_per_particle: usize,
    max_particles: usize,
}

impl ThresholdDefender {
    pub fn new(threshold: f64, attacker_model: UniformAttacker) -> Result<Self> {
        GameError::check_probability("threshold", threshold)?;
        Ok(Self {
            threshold,
            attacker_model,
            samples_per_particle: 8,
            max_particles: 64,
        })
    }

    pub fn with_samples_per_particle(mut self, samples: usize) -> Self {
        self.samples_per_particle = samples.max(1);
        self
    }

    pub fn with_max_particles(mut self, particles: usize) -> Self {
        self.max_particles = particles.max(1);
        self
    }

    /// Old belief with the disabled nodes removed from every particle.
    fn propagate_disables(belief: &DefenderBelief, action: &DefenderAction) -> Result<DefenderBelief> {
        let mut merged: BTreeMap<GameState, f64> = BTreeMap::new();
        for (state, weight) in belief.iter() {
            let next: GameState = state.active_nodes().filter(|n| !action.contains(*n)).collect();
            *merged.entry(next).or_insert(0.0) += weight;
        }
        let mut out = DefenderBelief::new();
        for (state, weight) in merged {
            out.add_state(state, weight)?;
        }
        out.normalized()
    }
}

impl DefenderPolicy for ThresholdDefender {
    fn sample_action(
        &self,
        graph: &DependencyGraph,
        _time_step: usize,
        _horizon: usize,
        belief: &DefenderBelief,
        _rng: &mut dyn RngCore,
    ) -> Result<DefenderAction> {
        let mut action = DefenderAction::new();
        for node in graph.nodes() {
            if belief.marginal(node.id)? >= self.threshold {
                action.disable(node.id);
            }
        }
        Ok(action)
    }

    fn update_belief(
        &self,
        graph: &DependencyGraph,
        belief: &DefenderBelief,
        action: &DefenderAction,
        observation: &DefenderObservation,
        time_step: usize,
        horizon: usize,
        rng: &mut dyn RngCore,
    ) -> Result<DefenderBelief> {
        let oracle = GameOracle::new(graph);
        let mut posterior: BTreeMap<GameState, f64> = BTreeMap::new();

        for (state, weight) in belief.iter() {
            if weight <= 0.0 {
                continue;
            }
            let attack = self
                .attacker_model
                .sample_action(graph, state, time_step, horizon, &mut *rng)?;
            let samples = oracle.sample_transitions(
                state,
                &attack,
                action,
                &mut *rng,
                self.samples_per_particle,
                SamplingMode::Distinct,
            )?;
            for next in samples.states {
                let p_transition = oracle.transition_likelihood(action, &attack, state, &next)?;
                let p_observation = oracle.observation_likelihood(&next, observation)?;
                *posterior.entry(next).or_insert(0.0) += weight * p_transition * p_observation;
            }
        }

        let mut updated = DefenderBelief::new();
        for (state, weight) in posterior {
            if weight > 0.0 {
                updated.add_state(state, weight)?;
            }
        }
        updated.prune(self.max_particles);

        match updated.normalized() {
            Ok(normalized) => Ok(normalized),
            Err(GameError::EmptyBelief) => {
                trace!("Particle filter lost all mass at t={}, keeping prior", time_step);
                Self::propagate_disables(belief, action)
            }
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "ThresholdDefender"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureId;
    use approx::assert_relative_eq;
    use attackgame_core::NodeId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_uniform_attacker_respects_candidates() {
        let graph = FixtureId::Chain.build().unwrap();
        let attacker = UniformAttacker::new(1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let action = attacker.sample_action(&graph, &GameState::new(), 0, 5, &mut rng).unwrap();
        assert_eq!(action.nodes().collect::<Vec<_>>(), vec![NodeId(1)]);

        let state = GameState::from_nodes([NodeId(1)]);
        let action = attacker.sample_action(&graph, &state, 1, 5, &mut rng).unwrap();
        assert_eq!(action.nodes().collect::<Vec<_>>(), vec![NodeId(2)]);
        assert_eq!(action.edges_for(NodeId(2)).unwrap().len(), 1);
        assert!(action.validate(&graph, &state).is_ok());
    }

    #[test]
    fn test_uniform_attacker_zero_prob_is_idle() {
        let graph = FixtureId::Layered.build().unwrap();
        let attacker = UniformAttacker::new(0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let action = attacker.sample_action(&graph, &GameState::new(), 0, 5, &mut rng).unwrap();
        assert!(action.is_empty());
        assert!(UniformAttacker::new(1.5).is_err());
    }

    #[test]
    fn test_threshold_defender_disables_believed_nodes() {
        let graph = FixtureId::Chain.build().unwrap();
        let defender = ThresholdDefender::new(0.5, UniformAttacker::new(1.0).unwrap()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut belief = DefenderBelief::new();
        belief.add_state(GameState::from_nodes([NodeId(1)]), 0.6).unwrap();
        belief.add_state(GameState::new(), 0.4).unwrap();

        let action = defender.sample_action(&graph, 0, 5, &belief, &mut rng).unwrap();
        assert_eq!(action.nodes().collect::<Vec<_>>(), vec![NodeId(1)]);
    }

    #[test]
    fn test_threshold_defender_update_is_normalized() {
        let graph = FixtureId::Diamond.build().unwrap();
        let oracle = GameOracle::new(&graph);
        let defender = ThresholdDefender::new(0.5, UniformAttacker::new(1.0).unwrap()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        let prior = DefenderBelief::point_mass(GameState::new());
        let truth = GameState::from_nodes([NodeId(1)]);
        let obs = oracle.sample_observation(&truth, &mut rng);

        let posterior = defender
            .update_belief(&graph, &prior, &DefenderAction::new(), &obs, 0, 3, &mut rng)
            .unwrap();
        assert!(!posterior.is_empty());
        assert_relative_eq!(posterior.total_weight(), 1.0, epsilon = 1e-9);
        // only roots can become active from the empty state
        for (state, _) in posterior.iter() {
            assert!(state.active_nodes().all(|n| graph.root_set().contains(&n)));
        }
    }

    #[test]
    fn test_threshold_defender_falls_back_on_impossible_observation() {
        let mut spec = FixtureId::SingleRoot.build().unwrap().to_spec();
        spec.nodes[0].pos_alert_given_active = 1.0;
        spec.nodes[0].pos_alert_given_inactive = 1.0;
        let graph = spec.build().unwrap();
        let defender = ThresholdDefender::new(0.5, UniformAttacker::new(1.0).unwrap()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        // a silent sensor is impossible when it always fires
        let obs: DefenderObservation = [attackgame_core::SecurityAlert::new(NodeId(1), false)].into_iter().collect();
        let prior = DefenderBelief::point_mass(GameState::from_nodes([NodeId(1)]));
        let action: DefenderAction = [NodeId(1)].into_iter().collect();

        let posterior = defender
            .update_belief(&graph, &prior, &action, &obs, 0, 3, &mut rng)
            .unwrap();
        assert_relative_eq!(posterior.probability(&GameState::new()), 1.0);
    }

    #[test]
    fn test_passive_defender_keeps_belief() {
        let graph = FixtureId::Chain.build().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let belief = DefenderBelief::point_mass(GameState::from_nodes([NodeId(1)]));
        let updated = PassiveDefender
            .update_belief(&graph, &belief, &DefenderAction::new(), &DefenderObservation::new(), 0, 1, &mut rng)
            .unwrap();
        assert_eq!(updated, belief);
        assert!(PassiveDefender.sample_action(&graph, 0, 1, &belief, &mut rng).unwrap().is_empty());
    }
}
