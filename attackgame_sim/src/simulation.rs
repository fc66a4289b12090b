//! Episode driver.
//!
//! A [`GameSimulation`] owns the graph, both strategies and the RNG. Each
//! round it asks the attacker (who sees the true state) and the defender
//! (who sees only its belief) for actions, samples the transition and the
//! alerts through the oracle, lets the defender revise its belief, and
//! records a [`GameSample`]. Payoffs are scored once the last round is done.

use crate::config::SimulationConfig;
use crate::oracle::GameOracle;
use crate::policy::{AttackerPolicy, DefenderPolicy};
use crate::result::{score_samples, GameSample, GameSimulationResult, PayoffAccumulator};
use attackgame_core::{DefenderBelief, DependencyGraph, GameState, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    NotStarted,
    Running,
    Finished,
}

/// Runs episodes of the attacker/defender game on one graph.
pub struct GameSimulation {
    graph: DependencyGraph,
    attacker: Box<dyn AttackerPolicy>,
    defender: Box<dyn DefenderPolicy>,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    status: SimulationStatus,

    /// Ground truth for the round being played
    current: GameState,

    /// Defender's belief carried between rounds
    belief: DefenderBelief,

    result: GameSimulationResult,
}

impl GameSimulation {
    /// Creates a simulation seeded from `config.seed`.
    pub fn new(
        graph: DependencyGraph,
        attacker: Box<dyn AttackerPolicy>,
        defender: Box<dyn DefenderPolicy>,
        config: SimulationConfig,
    ) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self {
            graph,
            attacker,
            defender,
            config,
            rng,
            status: SimulationStatus::NotStarted,
            current: GameState::new(),
            belief: DefenderBelief::point_mass(GameState::new()),
            result: GameSimulationResult::default(),
        })
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// True state after the most recent round.
    pub fn current_state(&self) -> &GameState {
        &self.current
    }

    /// Defender belief after the most recent round.
    pub fn belief(&self) -> &DefenderBelief {
        &self.belief
    }

    /// Result of the most recent episode.
    pub fn result(&self) -> &GameSimulationResult {
        &self.result
    }

    /// Replaces the RNG stream. Does not touch episode state.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Back to `NotStarted`: no active nodes, point-mass belief on the empty
    /// state, empty result. The RNG stream continues.
    pub fn reset(&mut self) {
        self.status = SimulationStatus::NotStarted;
        self.current = GameState::new();
        self.belief = DefenderBelief::point_mass(GameState::new());
        self.result.clear();
    }

    /// Resets and plays rounds `0..=num_time_steps`, then scores the episode.
    ///
    /// On error the simulation stays `Running` with the rounds played so
    /// far; call [`GameSimulation::reset`] or run again.
    pub fn run_episode(&mut self) -> Result<&GameSimulationResult> {
        self.reset();
        self.status = SimulationStatus::Running;

        let horizon = self.config.num_time_steps;
        let oracle = GameOracle::new(&self.graph);
        self.result = GameSimulationResult::new(self.current.clone());

        debug!(
            "Episode start: {} vs {}, T={}",
            self.attacker.name(),
            self.defender.name(),
            horizon
        );

        for t in 0..=horizon {
            let attack = self
                .attacker
                .sample_action(&self.graph, &self.current, t, horizon, &mut self.rng)?;
            let defend = self
                .defender
                .sample_action(&self.graph, t, horizon, &self.belief, &mut self.rng)?;

            let next = oracle.sample_transition(&self.current, &attack, &defend, &mut self.rng)?;
            let observation = oracle.sample_observation(&next, &mut self.rng);

            self.belief = self.defender.update_belief(
                &self.graph,
                &self.belief,
                &defend,
                &observation,
                t,
                horizon,
                &mut self.rng,
            )?;

            trace!(
                "t={} attempted={} disabled={} alerts={} state={}",
                t,
                attack.len(),
                defend.len(),
                observation.fired_nodes().count(),
                next
            );

            self.current = next;
            self.result.push_sample(GameSample {
                time_step: t,
                state: self.current.clone(),
                observation,
                defender_action: defend,
                attacker_action: attack,
            });
        }

        let payoffs = score_samples(&self.graph, self.result.samples(), self.config.discount_factor)?;
        self.result.set_payoffs(payoffs);
        self.status = SimulationStatus::Finished;

        debug!(
            "Episode done: {} active at end, defender={:.3} attacker={:.3}",
            self.current.len(),
            payoffs.defender,
            payoffs.attacker
        );
        Ok(&self.result)
    }

    /// Plays `episodes` episodes and averages their payoffs.
    ///
    /// Episode `i` is seeded with `config.derived_seed(i)`, so each episode
    /// is reproducible on its own. `result()` afterwards holds the last one.
    pub fn estimate_payoffs(&mut self, episodes: usize) -> Result<PayoffAccumulator> {
        let mut acc = PayoffAccumulator::new();
        for i in 0..episodes {
            self.reseed(self.config.derived_seed(i as u64));
            let result = self.run_episode()?;
            info!(
                "Episode {}/{}: defender={:.3} attacker={:.3}",
                i + 1,
                episodes,
                result.defender_payoff(),
                result.attacker_payoff()
            );
            acc.record(result);
        }
        Ok(acc)
    }
}

impl std::fmt::Debug for GameSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSimulation")
            .field("attacker", &self.attacker.name())
            .field("defender", &self.defender.name())
            .field("config", &self.config)
            .field("status", &self.status)
            .field("current", &self.current)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{PassiveDefender, ThresholdDefender, UniformAttacker};
    use crate::fixtures::FixtureId;
    use attackgame_core::GameError;

    fn simulation(fixture: FixtureId, config: SimulationConfig) -> GameSimulation {
        GameSimulation::new(
            fixture.build().unwrap(),
            Box::new(UniformAttacker::new(0.8).unwrap()),
            Box::new(PassiveDefender),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_discount() {
        let err = GameSimulation::new(
            FixtureId::Chain.build().unwrap(),
            Box::new(UniformAttacker::new(0.5).unwrap()),
            Box::new(PassiveDefender),
            SimulationConfig::default().with_discount(0.0),
        )
        .unwrap_err();
        assert_eq!(err, GameError::InvalidDiscount(0.0));
    }

    #[test]
    fn test_status_transitions() {
        let mut sim = simulation(FixtureId::Chain, SimulationConfig::default().with_time_steps(3));
        assert_eq!(sim.status(), SimulationStatus::NotStarted);

        sim.run_episode().unwrap();
        assert_eq!(sim.status(), SimulationStatus::Finished);
        assert_eq!(sim.result().samples().len(), 4);

        sim.reset();
        assert_eq!(sim.status(), SimulationStatus::NotStarted);
        assert!(sim.result().samples().is_empty());
        assert!(sim.current_state().is_empty());
    }

    #[test]
    fn test_samples_are_time_ordered_and_persistent() {
        let mut sim = simulation(FixtureId::Layered, SimulationConfig::default().with_time_steps(6));
        let result = sim.run_episode().unwrap().clone();

        let mut prev = result.initial_state().clone();
        for (t, sample) in result.samples().iter().enumerate() {
            assert_eq!(sample.time_step, t);
            // passive defender: nothing ever deactivates
            assert!(prev.active_nodes().all(|n| sample.state.is_active(n)));
            assert_eq!(sample.observation.len(), 7);
            prev = sample.state.clone();
        }
        assert_eq!(result.final_state(), sim.current_state());
    }

    #[test]
    fn test_same_seed_same_episode() {
        let config = SimulationConfig::default().with_time_steps(5).with_seed(7);
        let mut a = simulation(FixtureId::Diamond, config.clone());
        let mut b = simulation(FixtureId::Diamond, config);
        assert_eq!(a.run_episode().unwrap(), b.run_episode().unwrap());
    }

    #[test]
    fn test_estimate_payoffs_is_reproducible() {
        let config = SimulationConfig::default().with_time_steps(4).with_seed(11);
        let mut a = simulation(FixtureId::Layered, config.clone());
        let mut b = simulation(FixtureId::Layered, config);

        let acc_a = a.estimate_payoffs(5).unwrap();
        let acc_b = b.estimate_payoffs(5).unwrap();
        assert_eq!(acc_a.episode_count(), 5);
        assert_eq!(acc_a, acc_b);
        assert_eq!(a.result(), b.result());
    }

    #[test]
    fn test_zero_episodes_has_no_mean() {
        let mut sim = simulation(FixtureId::Chain, SimulationConfig::default());
        let acc = sim.estimate_payoffs(0).unwrap();
        assert_eq!(acc.mean_attacker_payoff(), Err(GameError::NoEpisodes));
    }

    #[test]
    fn test_threshold_defender_episode_respects_disables() {
        let defender = ThresholdDefender::new(0.3, UniformAttacker::new(1.0).unwrap()).unwrap();
        let mut sim = GameSimulation::new(
            FixtureId::Chain.build().unwrap(),
            Box::new(UniformAttacker::new(1.0).unwrap()),
            Box::new(defender),
            SimulationConfig::default().with_time_steps(8).with_seed(3),
        )
        .unwrap();

        let result = sim.run_episode().unwrap();
        for sample in result.samples() {
            for node in sample.defender_action.nodes() {
                assert!(!sample.state.is_active(node));
            }
        }
        assert!((sim.belief().total_weight() - 1.0).abs() < 1e-9);
    }
}
