//! Episode records, payoff scoring and multi-episode aggregation.

use attackgame_core::{
    AttackerAction, DefenderAction, DefenderObservation, DependencyGraph, GameError, GameState,
    Result,
};
use serde::Serialize;

/// What happened in one round of an episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSample {
    /// Round index t
    pub time_step: usize,

    /// State after the transition
    pub state: GameState,

    /// Alerts generated from `state`
    pub observation: DefenderObservation,

    /// Nodes the defender disabled
    pub defender_action: DefenderAction,

    /// Nodes the attacker attempted
    pub attacker_action: AttackerAction,
}

/// Outcome of one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameSimulationResult {
    initial_state: GameState,
    samples: Vec<GameSample>,
    defender_payoff: f64,
    attacker_payoff: f64,
}

impl GameSimulationResult {
    pub fn new(initial_state: GameState) -> Self {
        Self {
            initial_state,
            ..Default::default()
        }
    }

    /// State before round 0.
    pub fn initial_state(&self) -> &GameState {
        &self.initial_state
    }

    /// Rounds in time order.
    pub fn samples(&self) -> &[GameSample] {
        &self.samples
    }

    pub fn defender_payoff(&self) -> f64 {
        self.defender_payoff
    }

    pub fn attacker_payoff(&self) -> f64 {
        self.attacker_payoff
    }

    /// State after the last round (the initial state if nothing ran).
    pub fn final_state(&self) -> &GameState {
        self.samples.last().map_or(&self.initial_state, |s| &s.state)
    }

    /// Drops all samples and zeroes the payoffs.
    pub fn clear(&mut self) {
        self.initial_state = GameState::new();
        self.samples.clear();
        self.defender_payoff = 0.0;
        self.attacker_payoff = 0.0;
    }

    pub(crate) fn push_sample(&mut self, sample: GameSample) {
        self.samples.push(sample);
    }

    pub(crate) fn set_payoffs(&mut self, payoffs: Payoffs) {
        self.defender_payoff = payoffs.defender;
        self.attacker_payoff = payoffs.attacker;
    }
}

/// Discounted payoffs of both players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Payoffs {
    pub defender: f64,
    pub attacker: f64,
}

/// Scores a sequence of rounds.
///
/// For round `t` with factor `d = discount^t`:
/// - every active target adds `d · defender_penalty` / `d · attacker_reward`
/// - every disabled node adds its `defender_disable_cost` (not discounted)
/// - every attempted AND node adds `d · attacker_activation_cost`, every
///   attempted OR node adds `d ·` the costs of the edges used
pub fn score_samples(graph: &DependencyGraph, samples: &[GameSample], discount: f64) -> Result<Payoffs> {
    let mut payoffs = Payoffs::default();

    for sample in samples {
        let factor = discount.powf(sample.time_step as f64);

        for node_id in sample.state.active_nodes() {
            let node = graph.require_node(node_id)?;
            if node.is_target() {
                payoffs.defender += factor * node.defender_penalty;
                payoffs.attacker += factor * node.attacker_reward;
            }
        }

        for node_id in sample.defender_action.nodes() {
            payoffs.defender += graph.require_node(node_id)?.defender_disable_cost;
        }

        for (node_id, edges) in sample.attacker_action.attempts() {
            let node = graph.require_node(node_id)?;
            if node.is_and() {
                payoffs.attacker += factor * node.attacker_activation_cost;
            } else {
                for &edge_id in edges {
                    payoffs.attacker += factor * graph.require_edge(edge_id)?.attacker_activation_cost;
                }
            }
        }
    }
    Ok(payoffs)
}

/// Running totals over repeated episodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PayoffAccumulator {
    episodes: usize,
    total_defender: f64,
    total_attacker: f64,
}

impl PayoffAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one finished episode.
    pub fn record(&mut self, result: &GameSimulationResult) {
        self.episodes += 1;
        self.total_defender += result.defender_payoff();
        self.total_attacker += result.attacker_payoff();
    }

    pub fn episode_count(&self) -> usize {
        self.episodes
    }

    /// Mean defender payoff; fails before any episode is recorded.
    pub fn mean_defender_payoff(&self) -> Result<f64> {
        self.mean(self.total_defender)
    }

    /// Mean attacker payoff; fails before any episode is recorded.
    pub fn mean_attacker_payoff(&self) -> Result<f64> {
        self.mean(self.total_attacker)
    }

    /// Both means at once.
    pub fn mean_payoffs(&self) -> Result<Payoffs> {
        Ok(Payoffs {
            defender: self.mean_defender_payoff()?,
            attacker: self.mean_attacker_payoff()?,
        })
    }

    fn mean(&self, total: f64) -> Result<f64> {
        if self.episodes == 0 {
            return Err(GameError::NoEpisodes);
        }
        Ok(total / self.episodes as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureId;
    use approx::assert_relative_eq;
    use attackgame_core::{EdgeId, NodeId};

    fn sample(t: usize, active: &[u32], disabled: &[u32], attack: AttackerAction) -> GameSample {
        GameSample {
            time_step: t,
            state: active.iter().copied().map(NodeId).collect(),
            observation: DefenderObservation::new(),
            defender_action: disabled.iter().copied().map(NodeId).collect(),
            attacker_action: attack,
        }
    }

    #[test]
    fn test_score_discounts_rewards_and_costs() {
        // chain: 1 AND (cost -0.5), 2 OR via e1 (cost -0.3), 3 AND target (10 / -10)
        let graph = FixtureId::Chain.build().unwrap();

        let mut attack_root = AttackerAction::new();
        attack_root.attack_and_node(NodeId(1));
        let mut attack_pivot = AttackerAction::new();
        attack_pivot.attack_or_node(NodeId(2), [EdgeId(1)]);

        let samples = vec![
            sample(0, &[1], &[], attack_root),
            sample(1, &[1, 3], &[2], attack_pivot),
        ];
        let payoffs = score_samples(&graph, &samples, 0.5).unwrap();

        // attacker: -0.5 + 0.5 * (10 - 0.3)
        assert_relative_eq!(payoffs.attacker, -0.5 + 0.5 * 9.7, epsilon = 1e-12);
        // defender: 0.5 * -10 + disable cost of node 2 (-0.6, undiscounted)
        assert_relative_eq!(payoffs.defender, -5.0 - 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_discount_holds_for_very_late_rounds() {
        let graph = FixtureId::SingleRoot.build().unwrap();
        let late = usize::try_from(1u64 << 32).unwrap_or(usize::MAX);
        let samples = vec![sample(late, &[1], &[], AttackerAction::new())];

        let payoffs = score_samples(&graph, &samples, 0.5).unwrap();
        assert!(payoffs.attacker.abs() < 1e-12);
        assert!(payoffs.defender.abs() < 1e-12);
    }

    #[test]
    fn test_accumulator_mean() {
        let mut acc = PayoffAccumulator::new();
        assert_eq!(acc.mean_defender_payoff(), Err(GameError::NoEpisodes));
        assert_eq!(acc.mean_payoffs(), Err(GameError::NoEpisodes));

        let mut result = GameSimulationResult::new(GameState::new());
        result.set_payoffs(Payoffs { defender: -2.0, attacker: 4.0 });
        acc.record(&result);
        result.set_payoffs(Payoffs { defender: -4.0, attacker: 2.0 });
        acc.record(&result);

        assert_eq!(acc.episode_count(), 2);
        assert_relative_eq!(acc.mean_defender_payoff().unwrap(), -3.0);
        assert_relative_eq!(acc.mean_attacker_payoff().unwrap(), 3.0);
    }

    #[test]
    fn test_clear_resets_result() {
        let mut result = GameSimulationResult::new(GameState::from_nodes([NodeId(1)]));
        result.push_sample(sample(0, &[1], &[], AttackerAction::new()));
        result.set_payoffs(Payoffs { defender: -1.0, attacker: 1.0 });
        result.clear();
        assert!(result.samples().is_empty());
        assert!(result.initial_state().is_empty());
        assert_eq!(result.attacker_payoff(), 0.0);
    }
}
