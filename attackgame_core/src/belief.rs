//! Defender belief: a weighted set of hypotheses about the hidden game state.

use crate::error::{GameError, Result};
use crate::ids::NodeId;
use crate::state::GameState;
use std::collections::BTreeMap;

/// Point-mass approximation of the defender's posterior over game states.
///
/// Weights are non-negative but not necessarily normalized; the update rule
/// that produced them decides what normalization means. Use
/// [`DefenderBelief::normalized`] to get a proper distribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefenderBelief {
    weights: BTreeMap<GameState, f64>,
}

impl DefenderBelief {
    /// Creates an empty belief.
    pub fn new() -> Self {
        Self::default()
    }

    /// A belief that puts all mass on one state.
    pub fn point_mass(state: GameState) -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(state, 1.0);
        Self { weights }
    }

    /// Inserts or overwrites the weight of `state`.
    pub fn add_state(&mut self, state: GameState, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GameError::InvalidWeight(weight));
        }
        self.weights.insert(state, weight);
        Ok(())
    }

    /// Weight of `state`, zero when absent.
    pub fn probability(&self, state: &GameState) -> f64 {
        self.weights.get(state).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Entries in ascending state order.
    pub fn iter(&self) -> impl Iterator<Item = (&GameState, f64)> + '_ {
        self.weights.iter().map(|(s, w)| (s, *w))
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Copy of this belief scaled to total weight 1.
    pub fn normalized(&self) -> Result<Self> {
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(GameError::EmptyBelief);
        }
        Ok(Self {
            weights: self
                .weights
                .iter()
                .map(|(s, w)| (s.clone(), w / total))
                .collect(),
        })
    }

    /// Normalized probability that `node` is active.
    pub fn marginal(&self, node: NodeId) -> Result<f64> {
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(GameError::EmptyBelief);
        }
        let active: f64 = self
            .weights
            .iter()
            .filter(|(s, _)| s.is_active(node))
            .map(|(_, w)| *w)
            .sum();
        Ok(active / total)
    }

    /// Keeps only the `max_states` heaviest entries. Ties are broken by
    /// state order so pruning is deterministic.
    pub fn prune(&mut self, max_states: usize) {
        if self.weights.len() <= max_states {
            return;
        }
        let mut entries: Vec<(GameState, f64)> = std::mem::take(&mut self.weights).into_iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(max_states);
        self.weights = entries.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(ids: &[u32]) -> GameState {
        ids.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_add_overwrites() {
        let mut belief = DefenderBelief::new();
        belief.add_state(state(&[1]), 0.3).unwrap();
        belief.add_state(state(&[1]), 0.6).unwrap();
        assert_eq!(belief.len(), 1);
        assert_relative_eq!(belief.probability(&state(&[1])), 0.6);
        assert_eq!(belief.probability(&state(&[2])), 0.0);
    }

    #[test]
    fn test_rejects_bad_weight() {
        let mut belief = DefenderBelief::new();
        assert_eq!(belief.add_state(state(&[]), -1.0), Err(GameError::InvalidWeight(-1.0)));
        assert!(belief.add_state(state(&[]), f64::NAN).is_err());
    }

    #[test]
    fn test_normalized_and_marginal() {
        let mut belief = DefenderBelief::new();
        belief.add_state(state(&[1]), 1.0).unwrap();
        belief.add_state(state(&[1, 2]), 3.0).unwrap();

        let norm = belief.normalized().unwrap();
        assert_relative_eq!(norm.total_weight(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(norm.probability(&state(&[1, 2])), 0.75, epsilon = 1e-12);

        assert_relative_eq!(belief.marginal(NodeId(1)).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(belief.marginal(NodeId(2)).unwrap(), 0.75, epsilon = 1e-12);
        assert_relative_eq!(belief.marginal(NodeId(3)).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_belief_cannot_normalize() {
        assert_eq!(DefenderBelief::new().normalized(), Err(GameError::EmptyBelief));
        assert_eq!(DefenderBelief::new().marginal(NodeId(1)), Err(GameError::EmptyBelief));
    }

    #[test]
    fn test_prune_keeps_heaviest() {
        let mut belief = DefenderBelief::new();
        belief.add_state(state(&[1]), 0.1).unwrap();
        belief.add_state(state(&[2]), 0.5).unwrap();
        belief.add_state(state(&[3]), 0.4).unwrap();
        belief.prune(2);
        assert_eq!(belief.len(), 2);
        assert_eq!(belief.probability(&state(&[1])), 0.0);
        assert_relative_eq!(belief.probability(&state(&[2])), 0.5);
    }
}
