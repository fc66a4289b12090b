//! Player strategy interfaces.
//!
//! The simulation loop only talks to players through these traits. Concrete
//! strategies are chosen when a [`crate::GameSimulation`] is constructed.
//! RNGs are passed as `&mut dyn RngCore` so strategies can be boxed.

use attackgame_core::{
    AttackerAction, DefenderAction, DefenderBelief, DefenderObservation, DependencyGraph,
    GameState, Result,
};
use rand::RngCore;

/// Attacker strategy.
pub trait AttackerPolicy: Send + Sync {
    /// Chooses the attempts for time step `time_step` of `horizon`.
    ///
    /// The attacker observes the true `state`. Nodes active in `state` must
    /// not be attempted.
    fn sample_action(
        &self,
        graph: &DependencyGraph,
        state: &GameState,
        time_step: usize,
        horizon: usize,
        rng: &mut dyn RngCore,
    ) -> Result<AttackerAction>;

    /// Returns the name of this strategy.
    fn name(&self) -> &str;
}

/// Defender strategy. The defender never sees the true state, only its
/// belief and the alerts.
pub trait DefenderPolicy: Send + Sync {
    /// Chooses the nodes to disable at `time_step`.
    fn sample_action(
        &self,
        graph: &DependencyGraph,
        time_step: usize,
        horizon: usize,
        belief: &DefenderBelief,
        rng: &mut dyn RngCore,
    ) -> Result<DefenderAction>;

    /// Folds this step's action and observation into a new belief.
    #[allow(clippy::too_many_arguments)]
    fn update_belief(
        &self,
        graph: &DependencyGraph,
        belief: &DefenderBelief,
        action: &DefenderAction,
        observation: &DefenderObservation,
        time_step: usize,
        horizon: usize,
        rng: &mut dyn RngCore,
    ) -> Result<DefenderBelief>;

    /// Returns the name of this strategy.
    fn name(&self) -> &str;
}
