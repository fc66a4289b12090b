//! AttackGame Simulation Harness
//!
//! Plays the dependency-graph security game defined in `attackgame_core`:
//!
//! - **Oracle**: samples state transitions and sensor alerts and evaluates
//!   their exact likelihoods
//! - **Policies**: object-safe attacker and defender strategy traits, plus
//!   simple baseline strategies
//! - **Simulation**: drives one episode round by round and scores the
//!   discounted payoffs of both players
//! - **Results**: per-episode records and multi-episode averages
//!
//! All randomness flows from one seed through an explicit RNG, so every
//! episode can be replayed exactly.
//!
//! # Usage
//!
//! ```ignore
//! use attackgame_sim::{GameSimulation, SimulationConfig};
//! use attackgame_sim::baseline::{PassiveDefender, UniformAttacker};
//! use attackgame_sim::fixtures::FixtureId;
//!
//! let mut sim = GameSimulation::new(
//!     FixtureId::Layered.build()?,
//!     Box::new(UniformAttacker::new(0.5)?),
//!     Box::new(PassiveDefender),
//!     SimulationConfig::default(),
//! )?;
//! let means = sim.estimate_payoffs(100)?.mean_payoffs()?;
//! ```

mod config;
mod error;
mod exporter;
mod oracle;
mod result;
mod simulation;

pub mod baseline;
pub mod fixtures;
pub mod policy;

pub use config::SimulationConfig;
pub use error::SimError;
pub use exporter::{EpisodeExport, EpisodeFrame};
pub use oracle::{GameOracle, SamplingMode, TransitionSamples, MAX_SAMPLING_ATTEMPTS};
pub use policy::{AttackerPolicy, DefenderPolicy};
pub use result::{score_samples, GameSample, GameSimulationResult, PayoffAccumulator, Payoffs};
pub use simulation::{GameSimulation, SimulationStatus};
