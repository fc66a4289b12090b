//! AttackGame Core - Dependency-Graph Security Game Model
//!
//! Data model for a discrete-time, partially observable game between an
//! attacker and a defender played over a dependency graph:
//! 1. **Graph Model**: a DAG of AND/OR nodes with attacker, defender and
//!    sensor parameters, validated at build time
//! 2. **Game State**: the set of active (compromised) nodes
//! 3. **Belief**: the defender's weighted hypotheses over hidden states
//! 4. **Actions & Observations**: what each player does and what the
//!    defender's sensors report
//!
//! Everything here is deterministic. Sampling lives in `attackgame_sim`.

pub mod action;
pub mod belief;
pub mod edge;
pub mod error;
pub mod graph;
pub mod ids;
pub mod node;
pub mod observation;
pub mod state;

// Re-export key types for convenience
pub use action::{AttackerAction, DefenderAction};
pub use belief::DefenderBelief;
pub use edge::{Edge, EdgeKind};
pub use error::{GameError, Result};
pub use graph::{DependencyGraph, GraphBuilder, GraphSpec};
pub use ids::{EdgeId, IdAllocator, NodeId};
pub use node::{ActivationType, Node, NodeRole};
pub use observation::{DefenderObservation, SecurityAlert};
pub use state::GameState;
