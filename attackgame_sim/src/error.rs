//! Error types for the simulation harness and CLI.

use attackgame_core::GameError;
use thiserror::Error;

/// Errors surfaced by the harness outside the pure game model.
#[derive(Debug, Error)]
pub enum SimError {
    /// Precondition violation inside the game model or oracle
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Reading a graph or writing an export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Graph or config JSON could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Fixture name not recognized
    #[error("Unknown fixture: {0}")]
    UnknownFixture(String),
}
