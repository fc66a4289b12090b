//! JSON export of a played episode.
//!
//! One frame per round, flattened to plain ids so external tooling can read
//! it without knowing the game types.

use crate::config::SimulationConfig;
use crate::result::{GameSample, GameSimulationResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One round of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeFrame {
    /// Round index
    pub time_step: usize,

    /// Active node ids after the transition
    pub active_nodes: Vec<u32>,

    /// Legacy bit-string id of the state
    pub canonical_id: String,

    /// Nodes whose alert fired
    pub alerts: Vec<u32>,

    /// Nodes the attacker attempted
    pub attacked: Vec<u32>,

    /// Nodes the defender disabled
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub disabled: Vec<u32>,
}

impl From<&GameSample> for EpisodeFrame {
    fn from(sample: &GameSample) -> Self {
        Self {
            time_step: sample.time_step,
            active_nodes: sample.state.active_nodes().map(|n| n.get()).collect(),
            canonical_id: sample.state.canonical_id(),
            alerts: sample.observation.fired_nodes().map(|n| n.get()).collect(),
            attacked: sample.attacker_action.nodes().map(|n| n.get()).collect(),
            disabled: sample.defender_action.nodes().map(|n| n.get()).collect(),
        }
    }
}

/// Complete episode export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeExport {
    /// Graph name (fixture or file)
    pub graph: String,

    /// Seed used
    pub seed: u64,

    pub num_time_steps: usize,
    pub discount_factor: f64,

    /// Strategy names
    pub attacker: String,
    pub defender: String,

    /// All frames
    pub frames: Vec<EpisodeFrame>,

    /// Final payoffs
    pub defender_payoff: f64,
    pub attacker_payoff: f64,
}

impl EpisodeExport {
    /// Creates an empty export container.
    pub fn new(graph: &str, config: &SimulationConfig, attacker: &str, defender: &str) -> Self {
        Self {
            graph: graph.to_string(),
            seed: config.seed,
            num_time_steps: config.num_time_steps,
            discount_factor: config.discount_factor,
            attacker: attacker.to_string(),
            defender: defender.to_string(),
            frames: Vec::new(),
            defender_payoff: 0.0,
            attacker_payoff: 0.0,
        }
    }

    /// Copies frames and payoffs from a finished episode.
    pub fn record(&mut self, result: &GameSimulationResult) {
        self.frames = result.samples().iter().map(EpisodeFrame::from).collect();
        self.defender_payoff = result.defender_payoff();
        self.attacker_payoff = result.attacker_payoff();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{PassiveDefender, UniformAttacker};
    use crate::fixtures::FixtureId;
    use crate::GameSimulation;

    #[test]
    fn test_export_mirrors_episode() {
        let config = SimulationConfig::default().with_time_steps(2).with_discount(1.0);
        let mut sim = GameSimulation::new(
            FixtureId::SingleRoot.build().unwrap(),
            Box::new(UniformAttacker::new(1.0).unwrap()),
            Box::new(PassiveDefender),
            config.clone(),
        )
        .unwrap();
        let result = sim.run_episode().unwrap();

        let mut export = EpisodeExport::new("single_root", &config, "UniformAttacker", "PassiveDefender");
        export.record(result);

        assert_eq!(export.frames.len(), 3);
        assert_eq!(export.frames[0].active_nodes, vec![1]);
        assert_eq!(export.frames[0].canonical_id, "1");
        assert_eq!(export.frames[0].attacked, vec![1]);
        // already active, nothing left to attempt
        assert!(export.frames[1].attacked.is_empty());
        assert_eq!(export.attacker_payoff, result.attacker_payoff());

        let json = export.to_json().unwrap();
        let back: EpisodeExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, export);
    }
}
