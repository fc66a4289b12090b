//! Defender observations: one noisy alert flag per node per time step.

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

/// Sensor output for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub node: NodeId,
    pub alert: bool,
}

impl SecurityAlert {
    pub fn new(node: NodeId, alert: bool) -> Self {
        Self { node, alert }
    }
}

/// All alerts of one time step, in the order they were generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefenderObservation {
    alerts: Vec<SecurityAlert>,
}

impl DefenderObservation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, alert: SecurityAlert) {
        self.alerts.push(alert);
    }

    pub fn alerts(&self) -> &[SecurityAlert] {
        &self.alerts
    }

    /// Alert flag for `node`, if the observation covers it.
    pub fn alert_for(&self, node: NodeId) -> Option<bool> {
        self.alerts.iter().find(|a| a.node == node).map(|a| a.alert)
    }

    /// Nodes whose alert fired.
    pub fn fired_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.alerts.iter().filter(|a| a.alert).map(|a| a.node)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl FromIterator<SecurityAlert> for DefenderObservation {
    fn from_iter<I: IntoIterator<Item = SecurityAlert>>(iter: I) -> Self {
        Self {
            alerts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_lookup() {
        let obs: DefenderObservation = [
            SecurityAlert::new(NodeId(1), true),
            SecurityAlert::new(NodeId(2), false),
            SecurityAlert::new(NodeId(3), true),
        ]
        .into_iter()
        .collect();

        assert_eq!(obs.len(), 3);
        assert_eq!(obs.alert_for(NodeId(2)), Some(false));
        assert_eq!(obs.alert_for(NodeId(9)), None);
        assert_eq!(obs.fired_nodes().collect::<Vec<_>>(), vec![NodeId(1), NodeId(3)]);
    }
}
