use crate::input::Command;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters accumulated by one decision engine over its lifetime.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct AiMetrics {
    pub ticks: u64,
    pub constructs: u64,
    pub destroys: u64,
    pub work_areas: u64,
    pub moves: u64,
    pub reassignments: u64,
    /// Placement searches that found no site.
    pub failed_placements: u64,
    /// Passes cut short by an inconsistent snapshot.
    pub diagnostics: u64,
    pub decision_time: Duration,
}

impl AiMetrics {
    pub fn record(&mut self, command: &Command) {
        match command {
            Command::Construct { .. } => self.constructs += 1,
            Command::Destroy { .. } => self.destroys += 1,
            Command::SetWorkArea { .. } => self.work_areas += 1,
            Command::MoveUnits { .. } => self.moves += 1,
            Command::ReassignRole { .. } => self.reassignments += 1,
        }
    }

    pub fn commands(&self) -> u64 {
        self.constructs + self.destroys + self.work_areas + self.moves + self.reassignments
    }

    pub fn tick_avg_ms(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.decision_time.as_secs_f64() * 1000.0 / self.ticks as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Position;

    #[test]
    fn test_record_by_kind() {
        let mut metrics = AiMetrics::default();
        metrics.record(&Command::Destroy {
            position: Position::new(0, 0),
        });
        metrics.record(&Command::MoveUnits {
            target: Position::new(1, 1),
            units: vec![],
        });
        assert_eq!(metrics.destroys, 1);
        assert_eq!(metrics.moves, 1);
        assert_eq!(metrics.commands(), 2);
        assert_eq!(metrics.tick_avg_ms(), 0.0);
    }
}
