use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the evaluation passes and the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between scheduler ticks. Deadlines are whole days, so a
    /// minute is plenty.
    pub tick_interval_secs: u64,
    /// Upper bound on orchestrator passes per tick. A mission needs two
    /// passes to move from one remedy to the next.
    pub max_orchestration_passes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tick_interval_secs: 60,
            max_orchestration_passes: 4,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}
