//! Timer phase

use serde::{Deserialize, Serialize};

/// Phase of the current attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// No attempt in progress
    #[default]
    NotRunning,
    /// Attempt in progress, clock ticking
    Running,
    /// Attempt in progress, clock stopped
    Paused,
    /// Last split reached, waiting for a reset
    Ended,
}

impl TimerPhase {
    /// Whether an attempt is in progress (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, TimerPhase::Running | TimerPhase::Paused)
    }
}
