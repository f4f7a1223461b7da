//! Events emitted by the timer

use super::state::TimerPhase;
use crate::time::DualTime;

/// Direction of a comparison switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Previous,
}

/// Event produced by a timer command, after the command's mutation
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// An attempt started (or a frozen attempt was resumed)
    Started,
    /// A split was completed
    Split {
        /// Index of the split that was completed
        segment: usize,
        /// Time recorded on it
        time: DualTime,
        /// Whether this split finished the run
        finished: bool,
    },
    /// A split was skipped without recording a time
    SplitSkipped { segment: usize },
    /// The previous split was reopened; `segment` is now active
    SplitUndone { segment: usize },
    Paused,
    Resumed,
    AllPausesUndone,
    /// The attempt was reset
    Reset { previous_phase: TimerPhase },
    /// The current comparison changed
    ComparisonSwitched {
        comparison: String,
        direction: CycleDirection,
    },
}

/// Callback type for timer events
pub type TimerCallback = Box<dyn Fn(&TimerEvent) + Send + Sync>;

/// Event handler that can have multiple listeners
pub struct EventHandler {
    callbacks: Vec<TimerCallback>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback for timer events
    pub fn subscribe(&mut self, callback: TimerCallback) {
        self.callbacks.push(callback);
    }

    /// Deliver events to all listeners, in order
    pub fn emit(&self, events: &[TimerEvent]) {
        for event in events {
            for callback in &self.callbacks {
                callback(event);
            }
        }
    }

    /// Check if there are any listeners
    pub fn has_listeners(&self) -> bool {
        !self.callbacks.is_empty()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
