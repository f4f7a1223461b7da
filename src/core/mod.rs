//! Core timer abstractions
//!
//! This module contains the split timer state machine:
//! - `Timer` - drives a run through start / split / skip / undo / reset
//! - `TimerPhase` - phase of the current attempt
//! - `TimerEvent` - events returned by timer commands

mod events;
mod history;
mod state;
mod timer;

pub use events::{CycleDirection, EventHandler, TimerCallback, TimerEvent};
pub use state::TimerPhase;
pub use timer::Timer;
