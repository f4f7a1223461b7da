//! NYA Core Timer
//!
//! The split timer behind the hit counter: a deterministic state machine that
//! times a run through an ordered list of splits, optionally grouped under
//! parent rows, while counting deaths per split.
//!
//! It tracks, at every instant:
//! - the phase of the attempt and which split is active
//! - best segments and the personal best, on real time and game time
//! - deaths per split, per group and per run
//!
//! Rendering, hotkeys and storage belong to the host. Commands never fail;
//! they return the events they produced, and an empty list when ignored.
//!
//! ```ignore
//! let mut timer = Timer::new(RunState::from_names(["Asylum Demon", "Taurus Demon"]));
//! timer.start();
//! timer.add_deaths(1);
//! timer.split();
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod run;
pub mod shared;
pub mod time;

// Re-export commonly used types
pub use crate::config::{RunDefinition, SegmentDefinition, TimerConfig};
pub use crate::core::{CycleDirection, EventHandler, Timer, TimerEvent, TimerPhase};
pub use crate::error::{Result, TimerError};
pub use crate::run::{Attempt, FrozenRun, RunState, Segment, DEATHS_UNSET};
pub use crate::shared::SharedTimer;
pub use crate::time::{AtomicDateTime, Clock, DualTime, ManualClock, SystemClock, TimeStamp, TimingMethod};
