//! Run data model
//!
//! - `RunState` - ordered segments plus run-level aggregates
//! - `Segment` - one split, optionally grouped under a parent row
//! - `Attempt` - one entry of the attempt history
//! - `FrozenRun` - snapshot of an interrupted attempt

mod attempt;
mod fixup;
mod frozen;
mod segment;
mod state;

pub use attempt::Attempt;
pub use frozen::FrozenRun;
pub use segment::{Segment, DEATHS_UNSET};
pub use state::{RunState, BEST_SEGMENTS_COMPARISON, PERSONAL_BEST_COMPARISON};
