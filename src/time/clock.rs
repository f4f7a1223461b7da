//! Clock sources

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::sync::Arc;
use std::time::Instant;

/// A point on a monotonic clock, measured from the clock's own origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeStamp(TimeDelta);

impl TimeStamp {
    /// Create a timestamp at `elapsed` past the clock origin
    pub fn from_origin(elapsed: TimeDelta) -> Self {
        Self(elapsed)
    }

    /// Time since the clock origin
    pub fn since_origin(&self) -> TimeDelta {
        self.0
    }
}

impl Default for TimeStamp {
    fn default() -> Self {
        Self(TimeDelta::zero())
    }
}

impl Sub for TimeStamp {
    type Output = TimeDelta;

    fn sub(self, rhs: TimeStamp) -> TimeDelta {
        self.0 - rhs.0
    }
}

impl Sub<TimeDelta> for TimeStamp {
    type Output = TimeStamp;

    fn sub(self, rhs: TimeDelta) -> TimeStamp {
        TimeStamp(self.0 - rhs)
    }
}

impl Add<TimeDelta> for TimeStamp {
    type Output = TimeStamp;

    fn add(self, rhs: TimeDelta) -> TimeStamp {
        TimeStamp(self.0 + rhs)
    }
}

/// Wall-clock time, flagged with whether it was synced to a trusted clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicDateTime {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub synced_with_atomic_clock: bool,
}

impl AtomicDateTime {
    pub fn new(time: DateTime<Utc>, synced_with_atomic_clock: bool) -> Self {
        Self {
            time,
            synced_with_atomic_clock,
        }
    }
}

/// Source of time for the timer
///
/// `now` drives every elapsed-time computation; `now_utc` is only used to
/// stamp when attempts start and end.
pub trait Clock {
    /// Current monotonic time
    fn now(&self) -> TimeStamp;

    /// Current wall-clock time
    fn now_utc(&self) -> AtomicDateTime;
}

/// Clock backed by `std::time::Instant` and the system wall clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TimeStamp {
        let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::MAX);
        TimeStamp(elapsed)
    }

    fn now_utc(&self) -> AtomicDateTime {
        AtomicDateTime::new(Utc::now(), false)
    }
}

#[derive(Debug)]
struct ManualClockState {
    elapsed: TimeDelta,
    wall: DateTime<Utc>,
    synced: bool,
}

/// Clock that only moves when told to
///
/// Clones share the same time, so a host can keep a handle after moving the
/// clock into a `Timer`. Used for replays and tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualClockState>>,
}

impl ManualClock {
    /// Create a clock at its origin with the given wall-clock time
    pub fn new(wall: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualClockState {
                elapsed: TimeDelta::zero(),
                wall,
                synced: false,
            })),
        }
    }

    /// Move both the monotonic and the wall clock forward
    pub fn advance(&self, by: TimeDelta) {
        let mut state = self.state.lock();
        state.elapsed += by;
        state.wall += by;
    }

    /// Mark subsequent wall-clock readings as synced (or not)
    pub fn set_synced(&self, synced: bool) {
        self.state.lock().synced = synced;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeStamp {
        TimeStamp(self.state.lock().elapsed)
    }

    fn now_utc(&self) -> AtomicDateTime {
        let state = self.state.lock();
        AtomicDateTime::new(state.wall, state.synced)
    }
}
