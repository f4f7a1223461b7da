//! Attempt history entries

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::time::{AtomicDateTime, DualTime};

/// One finished or abandoned attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Attempt index, never reused
    pub index: i32,
    /// Final time, empty when the attempt did not finish
    #[serde(default)]
    pub time: DualTime,
    #[serde(default)]
    pub started: Option<AtomicDateTime>,
    #[serde(default)]
    pub ended: Option<AtomicDateTime>,
    /// Total time spent paused
    #[serde(default, with = "crate::time::serde_millis::option")]
    pub pause_time: Option<TimeDelta>,
}

impl Attempt {
    pub fn new(
        index: i32,
        time: DualTime,
        started: Option<AtomicDateTime>,
        ended: Option<AtomicDateTime>,
        pause_time: Option<TimeDelta>,
    ) -> Self {
        Self {
            index,
            time,
            started,
            ended,
            pause_time,
        }
    }

    /// Whether the attempt reached the last split
    pub fn is_finished(&self) -> bool {
        !self.time.is_empty()
    }

    /// Wall-clock length of the attempt, when both ends were stamped
    pub fn duration(&self) -> Option<TimeDelta> {
        match (self.started, self.ended) {
            (Some(started), Some(ended)) => Some(ended.time - started.time),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_unfinished_attempt() {
        let attempt = Attempt::new(0, DualTime::default(), None, None, None);
        assert!(!attempt.is_finished());
        assert!(attempt.duration().is_none());
    }

    #[test]
    fn test_duration() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let attempt = Attempt::new(
            3,
            DualTime::real(TimeDelta::seconds(90)),
            Some(AtomicDateTime::new(start, true)),
            Some(AtomicDateTime::new(start + TimeDelta::seconds(95), true)),
            Some(TimeDelta::seconds(5)),
        );
        assert!(attempt.is_finished());
        assert_eq!(attempt.duration(), Some(TimeDelta::seconds(95)));
    }
}
