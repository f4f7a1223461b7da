//! A single split in a run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::time::DualTime;

/// Death count meaning "not measured this attempt"
pub const DEATHS_UNSET: i32 = -1;

/// One split of a run
///
/// Segments live in a flat list. A segment that belongs to a group stores the
/// list index of its parent row; the parent row sits right after the last
/// child of the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Display name
    pub name: String,
    /// Time recorded for this split in the current attempt
    #[serde(default, skip_serializing_if = "DualTime::is_empty")]
    pub split_time: DualTime,
    /// Shortest segment ever recorded, per clock
    #[serde(default)]
    pub best_segment_time: DualTime,
    /// Split time in the personal best run
    #[serde(default)]
    pub personal_best_split_time: DualTime,
    /// Fewest deaths ever recorded on this split
    #[serde(default = "unset_deaths")]
    pub best_death_count: i32,
    /// Deaths on this split in the personal best run
    #[serde(default = "unset_deaths")]
    pub personal_best_death_count: i32,
    /// Deaths in the current attempt, `DEATHS_UNSET` when not measured
    #[serde(default = "unset_deaths")]
    pub death_count: i32,
    /// Segment time per attempt index
    #[serde(default)]
    pub segment_history: BTreeMap<i32, DualTime>,
    /// Index of the parent row, if this split belongs to a group
    #[serde(default)]
    pub parent: Option<usize>,
}

fn unset_deaths() -> i32 {
    DEATHS_UNSET
}

impl Segment {
    /// Create a top-level segment
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            split_time: DualTime::default(),
            best_segment_time: DualTime::default(),
            personal_best_split_time: DualTime::default(),
            best_death_count: DEATHS_UNSET,
            personal_best_death_count: DEATHS_UNSET,
            death_count: DEATHS_UNSET,
            segment_history: BTreeMap::new(),
            parent: None,
        }
    }

    /// Create a segment belonging to the group closed by `parent`
    pub fn child_of(name: impl Into<String>, parent: usize) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(name)
        }
    }

    /// Death count with the unset marker read as zero
    pub fn deaths_or_zero(&self) -> i32 {
        self.death_count.max(0)
    }

    /// Whether deaths were measured this attempt
    pub fn has_deaths(&self) -> bool {
        self.death_count != DEATHS_UNSET
    }

    /// Clear per-attempt state
    pub fn reset_attempt(&mut self) {
        self.split_time = DualTime::default();
        self.death_count = DEATHS_UNSET;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_new_segment_is_unset() {
        let segment = Segment::new("Asylum Demon");
        assert_eq!(segment.name, "Asylum Demon");
        assert_eq!(segment.death_count, DEATHS_UNSET);
        assert_eq!(segment.best_death_count, DEATHS_UNSET);
        assert!(segment.split_time.is_empty());
        assert!(segment.parent.is_none());
        assert!(!segment.has_deaths());
    }

    #[test]
    fn test_child_of() {
        let segment = Segment::child_of("Taurus Demon", 3);
        assert_eq!(segment.parent, Some(3));
    }

    #[test]
    fn test_deaths_or_zero() {
        let mut segment = Segment::new("Gargoyles");
        assert_eq!(segment.deaths_or_zero(), 0);
        segment.death_count = 4;
        assert_eq!(segment.deaths_or_zero(), 4);
    }

    #[test]
    fn test_reset_attempt_keeps_records() {
        let mut segment = Segment::new("Capra Demon");
        segment.split_time = DualTime::real(TimeDelta::seconds(30));
        segment.best_segment_time = DualTime::real(TimeDelta::seconds(25));
        segment.death_count = 2;

        segment.reset_attempt();
        assert!(segment.split_time.is_empty());
        assert_eq!(segment.death_count, DEATHS_UNSET);
        assert_eq!(segment.best_segment_time.real_time, Some(TimeDelta::seconds(25)));
    }

    #[test]
    fn test_deserialize_defaults() {
        let segment: Segment = serde_json::from_str(r#"{"name":"Quelaag"}"#).unwrap();
        assert_eq!(segment, Segment::new("Quelaag"));
    }
}
