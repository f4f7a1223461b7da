//! Run definition and run-level aggregates

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::attempt::Attempt;
use super::frozen::FrozenRun;
use super::segment::{Segment, DEATHS_UNSET};
use crate::time::{DualTime, TimingMethod};
use crate::{Result, TimerError};

/// Comparison against the personal best run
pub const PERSONAL_BEST_COMPARISON: &str = "Personal Best";
/// Comparison against the sum of best segments
pub const BEST_SEGMENTS_COMPARISON: &str = "Best Segments";

fn default_comparisons() -> Vec<String> {
    vec![
        PERSONAL_BEST_COMPARISON.to_string(),
        BEST_SEGMENTS_COMPARISON.to_string(),
    ]
}

fn default_current_comparison() -> String {
    PERSONAL_BEST_COMPARISON.to_string()
}

fn unset_deaths() -> i32 {
    DEATHS_UNSET
}

/// A run: ordered segments plus everything recorded about past attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub segments: Vec<Segment>,
    #[serde(default)]
    attempt_history: Vec<Attempt>,
    #[serde(default)]
    pub attempt_count: u32,
    /// Time shown before the attempt starts; negative for a countdown
    #[serde(default = "TimeDelta::zero", with = "crate::time::serde_millis")]
    pub offset: TimeDelta,
    /// Deaths in the current attempt
    #[serde(default)]
    pub current_death_count: i32,
    /// Fewest deaths in a finished attempt, `DEATHS_UNSET` if none finished
    #[serde(default = "unset_deaths")]
    pub best_death_count: i32,
    #[serde(default = "default_comparisons")]
    pub comparisons: Vec<String>,
    #[serde(default = "default_current_comparison")]
    pub current_comparison: String,
    /// Set whenever the run has unsaved changes
    #[serde(skip)]
    pub has_changed: bool,
    /// Identity of the catalogued run this was imported from
    #[serde(default)]
    pub run_id: Option<String>,
    /// Interrupted attempt waiting to be resumed
    #[serde(default)]
    pub frozen_run: Option<FrozenRun>,
}

impl RunState {
    /// Create a run from its segments
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            attempt_history: Vec::new(),
            attempt_count: 0,
            offset: TimeDelta::zero(),
            current_death_count: 0,
            best_death_count: DEATHS_UNSET,
            comparisons: default_comparisons(),
            current_comparison: default_current_comparison(),
            has_changed: false,
            run_id: None,
            frozen_run: None,
        }
    }

    /// Create a run of top-level segments with the given names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Segment::new).collect())
    }

    /// Append a top-level segment, returning its index
    pub fn push_segment(&mut self, name: impl Into<String>) -> usize {
        self.segments.push(Segment::new(name));
        self.segments.len() - 1
    }

    /// Append a group: its children followed by the parent row
    ///
    /// Returns the index of the parent row.
    pub fn push_group<I, S>(&mut self, parent_name: impl Into<String>, children: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let children: Vec<String> = children.into_iter().map(Into::into).collect();
        let parent_index = self.segments.len() + children.len();
        for child in children {
            self.segments.push(Segment::child_of(child, parent_index));
        }
        self.segments.push(Segment::new(parent_name));
        parent_index
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Past attempts, oldest first
    pub fn attempt_history(&self) -> &[Attempt] {
        &self.attempt_history
    }

    pub(crate) fn push_attempt(&mut self, attempt: Attempt) {
        self.attempt_history.push(attempt);
    }

    /// Whether `parent` is the parent row of `child`
    pub fn is_parent_of(&self, parent: usize, child: usize) -> bool {
        self.segments
            .get(child)
            .map_or(false, |segment| segment.parent == Some(parent))
    }

    /// Whether two segments belong to the same group (or both to none)
    pub fn same_parent(&self, left: usize, right: usize) -> bool {
        match (self.segments.get(left), self.segments.get(right)) {
            (Some(l), Some(r)) => l.parent == r.parent,
            _ => false,
        }
    }

    /// Whether the segment at `index` closes a group
    pub fn is_parent_row(&self, index: usize) -> bool {
        index > 0 && self.is_parent_of(index, index - 1)
    }

    /// Indices of the children of a parent row
    pub fn children(&self, parent: usize) -> Range<usize> {
        let end = parent.min(self.segments.len());
        let mut first = end;
        while first > 0 && self.is_parent_of(parent, first - 1) {
            first -= 1;
        }
        first..end
    }

    /// Check the group layout
    ///
    /// A parent row must come after all of its children, the children must be
    /// contiguous, and parent rows cannot belong to a group themselves.
    pub fn validate(&self) -> Result<()> {
        for (index, segment) in self.segments.iter().enumerate() {
            let Some(parent) = segment.parent else {
                continue;
            };
            if parent >= self.segments.len() {
                return Err(TimerError::invalid_run(format!(
                    "segment {} '{}' points to missing parent {}",
                    index, segment.name, parent
                )));
            }
            if parent <= index {
                return Err(TimerError::invalid_run(format!(
                    "segment {} '{}' must come before its parent row {}",
                    index, segment.name, parent
                )));
            }
            if self.segments[parent].parent.is_some() {
                return Err(TimerError::invalid_run(format!(
                    "parent row {} '{}' cannot belong to a group",
                    parent, self.segments[parent].name
                )));
            }
            let gap = (index + 1..parent).find(|&i| self.segments[i].parent != Some(parent));
            if let Some(gap) = gap {
                return Err(TimerError::invalid_run(format!(
                    "children of parent row {} are not contiguous (segment {} breaks the group)",
                    parent, gap
                )));
            }
        }
        if !self.comparisons.is_empty() && !self.comparisons.contains(&self.current_comparison) {
            return Err(TimerError::invalid_run(format!(
                "current comparison '{}' is not in the comparison list",
                self.current_comparison
            )));
        }
        Ok(())
    }

    /// Segment durations derived from per-split times
    ///
    /// For each clock, a segment is its split time minus the last recorded
    /// split time before it. A parent row is measured from the time its group
    /// was entered instead, so it spans the whole group. Splits without a
    /// time yield a missing component.
    pub fn segment_times<F>(&self, split_time: F) -> Vec<DualTime>
    where
        F: Fn(&Segment) -> DualTime,
    {
        let mut times = Vec::with_capacity(self.segments.len());
        let mut current_parent: Option<usize> = None;
        let mut previous = DualTime::zero();
        let mut group_start = DualTime::zero();

        for (index, segment) in self.segments.iter().enumerate() {
            if current_parent.is_none() && segment.parent.is_some() {
                group_start = previous;
            }
            let reference = if current_parent == Some(index) {
                group_start
            } else {
                previous
            };

            let split = split_time(segment);
            let mut segment_time = DualTime::default();
            for method in TimingMethod::ALL {
                if let Some(time) = split.get(method) {
                    segment_time.set(method, reference.get(method).map(|r| time - r));
                    previous.set(method, Some(time));
                }
            }

            current_parent = segment.parent;
            times.push(segment_time);
        }
        times
    }

    /// Move the current comparison `step` places through the cyclic list
    ///
    /// Returns the new comparison, or `None` when the list is empty.
    pub(crate) fn cycle_comparison(&mut self, step: i64) -> Option<&str> {
        if self.comparisons.is_empty() {
            return None;
        }
        let len = self.comparisons.len() as i64;
        let position = self
            .comparisons
            .iter()
            .position(|c| *c == self.current_comparison)
            .map_or(-1, |p| p as i64);
        let next = (position + step).rem_euclid(len) as usize;
        self.current_comparison = self.comparisons[next].clone();
        Some(&self.current_comparison)
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
