//! Configuration types for the timer
//!
//! These types define the structure of timer configurations loaded from TOML
//! files: timer settings plus the definition of the run to time.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Timer;
use crate::run::{FrozenRun, RunState, Segment, PERSONAL_BEST_COMPARISON};
use crate::time::{Clock, TimingMethod};
use crate::{Result, TimerError};

/// One entry of a run definition
///
/// An entry with `children` becomes a group: the children in order, followed
/// by a parent row carrying the entry's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDefinition {
    pub name: String,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Definition of a run: segments, offset and comparisons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDefinition {
    pub segments: Vec<SegmentDefinition>,
    /// Start offset in milliseconds; negative for a countdown
    #[serde(default)]
    pub offset_ms: i64,
    #[serde(default)]
    pub comparisons: Vec<String>,
    #[serde(default)]
    pub current_comparison: Option<String>,
}

impl RunDefinition {
    /// Build and validate the run
    pub fn build(&self) -> Result<RunState> {
        if self.segments.is_empty() {
            return Err(TimerError::invalid_run("run has no segments"));
        }

        let mut run = RunState::default();
        for definition in &self.segments {
            if definition.name.trim().is_empty() {
                return Err(TimerError::invalid_run("segment name is empty"));
            }
            if definition.children.is_empty() {
                run.segments.push(Segment::new(definition.name.as_str()));
            } else {
                run.push_group(definition.name.as_str(), definition.children.iter().cloned());
            }
        }

        run.offset = TimeDelta::milliseconds(self.offset_ms);
        if !self.comparisons.is_empty() {
            run.comparisons = self.comparisons.clone();
        }
        run.current_comparison = match &self.current_comparison {
            Some(comparison) => comparison.clone(),
            None if run.comparisons.iter().any(|c| c == PERSONAL_BEST_COMPARISON) => {
                PERSONAL_BEST_COMPARISON.to_string()
            }
            None => run.comparisons[0].clone(),
        };

        run.validate()?;
        log::debug!("Built run with {} splits", run.len());
        Ok(run)
    }
}

/// Full timer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Clock used to decide personal bests
    #[serde(default)]
    pub timing_method: TimingMethod,
    pub run: RunDefinition,
    /// Snapshot of an interrupted attempt, as written by `FrozenRun::to_json`
    #[serde(default)]
    pub frozen_run: Option<String>,
}

impl TimerConfig {
    /// Load a configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        log::info!("Loading timer config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build a timer for the configured run
    pub fn into_timer<C: Clock>(self, clock: C) -> Result<Timer<C>> {
        let mut run = self.run.build()?;
        if let Some(json) = &self.frozen_run {
            run.frozen_run = Some(FrozenRun::from_json(json)?);
        }
        let mut timer = Timer::with_clock(run, clock);
        timer.set_timing_method(self.timing_method);
        Ok(timer)
    }
}
