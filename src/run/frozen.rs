//! Snapshots of interrupted attempts

use serde::{Deserialize, Serialize};

use crate::time::DualTime;
use crate::Result;

/// An attempt frozen mid-run so it can be resumed later
///
/// Entry `i` holds the deaths and end time of split `i`. The last entry is
/// the split that was active when the attempt was frozen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrozenRun {
    pub split_deaths: Vec<i32>,
    pub split_end_times: Vec<DualTime>,
}

impl FrozenRun {
    pub fn new(split_deaths: Vec<i32>, split_end_times: Vec<DualTime>) -> Self {
        Self {
            split_deaths,
            split_end_times,
        }
    }

    /// Number of splits covered by the snapshot
    pub fn len(&self) -> usize {
        self.split_deaths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.split_deaths.is_empty()
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the snapshot to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
