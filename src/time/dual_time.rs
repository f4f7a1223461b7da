//! Real time / game time pairs

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Which clock a comparison or personal best is judged by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingMethod {
    /// Wall time since the attempt started, minus pauses
    #[default]
    RealTime,
    /// In-game time, i.e. real time minus loading times
    GameTime,
}

impl TimingMethod {
    /// Both methods, real time first
    pub const ALL: [TimingMethod; 2] = [TimingMethod::RealTime, TimingMethod::GameTime];
}

/// A time recorded on both clocks
///
/// Each component is optional. A missing component stays missing through
/// arithmetic, and a `DualTime` with both components missing means
/// "not recorded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DualTime {
    /// Primary clock
    #[serde(default, with = "super::serde_millis::option", skip_serializing_if = "Option::is_none")]
    pub real_time: Option<TimeDelta>,
    /// Secondary (alternate) clock
    #[serde(default, with = "super::serde_millis::option", skip_serializing_if = "Option::is_none")]
    pub game_time: Option<TimeDelta>,
}

impl DualTime {
    /// Create a time from both components
    pub fn new(real_time: Option<TimeDelta>, game_time: Option<TimeDelta>) -> Self {
        Self { real_time, game_time }
    }

    /// Zero on both clocks
    pub fn zero() -> Self {
        Self::new(Some(TimeDelta::zero()), Some(TimeDelta::zero()))
    }

    /// Same duration on both clocks
    pub fn both(time: TimeDelta) -> Self {
        Self::new(Some(time), Some(time))
    }

    /// Real time only
    pub fn real(time: TimeDelta) -> Self {
        Self::new(Some(time), None)
    }

    /// True when neither component is recorded
    pub fn is_empty(&self) -> bool {
        self.real_time.is_none() && self.game_time.is_none()
    }

    /// Get the component for a timing method
    pub fn get(&self, method: TimingMethod) -> Option<TimeDelta> {
        match method {
            TimingMethod::RealTime => self.real_time,
            TimingMethod::GameTime => self.game_time,
        }
    }

    /// Replace the component for a timing method
    pub fn set(&mut self, method: TimingMethod, time: Option<TimeDelta>) {
        match method {
            TimingMethod::RealTime => self.real_time = time,
            TimingMethod::GameTime => self.game_time = time,
        }
    }
}

fn zip_with(
    left: Option<TimeDelta>,
    right: Option<TimeDelta>,
    op: impl Fn(TimeDelta, TimeDelta) -> TimeDelta,
) -> Option<TimeDelta> {
    match (left, right) {
        (Some(l), Some(r)) => Some(op(l, r)),
        _ => None,
    }
}

impl Add for DualTime {
    type Output = DualTime;

    fn add(self, rhs: DualTime) -> DualTime {
        DualTime::new(
            zip_with(self.real_time, rhs.real_time, |l, r| l + r),
            zip_with(self.game_time, rhs.game_time, |l, r| l + r),
        )
    }
}

impl Sub for DualTime {
    type Output = DualTime;

    fn sub(self, rhs: DualTime) -> DualTime {
        DualTime::new(
            zip_with(self.real_time, rhs.real_time, |l, r| l - r),
            zip_with(self.game_time, rhs.game_time, |l, r| l - r),
        )
    }
}

/// True when `candidate` should replace `stored`
///
/// A recorded candidate beats a missing stored value; otherwise it has to be
/// strictly shorter. A missing candidate never wins.
pub fn improves_on(candidate: Option<TimeDelta>, stored: Option<TimeDelta>) -> bool {
    match (candidate, stored) {
        (Some(_), None) => true,
        (Some(c), Some(s)) => c < s,
        (None, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: i64) -> TimeDelta {
        TimeDelta::seconds(s)
    }

    #[test]
    fn test_default_is_empty() {
        assert!(DualTime::default().is_empty());
        assert!(!DualTime::real(secs(1)).is_empty());
    }

    #[test]
    fn test_subtraction_propagates_missing() {
        let split = DualTime::new(Some(secs(15)), None);
        let previous = DualTime::both(secs(10));
        let segment = split - previous;
        assert_eq!(segment.real_time, Some(secs(5)));
        assert_eq!(segment.game_time, None);
    }

    #[test]
    fn test_addition_keeps_missing_components_missing() {
        let split = DualTime::new(Some(secs(20)), None);
        let total = split + DualTime::both(secs(3));
        assert_eq!(total, DualTime::new(Some(secs(23)), None));
    }

    #[test]
    fn test_get_and_set_by_method() {
        let mut time = DualTime::default();
        time.set(TimingMethod::GameTime, Some(secs(7)));
        assert_eq!(time.get(TimingMethod::GameTime), Some(secs(7)));
        assert_eq!(time.get(TimingMethod::RealTime), None);
    }

    #[test]
    fn test_improves_on() {
        assert!(improves_on(Some(secs(5)), None));
        assert!(improves_on(Some(secs(4)), Some(secs(5))));
        assert!(!improves_on(Some(secs(5)), Some(secs(5))));
        assert!(!improves_on(None, Some(secs(5))));
        assert!(!improves_on(None, None));
    }

    #[test]
    fn test_serializes_as_milliseconds() {
        let time = DualTime::new(Some(TimeDelta::milliseconds(1_500)), None);
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, r#"{"real_time":1500}"#);

        let parsed: DualTime = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, time);
    }
}
