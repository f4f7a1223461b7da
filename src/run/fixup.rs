//! Run maintenance applied after resets and personal best changes

use super::state::RunState;
use crate::time::{improves_on, DualTime, TimingMethod};

impl RunState {
    /// Repair derived records after the run changed
    ///
    /// Per clock: personal best split times are made non-decreasing, and each
    /// best segment is lowered to any shorter personal best segment or
    /// recorded history segment. History is not used for parent rows, whose
    /// history entries only hold the step from their last child.
    pub fn fix_splits(&mut self) {
        for method in TimingMethod::ALL {
            self.fix_personal_best_order(method);
        }

        let personal_best_segments = self.segment_times(|s| s.personal_best_split_time);
        for index in 0..self.segments.len() {
            let is_parent_row = self.is_parent_row(index);
            let segment = &mut self.segments[index];
            for method in TimingMethod::ALL {
                let mut best = segment.best_segment_time.get(method);
                let pb_segment = personal_best_segments[index].get(method);
                if improves_on(pb_segment, best) {
                    best = pb_segment;
                }
                if !is_parent_row {
                    for recorded in segment.segment_history.values() {
                        if improves_on(recorded.get(method), best) {
                            best = recorded.get(method);
                        }
                    }
                }
                segment.best_segment_time.set(method, best);
            }
        }
    }

    fn fix_personal_best_order(&mut self, method: TimingMethod) {
        let mut previous = None;
        for segment in &mut self.segments {
            let Some(time) = segment.personal_best_split_time.get(method) else {
                continue;
            };
            match previous {
                Some(earlier) if time < earlier => {
                    log::debug!(
                        "Raising {:?} personal best of '{}' to {}ms",
                        method,
                        segment.name,
                        earlier.num_milliseconds()
                    );
                    segment.personal_best_split_time.set(method, Some(earlier));
                }
                _ => previous = Some(time),
            }
        }
    }

    /// Fold the outgoing personal best into segment history
    ///
    /// Segments of the current personal best that are not already recorded in
    /// a segment's history are stored under a fresh negative attempt index, so
    /// they survive the personal best being overwritten.
    pub fn import_segment_history(&mut self) {
        let personal_best_segments = self.segment_times(|s| s.personal_best_split_time);
        if personal_best_segments.iter().all(DualTime::is_empty) {
            return;
        }

        let lowest = self
            .segments
            .iter()
            .flat_map(|s| s.segment_history.keys().copied())
            .min()
            .unwrap_or(0);
        let index = lowest.min(0) - 1;

        let mut imported = 0;
        for (segment, pb_segment) in self.segments.iter_mut().zip(personal_best_segments) {
            if pb_segment.is_empty() || segment.segment_history.values().any(|t| *t == pb_segment) {
                continue;
            }
            segment.segment_history.insert(index, pb_segment);
            imported += 1;
        }

        if imported > 0 {
            log::debug!("Imported {} personal best segments at history index {}", imported, index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn secs(s: i64) -> TimeDelta {
        TimeDelta::seconds(s)
    }

    #[test]
    fn test_fix_personal_best_order() {
        let mut run = RunState::from_names(["A", "B", "C"]);
        run.segments[0].personal_best_split_time = DualTime::real(secs(10));
        run.segments[1].personal_best_split_time = DualTime::real(secs(8));
        run.segments[2].personal_best_split_time = DualTime::real(secs(20));

        run.fix_splits();
        assert_eq!(run.segments[1].personal_best_split_time.real_time, Some(secs(10)));
        assert_eq!(run.segments[2].personal_best_split_time.real_time, Some(secs(20)));
    }

    #[test]
    fn test_best_segment_lowered_to_history() {
        let mut run = RunState::from_names(["A", "B"]);
        run.segments[1].best_segment_time = DualTime::real(secs(9));
        run.segments[1].segment_history.insert(0, DualTime::real(secs(7)));
        run.segments[1].segment_history.insert(1, DualTime::real(secs(12)));

        run.fix_splits();
        assert_eq!(run.segments[1].best_segment_time.real_time, Some(secs(7)));
    }

    #[test]
    fn test_best_segment_filled_from_personal_best() {
        let mut run = RunState::from_names(["A", "B"]);
        run.segments[0].personal_best_split_time = DualTime::real(secs(10));
        run.segments[1].personal_best_split_time = DualTime::real(secs(16));

        run.fix_splits();
        assert_eq!(run.segments[0].best_segment_time.real_time, Some(secs(10)));
        assert_eq!(run.segments[1].best_segment_time.real_time, Some(secs(6)));
        assert!(run.segments[1].best_segment_time.game_time.is_none());
    }

    #[test]
    fn test_parent_row_ignores_history() {
        let mut run = RunState::default();
        run.push_group("Group", ["A", "B"]);
        run.segments[2].best_segment_time = DualTime::real(secs(12));
        run.segments[2].segment_history.insert(0, DualTime::real(secs(0)));

        run.fix_splits();
        assert_eq!(run.segments[2].best_segment_time.real_time, Some(secs(12)));
    }

    #[test]
    fn test_import_segment_history() {
        let mut run = RunState::from_names(["A", "B"]);
        run.segments[0].personal_best_split_time = DualTime::real(secs(10));
        run.segments[1].personal_best_split_time = DualTime::real(secs(16));
        run.segments[0].segment_history.insert(0, DualTime::real(secs(10)));

        run.import_segment_history();
        // Already recorded for A; missing for B
        assert_eq!(run.segments[0].segment_history.len(), 1);
        assert_eq!(
            run.segments[1].segment_history.get(&-1),
            Some(&DualTime::real(secs(6)))
        );

        // A second import uses a lower index and finds nothing new
        run.import_segment_history();
        assert_eq!(run.segments[1].segment_history.len(), 1);
    }

    #[test]
    fn test_import_without_personal_best() {
        let mut run = RunState::from_names(["A"]);
        run.import_segment_history();
        assert!(run.segments[0].segment_history.is_empty());
    }
}
