//! Recording finished attempts
//!
//! Run on reset, in order: attempt history, best segments, personal best,
//! segment history.

use super::state::TimerPhase;
use super::timer::Timer;
use crate::run::{Attempt, DEATHS_UNSET};
use crate::time::{improves_on, Clock, DualTime, TimingMethod};

impl<C: Clock> Timer<C> {
    /// Append the attempt to the run's attempt history
    pub(super) fn update_attempt_history(&mut self) {
        let time = if self.phase == TimerPhase::Ended {
            self.current_time()
        } else {
            DualTime::default()
        };
        let index = self
            .run
            .attempt_history()
            .iter()
            .map(|attempt| attempt.index)
            .max()
            .map_or(0, |max| (max + 1).max(0));

        log::debug!("Recording attempt {}", index);
        let attempt = Attempt::new(
            index,
            time,
            self.attempt_started,
            self.attempt_ended,
            self.pause_time(),
        );
        self.run.push_attempt(attempt);
    }

    /// Lower best segments and best death counts to this attempt's values
    pub(super) fn update_best_segments(&mut self) {
        let run = &mut self.run;
        if self.phase == TimerPhase::Ended
            && (run.best_death_count == DEATHS_UNSET
                || run.current_death_count < run.best_death_count)
        {
            run.best_death_count = run.current_death_count;
        }

        let segment_times = run.segment_times(|segment| segment.split_time);
        for (segment, segment_time) in run.segments.iter_mut().zip(segment_times) {
            for method in TimingMethod::ALL {
                if improves_on(segment_time.get(method), segment.best_segment_time.get(method)) {
                    segment.best_segment_time.set(method, segment_time.get(method));
                }
            }

            if segment.death_count >= 0
                && (segment.best_death_count == DEATHS_UNSET
                    || segment.death_count < segment.best_death_count)
            {
                segment.best_death_count = segment.death_count;
            }
        }
    }

    /// Promote the attempt if it beat the personal best on the active method
    pub(super) fn update_personal_best(&mut self) {
        let method = self.timing_method;
        let Some(last) = self.run.last_segment() else {
            return;
        };
        if improves_on(
            last.split_time.get(method),
            last.personal_best_split_time.get(method),
        ) {
            self.set_run_as_personal_best();
        }
    }

    /// Record each completed split's segment under the latest attempt index
    pub(super) fn update_segment_history(&mut self) {
        let Some(attempt_index) = self.run.attempt_history().last().map(|a| a.index) else {
            return;
        };
        let completed = self.current_split_index.unwrap_or(0);

        let mut previous = DualTime::zero();
        for segment in self.run.segments.iter_mut().take(completed) {
            let split = segment.split_time;
            segment
                .segment_history
                .entry(attempt_index)
                .or_insert(split - previous);

            for method in TimingMethod::ALL {
                if let Some(time) = split.get(method) {
                    previous.set(method, Some(time));
                }
            }
        }
    }

    /// Make the current attempt the personal best
    fn set_run_as_personal_best(&mut self) {
        self.run.import_segment_history();
        self.run.fix_splits();
        for segment in &mut self.run.segments {
            segment.personal_best_split_time = segment.split_time;
            segment.personal_best_death_count = segment.death_count;
        }
        self.run.run_id = None;

        let final_time = self
            .run
            .last_segment()
            .and_then(|s| s.split_time.get(self.timing_method));
        log::info!(
            "New personal best: {:?}ms",
            final_time.map(|t| t.num_milliseconds())
        );
    }
}
