//! Split timer state machine

use chrono::TimeDelta;

use super::events::{CycleDirection, TimerEvent};
use super::state::TimerPhase;
use crate::run::{FrozenRun, RunState, DEATHS_UNSET};
use crate::time::{AtomicDateTime, Clock, DualTime, SystemClock, TimeStamp, TimingMethod};

/// The timer: drives a `RunState` through attempts
///
/// Every command checks its preconditions and does nothing when they do not
/// hold. Commands return the events they produced, in order; an empty list
/// means the command was ignored.
pub struct Timer<C: Clock = SystemClock> {
    pub(super) run: RunState,
    clock: C,
    pub(super) phase: TimerPhase,
    /// Active split, `None` before the attempt starts. Equals the number of
    /// splits once the run has ended.
    pub(super) current_split_index: Option<usize>,
    pub(super) timing_method: TimingMethod,
    pub(super) attempt_started: Option<AtomicDateTime>,
    pub(super) attempt_ended: Option<AtomicDateTime>,
    start_time: Option<TimeStamp>,
    adjusted_start_time: TimeStamp,
    start_time_with_offset: TimeStamp,
    time_paused_at: TimeDelta,
    is_game_time_initialized: bool,
    is_game_time_paused: bool,
    game_time_pause_time: Option<TimeDelta>,
    loading_times: TimeDelta,
    events: Vec<TimerEvent>,
}

impl Timer<SystemClock> {
    /// Create a timer for a run using the system clock
    pub fn new(run: RunState) -> Self {
        Self::with_clock(run, SystemClock::new())
    }
}

impl<C: Clock> Timer<C> {
    /// Create a timer for a run using the given clock
    pub fn with_clock(run: RunState, clock: C) -> Self {
        Self {
            run,
            clock,
            phase: TimerPhase::NotRunning,
            current_split_index: None,
            timing_method: TimingMethod::RealTime,
            attempt_started: None,
            attempt_ended: None,
            start_time: None,
            adjusted_start_time: TimeStamp::default(),
            start_time_with_offset: TimeStamp::default(),
            time_paused_at: TimeDelta::zero(),
            is_game_time_initialized: false,
            is_game_time_paused: false,
            game_time_pause_time: None,
            loading_times: TimeDelta::zero(),
            events: Vec::new(),
        }
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    /// Take the run back out of the timer
    pub fn into_run(self) -> RunState {
        self.run
    }

    /// Swap in a different run; only allowed while no attempt is in progress
    pub fn replace_run(&mut self, run: RunState) -> Option<RunState> {
        if self.phase != TimerPhase::NotRunning {
            log::warn!("Cannot replace the run during an attempt");
            return None;
        }
        Some(std::mem::replace(&mut self.run, run))
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Index of the active split, `None` before the attempt starts
    pub fn current_split_index(&self) -> Option<usize> {
        self.current_split_index
    }

    /// The active split, if the attempt is in progress
    pub fn current_split(&self) -> Option<&crate::run::Segment> {
        self.active_index().map(|index| &self.run.segments[index])
    }

    pub fn timing_method(&self) -> TimingMethod {
        self.timing_method
    }

    /// Select the clock used to decide personal bests
    pub fn set_timing_method(&mut self, method: TimingMethod) {
        self.timing_method = method;
    }

    /// Monotonic time the attempt started at, before applying the offset
    pub fn start_time(&self) -> Option<TimeStamp> {
        self.start_time
    }

    pub fn attempt_started(&self) -> Option<AtomicDateTime> {
        self.attempt_started
    }

    pub fn attempt_ended(&self) -> Option<AtomicDateTime> {
        self.attempt_ended
    }

    pub fn is_game_time_initialized(&self) -> bool {
        self.is_game_time_initialized
    }

    pub fn is_game_time_paused(&self) -> bool {
        self.is_game_time_paused
    }

    pub fn loading_times(&self) -> TimeDelta {
        self.loading_times
    }

    /// Current time on both clocks
    pub fn current_time(&self) -> DualTime {
        let last_split = self.run.last_segment().map(|s| s.split_time).unwrap_or_default();

        let real_time = match self.phase {
            TimerPhase::NotRunning => Some(self.run.offset),
            TimerPhase::Running => Some(self.clock.now() - self.adjusted_start_time),
            TimerPhase::Paused => Some(self.time_paused_at),
            TimerPhase::Ended => last_split.real_time,
        };

        let game_time = if self.phase == TimerPhase::Ended {
            last_split.game_time
        } else if self.is_game_time_paused {
            self.game_time_pause_time
        } else if self.is_game_time_initialized {
            real_time.map(|t| t - self.loading_times)
        } else {
            None
        };

        DualTime::new(real_time, game_time)
    }

    /// Time spent paused during the current attempt
    ///
    /// While paused, the ongoing pause is not counted until the timer resumes.
    pub fn pause_time(&self) -> Option<TimeDelta> {
        if self.phase == TimerPhase::NotRunning {
            None
        } else {
            Some(self.adjusted_start_time - self.start_time_with_offset)
        }
    }

    /// Index of the active split, if it points at a split
    pub(super) fn active_index(&self) -> Option<usize> {
        self.current_split_index.filter(|&index| index < self.run.segments.len())
    }

    fn take_events(&mut self) -> Vec<TimerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a new attempt
    pub fn start(&mut self) -> Vec<TimerEvent> {
        self.do_start();
        self.take_events()
    }

    fn do_start(&mut self) {
        if self.phase != TimerPhase::NotRunning {
            return;
        }
        if self.run.is_empty() {
            log::warn!("Cannot start a run without splits");
            return;
        }

        let now = self.clock.now();
        self.phase = TimerPhase::Running;
        self.current_split_index = Some(0);
        self.attempt_started = Some(self.clock.now_utc());
        self.attempt_ended = None;
        self.start_time = Some(now);
        self.start_time_with_offset = now - self.run.offset;
        self.adjusted_start_time = self.start_time_with_offset;
        self.time_paused_at = self.run.offset;
        self.is_game_time_initialized = false;

        self.zero_deaths(0);
        if let Some(parent) = self.run.segments[0].parent {
            self.zero_deaths(parent);
        }

        self.run.attempt_count += 1;
        self.run.has_changed = true;

        log::info!("Attempt {} started", self.run.attempt_count);
        self.events.push(TimerEvent::Started);
    }

    /// Pause a running attempt, or resume a paused one
    ///
    /// Pausing before the attempt has started starts it.
    pub fn pause(&mut self) -> Vec<TimerEvent> {
        self.do_pause();
        self.take_events()
    }

    fn do_pause(&mut self) {
        match self.phase {
            TimerPhase::Running => {
                self.time_paused_at = self.current_time().real_time.unwrap_or_else(TimeDelta::zero);
                self.phase = TimerPhase::Paused;
                log::debug!("Paused at {}ms", self.time_paused_at.num_milliseconds());
                self.events.push(TimerEvent::Paused);
            }
            TimerPhase::Paused => {
                self.adjusted_start_time = self.clock.now() - self.time_paused_at;
                self.phase = TimerPhase::Running;
                self.run.has_changed = true;
                log::debug!("Resumed at {}ms", self.time_paused_at.num_milliseconds());
                self.events.push(TimerEvent::Resumed);
            }
            TimerPhase::NotRunning => self.do_start(),
            TimerPhase::Ended => {}
        }
    }

    /// Remove every pause from the current attempt
    ///
    /// Resumes first when paused. Once the run has ended, the removed pause
    /// time is added back onto the final split.
    pub fn undo_all_pauses(&mut self) -> Vec<TimerEvent> {
        if self.phase == TimerPhase::Paused {
            self.do_pause();
        }

        let pause_time = self.pause_time().unwrap_or_else(TimeDelta::zero);
        if self.phase == TimerPhase::Ended {
            if let Some(last) = self.run.segments.last_mut() {
                last.split_time = last.split_time + DualTime::both(pause_time);
            }
        }

        self.adjusted_start_time = self.start_time_with_offset;
        log::debug!("Undid {}ms of pauses", pause_time.num_milliseconds());
        self.events.push(TimerEvent::AllPausesUndone);
        self.take_events()
    }

    /// Complete the active split
    pub fn split(&mut self) -> Vec<TimerEvent> {
        if self.phase != TimerPhase::Running {
            return Vec::new();
        }
        let Some(previous) = self.active_index() else {
            return Vec::new();
        };
        if !self.current_time().real_time.is_some_and(|t| t > TimeDelta::zero()) {
            return Vec::new();
        }

        if self.advance_split() {
            if let Some(current) = self.active_index() {
                if self.run.is_parent_of(current, previous) {
                    self.advance_split();
                }
            }
            self.enter_split(previous);
        }

        self.run.has_changed = true;
        let time = self.run.segments[previous].split_time;
        let finished = self.phase == TimerPhase::Ended;
        log::debug!(
            "Split '{}' at {:?}",
            self.run.segments[previous].name,
            time.real_time.map(|t| t.num_milliseconds())
        );
        if finished {
            log::info!("Run finished");
        }
        self.events.push(TimerEvent::Split {
            segment: previous,
            time,
            finished,
        });
        self.take_events()
    }

    /// Record the current time on the active split and move past it
    ///
    /// Returns false when that finished the run.
    fn advance_split(&mut self) -> bool {
        let Some(index) = self.active_index() else {
            return false;
        };
        self.run.segments[index].split_time = self.current_time();

        let next = index + 1;
        self.current_split_index = Some(next);
        if next == self.run.segments.len() {
            self.phase = TimerPhase::Ended;
            self.attempt_ended = Some(self.clock.now_utc());
            return false;
        }
        true
    }

    /// Move past the active split without recording a time
    fn skip_current(&mut self) {
        if let Some(index) = self.active_index() {
            self.run.segments[index].split_time = DualTime::default();
            self.current_split_index = Some(index + 1);
        }
    }

    /// Start measuring deaths on the newly active split
    ///
    /// The group's parent row is only zeroed when the group was just entered.
    fn enter_split(&mut self, previous: usize) {
        let Some(current) = self.active_index() else {
            return;
        };
        self.zero_deaths(current);
        if let Some(parent) = self.run.segments[current].parent {
            if !self.run.same_parent(current, previous) {
                self.zero_deaths(parent);
            }
        }
    }

    /// Skip the active split
    ///
    /// Ignored when no split would be left to become active.
    pub fn skip_split(&mut self) -> Vec<TimerEvent> {
        if !self.phase.is_active() {
            return Vec::new();
        }
        let Some(previous) = self.active_index() else {
            return Vec::new();
        };
        let len = self.run.segments.len();
        if previous + 1 >= len {
            return Vec::new();
        }
        let next = previous + 1;
        let next_is_parent = self.run.is_parent_of(next, previous);
        if next_is_parent && previous + 2 >= len {
            return Vec::new();
        }

        self.unset_deaths(previous);
        self.skip_current();
        if next_is_parent {
            if self.all_children_unset(next) {
                self.unset_deaths(next);
            }
            self.skip_current();
        }
        self.enter_split(previous);

        self.run.has_changed = true;
        log::debug!("Skipped '{}'", self.run.segments[previous].name);
        self.events.push(TimerEvent::SplitSkipped { segment: previous });
        self.take_events()
    }

    /// Reopen the previous split
    pub fn undo_split(&mut self) -> Vec<TimerEvent> {
        if self.phase == TimerPhase::NotRunning {
            return Vec::new();
        }
        let Some(index) = self.current_split_index.filter(|&i| i > 0) else {
            return Vec::new();
        };

        let (undone_deaths, previous_parent) = if self.phase == TimerPhase::Ended {
            self.phase = TimerPhase::Running;
            (0, None)
        } else {
            let segment = &mut self.run.segments[index];
            let deaths = segment.deaths_or_zero();
            segment.death_count = DEATHS_UNSET;
            (deaths, segment.parent)
        };

        self.step_back(undone_deaths);
        let current = self.current_split_index.unwrap_or(0);

        if let Some(parent) = previous_parent {
            if self.run.segments[current].parent != Some(parent) {
                self.unset_deaths(parent);
            }
        }

        if self.run.is_parent_row(current) {
            self.step_back(undone_deaths);
        }

        self.run.has_changed = true;
        let current = self.current_split_index.unwrap_or(0);
        log::debug!("Undid split, '{}' is active again", self.run.segments[current].name);
        self.events.push(TimerEvent::SplitUndone { segment: current });
        self.take_events()
    }

    fn step_back(&mut self, undone_deaths: i32) {
        let Some(index) = self.current_split_index.and_then(|i| i.checked_sub(1)) else {
            return;
        };
        self.current_split_index = Some(index);
        let segment = &mut self.run.segments[index];
        segment.split_time = DualTime::default();
        segment.death_count = segment.deaths_or_zero().saturating_add(undone_deaths);
    }

    /// Add (or with a negative count, remove) deaths on the active split
    ///
    /// Counts never drop below zero. Returns whether anything changed.
    pub fn add_deaths(&mut self, count: i32) -> bool {
        if self.phase != TimerPhase::Running {
            return false;
        }
        let Some(index) = self.active_index() else {
            return false;
        };

        let segment = &mut self.run.segments[index];
        let before = segment.deaths_or_zero();
        let after = before.saturating_add(count).max(0);
        segment.death_count = after;
        let applied = after - before;
        let parent = segment.parent;

        if let Some(parent) = parent {
            let parent = &mut self.run.segments[parent];
            parent.death_count = parent.deaths_or_zero().saturating_add(applied).max(0);
        }
        self.run.current_death_count = self.run.current_death_count.saturating_add(applied).max(0);
        applied != 0
    }

    fn zero_deaths(&mut self, index: usize) {
        self.run.segments[index].death_count = 0;
    }

    fn unset_deaths(&mut self, index: usize) {
        self.run.segments[index].death_count = DEATHS_UNSET;
    }

    fn all_children_unset(&self, parent: usize) -> bool {
        self.run
            .children(parent)
            .all(|child| !self.run.segments[child].has_deaths())
    }

    /// Rebuild the active group's parent row count from its children
    fn recount_group_deaths(&mut self) {
        let Some(current) = self.active_index() else {
            return;
        };
        let Some(parent) = self.run.segments[current].parent else {
            return;
        };
        let total: i32 = self
            .run
            .children(parent)
            .filter(|&child| child <= current)
            .map(|child| self.run.segments[child].deaths_or_zero())
            .fold(0, i32::saturating_add);
        self.run.segments[parent].death_count = total;
    }

    /// End the attempt
    ///
    /// With `update_history`, the attempt is recorded: attempt history, best
    /// segments, personal best and segment history are updated in that order.
    pub fn reset(&mut self, update_history: bool) -> Vec<TimerEvent> {
        if self.phase == TimerPhase::NotRunning {
            return Vec::new();
        }

        if self.phase != TimerPhase::Ended {
            self.attempt_ended = Some(self.clock.now_utc());
        }
        self.is_game_time_paused = false;
        self.game_time_pause_time = None;
        self.loading_times = TimeDelta::zero();

        if update_history {
            if let Some(index) = self.active_index() {
                self.unset_deaths(index);
                if let Some(parent) = self.run.segments[index].parent {
                    self.unset_deaths(parent);
                }
            }
            self.update_attempt_history();
            self.update_best_segments();
            self.update_personal_best();
            self.update_segment_history();
        }

        self.reset_splits();
        self.run.fix_splits();
        self.take_events()
    }

    fn reset_splits(&mut self) {
        let previous_phase = self.phase;
        self.phase = TimerPhase::NotRunning;
        self.current_split_index = None;
        self.run.current_death_count = 0;
        for segment in &mut self.run.segments {
            segment.reset_attempt();
        }

        log::info!("Reset from {:?}", previous_phase);
        self.events.push(TimerEvent::Reset { previous_phase });
    }

    /// Switch to the next comparison
    pub fn switch_comparison_next(&mut self) -> Vec<TimerEvent> {
        self.switch_comparison(CycleDirection::Next)
    }

    /// Switch to the previous comparison
    pub fn switch_comparison_previous(&mut self) -> Vec<TimerEvent> {
        self.switch_comparison(CycleDirection::Previous)
    }

    fn switch_comparison(&mut self, direction: CycleDirection) -> Vec<TimerEvent> {
        let step = match direction {
            CycleDirection::Next => 1,
            CycleDirection::Previous => -1,
        };
        let Some(comparison) = self.run.cycle_comparison(step).map(str::to_string) else {
            log::warn!("No comparisons to switch between");
            return Vec::new();
        };
        log::debug!("Comparing against {}", comparison);
        self.events.push(TimerEvent::ComparisonSwitched {
            comparison,
            direction,
        });
        self.take_events()
    }

    /// Start tracking game time for this attempt
    pub fn initialize_game_time(&mut self) {
        self.is_game_time_initialized = true;
    }

    /// Freeze game time, e.g. while the game is loading
    pub fn pause_game_time(&mut self) {
        if !self.is_game_time_paused {
            self.game_time_pause_time = self.current_time().game_time;
            self.is_game_time_paused = true;
        }
    }

    /// Let game time follow real time again
    ///
    /// The frozen interval is added to the loading times.
    pub fn resume_game_time(&mut self) {
        if self.is_game_time_paused {
            if let (Some(real), Some(paused_at)) =
                (self.current_time().real_time, self.game_time_pause_time)
            {
                self.loading_times = real - paused_at;
            }
            self.is_game_time_paused = false;
        }
    }

    /// Set game time to a value read from the game
    pub fn set_game_time(&mut self, game_time: TimeDelta) {
        if self.is_game_time_paused {
            self.game_time_pause_time = Some(game_time);
        }
        if let Some(real) = self.current_time().real_time {
            self.loading_times = real - game_time;
        }
    }

    /// Set the total loading time removed from game time
    pub fn set_loading_times(&mut self, loading_times: TimeDelta) {
        self.loading_times = loading_times;
        if self.is_game_time_paused {
            self.game_time_pause_time = self.current_time().real_time.map(|t| t - loading_times);
        }
    }

    /// Snapshot the attempt in progress so it can be resumed later
    pub fn freeze_run(&self) -> Option<FrozenRun> {
        if !self.phase.is_active() {
            return None;
        }
        let current = self.active_index()?;
        let mut frozen = FrozenRun::default();
        for index in 0..=current {
            let segment = &self.run.segments[index];
            frozen.split_deaths.push(segment.death_count);
            let end_time = if index == current {
                self.current_time()
            } else {
                segment.split_time
            };
            frozen.split_end_times.push(end_time);
        }
        Some(frozen)
    }

    /// Resume the attempt stored in the run's frozen snapshot
    ///
    /// The snapshot is consumed. The timer ends up paused on the split that
    /// was active when the snapshot was taken, showing the time it was taken at.
    pub fn load_frozen_run(&mut self) -> Vec<TimerEvent> {
        if self.phase != TimerPhase::NotRunning {
            return Vec::new();
        }
        let Some(frozen) = self.run.frozen_run.take() else {
            return Vec::new();
        };

        let count = frozen.len();
        if count == 0 {
            return Vec::new();
        }
        if count > self.run.segments.len() || frozen.split_end_times.len() < count {
            log::warn!(
                "Discarding frozen run with {} entries for a run of {} splits",
                count,
                self.run.segments.len()
            );
            return Vec::new();
        }
        let Some(end_time) = frozen.split_end_times[count - 1].real_time else {
            log::warn!("Discarding frozen run without an end time");
            return Vec::new();
        };

        for index in 0..count {
            let segment = &mut self.run.segments[index];
            segment.death_count = frozen.split_deaths[index];
            segment.split_time = frozen.split_end_times[index];
        }
        self.run.segments[count - 1].split_time = DualTime::default();

        let offset_end_time = end_time - self.run.offset;
        let now_utc = self.clock.now_utc();
        let begin = self.clock.now() - offset_end_time;

        self.current_split_index = Some(count - 1);
        self.phase = TimerPhase::Running;
        self.attempt_started = Some(AtomicDateTime::new(
            now_utc.time - offset_end_time,
            now_utc.synced_with_atomic_clock,
        ));
        self.attempt_ended = None;
        self.start_time = Some(begin);
        self.start_time_with_offset = begin - self.run.offset;
        self.adjusted_start_time = self.start_time_with_offset;
        self.time_paused_at = self.run.offset;
        self.is_game_time_initialized = false;
        self.recount_group_deaths();

        self.run.current_death_count = self
            .run
            .segments
            .iter()
            .filter(|s| s.parent.is_none() && s.death_count > 0)
            .map(|s| s.death_count)
            .fold(0, i32::saturating_add);

        log::info!(
            "Resumed frozen run at split {} ({}ms)",
            count - 1,
            end_time.num_milliseconds()
        );
        self.events.push(TimerEvent::Started);
        self.do_pause();
        self.take_events()
    }
}
