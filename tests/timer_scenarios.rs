//! End-to-end timer scenarios

use chrono::TimeDelta;
use nyacore_timer::{
    DualTime, ManualClock, RunState, Timer, TimerConfig, TimerEvent, TimerPhase, DEATHS_UNSET,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn secs(s: i64) -> TimeDelta {
    TimeDelta::seconds(s)
}

fn flat_timer(count: usize) -> (Timer<ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let names: Vec<String> = (0..count).map(|i| format!("Split {}", i + 1)).collect();
    (Timer::with_clock(RunState::from_names(names), clock.clone()), clock)
}

#[test]
fn test_three_split_personal_best() {
    init_logging();
    let (mut timer, clock) = flat_timer(3);

    timer.start();
    clock.advance(secs(10));
    timer.split();
    clock.advance(secs(5));
    timer.split();
    clock.advance(secs(5));
    let events = timer.split();
    assert!(matches!(events[0], TimerEvent::Split { segment: 2, finished: true, .. }));
    assert_eq!(timer.phase(), TimerPhase::Ended);

    let events = timer.reset(true);
    assert_eq!(
        events,
        vec![TimerEvent::Reset {
            previous_phase: TimerPhase::Ended
        }]
    );

    let run = timer.run();
    let pb: Vec<_> = run
        .segments
        .iter()
        .map(|s| s.personal_best_split_time.real_time)
        .collect();
    assert_eq!(pb, vec![Some(secs(10)), Some(secs(15)), Some(secs(20))]);

    let best: Vec<_> = run
        .segments
        .iter()
        .map(|s| s.best_segment_time.real_time)
        .collect();
    assert_eq!(best, vec![Some(secs(10)), Some(secs(5)), Some(secs(5))]);

    assert_eq!(run.attempt_history().len(), 1);
    assert_eq!(run.attempt_history()[0].time.real_time, Some(secs(20)));
    assert!(run.segments.iter().all(|s| s.split_time.is_empty()));
    assert!(run.segments.iter().all(|s| s.death_count == DEATHS_UNSET));
}

#[test]
fn test_splitting_every_segment_ends_the_run() {
    for count in 1..6 {
        let (mut timer, clock) = flat_timer(count);
        timer.start();
        for _ in 0..count {
            clock.advance(secs(1));
            timer.split();
        }
        assert_eq!(timer.phase(), TimerPhase::Ended);
        assert_eq!(timer.current_split_index(), Some(count));
    }
}

#[test]
fn test_split_then_undo_restores_first_split() {
    let (mut timer, clock) = flat_timer(3);
    timer.start();
    clock.advance(secs(2));
    timer.split();
    timer.undo_split();

    assert_eq!(timer.current_split_index(), Some(0));
    assert!(timer.run().segments[0].split_time.is_empty());
}

#[test]
fn test_group_completion_moves_past_parent_row() {
    let mut run = RunState::default();
    run.push_segment("Intro");
    let first_child = run.len();
    run.push_group("Castle", ["Gate", "Courtyard", "Keep"]);
    run.push_segment("Final");

    let clock = ManualClock::default();
    let mut timer = Timer::with_clock(run, clock.clone());
    timer.start();
    clock.advance(secs(1));
    timer.split();
    for _ in 0..3 {
        clock.advance(secs(1));
        timer.split();
    }
    assert_eq!(timer.current_split_index(), Some(first_child + 3 + 1));
    assert_eq!(timer.phase(), TimerPhase::Running);
}

#[test]
fn test_group_at_end_finishes_run() {
    let mut run = RunState::default();
    run.push_segment("Intro");
    run.push_group("Castle", ["Gate", "Keep"]);

    let clock = ManualClock::default();
    let mut timer = Timer::with_clock(run, clock.clone());
    timer.start();
    for _ in 0..3 {
        clock.advance(secs(1));
        timer.split();
    }
    assert_eq!(timer.phase(), TimerPhase::Ended);
    // The group's parent row spans both children
    timer.reset(true);
    assert_eq!(
        timer.run().segments[3].best_segment_time.real_time,
        Some(secs(2))
    );
}

#[test]
fn test_rejected_skip_changes_nothing() {
    let (mut timer, clock) = flat_timer(2);
    timer.start();
    clock.advance(secs(1));
    timer.split();

    let before = timer.run().clone();
    assert!(timer.skip_split().is_empty());
    assert_eq!(timer.run(), &before);
    assert_eq!(timer.current_split_index(), Some(1));
}

#[test]
fn test_deaths_never_negative() {
    let (mut timer, clock) = flat_timer(3);
    assert!(!timer.add_deaths(2));

    timer.start();
    timer.add_deaths(2);
    timer.add_deaths(-10);
    clock.advance(secs(1));
    timer.split();
    timer.skip_split();
    timer.undo_split();
    timer.undo_split();

    for segment in &timer.run().segments {
        assert!(segment.death_count >= DEATHS_UNSET);
    }
    assert!(timer.run().current_death_count >= 0);
}

#[test]
fn test_best_segments_never_increase() {
    let (mut timer, clock) = flat_timer(2);
    let mut previous: Option<Vec<DualTime>> = None;

    for (first, second) in [(10, 5), (12, 3), (9, 9), (20, 20)] {
        timer.start();
        clock.advance(secs(first));
        timer.split();
        clock.advance(secs(second));
        timer.split();
        timer.reset(true);

        let best: Vec<_> = timer
            .run()
            .segments
            .iter()
            .map(|s| s.best_segment_time)
            .collect();
        if let Some(previous) = &previous {
            for (now, before) in best.iter().zip(previous) {
                assert!(now.real_time <= before.real_time);
            }
        }
        previous = Some(best);
    }

    let best: Vec<_> = timer
        .run()
        .segments
        .iter()
        .map(|s| s.best_segment_time.real_time)
        .collect();
    assert_eq!(best, vec![Some(secs(9)), Some(secs(3))]);
}

#[test]
fn test_undo_all_pauses_removes_pause() {
    let (mut timer, clock) = flat_timer(2);
    timer.start();
    clock.advance(secs(4));
    timer.pause();
    clock.advance(secs(3));
    timer.pause();
    clock.advance(secs(1));
    assert_eq!(timer.current_time().real_time, Some(secs(5)));

    timer.undo_all_pauses();
    assert_eq!(timer.current_time().real_time, Some(secs(8)));
    clock.advance(secs(2));
    assert_eq!(timer.current_time().real_time, Some(secs(10)));
}

#[test]
fn test_cycle_comparisons() {
    let (mut timer, _clock) = flat_timer(1);
    let mut run = timer.run().clone();
    run.comparisons = vec!["A".into(), "B".into(), "C".into()];
    run.current_comparison = "B".into();
    timer.replace_run(run);

    timer.switch_comparison_next();
    assert_eq!(timer.run().current_comparison, "C");
    timer.switch_comparison_next();
    assert_eq!(timer.run().current_comparison, "A");
    timer.switch_comparison_previous();
    assert_eq!(timer.run().current_comparison, "C");
}

#[test]
fn test_slower_run_keeps_personal_best() {
    let (mut timer, clock) = flat_timer(2);

    timer.start();
    clock.advance(secs(10));
    timer.split();
    timer.add_deaths(2);
    clock.advance(secs(10));
    timer.split();
    timer.reset(true);

    timer.start();
    clock.advance(secs(8));
    timer.split();
    clock.advance(secs(15));
    timer.split();
    timer.reset(true);

    let run = timer.run();
    assert_eq!(run.segments[0].personal_best_split_time.real_time, Some(secs(10)));
    assert_eq!(run.segments[1].personal_best_split_time.real_time, Some(secs(20)));
    assert_eq!(run.segments[1].personal_best_death_count, 2);
    assert_eq!(run.segments[0].best_segment_time.real_time, Some(secs(8)));
    assert_eq!(run.best_death_count, 0);
    assert_eq!(run.attempt_count, 2);

    // Both attempts are in every split's history
    assert_eq!(run.segments[0].segment_history.len(), 2);
    assert_eq!(
        run.segments[1].segment_history.get(&1),
        Some(&DualTime::real(secs(15)))
    );
}

#[test]
fn test_config_to_frozen_resume() {
    init_logging();
    let config = TimerConfig::from_toml_str(
        r#"
        [run]
        [[run.segments]]
        name = "Asylum"

        [[run.segments]]
        name = "Burg"
        children = ["Taurus Demon", "Gargoyles"]
        "#,
    )
    .unwrap();

    let clock = ManualClock::default();
    let mut timer = config.clone().into_timer(clock.clone()).unwrap();
    timer.start();
    clock.advance(secs(30));
    timer.split();
    timer.add_deaths(2);
    clock.advance(secs(10));
    let frozen = timer.freeze_run().unwrap();

    let mut fresh = config.into_timer(ManualClock::default()).unwrap();
    let json = frozen.to_json().unwrap();
    let mut run = fresh.run().clone();
    run.frozen_run = Some(nyacore_timer::FrozenRun::from_json(&json).unwrap());
    fresh.replace_run(run);

    let events = fresh.load_frozen_run();
    assert_eq!(events, vec![TimerEvent::Started, TimerEvent::Paused]);
    assert_eq!(fresh.current_split_index(), Some(1));
    assert_eq!(fresh.current_time().real_time, Some(secs(40)));
    assert_eq!(fresh.run().segments[1].death_count, 2);
    assert_eq!(fresh.run().segments[3].death_count, 2);
    assert_eq!(fresh.run().current_death_count, 2);
}
