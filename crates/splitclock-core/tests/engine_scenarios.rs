//! End-to-end engine scenarios.
//!
//! Drives both engines with synthetic ticks, the way a host loop would, and
//! routes their events through `dispatch` into an in-memory history.

use splitclock_core::{
    dispatch, Countdown, CountdownState, DurationInput, Event, FeedbackSettings, HistoryLog,
    MemoryHistory, RecordingSink, Stopwatch, REST_DELAY_MS, TICK_PERIOD_MS,
};

/// Feed `total_ms` in nominal host ticks, collecting every event.
fn run_ticks(engine: &mut Countdown, total_ms: u64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut left = total_ms;
    while left > 0 {
        let d = left.min(TICK_PERIOD_MS);
        events.extend(engine.tick(d));
        left -= d;
    }
    events
}

fn alarms(events: &[Event]) -> usize {
    events.iter().filter(|e| **e == Event::Alarm).count()
}

#[test]
fn two_set_countdown_scenario() {
    let mut cd = Countdown::new(DurationInput::clamped(0, 30), 2);
    cd.start();

    let first = run_ticks(&mut cd, 30_000);
    assert_eq!(cd.remaining_ms(), 0);
    assert_eq!(alarms(&first), 1);
    assert_eq!(cd.completed_sets(), 1);
    assert_eq!(cd.state(), CountdownState::Resting);
    assert!(matches!(first.last(), Some(Event::RestStarted { .. })));

    run_ticks(&mut cd, REST_DELAY_MS);
    assert_eq!(cd.remaining_ms(), 30_000);
    assert!(cd.is_running());

    let second = run_ticks(&mut cd, 30_000);
    assert_eq!(alarms(&second), 1);
    assert_eq!(cd.completed_sets(), 2);
    assert_eq!(cd.state(), CountdownState::Complete);
    assert_eq!(second.last(), Some(&Event::SetsFinished { sets: 2 }));

    let after = run_ticks(&mut cd, 60_000);
    assert!(after.is_empty());
    assert_eq!(cd.completed_sets(), 2);
}

#[test]
fn progress_is_non_increasing_while_running() {
    let mut cd = Countdown::new(DurationInput::clamped(0, 5), 1);
    assert_eq!(cd.progress_percent(), 100.0);
    cd.start();
    let mut last = cd.progress_percent();
    for _ in 0..600 {
        cd.tick(TICK_PERIOD_MS);
        let now = cd.progress_percent();
        assert!(now <= last);
        last = now;
    }
    assert_eq!(last, 0.0);
    cd.reset();
    assert_eq!(cd.progress_percent(), 100.0);
}

#[test]
fn stopwatch_session_lands_in_history_once() {
    let mut sw = Stopwatch::new();
    let mut sink = RecordingSink::default();
    let mut history = MemoryHistory::new();
    let settings = FeedbackSettings::default();

    sw.start();
    sw.tick(1234);
    dispatch(sw.lap(), settings, &mut sink, &mut history).unwrap();
    sw.tick(500);
    dispatch(sw.lap(), settings, &mut sink, &mut history).unwrap();
    sw.tick(66);
    dispatch(sw.stop(), settings, &mut sink, &mut history).unwrap();

    dispatch(sw.reset(), settings, &mut sink, &mut history).unwrap();
    dispatch(sw.reset(), settings, &mut sink, &mut history).unwrap();

    let records = history.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].laps, vec![1234, 1734]);
    assert_eq!(records[0].total_time_ms, 1800);
    // two laps (click + haptic each) and one stop click
    assert_eq!(sink.events.len(), 5);
}

#[test]
fn load_reproduces_committed_session() {
    let mut sw = Stopwatch::new();
    let mut history = MemoryHistory::new();
    sw.start();
    for d in [812, 903, 777, 1001] {
        sw.tick(d);
        sw.lap();
    }
    sw.tick(45);
    let elapsed = sw.elapsed_ms();
    let laps = sw.laps().to_vec();
    let splits = sw.splits();
    let summary = sw.summary();

    dispatch(
        sw.reset(),
        FeedbackSettings::default(),
        &mut RecordingSink::default(),
        &mut history,
    )
    .unwrap();

    let record = history.get(0).unwrap();
    let mut restored = Stopwatch::new();
    restored.load_workout(&record);
    assert_eq!(restored.elapsed_ms(), elapsed);
    assert_eq!(restored.laps(), laps.as_slice());
    assert_eq!(restored.splits(), splits);
    assert_eq!(restored.summary(), summary);
}

#[test]
fn engines_tick_independently() {
    let mut sw = Stopwatch::new();
    let mut cd = Countdown::new(DurationInput::clamped(0, 1), 1);
    sw.start();
    cd.start();
    for _ in 0..150 {
        sw.tick(TICK_PERIOD_MS);
        cd.tick(TICK_PERIOD_MS);
    }
    assert_eq!(sw.elapsed_ms(), 1500);
    assert_eq!(cd.state(), CountdownState::Complete);
    assert!(sw.is_running());
}

#[test]
fn reconfigure_mid_rest_never_sees_stale_restart() {
    let mut cd = Countdown::new(DurationInput::clamped(0, 10), 3);
    cd.start();
    run_ticks(&mut cd, 10_000);
    let stale = cd.pending_rest().expect("rest armed");

    cd.reset();
    cd.configure(DurationInput::clamped(1, 0));
    run_ticks(&mut cd, 5_000);
    assert!(cd.fire_restart(stale).is_empty());

    assert_eq!(cd.state(), CountdownState::Configuring);
    assert_eq!(cd.remaining_ms(), 60_000);
    assert!(!cd.is_running());
}
