// Integration tests (native) for the fixed-step clock as the host drives it:
// one `advance` per animation frame, then that many scene updates.

use tacklebot_waters::scheduler::{FIXED_STEP_SECS, FixedStep, MAX_STEPS_PER_FRAME};

// Feed `frames` timestamps spaced `frame_ms` apart and total the steps.
fn run(clock: &mut FixedStep, start_ms: f64, frame_ms: f64, frames: usize) -> usize {
    (1..=frames).map(|i| clock.advance(start_ms + i as f64 * frame_ms)).sum()
}

#[test]
fn refresh_rate_does_not_change_simulation_rate() {
    for hz in [30.0, 60.0, 75.0, 120.0, 144.0] {
        let mut clock = FixedStep::default();
        clock.advance(0.0);
        let frame_ms = 1000.0 / hz;
        let steps = run(&mut clock, 0.0, frame_ms, (hz * 10.0) as usize);
        let expected = (10.0 / FIXED_STEP_SECS).round() as usize;
        assert!(steps.abs_diff(expected) <= 1, "{hz} Hz ran {steps} steps, expected {expected}");
    }
}

#[test]
fn backgrounded_tab_is_capped_and_excess_dropped() {
    let mut clock = FixedStep::default();
    clock.advance(0.0);
    assert_eq!(clock.advance(60_000.0), MAX_STEPS_PER_FRAME);
    assert!(clock.accumulator() < FIXED_STEP_SECS);
    // next normal frame is back to regular pacing
    assert!(clock.advance(60_000.0 + 1000.0 / 30.0) <= 1);
}

#[test]
fn reset_reprimes_after_a_pause() {
    let mut clock = FixedStep::default();
    clock.advance(0.0);
    clock.advance(50.0);
    clock.reset();
    assert_eq!(clock.advance(90_000.0), 0);
    assert_eq!(clock.accumulator(), 0.0);
}
