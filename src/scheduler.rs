//! Fixed-step clock that decouples simulation rate from display refresh.
//!
//! Each animation frame feeds its timestamp in; the clock answers how many
//! fixed updates to run before the single render of that frame.

/// 30 Hz simulation.
pub const FIXED_STEP_SECS: f64 = 1.0 / 30.0;
/// Catch-up cap; accumulated time beyond it is dropped (backgrounded tab).
pub const MAX_STEPS_PER_FRAME: usize = 5;

#[derive(Clone, Debug)]
pub struct FixedStep {
    interval: f64,
    max_steps: usize,
    accumulator: f64,
    last_ms: Option<f64>,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(FIXED_STEP_SECS, MAX_STEPS_PER_FRAME)
    }
}

impl FixedStep {
    pub fn new(interval: f64, max_steps: usize) -> Self {
        Self { interval, max_steps: max_steps.max(1), accumulator: 0.0, last_ms: None }
    }

    /// Simulated seconds per update.
    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Feed a frame timestamp (milliseconds); returns the updates to run now.
    pub fn advance(&mut self, now_ms: f64) -> usize {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };
        // Clock jumps backwards count as no time passing.
        let elapsed = ((now_ms - last) / 1000.0).max(0.0);
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.interval && steps < self.max_steps {
            self.accumulator -= self.interval;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.interval {
            self.accumulator = 0.0;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_ms = None;
    }
}
