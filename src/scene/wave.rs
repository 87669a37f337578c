// wave.rs - Water line and travelling surface
//
// The surface is a row of sample points re-evaluated every tick from a sum of
// sines over the shared scene clock, so no per-point velocity is stored.

use crate::geom::{Vec2, lerp};

pub const WAVE_SAMPLES: usize = 48;

const MIN_WATER_PCT: f64 = 10.0;
const MAX_WATER_PCT: f64 = 95.0;
const WATER_EASE: f64 = 0.03;

// (amplitude px, spatial frequency rad/px, temporal frequency rad/s, phase)
const FULL_TERMS: [(f64, f64, f64, f64); 3] = [
    (7.0, 0.011, 1.1, 0.0),
    (4.5, 0.027, -1.7, 1.3),
    (2.5, 0.053, 2.6, 4.1),
];
const REDUCED_TERM: (f64, f64, f64, f64) = (3.0, 0.010, 0.8, 0.0);

/// Water line as a percentage of viewport height, eased toward a target.
#[derive(Clone, Debug)]
pub struct WaterLevel {
    current: f64,
    target: f64,
}

impl WaterLevel {
    pub fn new(pct: f64) -> Self {
        let pct = pct.clamp(MIN_WATER_PCT, MAX_WATER_PCT);
        Self { current: pct, target: pct }
    }

    pub fn set_target(&mut self, pct: f64) {
        if pct.is_finite() {
            self.target = pct.clamp(MIN_WATER_PCT, MAX_WATER_PCT);
        }
    }

    pub fn update(&mut self) {
        self.current += (self.target - self.current) * WATER_EASE;
    }

    pub fn pct(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Baseline y of the surface for a viewport of `height`.
    pub fn base_y(&self, height: f64) -> f64 {
        height * (1.0 - self.current / 100.0)
    }
}

#[derive(Clone, Debug)]
pub struct WaveSurface {
    points: Vec<Vec2>,
    spacing: f64,
    base: f64,
}

impl WaveSurface {
    pub fn new(width: f64, base: f64) -> Self {
        let mut wave = Self { points: Vec::with_capacity(WAVE_SAMPLES), spacing: 0.0, base };
        wave.resize(width);
        wave
    }

    pub fn resize(&mut self, width: f64) {
        self.spacing = width.max(0.0) / (WAVE_SAMPLES - 1) as f64;
        self.points.clear();
        for i in 0..WAVE_SAMPLES {
            self.points.push(Vec2::new(i as f64 * self.spacing, self.base));
        }
    }

    pub fn update(&mut self, base: f64, clock: f64, full: bool) {
        self.base = base;
        for p in &mut self.points {
            let offset = if full {
                FULL_TERMS.iter().map(|&t| term(t, p.x, clock)).sum()
            } else {
                term(REDUCED_TERM, p.x, clock)
            };
            p.y = base + offset;
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    /// Surface height at `x`, interpolated between the two nearest samples.
    pub fn surface_at(&self, x: f64) -> f64 {
        if self.spacing <= 0.0 || self.points.is_empty() {
            return self.base;
        }
        let last = self.points.len() - 1;
        let pos = (x / self.spacing).clamp(0.0, last as f64);
        let i = (pos.floor() as usize).min(last);
        if i == last {
            return self.points[last].y;
        }
        lerp(self.points[i].y, self.points[i + 1].y, pos - i as f64)
    }

    /// Highest point (smallest y) currently on the surface.
    pub fn crest(&self) -> f64 {
        self.points.iter().map(|p| p.y).fold(self.base, f64::min)
    }
}

fn term((amp, k, w, phase): (f64, f64, f64, f64), x: f64, clock: f64) -> f64 {
    amp * (x * k + clock * w + phase).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_interpolates_between_samples() {
        let mut wave = WaveSurface::new(470.0, 100.0);
        wave.update(100.0, 0.7, true);
        let pts = wave.points().to_vec();
        let mid_x = (pts[3].x + pts[4].x) / 2.0;
        let expected = (pts[3].y + pts[4].y) / 2.0;
        assert!((wave.surface_at(mid_x) - expected).abs() < 1e-9);
        assert_eq!(wave.surface_at(-50.0), pts[0].y);
        assert_eq!(wave.surface_at(10_000.0), pts[WAVE_SAMPLES - 1].y);
    }

    #[test]
    fn zero_width_falls_back_to_base() {
        let wave = WaveSurface::new(0.0, 42.0);
        assert_eq!(wave.surface_at(10.0), 42.0);
    }

    #[test]
    fn reduced_waves_stay_closer_to_base() {
        let mut wave = WaveSurface::new(800.0, 200.0);
        for step in 0..50 {
            wave.update(200.0, step as f64 * 0.1, false);
            assert!(wave.points().iter().all(|p| (p.y - 200.0).abs() <= REDUCED_TERM.0 + 1e-9));
        }
    }

    #[test]
    fn water_level_eases_and_clamps() {
        let mut level = WaterLevel::new(50.0);
        level.set_target(200.0);
        assert_eq!(level.target(), MAX_WATER_PCT);
        level.update();
        assert!(level.pct() > 50.0 && level.pct() < MAX_WATER_PCT);
        assert!((level.base_y(1000.0) - 1000.0 * (1.0 - level.pct() / 100.0)).abs() < 1e-9);
        level.set_target(f64::NAN);
        assert_eq!(level.target(), MAX_WATER_PCT);
    }
}
