//! Short-lived particles: bubbles, cursor trail points and splash droplets.
//!
//! All of them share the same opacity ramp (fade in over the first slice of
//! life, then linear fade to zero at `max_age`) and the same rule: a particle
//! whose terminal condition holds after its update is dropped in that update.

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::geom::Vec2;

pub const MAX_BUBBLES: usize = 80;
pub const MAX_TRAIL: usize = 240;

const FADE_IN_FRACTION: f64 = 0.15;
pub const SPLASH_GRAVITY: f64 = 420.0;
const SPLASH_SPEED: (f64, f64) = (60.0, 180.0);
const TRAIL_SPACING: f64 = 6.0;

/// Opacity at `age` for a particle peaking at `peak`.
pub fn ramp(age: f64, max_age: f64, peak: f64) -> f64 {
    if max_age <= 0.0 || age >= max_age {
        return 0.0;
    }
    let fade_in = max_age * FADE_IN_FRACTION;
    if age < fade_in {
        peak * age / fade_in
    } else {
        peak * (1.0 - (age - fade_in) / (max_age - fade_in))
    }
}

/// Integer count with the given expectation: floor plus a Bernoulli remainder.
pub fn stochastic_count<R: Rng + ?Sized>(rng: &mut R, expected: f64) -> usize {
    if !(expected > 0.0) {
        return 0;
    }
    let whole = expected.floor();
    let extra = if rng.gen_bool((expected - whole).clamp(0.0, 1.0)) { 1 } else { 0 };
    whole as usize + extra
}

#[derive(Clone, Debug)]
pub struct Bubble {
    pub pos: Vec2,
    pub size: f64,
    pub rise: f64,
    pub wobble_phase: f64,
    pub wobble: f64,
    pub age: f64,
    pub max_age: f64,
    pub opacity: f64,
}

impl Bubble {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, pos: Vec2) -> Self {
        Self {
            pos,
            size: rng.gen_range(1.5..5.0),
            rise: rng.gen_range(18.0..42.0),
            wobble_phase: rng.gen_range(0.0..TAU),
            wobble: rng.gen_range(4.0..14.0),
            age: 0.0,
            max_age: rng.gen_range(4.0..9.0),
            opacity: 0.0,
        }
    }

    /// Advance one step; false once the bubble should be removed.
    pub fn update(&mut self, dt: f64, surface_y: f64, width: f64) -> bool {
        self.age += dt;
        self.wobble_phase += dt * 2.2;
        self.pos.y -= self.rise * dt;
        self.pos.x += self.wobble_phase.sin() * self.wobble * dt;
        self.opacity = ramp(self.age, self.max_age, 0.6);
        !self.is_terminal(surface_y, width)
    }

    pub fn is_terminal(&self, surface_y: f64, width: f64) -> bool {
        self.age >= self.max_age
            || self.opacity <= 0.0
            || self.pos.y <= surface_y
            || self.pos.x < 0.0
            || self.pos.x > width
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrailKind {
    Cursor,
    Splash { vel: Vec2 },
}

#[derive(Clone, Debug)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub size: f64,
    pub age: f64,
    pub max_age: f64,
    pub opacity: f64,
    pub kind: TrailKind,
}

impl TrailPoint {
    pub fn cursor<R: Rng + ?Sized>(rng: &mut R, pos: Vec2) -> Self {
        Self {
            pos,
            size: rng.gen_range(2.0..4.0),
            age: 0.0,
            max_age: rng.gen_range(0.5..0.8),
            opacity: 0.0,
            kind: TrailKind::Cursor,
        }
    }

    /// Droplet thrown upward and outward from `origin`.
    pub fn droplet<R: Rng + ?Sized>(rng: &mut R, origin: Vec2, speed_scale: f64) -> Self {
        let angle = -PI * rng.gen_range(0.08..0.92);
        let speed = rng.gen_range(SPLASH_SPEED.0..SPLASH_SPEED.1) * speed_scale;
        Self {
            pos: origin,
            size: rng.gen_range(1.2..3.2) * speed_scale.max(0.5),
            age: 0.0,
            max_age: rng.gen_range(0.6..1.0),
            opacity: 0.0,
            kind: TrailKind::Splash { vel: Vec2::from_angle(angle, speed) },
        }
    }

    pub fn update(&mut self, dt: f64, width: f64, height: f64) -> bool {
        self.age += dt;
        if let TrailKind::Splash { vel } = &mut self.kind {
            vel.y += SPLASH_GRAVITY * dt;
            self.pos += *vel * dt;
        }
        let peak = match self.kind {
            TrailKind::Cursor => 0.5,
            TrailKind::Splash { .. } => 0.85,
        };
        self.opacity = ramp(self.age, self.max_age, peak);
        !self.is_terminal(width, height)
    }

    pub fn is_terminal(&self, width: f64, height: f64) -> bool {
        self.age >= self.max_age
            || self.opacity <= 0.0
            || self.pos.x < 0.0
            || self.pos.x > width
            || self.pos.y < 0.0
            || self.pos.y > height
    }
}

/// Push a burst of `count` droplets, evicting the oldest points past the cap.
pub fn splash<R: Rng + ?Sized>(
    rng: &mut R,
    trail: &mut Vec<TrailPoint>,
    origin: Vec2,
    count: usize,
    speed_scale: f64,
) {
    for _ in 0..count {
        trail.push(TrailPoint::droplet(rng, origin, speed_scale));
    }
    enforce_cap(trail, MAX_TRAIL);
}

/// Cursor trail point, spaced so slow drags do not pile points up.
pub fn cursor_trail<R: Rng + ?Sized>(
    rng: &mut R,
    trail: &mut Vec<TrailPoint>,
    last: &mut Option<Vec2>,
    pos: Vec2,
) {
    if last.is_some_and(|prev| (prev - pos).len() < TRAIL_SPACING) {
        return;
    }
    *last = Some(pos);
    trail.push(TrailPoint::cursor(rng, pos));
    enforce_cap(trail, MAX_TRAIL);
}

fn enforce_cap<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}
