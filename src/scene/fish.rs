//! Fish entity and its swim / pause / dart / nibble state machine.
//!
//! Speed and depth never snap: each tick they ease toward their targets. The
//! only exceptions are darting and nibbling, which drive the position directly.
//! Vertical position is clamped into the water column every tick.

use rand::Rng;

use super::decor::{Decorations, SceneryRef};
use super::wave::WaveSurface;
use crate::geom::Vec2;

/// Rendered height / rendered width of the fish sprites.
pub const FISH_ASPECT: f64 = 0.55;
pub const VERTICAL_PAD: f64 = 6.0;

const SPEED_EASE: f64 = 0.08;
const DEPTH_EASE: f64 = 0.03;
const NIBBLE_EASE: f64 = 0.06;

const SIZE: (f64, f64) = (40.0, 90.0);
const BASE_SPEED: (f64, f64) = (25.0, 55.0);
const LIFETIME: (f64, f64) = (45.0, 110.0);
const FADE_SECS: f64 = 1.2;

const SWIM_SECS: (f64, f64) = (3.0, 8.0);
const PAUSE_CHANCE: f64 = 0.3;
const PAUSE_SECS: (f64, f64) = (1.0, 3.0);
const PAUSE_SPEED: f64 = 0.05;
pub const DART_SPEED_MULT: f64 = 3.5;
pub const DART_SECS: f64 = 1.2;
const DART_VERTICAL: f64 = 0.6;
const NIBBLE_SECS: (f64, f64) = (2.0, 5.0);
const NIBBLE_SPEED: f64 = 0.05;

/// Base reaction radius of a click; half the fish's rendered width is added.
pub const CLICK_RADIUS: f64 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    fn toward(dx: f64) -> Self {
        if dx < 0.0 { Facing::Left } else { Facing::Right }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FishState {
    Swimming,
    Pausing,
    /// Fleeing along `angle` (radians, canvas coordinates).
    Darting { angle: f64 },
    /// Hovering next to a plant or coral; `offset` is relative to its anchor.
    Nibbling { target: SceneryRef, offset: Vec2 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fade {
    In,
    Visible,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FishFate {
    Alive,
    Gone,
}

#[derive(Clone, Debug)]
pub struct Fish {
    /// Index into the scene's fish-kind table.
    pub kind: usize,
    pub pos: Vec2,
    /// Rendered width in px.
    pub size: f64,
    pub base_speed: f64,
    pub speed: f64,
    pub target_speed: f64,
    pub target_y: f64,
    pub facing: Facing,
    pub state: FishState,
    pub state_timer: f64,
    pub avoid_raw: Vec2,
    pub avoid: Vec2,
    pub avoid_cooldown: f64,
    pub opacity: f64,
    pub fade: Fade,
    pub lifetime: f64,
    pub wiggle_phase: f64,
    pub wiggle_amp: f64,
}

/// What the fish update needs from the rest of the scene.
pub struct Waters<'a> {
    pub width: f64,
    pub floor: f64,
    pub wave: &'a WaveSurface,
}

impl Waters<'_> {
    /// Allowed centre-y range for a fish of `half_h` at `x`.
    pub fn vertical_bounds(&self, x: f64, half_h: f64) -> (f64, f64) {
        vertical_bounds(self.wave.surface_at(x), self.floor, half_h)
    }
}

pub fn vertical_bounds(surface: f64, floor: f64, half_h: f64) -> (f64, f64) {
    let top = surface + half_h + VERTICAL_PAD;
    let bottom = floor - half_h - VERTICAL_PAD;
    if top > bottom {
        // water shallower than the fish: park it mid-column
        let mid = (surface + floor) * 0.5;
        (mid, mid)
    } else {
        (top, bottom)
    }
}

impl Fish {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, kind: usize, waters: &Waters<'_>) -> Self {
        let size = rng.gen_range(SIZE.0..SIZE.1);
        let x = if waters.width > size * 2.0 {
            rng.gen_range(size..waters.width - size)
        } else {
            waters.width * 0.5
        };
        let half_h = size * FISH_ASPECT * 0.5;
        let (top, bottom) = waters.vertical_bounds(x, half_h);
        let y = if bottom > top { rng.gen_range(top..bottom) } else { top };
        let base_speed = rng.gen_range(BASE_SPEED.0..BASE_SPEED.1);
        Self {
            kind,
            pos: Vec2::new(x, y),
            size,
            base_speed,
            speed: base_speed * 0.5,
            target_speed: base_speed,
            target_y: y,
            facing: if rng.gen_bool(0.5) { Facing::Left } else { Facing::Right },
            state: FishState::Swimming,
            state_timer: rng.gen_range(SWIM_SECS.0..SWIM_SECS.1),
            avoid_raw: Vec2::ZERO,
            avoid: Vec2::ZERO,
            avoid_cooldown: rng.gen_range(0.0..super::interact::AVOID_INTERVAL),
            opacity: 0.0,
            fade: Fade::In,
            lifetime: rng.gen_range(LIFETIME.0..LIFETIME.1),
            wiggle_phase: rng.gen_range(0.0..std::f64::consts::TAU),
            wiggle_amp: rng.gen_range(0.03..0.08),
        }
    }

    pub fn half_width(&self) -> f64 {
        self.size * 0.5
    }

    pub fn half_height(&self) -> f64 {
        self.size * FISH_ASPECT * 0.5
    }

    /// Sprites face right; left-facing fish are drawn mirrored.
    pub fn mirrored(&self) -> bool {
        self.facing == Facing::Left
    }

    pub fn is_darting(&self) -> bool {
        matches!(self.state, FishState::Darting { .. })
    }

    pub fn is_nibbling(&self) -> bool {
        matches!(self.state, FishState::Nibbling { .. })
    }

    /// Current tilt used by the renderer.
    pub fn wiggle(&self) -> f64 {
        self.wiggle_phase.sin() * self.wiggle_amp
    }

    pub fn enter_swimming<R: Rng + ?Sized>(&mut self, rng: &mut R, waters: &Waters<'_>) {
        self.state = FishState::Swimming;
        self.state_timer = rng.gen_range(SWIM_SECS.0..SWIM_SECS.1);
        self.target_speed = self.base_speed * rng.gen_range(0.7..1.3);
        let (top, bottom) = waters.vertical_bounds(self.pos.x, self.half_height());
        self.target_y = if bottom > top { rng.gen_range(top..bottom) } else { top };
    }

    fn enter_pausing<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.state = FishState::Pausing;
        self.state_timer = rng.gen_range(PAUSE_SECS.0..PAUSE_SECS.1);
        self.target_speed = self.base_speed * PAUSE_SPEED;
    }

    pub fn start_nibbling<R: Rng + ?Sized>(&mut self, rng: &mut R, target: SceneryRef, anchor: Vec2) {
        let side = if self.pos.x < anchor.x { -1.0 } else { 1.0 };
        let offset = Vec2::new(side * (self.half_width() + 6.0), rng.gen_range(-6.0..6.0));
        self.state = FishState::Nibbling { target, offset };
        self.state_timer = rng.gen_range(NIBBLE_SECS.0..NIBBLE_SECS.1);
        self.target_speed = self.base_speed * NIBBLE_SPEED;
    }

    /// Startle the fish if `p` is within reach. Nibbling fish ignore clicks.
    pub fn react_to_click(&mut self, p: Vec2, width: f64) -> bool {
        if self.is_nibbling() {
            return false;
        }
        let mut away = self.pos - p;
        if away.len() > CLICK_RADIUS + self.half_width() {
            return false;
        }
        if away.x.abs() < away.y.abs() {
            // mostly vertical: bolt for the nearer side
            let edge = if self.pos.x < width * 0.5 { -1.0 } else { 1.0 };
            away.x = edge * away.y.abs().max(1.0);
        }
        if away.is_zero() {
            away = Vec2::new(self.facing.sign(), 0.0);
        }
        let angle = away.y.atan2(away.x);
        self.state = FishState::Darting { angle };
        self.state_timer = DART_SECS;
        self.target_speed = self.base_speed * DART_SPEED_MULT;
        self.facing = Facing::toward(angle.cos());
        true
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        waters: &Waters<'_>,
        decor: &mut Decorations,
        rng: &mut R,
    ) -> FishFate {
        if self.update_fade(dt) == FishFate::Gone {
            return FishFate::Gone;
        }

        self.state_timer -= dt;
        let mut nibble_goal = None;
        match self.state {
            FishState::Swimming => {
                if self.state_timer <= 0.0 {
                    if rng.gen_bool(PAUSE_CHANCE) {
                        self.enter_pausing(rng);
                    } else {
                        self.enter_swimming(rng, waters);
                    }
                }
            }
            FishState::Pausing | FishState::Darting { .. } => {
                if self.state_timer <= 0.0 {
                    self.enter_swimming(rng, waters);
                }
            }
            FishState::Nibbling { target, offset } => match decor.resolve(target) {
                Some(anchor) if self.state_timer > 0.0 => {
                    decor.nibble(target);
                    nibble_goal = Some((anchor, anchor + offset));
                }
                _ => self.enter_swimming(rng, waters),
            },
        }

        self.speed += (self.target_speed - self.speed) * SPEED_EASE;

        match (self.state, nibble_goal) {
            (FishState::Darting { angle }, _) => {
                let v = Vec2::from_angle(angle, self.speed);
                self.pos.x += v.x * dt;
                self.pos.y += v.y * DART_VERTICAL * dt;
                self.target_y = self.pos.y;
                if self.pos.x < -self.half_width() || self.pos.x > waters.width + self.half_width() {
                    return FishFate::Gone;
                }
            }
            (FishState::Nibbling { .. }, Some((anchor, goal))) => {
                self.pos = self.pos.ease_toward(goal, NIBBLE_EASE);
                self.target_y = self.pos.y;
                self.facing = Facing::toward(anchor.x - self.pos.x);
            }
            _ => {
                self.pos.x += self.facing.sign() * self.speed * dt + self.avoid.x * dt;
                self.target_y += self.avoid.y * dt;
                self.pos.y += (self.target_y - self.pos.y) * DEPTH_EASE;
                self.reflect(waters.width);
            }
        }

        let (top, bottom) = waters.vertical_bounds(self.pos.x, self.half_height());
        self.pos.y = self.pos.y.clamp(top, bottom);
        self.target_y = self.target_y.clamp(top, bottom);

        let wiggle_rate = if self.is_darting() { 14.0 } else { 3.0 + self.speed * 0.04 };
        self.wiggle_phase = (self.wiggle_phase + wiggle_rate * dt) % std::f64::consts::TAU;
        FishFate::Alive
    }

    fn reflect(&mut self, width: f64) {
        let hw = self.half_width();
        if width <= hw * 2.0 {
            self.pos.x = width * 0.5;
        } else if self.pos.x < hw {
            self.pos.x = hw;
            self.facing = self.facing.flipped();
        } else if self.pos.x > width - hw {
            self.pos.x = width - hw;
            self.facing = self.facing.flipped();
        }
    }

    fn update_fade(&mut self, dt: f64) -> FishFate {
        self.lifetime -= dt;
        match self.fade {
            Fade::In => {
                self.opacity = (self.opacity + dt / FADE_SECS).min(1.0);
                if self.opacity >= 1.0 {
                    self.fade = Fade::Visible;
                }
            }
            Fade::Visible => {
                if self.lifetime <= 0.0 {
                    self.fade = Fade::Out;
                }
            }
            Fade::Out => {
                self.opacity -= dt / FADE_SECS;
                if self.opacity <= 0.0 {
                    return FishFate::Gone;
                }
            }
        }
        FishFate::Alive
    }
}
