//! The water scene: every simulated entity plus the fixed-step update.
//!
//! `WaterScene` is headless. The host feeds it input intents and fixed steps,
//! and the render pass reads it back through the accessors. Nothing outside
//! this module touches the entity collections directly.

mod decor;
mod fish;
mod interact;
mod particles;
mod rain;
mod wave;

pub use decor::{
    BackgroundFeature, Cave, Coral, CoralKind, CoralShape, Decorations, Plant, SceneryKind,
    SceneryRef, BranchStyle, BRANCHING, FAN, branch, brain_outline, rock_outline,
};
pub use fish::{CLICK_RADIUS, DART_SPEED_MULT, Facing, Fish, FishFate, FishState, VERTICAL_PAD, Waters};
pub use interact::{AVOID_INTERVAL, pair_push};
pub use particles::{Bubble, MAX_BUBBLES, MAX_TRAIL, TrailKind, TrailPoint, ramp, stochastic_count};
pub use rain::{DropFate, MAX_DROPS, Raindrop, WEATHER_INTERVAL, Weather};
pub use wave::{WAVE_SAMPLES, WaterLevel, WaveSurface};

use rand::Rng;
use rand::rngs::StdRng;

use crate::assets::FishKinds;
use crate::config::{EffectsProfile, SceneConfig};
use crate::geom::Vec2;

/// Gap between the bottom of the viewport and the substrate line.
pub const FLOOR_INSET: f64 = 8.0;
/// Minimum time between two fish spawns while topping up the population.
pub const FISH_SPAWN_INTERVAL: f64 = 1.5;
const RAIN_SPLASH_DROPLETS: (usize, usize) = (2, 4);
const RAIN_SPLASH_SCALE: f64 = 0.45;

pub struct WaterScene {
    width: f64,
    height: f64,
    profile: EffectsProfile,
    clock: f64,
    water: WaterLevel,
    wave: WaveSurface,
    weather: Weather,
    fish: Vec<Fish>,
    decor: Decorations,
    bubbles: Vec<Bubble>,
    drops: Vec<Raindrop>,
    trail: Vec<TrailPoint>,
    kinds: FishKinds,
    spawn_cooldown: f64,
    last_pointer: Option<Vec2>,
    drops_spawned: u64,
    rng: StdRng,
}

impl WaterScene {
    pub fn new(config: &SceneConfig, reduced: bool, width: f64, height: f64, rng: StdRng) -> Self {
        let profile = EffectsProfile::from_config(config, reduced);
        let water = WaterLevel::new(config.water_level_pct);
        let base = water.base_y(height);
        let mut scene = Self {
            width: width.max(0.0),
            height: height.max(0.0),
            profile,
            clock: 0.0,
            water,
            wave: WaveSurface::new(width, base),
            weather: Weather::default(),
            fish: Vec::new(),
            decor: Decorations::default(),
            bubbles: Vec::new(),
            drops: Vec::new(),
            trail: Vec::new(),
            kinds: FishKinds::new(&config.fish_images),
            spawn_cooldown: 0.0,
            last_pointer: None,
            drops_spawned: 0,
            rng,
        };
        scene.wave.update(base, 0.0, scene.profile.full_waves);
        scene.rebuild_decorations();
        log::info!(
            "water scene {}x{} ({} profile)",
            scene.width,
            scene.height,
            if scene.profile.reduced { "reduced" } else { "full" }
        );
        scene
    }

    // --- Intents ---------------------------------------------------------------

    /// Startle nearby fish and throw a splash at the click point.
    /// Returns how many fish started darting.
    pub fn notify_click(&mut self, x: f64, y: f64) -> usize {
        let p = Vec2::new(x, y);
        let count = self.profile.splash_droplets + self.rng.gen_range(0..=4);
        particles::splash(&mut self.rng, &mut self.trail, p, count, 1.0);
        let width = self.width;
        let startled = self
            .fish
            .iter_mut()
            .map(|f| f.react_to_click(p, width))
            .filter(|&hit| hit)
            .count();
        if startled > 0 {
            log::debug!("click at ({x:.0}, {y:.0}) startled {startled} fish");
        }
        startled
    }

    pub fn notify_pointer_move(&mut self, x: f64, y: f64) {
        if !self.profile.cursor_trail {
            return;
        }
        particles::cursor_trail(&mut self.rng, &mut self.trail, &mut self.last_pointer, Vec2::new(x, y));
    }

    /// New viewport size: clears and regenerates every decoration.
    pub fn notify_resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.wave.resize(self.width);
        self.wave.update(self.water.base_y(self.height), self.clock, self.profile.full_waves);
        self.rebuild_decorations();
    }

    pub fn set_water_level(&mut self, pct: f64) {
        self.water.set_target(pct);
    }

    pub fn set_rain(&mut self, on: bool, intensity: f64) {
        self.weather.set(on, intensity);
    }

    pub fn mark_image_ready(&mut self, kind: &str) {
        self.kinds.mark_ready(kind);
    }

    pub fn mark_image_failed(&mut self, kind: &str) {
        self.kinds.mark_failed(kind, self.clock);
    }

    /// Kinds whose failed image should be requested again now.
    pub fn due_image_retries(&mut self) -> Vec<String> {
        self.kinds.due_retries(self.clock)
    }

    // --- Fixed step --------------------------------------------------------------

    pub fn update(&mut self, dt: f64) {
        self.clock += dt;
        self.water.update();
        let base = self.water.base_y(self.height);
        self.wave.update(base, self.clock, self.profile.full_waves);
        self.decor.update_plants(dt);
        self.decor.update_corals(dt);
        self.update_rain(dt);
        self.update_interactions(dt);
        self.update_fish(dt);
        self.update_bubbles(dt);
        self.update_trail(dt);
    }

    fn update_rain(&mut self, dt: f64) {
        if self.profile.weather {
            self.weather.update(dt, &mut self.rng);
        }
        if self.weather.raining() {
            let expected = self.weather.intensity() * self.profile.rain_spawn_rate * dt;
            for _ in 0..stochastic_count(&mut self.rng, expected) {
                if self.drops.len() >= MAX_DROPS {
                    break;
                }
                self.drops.push(Raindrop::spawn(&mut self.rng, self.width));
                self.drops_spawned += 1;
            }
        }

        let mut splashes = Vec::new();
        let (wave, width, height) = (&self.wave, self.width, self.height);
        self.drops.retain_mut(|d| match d.update(dt, wave.surface_at(d.pos.x), width, height) {
            DropFate::Falling => true,
            DropFate::Splashed => {
                splashes.push(Vec2::new(d.pos.x, wave.surface_at(d.pos.x)));
                false
            }
            DropFate::Gone => false,
        });
        for at in splashes {
            let n = self.rng.gen_range(RAIN_SPLASH_DROPLETS.0..=RAIN_SPLASH_DROPLETS.1);
            particles::splash(&mut self.rng, &mut self.trail, at, n, RAIN_SPLASH_SCALE);
        }
    }

    fn update_interactions(&mut self, dt: f64) {
        if self.profile.avoidance {
            interact::avoidance_pass(&mut self.fish, dt);
        }
        let waters = Waters { width: self.width, floor: self.floor(), wave: &self.wave };
        interact::nibble_pass(&mut self.fish, &self.decor, &waters, &mut self.rng);
    }

    fn update_fish(&mut self, dt: f64) {
        let waters = Waters { width: self.width, floor: self.floor(), wave: &self.wave };
        let (decor, rng) = (&mut self.decor, &mut self.rng);
        self.fish.retain_mut(|f| f.update(dt, &waters, decor, rng) == FishFate::Alive);

        if self.kinds.warn_if_empty() || self.fish.len() >= self.profile.fish_count {
            return;
        }
        self.spawn_cooldown -= dt;
        if self.spawn_cooldown > 0.0 {
            return;
        }
        let ready = self.kinds.ready_kinds();
        if ready.is_empty() {
            return;
        }
        let kind = ready[self.rng.gen_range(0..ready.len())];
        self.fish.push(Fish::spawn(&mut self.rng, kind, &waters));
        self.spawn_cooldown = FISH_SPAWN_INTERVAL;
    }

    fn update_bubbles(&mut self, dt: f64) {
        for _ in 0..stochastic_count(&mut self.rng, self.profile.bubble_rate * dt) {
            if self.bubbles.len() >= MAX_BUBBLES || self.width <= 0.0 {
                break;
            }
            let at = Vec2::new(self.rng.gen_range(0.0..self.width), self.floor());
            self.bubbles.push(Bubble::spawn(&mut self.rng, at));
        }
        let (wave, width) = (&self.wave, self.width);
        self.bubbles.retain_mut(|b| b.update(dt, wave.surface_at(b.pos.x), width));
    }

    fn update_trail(&mut self, dt: f64) {
        let (width, height) = (self.width, self.height);
        self.trail.retain_mut(|t| t.update(dt, width, height));
    }

    fn rebuild_decorations(&mut self) {
        let depth = self.floor() - self.water.base_y(self.height);
        let (width, floor) = (self.width, self.floor());
        self.decor.rebuild(&mut self.rng, width, floor, depth.max(0.0), &self.profile);
    }

    // --- Read access -----------------------------------------------------------

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn floor(&self) -> f64 {
        (self.height - FLOOR_INSET).max(0.0)
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn profile(&self) -> &EffectsProfile {
        &self.profile
    }

    pub fn reduced(&self) -> bool {
        self.profile.reduced
    }

    pub fn water_level_pct(&self) -> f64 {
        self.water.pct()
    }

    pub fn wave(&self) -> &WaveSurface {
        &self.wave
    }

    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    pub fn fish(&self) -> &[Fish] {
        &self.fish
    }

    pub fn decorations(&self) -> &Decorations {
        &self.decor
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    pub fn trail(&self) -> &[TrailPoint] {
        &self.trail
    }

    pub fn fish_kinds(&self) -> &FishKinds {
        &self.kinds
    }

    /// Raindrops created since the scene started.
    pub fn drops_spawned(&self) -> u64 {
        self.drops_spawned
    }
}

#[cfg(test)]
mod tests;
