//! Procedurally generated scenery: seaweed, coral and background rock.
//!
//! Every structure is produced once, from the scene RNG, when the decoration
//! set is built. Only a viewport resize rebuilds the set, and each rebuild bumps
//! `epoch` so fish holding a `SceneryRef` into the old set notice it is gone.
//! Structures are stored relative to the entity origin so sway can rotate them
//! about their base.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use rand::Rng;

use crate::config::EffectsProfile;
use crate::geom::{CurveTo, Segment, Vec2};

pub const MIN_BRANCH_LEN: f64 = 3.0;
/// How long a nibbled plant/coral keeps its extra wiggle after the last bite.
pub const NIBBLE_WIGGLE_SECS: f64 = 0.5;

const PLANT_HEIGHT: (f64, f64) = (40.0, 130.0);
const CORAL_SIZE: (f64, f64) = (24.0, 58.0);
const FEATURE_WIDTH: (f64, f64) = (140.0, 320.0);

// --- Generators --------------------------------------------------------------

/// Shape knobs for the recursive branch generator.
#[derive(Clone, Copy, Debug)]
pub struct BranchStyle {
    pub spread: f64,
    pub min_children: u32,
    pub max_children: u32,
    pub shrink: (f64, f64),
    pub narrow: f64,
}

pub const BRANCHING: BranchStyle =
    BranchStyle { spread: 0.55, min_children: 1, max_children: 3, shrink: (0.65, 0.85), narrow: 0.7 };
pub const FAN: BranchStyle =
    BranchStyle { spread: 0.9, min_children: 2, max_children: 3, shrink: (0.7, 0.85), narrow: 0.7 };

/// Emit one segment from `start`, then recurse into 1-3 perturbed children.
pub fn branch<R: Rng + ?Sized>(
    rng: &mut R,
    style: &BranchStyle,
    start: Vec2,
    angle: f64,
    length: f64,
    depth: u32,
    width: f64,
    out: &mut Vec<Segment>,
) {
    if depth == 0 || length < MIN_BRANCH_LEN {
        return;
    }
    let end = start + Vec2::from_angle(angle, length);
    out.push(Segment { from: start, to: end, width });

    let children = rng.gen_range(style.min_children..=style.max_children);
    for _ in 0..children {
        let child_angle = angle + rng.gen_range(-style.spread..style.spread);
        let child_len = length * rng.gen_range(style.shrink.0..style.shrink.1);
        branch(rng, style, end, child_angle, child_len, depth - 1, width * style.narrow, out);
    }
}

/// Closed blob of `n` points at randomized radii around the origin.
pub fn brain_outline<R: Rng + ?Sized>(rng: &mut R, radius: f64, n: usize) -> Vec<Vec2> {
    let n = n.max(3);
    (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * TAU;
            let r = radius * rng.gen_range(0.8..1.1);
            // squashed vertically so the blob sits on the substrate
            Vec2::new(a.cos() * r, a.sin() * r * 0.7)
        })
        .collect()
}

/// Irregular mound: vertices over the upper half-ellipse, joined by cubic
/// curves whose control points are jittered off each edge midpoint.
pub fn rock_outline<R: Rng + ?Sized>(rng: &mut R, rx: f64, ry: f64) -> (Vec2, Vec<CurveTo>) {
    let n = rng.gen_range(6..=9);
    let mut verts = Vec::with_capacity(n);
    for i in 0..n {
        let a = PI + i as f64 / (n - 1) as f64 * PI;
        let sx = if i == 0 || i == n - 1 { 1.0 } else { rng.gen_range(0.75..1.1) };
        let sy = rng.gen_range(0.7..1.1);
        verts.push(Vec2::new(a.cos() * rx * sx, (a.sin() * ry * sy).min(0.0)));
    }

    let jitter = rx.min(ry) * 0.35;
    let start = verts[0];
    let mut curves = Vec::with_capacity(n);
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let mid = (a + b) * 0.5;
        let mut c1 = mid + Vec2::new(rng.gen_range(-jitter..jitter), rng.gen_range(-jitter..jitter));
        let mut c2 = mid + Vec2::new(rng.gen_range(-jitter..jitter), rng.gen_range(-jitter..jitter));
        if i == n - 1 {
            // closing edge runs along the floor
            c1.y = 0.0;
            c2.y = 0.0;
        }
        curves.push(CurveTo { c1, c2, to: b });
    }
    (start, curves)
}

fn seaweed<R: Rng + ?Sized>(rng: &mut R, height: f64) -> Vec<Segment> {
    let n = rng.gen_range(5..=9);
    let step = height / n as f64;
    let mut angle = -FRAC_PI_2;
    let mut at = Vec2::ZERO;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        angle = (angle + rng.gen_range(-0.25..0.25)).clamp(-FRAC_PI_2 - 0.5, -FRAC_PI_2 + 0.5);
        let to = at + Vec2::from_angle(angle, step);
        let width = 5.0 - 3.5 * i as f64 / n as f64;
        out.push(Segment { from: at, to, width });
        at = to;
    }
    out
}

// --- Entities ----------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct Sway {
    pub phase: f64,
    pub speed: f64,
    pub amplitude: f64,
}

impl Sway {
    fn random<R: Rng + ?Sized>(rng: &mut R, amplitude: (f64, f64)) -> Self {
        Self {
            phase: rng.gen_range(0.0..TAU),
            speed: rng.gen_range(0.6..1.4),
            amplitude: rng.gen_range(amplitude.0..amplitude.1),
        }
    }

    fn advance(&mut self, dt: f64) {
        self.phase = (self.phase + self.speed * dt) % TAU;
    }

    /// Rotation in radians; `nibble` > 0 layers a fast transient wiggle on top.
    pub fn angle(&self, nibble: f64) -> f64 {
        let base = self.phase.sin() * self.amplitude;
        if nibble > 0.0 {
            base + (self.phase * 9.0).sin() * 0.12 * (nibble / NIBBLE_WIGGLE_SECS).min(1.0)
        } else {
            base
        }
    }
}

#[derive(Clone, Debug)]
pub struct Plant {
    pub origin: Vec2,
    pub height: f64,
    pub segments: Vec<Segment>,
    pub sway: Sway,
    pub nibble: f64,
    pub tint: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoralKind {
    Branching,
    Fan,
    Brain,
}

#[derive(Clone, Debug)]
pub enum CoralShape {
    Branches(Vec<Segment>),
    Blob(Vec<Vec2>),
}

#[derive(Clone, Debug)]
pub struct Coral {
    pub origin: Vec2,
    pub size: f64,
    pub kind: CoralKind,
    pub shape: CoralShape,
    pub sway: Sway,
    pub nibble: f64,
    pub tint: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cave {
    pub center: Vec2,
    pub rx: f64,
    pub ry: f64,
}

#[derive(Clone, Debug)]
pub struct BackgroundFeature {
    pub origin: Vec2,
    pub start: Vec2,
    pub outline: Vec<CurveTo>,
    pub cave: Option<Cave>,
    /// 0 = pinned, 1 = moves fully with the water line.
    pub parallax: f64,
}

impl Plant {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, origin: Vec2) -> Self {
        let height = rng.gen_range(PLANT_HEIGHT.0..PLANT_HEIGHT.1);
        Self {
            origin,
            height,
            segments: seaweed(rng, height),
            sway: Sway::random(rng, (0.05, 0.14)),
            nibble: 0.0,
            tint: rng.gen_range(0..3),
        }
    }
}

impl Coral {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, origin: Vec2, kind: CoralKind) -> Self {
        let size = rng.gen_range(CORAL_SIZE.0..CORAL_SIZE.1);
        let shape = match kind {
            CoralKind::Branching => {
                let mut out = Vec::new();
                branch(rng, &BRANCHING, Vec2::ZERO, -FRAC_PI_2, size * 0.45, 4, 4.0, &mut out);
                CoralShape::Branches(out)
            }
            CoralKind::Fan => {
                let mut out = Vec::new();
                branch(rng, &FAN, Vec2::ZERO, -FRAC_PI_2, size * 0.35, 5, 2.5, &mut out);
                CoralShape::Branches(out)
            }
            CoralKind::Brain => {
                let n = rng.gen_range(14..=20);
                CoralShape::Blob(brain_outline(rng, size * 0.5, n))
            }
        };
        let sway = match kind {
            CoralKind::Brain => Sway::random(rng, (0.0, 0.01)),
            _ => Sway::random(rng, (0.02, 0.06)),
        };
        Self { origin, size, kind, shape, sway, nibble: 0.0, tint: rng.gen_range(0..4) }
    }

    /// Point fish aim for when nibbling.
    pub fn anchor(&self) -> Vec2 {
        self.origin + Vec2::new(0.0, -self.size * 0.5)
    }
}

impl Plant {
    pub fn anchor(&self) -> Vec2 {
        self.origin + Vec2::new(0.0, -self.height * 0.6)
    }
}

impl BackgroundFeature {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, origin: Vec2, max_height: f64) -> Self {
        let rx = rng.gen_range(FEATURE_WIDTH.0..FEATURE_WIDTH.1) * 0.5;
        let ry = (rx * rng.gen_range(0.5..1.1)).min(max_height.max(10.0));
        let (start, outline) = rock_outline(rng, rx, ry);
        let cave = rng.gen_bool(0.4).then(|| Cave {
            center: Vec2::new(rng.gen_range(-0.2..0.2) * rx, -ry * 0.3),
            rx: rx * 0.25,
            ry: ry * 0.22,
        });
        Self { origin, start, outline, cave, parallax: rng.gen_range(0.2..0.6) }
    }
}

// --- Decoration set ----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneryKind {
    Plant,
    Coral,
}

/// Non-owning handle from a fish to a plant or coral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneryRef {
    pub kind: SceneryKind,
    pub index: usize,
    pub epoch: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Decorations {
    pub plants: Vec<Plant>,
    pub corals: Vec<Coral>,
    pub features: Vec<BackgroundFeature>,
    epoch: u32,
}

impl Decorations {
    /// Replace the whole set for a viewport of `width`, with the substrate at `floor`.
    pub fn rebuild<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        width: f64,
        floor: f64,
        water_depth: f64,
        profile: &EffectsProfile,
    ) {
        self.epoch = self.epoch.wrapping_add(1);
        self.plants.clear();
        self.corals.clear();
        self.features.clear();
        if width <= 0.0 {
            return;
        }

        if profile.background_features {
            for _ in 0..profile.count_for(width, profile.feature_density) {
                let origin = Vec2::new(rng.gen_range(0.0..width), floor);
                self.features.push(BackgroundFeature::generate(rng, origin, water_depth * 0.6));
            }
        }
        for _ in 0..profile.count_for(width, profile.coral_density) {
            let origin = Vec2::new(rng.gen_range(0.0..width), floor + rng.gen_range(0.0..4.0));
            let kind = match rng.gen_range(0..10) {
                0..=3 => CoralKind::Branching,
                4..=6 => CoralKind::Fan,
                _ => CoralKind::Brain,
            };
            self.corals.push(Coral::generate(rng, origin, kind));
        }
        for _ in 0..profile.count_for(width, profile.plant_density) {
            let origin = Vec2::new(rng.gen_range(0.0..width), floor + rng.gen_range(2.0..8.0));
            self.plants.push(Plant::generate(rng, origin));
        }
        log::debug!(
            "decorations rebuilt: {} plants, {} corals, {} features",
            self.plants.len(),
            self.corals.len(),
            self.features.len()
        );
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn update_plants(&mut self, dt: f64) {
        for p in &mut self.plants {
            p.sway.advance(dt);
            p.nibble = (p.nibble - dt).max(0.0);
        }
    }

    pub fn update_corals(&mut self, dt: f64) {
        for c in &mut self.corals {
            c.sway.advance(dt);
            c.nibble = (c.nibble - dt).max(0.0);
        }
    }

    /// Current anchor of a referenced entity, or None if the set was rebuilt.
    pub fn resolve(&self, r: SceneryRef) -> Option<Vec2> {
        if r.epoch != self.epoch {
            return None;
        }
        match r.kind {
            SceneryKind::Plant => self.plants.get(r.index).map(Plant::anchor),
            SceneryKind::Coral => self.corals.get(r.index).map(Coral::anchor),
        }
    }

    /// Flag the entity as being nibbled; keeps its wiggle alive while refreshed.
    pub fn nibble(&mut self, r: SceneryRef) {
        if r.epoch != self.epoch {
            return;
        }
        match r.kind {
            SceneryKind::Plant => {
                if let Some(p) = self.plants.get_mut(r.index) {
                    p.nibble = NIBBLE_WIGGLE_SECS;
                }
            }
            SceneryKind::Coral => {
                if let Some(c) = self.corals.get_mut(r.index) {
                    c.nibble = NIBBLE_WIGGLE_SECS;
                }
            }
        }
    }

    /// Nearest plant or coral anchor within `radius` of `pos`.
    pub fn nearest(&self, pos: Vec2, radius: f64) -> Option<(SceneryRef, Vec2)> {
        let plants = self
            .plants
            .iter()
            .enumerate()
            .map(|(i, p)| (SceneryKind::Plant, i, p.anchor()));
        let corals = self
            .corals
            .iter()
            .enumerate()
            .map(|(i, c)| (SceneryKind::Coral, i, c.anchor()));

        let mut best: Option<(SceneryRef, Vec2, f64)> = None;
        for (kind, index, anchor) in plants.chain(corals) {
            let d = (anchor - pos).len();
            if d > radius {
                continue;
            }
            if best.as_ref().is_some_and(|(_, _, bd)| d >= *bd) {
                continue;
            }
            best = Some((SceneryRef { kind, index, epoch: self.epoch }, anchor, d));
        }
        best.map(|(r, a, _)| (r, a))
    }
}
