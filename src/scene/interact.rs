//! Fish-to-fish avoidance and fish-to-scenery nibbling.
//!
//! The raw push-apart vector of a fish is only recomputed when its own
//! throttle expires; the applied vector is smoothed toward it every tick.

use rand::Rng;

use super::decor::Decorations;
use super::fish::{Fish, FishState, Waters};
use crate::geom::Vec2;

pub const AVOID_INTERVAL: f64 = 0.1;
/// Soft buffer around the combined half-sizes.
pub const AVOID_BUFFER: f64 = 1.25;
/// px/s of push per px of overlap.
pub const AVOID_STRENGTH: f64 = 2.5;
pub const AVOID_SMOOTHING: f64 = 0.12;

pub const NIBBLE_CHANCE: f64 = 0.004;
pub const NIBBLE_RADIUS: f64 = 160.0;
/// Lower fraction of the water column counted as "near the substrate".
pub const SUBSTRATE_ZONE: f64 = 0.35;

/// Push on `a` away from `b`; `b` receives the negation.
pub fn pair_push(a: &Fish, b: &Fish) -> Option<Vec2> {
    let reach = (a.half_width() + b.half_width()) * AVOID_BUFFER;
    let d = a.pos - b.pos;
    let dist = d.len();
    if dist >= reach {
        return None;
    }
    let dir = if dist < 1e-6 { Vec2::new(1.0, 0.0) } else { d * (1.0 / dist) };
    Some(dir * ((reach - dist) * AVOID_STRENGTH))
}

pub fn avoidance_pass(fish: &mut [Fish], dt: f64) {
    let due: Vec<bool> = fish
        .iter_mut()
        .map(|f| {
            f.avoid_cooldown -= dt;
            if f.avoid_cooldown > 0.0 {
                return false;
            }
            f.avoid_cooldown = (f.avoid_cooldown + AVOID_INTERVAL).max(AVOID_INTERVAL * 0.5);
            f.avoid_raw = Vec2::ZERO;
            true
        })
        .collect();

    for i in 0..fish.len() {
        for j in (i + 1)..fish.len() {
            if !(due[i] || due[j]) || fish[i].is_darting() || fish[j].is_darting() {
                continue;
            }
            let Some(push) = pair_push(&fish[i], &fish[j]) else {
                continue;
            };
            if due[i] {
                fish[i].avoid_raw += push;
            }
            if due[j] {
                fish[j].avoid_raw += -push;
            }
        }
    }

    for f in fish.iter_mut() {
        if f.is_darting() {
            f.avoid_raw = Vec2::ZERO;
        }
        f.avoid = f.avoid.ease_toward(f.avoid_raw, AVOID_SMOOTHING);
    }
}

/// Swimming fish near the bottom occasionally pick the nearest plant or coral.
pub fn nibble_pass<R: Rng + ?Sized>(
    fish: &mut [Fish],
    decor: &Decorations,
    waters: &Waters<'_>,
    rng: &mut R,
) {
    let zone_top = waters.floor - (waters.floor - waters.wave.base()) * SUBSTRATE_ZONE;
    for f in fish.iter_mut() {
        if f.state != FishState::Swimming || f.pos.y < zone_top {
            continue;
        }
        if !rng.gen_bool(NIBBLE_CHANCE) {
            continue;
        }
        if let Some((target, anchor)) = decor.nearest(f.pos, NIBBLE_RADIUS) {
            f.start_nibbling(rng, target, anchor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectsProfile;
    use crate::scene::wave::WaveSurface;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pair(rng: &mut StdRng, wave: &WaveSurface) -> Vec<Fish> {
        let waters = Waters { width: 800.0, floor: 590.0, wave };
        let mut a = Fish::spawn(rng, 0, &waters);
        let mut b = Fish::spawn(rng, 0, &waters);
        a.size = 60.0;
        b.size = 60.0;
        a.pos = Vec2::new(400.0, 400.0);
        b.pos = Vec2::new(430.0, 410.0);
        a.avoid_cooldown = 0.0;
        b.avoid_cooldown = 0.0;
        vec![a, b]
    }

    #[test]
    fn overlapping_fish_push_apart_equally() {
        let wave = WaveSurface::new(800.0, 200.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut fish = pair(&mut rng, &wave);
        avoidance_pass(&mut fish, 1.0 / 30.0);
        let (a, b) = (fish[0].avoid_raw, fish[1].avoid_raw);
        assert!(!a.is_zero() && !b.is_zero());
        assert!((a.x + b.x).abs() < 1e-9 && (a.y + b.y).abs() < 1e-9);
        // a sits left of and above b, so it is pushed left and up
        assert!(a.x < 0.0 && a.y < 0.0);
        // along the line between the centres
        let line = fish[0].pos - fish[1].pos;
        assert!((a.x * line.y - a.y * line.x).abs() < 1e-6);
        // applied vector only moved part of the way
        assert!(fish[0].avoid.len() < a.len());
        assert!(fish[0].avoid.len() > 0.0);
    }

    #[test]
    fn darting_fish_are_excluded() {
        let wave = WaveSurface::new(800.0, 200.0);
        let mut rng = StdRng::seed_from_u64(2);
        let mut fish = pair(&mut rng, &wave);
        fish[1].state = FishState::Darting { angle: 0.0 };
        avoidance_pass(&mut fish, 1.0 / 30.0);
        assert!(fish[0].avoid_raw.is_zero());
        assert!(fish[1].avoid_raw.is_zero());
    }

    #[test]
    fn raw_vector_is_throttled_but_applied_keeps_smoothing() {
        let wave = WaveSurface::new(800.0, 200.0);
        let mut rng = StdRng::seed_from_u64(3);
        let mut fish = pair(&mut rng, &wave);
        avoidance_pass(&mut fish, 1.0 / 30.0);
        let raw = fish[0].avoid_raw;
        let applied = fish[0].avoid;
        // move them apart; raw must not change until the throttle expires
        fish[1].pos = Vec2::new(700.0, 400.0);
        avoidance_pass(&mut fish, 1.0 / 30.0);
        assert_eq!(fish[0].avoid_raw, raw);
        assert!(fish[0].avoid.len() > applied.len());
        for _ in 0..3 {
            avoidance_pass(&mut fish, 1.0 / 30.0);
        }
        assert!(fish[0].avoid_raw.is_zero());
    }

    #[test]
    fn coincident_fish_use_fallback_axis() {
        let wave = WaveSurface::new(800.0, 200.0);
        let mut rng = StdRng::seed_from_u64(4);
        let mut fish = pair(&mut rng, &wave);
        fish[1].pos = fish[0].pos;
        let push = pair_push(&fish[0], &fish[1]).unwrap();
        assert!(push.x > 0.0 && push.y == 0.0);
    }

    #[test]
    fn nibble_pass_targets_nearby_scenery() {
        let wave = WaveSurface::new(1000.0, 200.0);
        let waters = Waters { width: 1000.0, floor: 590.0, wave: &wave };
        let mut rng = StdRng::seed_from_u64(5);
        let mut decor = Decorations::default();
        decor.rebuild(&mut rng, 1000.0, 590.0, 390.0, &EffectsProfile::default());
        let anchor = decor.plants[0].anchor();

        let mut fish = vec![Fish::spawn(&mut rng, 0, &waters)];
        fish[0].pos = Vec2::new(anchor.x + 20.0, 560.0);
        fish[0].state_timer = 100.0;
        for _ in 0..5_000 {
            nibble_pass(&mut fish, &decor, &waters, &mut rng);
            if fish[0].is_nibbling() {
                break;
            }
        }
        let FishState::Nibbling { target, .. } = fish[0].state else {
            panic!("fish never started nibbling");
        };
        assert!(decor.resolve(target).is_some());
    }

    #[test]
    fn fish_high_in_the_column_never_nibble() {
        let wave = WaveSurface::new(1000.0, 200.0);
        let waters = Waters { width: 1000.0, floor: 590.0, wave: &wave };
        let mut rng = StdRng::seed_from_u64(6);
        let mut decor = Decorations::default();
        decor.rebuild(&mut rng, 1000.0, 590.0, 390.0, &EffectsProfile::default());
        let mut fish = vec![Fish::spawn(&mut rng, 0, &waters)];
        fish[0].pos = Vec2::new(500.0, 250.0);
        for _ in 0..5_000 {
            nibble_pass(&mut fish, &decor, &waters, &mut rng);
        }
        assert_eq!(fish[0].state, FishState::Swimming);
    }
}
