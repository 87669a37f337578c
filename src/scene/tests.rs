use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::config::FishImage;
use crate::scheduler::FIXED_STEP_SECS as DT;

fn config() -> SceneConfig {
    SceneConfig {
        fish_images: vec![
            FishImage { kind: "bass".into(), src: "img/bass.png".into() },
            FishImage { kind: "trout".into(), src: "img/trout.png".into() },
        ],
        ..Default::default()
    }
}

fn scene(seed: u64) -> WaterScene {
    WaterScene::new(&config(), false, 1280.0, 720.0, StdRng::seed_from_u64(seed))
}

fn stocked(seed: u64) -> WaterScene {
    let mut s = scene(seed);
    s.mark_image_ready("bass");
    s.mark_image_ready("trout");
    for _ in 0..(30 * 20) {
        s.update(DT);
    }
    s
}

fn assert_fish_in_water(s: &WaterScene) {
    for f in s.fish() {
        let (top, bottom) = fish::vertical_bounds(s.wave().surface_at(f.pos.x), s.floor(), f.half_height());
        assert!(
            f.pos.y >= top - 1e-9 && f.pos.y <= bottom + 1e-9,
            "fish at y={} outside [{top}, {bottom}]",
            f.pos.y
        );
    }
}

#[test]
fn fish_wait_for_images() {
    let mut s = scene(1);
    for _ in 0..120 {
        s.update(DT);
    }
    assert!(s.fish().is_empty());

    s.mark_image_ready("trout");
    s.update(DT);
    assert_eq!(s.fish().len(), 1);
    assert_eq!(s.fish_kinds().get(s.fish()[0].kind).map(|k| k.kind.as_str()), Some("trout"));
}

#[test]
fn population_tops_up_to_profile_count() {
    let s = stocked(2);
    assert!(s.fish().len() <= s.profile().fish_count);
    assert!(s.fish().len() >= s.profile().fish_count - 1);
}

#[test]
fn missing_fish_table_leaves_water_empty() {
    let mut s = WaterScene::new(&SceneConfig::default(), false, 800.0, 600.0, StdRng::seed_from_u64(3));
    for _ in 0..300 {
        s.update(DT);
    }
    assert!(s.fish().is_empty());
    assert!(!s.wave().points().is_empty());
}

#[test]
fn failed_images_are_retried() {
    let mut s = scene(4);
    s.mark_image_failed("bass");
    assert!(s.due_image_retries().is_empty());
    for _ in 0..(30 * 6) {
        s.update(DT);
    }
    assert_eq!(s.due_image_retries(), vec!["bass".to_string()]);
}

#[test]
fn fish_stay_inside_the_water_column() {
    let mut s = stocked(5);
    s.set_water_level(40.0);
    for tick in 0..(30 * 60) {
        if tick % 45 == 0 {
            let target = s.fish().first().map(|f| f.pos);
            if let Some(p) = target {
                s.notify_click(p.x + 10.0, p.y - 5.0);
            }
        }
        s.update(DT);
        assert_fish_in_water(&s);
    }
}

#[test]
fn particles_never_outlive_their_terminal_condition() {
    let mut s = stocked(6);
    s.set_rain(true, 1.0);
    for tick in 0..(30 * 30) {
        if tick % 7 == 0 {
            s.notify_pointer_move((tick * 13 % 1280) as f64, (tick * 7 % 720) as f64);
        }
        if tick % 60 == 0 {
            s.notify_click(640.0, 500.0);
        }
        s.update(DT);
        let (w, h) = (s.width(), s.height());
        for b in s.bubbles() {
            assert!(!b.is_terminal(s.wave().surface_at(b.pos.x), w));
        }
        for t in s.trail() {
            assert!(!t.is_terminal(w, h));
        }
        for d in s.drops() {
            assert!(d.pos.y < s.wave().surface_at(d.pos.x) && d.pos.y <= h);
            assert!(d.pos.x >= 0.0 && d.pos.x <= w && d.pos.y >= 0.0);
        }
    }
    assert!(s.drops_spawned() > 0);
}

#[test]
fn click_near_fish_makes_it_dart_and_splashes() {
    let mut s = stocked(7);
    let idx = s.fish().iter().position(|f| !f.is_nibbling()).expect("a free fish");
    let p = s.fish()[idx].pos + Vec2::new(-15.0, 4.0);
    let before = s.trail().len();

    assert!(s.notify_click(p.x, p.y) >= 1);

    let f = &s.fish()[idx];
    assert!(f.is_darting());
    assert_eq!(f.target_speed, f.base_speed * DART_SPEED_MULT);
    let droplets = s
        .trail()
        .iter()
        .filter(|t| t.pos == p && matches!(t.kind, TrailKind::Splash { .. }))
        .count();
    assert!(droplets >= s.profile().splash_droplets);
    assert!(s.trail().len() >= before + s.profile().splash_droplets);
}

#[test]
fn nibbling_fish_ignore_clicks() {
    let mut s = stocked(8);
    let anchor = s.decorations().plants[0].anchor();
    let target = SceneryRef { kind: SceneryKind::Plant, index: 0, epoch: s.decorations().epoch() };
    let mut rng = StdRng::seed_from_u64(0);
    s.fish[0].start_nibbling(&mut rng, target, anchor);
    let p = s.fish[0].pos;
    s.notify_click(p.x, p.y);
    assert!(s.fish[0].is_nibbling());
}

#[test]
fn resize_rebuilds_decorations_and_releases_nibblers() {
    let mut s = stocked(9);
    let anchor = s.decorations().plants[0].anchor();
    let target = SceneryRef { kind: SceneryKind::Plant, index: 0, epoch: s.decorations().epoch() };
    let mut rng = StdRng::seed_from_u64(0);
    s.fish[0].start_nibbling(&mut rng, target, anchor);
    s.update(DT);
    assert!(s.fish[0].is_nibbling());
    assert!(s.decorations().plants[0].nibble > 0.0);

    s.notify_resize(640.0, 720.0);
    let p = s.profile().clone();
    assert_eq!(s.decorations().plants.len(), p.count_for(640.0, p.plant_density));
    assert_eq!(s.decorations().corals.len(), p.count_for(640.0, p.coral_density));
    assert_eq!(s.decorations().features.len(), p.count_for(640.0, p.feature_density));
    assert_eq!(s.wave().points().len(), WAVE_SAMPLES);

    s.update(DT);
    assert!(!s.fish[0].is_nibbling());
}

#[test]
fn narrowing_resize_drops_rain_outside_the_viewport() {
    let mut s = scene(21);
    s.set_rain(true, 1.0);
    for _ in 0..3 {
        s.update(DT);
    }
    assert!(s.drops().iter().any(|d| d.pos.x > 300.0));
    s.notify_resize(300.0, 720.0);
    s.update(DT);
    let outside = s.drops().iter().filter(|d| d.pos.x < 0.0 || d.pos.x > 300.0).count();
    assert_eq!(outside, 0);
}

#[test]
fn rain_spawn_rate_matches_intensity() {
    let mut s = scene(10);
    let intensity = 0.5;
    s.set_rain(true, intensity);
    let ticks = 600;
    for _ in 0..ticks {
        s.update(DT);
    }
    let expected = intensity * ticks as f64 * DT * s.profile().rain_spawn_rate;
    let got = s.drops_spawned() as f64;
    assert!((got - expected).abs() < expected * 0.12, "spawned {got}, expected ~{expected}");
}

#[test]
fn reduced_profile_skips_avoidance_and_trail() {
    let mut s = WaterScene::new(&config(), true, 1280.0, 720.0, StdRng::seed_from_u64(11));
    s.mark_image_ready("bass");
    for _ in 0..300 {
        s.update(DT);
    }
    s.notify_pointer_move(100.0, 100.0);
    s.notify_pointer_move(300.0, 100.0);
    assert!(s.trail().is_empty());
    assert!(s.fish().iter().all(|f| f.avoid.is_zero()));
    assert!(s.decorations().features.is_empty());
}

#[test]
fn same_seed_same_decorations() {
    let a = scene(12);
    let b = scene(12);
    assert_eq!(a.decorations().corals.len(), b.decorations().corals.len());
    for (ca, cb) in a.decorations().corals.iter().zip(&b.decorations().corals) {
        match (&ca.shape, &cb.shape) {
            (CoralShape::Branches(x), CoralShape::Branches(y)) => assert_eq!(x, y),
            (CoralShape::Blob(x), CoralShape::Blob(y)) => assert_eq!(x, y),
            _ => panic!("coral kinds diverged"),
        }
    }
}

#[test]
fn water_level_change_is_gradual() {
    let mut s = scene(13);
    let start = s.water_level_pct();
    s.set_water_level(30.0);
    s.update(DT);
    let after = s.water_level_pct();
    assert!(after < start && after > 30.0);
}
