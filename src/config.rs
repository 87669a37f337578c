//! Scene configuration and the reduced-effects profile.
//!
//! The page hands `start_water_scene` an optional JSON blob; any field it leaves
//! out falls back to the defaults below. The capability check runs once at
//! startup and decides whether the scene runs the full or the reduced profile.

use serde::Deserialize;

use crate::error::Result;

/// One entry of the externally supplied fish-type → image table.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FishImage {
    pub kind: String,
    pub src: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Id of the canvas element to create (or reuse if already present).
    pub canvas_id: String,
    pub fish_images: Vec<FishImage>,
    pub fish_count: usize,
    pub reduced_fish_count: usize,
    /// Percentage of the viewport height covered by water.
    pub water_level_pct: f64,
    /// Decorations per horizontal pixel.
    pub plant_density: f64,
    pub coral_density: f64,
    pub feature_density: f64,
    /// Expected ambient bubbles per second.
    pub bubble_rate: f64,
    /// Expected raindrops per second at intensity 1.0.
    pub rain_spawn_rate: f64,
    /// Minimum droplets in a click splash.
    pub splash_droplets: usize,
    pub seed: Option<u64>,
    /// Skip the capability check and always run the reduced profile.
    pub force_reduced: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas_id: "tb-water-canvas".to_string(),
            fish_images: Vec::new(),
            fish_count: 9,
            reduced_fish_count: 4,
            water_level_pct: 62.0,
            plant_density: 1.0 / 90.0,
            coral_density: 1.0 / 220.0,
            feature_density: 1.0 / 480.0,
            bubble_rate: 2.5,
            rain_spawn_rate: 90.0,
            splash_droplets: 10,
            seed: None,
            force_reduced: false,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Host signals read once at startup.
#[derive(Clone, Copy, Debug, Default)]
pub struct Capabilities {
    pub prefers_reduced_motion: bool,
    /// `navigator.hardwareConcurrency`; 0 when the browser hides it.
    pub hardware_concurrency: u32,
    pub mobile_user_agent: bool,
}

const LOW_CORE_COUNT: u32 = 4;

impl Capabilities {
    pub fn reduced_effects(&self) -> bool {
        if self.prefers_reduced_motion || self.mobile_user_agent {
            return true;
        }
        self.hardware_concurrency != 0 && self.hardware_concurrency < LOW_CORE_COUNT
    }
}

pub fn is_mobile_user_agent(ua: &str) -> bool {
    let ua = ua.to_ascii_lowercase();
    ["android", "iphone", "ipad", "ipod", "mobile", "silk"]
        .iter()
        .any(|needle| ua.contains(needle))
}

/// Active tuning derived from the config and the reduced flag.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectsProfile {
    pub reduced: bool,
    pub fish_count: usize,
    pub bubble_rate: f64,
    pub decoration_scale: f64,
    pub full_waves: bool,
    pub avoidance: bool,
    pub weather: bool,
    pub cursor_trail: bool,
    pub background_features: bool,
    pub plant_density: f64,
    pub coral_density: f64,
    pub feature_density: f64,
    pub rain_spawn_rate: f64,
    pub splash_droplets: usize,
}

impl EffectsProfile {
    pub fn from_config(config: &SceneConfig, reduced: bool) -> Self {
        let reduced = reduced || config.force_reduced;
        Self {
            reduced,
            fish_count: if reduced { config.reduced_fish_count } else { config.fish_count },
            bubble_rate: if reduced { config.bubble_rate * 0.3 } else { config.bubble_rate },
            decoration_scale: if reduced { 0.5 } else { 1.0 },
            full_waves: !reduced,
            avoidance: !reduced,
            weather: !reduced,
            cursor_trail: !reduced,
            background_features: !reduced,
            plant_density: config.plant_density,
            coral_density: config.coral_density,
            feature_density: config.feature_density,
            rain_spawn_rate: config.rain_spawn_rate,
            splash_droplets: config.splash_droplets.max(1),
        }
    }

    /// `floor(width * density)` scaled by the profile.
    pub fn count_for(&self, width: f64, density: f64) -> usize {
        (width.max(0.0) * density * self.decoration_scale).floor() as usize
    }
}

impl Default for EffectsProfile {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SceneConfig::from_json(
            r#"{ "fish_count": 3, "fish_images": [{ "kind": "bass", "src": "img/bass.png" }] }"#,
        )
        .unwrap();
        assert_eq!(cfg.fish_count, 3);
        assert_eq!(cfg.fish_images.len(), 1);
        assert_eq!(cfg.canvas_id, "tb-water-canvas");
        assert!((cfg.water_level_pct - 62.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SceneConfig::from_json("{ fish_count: }").is_err());
    }

    #[test]
    fn reduced_heuristic() {
        let mut caps = Capabilities { hardware_concurrency: 8, ..Default::default() };
        assert!(!caps.reduced_effects());
        caps.hardware_concurrency = 2;
        assert!(caps.reduced_effects());
        caps.hardware_concurrency = 0;
        assert!(!caps.reduced_effects());
        caps.prefers_reduced_motion = true;
        assert!(caps.reduced_effects());
    }

    #[test]
    fn mobile_agents_detected() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15"
        ));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
        ));
    }

    #[test]
    fn reduced_profile_disables_decorative_systems() {
        let cfg = SceneConfig::default();
        let p = EffectsProfile::from_config(&cfg, true);
        assert!(p.reduced && !p.avoidance && !p.full_waves && !p.weather && !p.cursor_trail);
        assert_eq!(p.fish_count, cfg.reduced_fish_count);
        assert_eq!(p.count_for(900.0, 1.0 / 90.0), 5);
        let full = EffectsProfile::from_config(&cfg, false);
        assert_eq!(full.count_for(900.0, 1.0 / 90.0), 10);
    }
}
