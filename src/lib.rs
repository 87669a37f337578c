//! TackleBot Waters core crate.
//!
//! An ambient water scene drawn on a full-viewport canvas behind the page:
//! swimming fish, seaweed and coral, bubbles, rain and click splashes. The
//! simulation under `scene` is headless and deterministic for a given seed;
//! `host` and `render` are the only parts that talk to the browser.

use wasm_bindgen::prelude::*;

pub mod assets;
pub mod config;
pub mod error;
pub mod geom;
mod host;
mod render;
pub mod scene;
pub mod scheduler;

pub use config::SceneConfig;
pub use error::SceneError;
pub use scene::WaterScene;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Info).ok();
}

// -----------------------------------------------------------------------------
// JS entry points
// -----------------------------------------------------------------------------

/// Mount the scene. `config_json` is an optional `SceneConfig` object as JSON;
/// omitted fields keep their defaults. Calling it again while running is a no-op.
#[wasm_bindgen]
pub fn start_water_scene(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => SceneConfig::from_json(json)?,
        _ => SceneConfig::default(),
    };
    host::start(config)?;
    Ok(())
}

#[wasm_bindgen]
pub fn stop_water_scene() {
    host::stop();
}

#[wasm_bindgen]
pub fn is_water_scene_running() -> bool {
    host::is_running()
}

/// Ease the water line toward `pct` percent of the viewport height.
#[wasm_bindgen]
pub fn set_water_level(pct: f64) {
    host::with_scene(|scene| scene.set_water_level(pct));
}

#[wasm_bindgen]
pub fn set_rain(on: bool, intensity: f64) {
    host::with_scene(|scene| scene.set_rain(on, intensity));
}
