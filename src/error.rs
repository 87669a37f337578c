//! Errors raised while wiring the scene into the page.
//!
//! Nothing in here is produced by the simulation itself: update steps are
//! infallible, and the render pass swallows per-entity drawing failures.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("canvas setup failed: {0}")]
    Canvas(String),
    #[error("2d context unavailable")]
    Context,
    #[error("invalid scene config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("js error: {0}")]
    Js(String),
}

impl From<JsValue> for SceneError {
    fn from(value: JsValue) -> Self {
        SceneError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<SceneError> for JsValue {
    fn from(err: SceneError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
