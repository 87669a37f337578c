//! Browser wiring: canvas, listeners, image loading and the frame loop.
//!
//! One scene per page lives in `SCENE_HOST`. Every callback handed to the
//! browser captures the generation it was created for and does nothing once
//! that generation has been stopped, so a late image load or a frame that was
//! already queued cannot touch a newer scene.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, HtmlImageElement, MouseEvent,
    Window,
};

use crate::config::{Capabilities, SceneConfig, is_mobile_user_agent};
use crate::error::{Result, SceneError};
use crate::render;
use crate::scene::WaterScene;
use crate::scheduler::FixedStep;

const CANVAS_STYLE: &str = "position:fixed; left:0; top:0; width:100vw; height:100vh; \
     pointer-events:none; z-index:-1; display:block;";

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

thread_local! {
    static SCENE_HOST: RefCell<Option<SceneHost>> = const { RefCell::new(None) };
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

struct SceneHost {
    generation: u64,
    window: Window,
    canvas: HtmlCanvasElement,
    owns_canvas: bool,
    ctx: CanvasRenderingContext2d,
    scene: WaterScene,
    clock: FixedStep,
    images: HashMap<String, HtmlImageElement>,
    image_handlers: Vec<Closure<dyn FnMut()>>,
    listeners: Vec<Listener>,
    frame: FrameCallback,
    frame_id: Option<i32>,
}

pub fn is_running() -> bool {
    SCENE_HOST.with(|cell| cell.borrow().is_some())
}

/// Run `f` against the live scene, if there is one.
pub fn with_scene<R>(f: impl FnOnce(&mut WaterScene) -> R) -> Option<R> {
    SCENE_HOST.with(|cell| cell.borrow_mut().as_mut().map(|host| f(&mut host.scene)))
}

/// Mount the canvas and start animating. A second call while running is a no-op.
pub fn start(config: SceneConfig) -> Result<()> {
    if is_running() {
        log::debug!("water scene already running");
        return Ok(());
    }

    let win = web_sys::window().ok_or(SceneError::NoWindow)?;
    let doc = win.document().ok_or(SceneError::NoDocument)?;
    let body = doc.body().ok_or(SceneError::NoBody)?;

    let (canvas, owns_canvas) = match doc.get_element_by_id(&config.canvas_id) {
        Some(el) => {
            let c: HtmlCanvasElement = el
                .dyn_into()
                .map_err(|_| SceneError::Canvas(format!("#{} is not a canvas", config.canvas_id)))?;
            (c, false)
        }
        None => {
            let c: HtmlCanvasElement = doc
                .create_element("canvas")?
                .dyn_into()
                .map_err(|_| SceneError::Canvas("created element is not a canvas".into()))?;
            c.set_id(&config.canvas_id);
            c.set_attribute("style", CANVAS_STYLE)?;
            c.set_attribute("aria-hidden", "true")?;
            body.append_child(&c)?;
            (c, true)
        }
    };
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(SceneError::Context)?
        .dyn_into()
        .map_err(|_| SceneError::Context)?;

    let (width, height) = viewport(&win);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);

    let caps = detect_capabilities(&win);
    let reduced = config.force_reduced || caps.reduced_effects();
    log::info!(
        "capabilities: reduced motion {}, {} cores, mobile {} -> {} effects",
        caps.prefers_reduced_motion,
        caps.hardware_concurrency,
        caps.mobile_user_agent,
        if reduced { "reduced" } else { "full" }
    );

    let rng = config.seed.map(StdRng::seed_from_u64).unwrap_or_else(StdRng::from_entropy);
    let scene = WaterScene::new(&config, reduced, width, height, rng);

    let generation = GENERATION.with(|g| {
        let next = g.get().wrapping_add(1);
        g.set(next);
        next
    });

    let mut images = HashMap::new();
    let mut image_handlers = Vec::new();
    for kind in scene.fish_kinds().iter() {
        let img = HtmlImageElement::new()?;
        let onload = {
            let kind = kind.kind.clone();
            Closure::wrap(Box::new(move || {
                with_live(generation, |host| host.scene.mark_image_ready(&kind));
            }) as Box<dyn FnMut()>)
        };
        let onerror = {
            let kind = kind.kind.clone();
            Closure::wrap(Box::new(move || {
                with_live(generation, |host| host.scene.mark_image_failed(&kind));
            }) as Box<dyn FnMut()>)
        };
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        img.set_src(&kind.src);
        images.insert(kind.kind.clone(), img);
        image_handlers.push(onload);
        image_handlers.push(onerror);
    }

    let target: EventTarget = win.clone().into();
    let doc_target: EventTarget = doc.clone().into();
    let listeners = vec![
        listen(&target, "click", move |evt| {
            if let Some(m) = evt.dyn_ref::<MouseEvent>() {
                let (x, y) = (m.client_x() as f64, m.client_y() as f64);
                with_live(generation, |host| {
                    host.scene.notify_click(x, y);
                });
            }
        })?,
        listen(&target, "mousemove", move |evt| {
            if let Some(m) = evt.dyn_ref::<MouseEvent>() {
                let (x, y) = (m.client_x() as f64, m.client_y() as f64);
                with_live(generation, |host| host.scene.notify_pointer_move(x, y));
            }
        })?,
        listen(&target, "resize", move |_evt| {
            with_live(generation, SceneHost::resize);
        })?,
        // rAF stops while the tab is hidden; the first frame back only re-primes.
        listen(&doc_target, "visibilitychange", move |_evt| {
            with_live(generation, |host| host.clock.reset());
        })?,
    ];

    let host = SceneHost {
        generation,
        window: win,
        canvas,
        owns_canvas,
        ctx,
        scene,
        clock: FixedStep::default(),
        images,
        image_handlers,
        listeners,
        frame: Rc::new(RefCell::new(None)),
        frame_id: None,
    };
    let frame = host.frame.clone();
    SCENE_HOST.with(|cell| *cell.borrow_mut() = Some(host));
    start_loop(generation, frame);
    log::info!("water scene started (generation {generation})");
    Ok(())
}

/// Cancel the frame loop, detach listeners and remove the canvas (or blank
/// it, if it was already on the page). Safe to call repeatedly.
pub fn stop() {
    let Some(host) = SCENE_HOST.with(|cell| cell.borrow_mut().take()) else {
        return;
    };
    host.teardown();
}

fn start_loop(generation: u64, f: FrameCallback) {
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        SCENE_HOST.with(|cell| {
            let mut guard = cell.borrow_mut();
            let Some(host) = guard.as_mut().filter(|h| h.generation == generation) else {
                return;
            };
            host.frame(ts);
            host.frame_id = f
                .borrow()
                .as_ref()
                .and_then(|cb| host.window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
        });
    }) as Box<dyn FnMut(f64)>));

    with_live(generation, |host| {
        host.frame_id = g
            .borrow()
            .as_ref()
            .and_then(|cb| host.window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    });
}

fn with_live(generation: u64, f: impl FnOnce(&mut SceneHost)) {
    SCENE_HOST.with(|cell| {
        if let Some(host) = cell.borrow_mut().as_mut().filter(|h| h.generation == generation) {
            f(host);
        }
    });
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Listener> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok(Listener { target: target.clone(), event, closure })
}

fn viewport(win: &Window) -> (f64, f64) {
    let dim = |v: std::result::Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (dim(win.inner_width()), dim(win.inner_height()))
}

fn detect_capabilities(win: &Window) -> Capabilities {
    let prefers_reduced_motion = win
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|mq| mq.matches());
    let nav = win.navigator();
    Capabilities {
        prefers_reduced_motion,
        hardware_concurrency: nav.hardware_concurrency().max(0.0) as u32,
        mobile_user_agent: nav.user_agent().is_ok_and(|ua| is_mobile_user_agent(&ua)),
    }
}

impl SceneHost {
    fn frame(&mut self, now_ms: f64) {
        let steps = self.clock.advance(now_ms);
        for _ in 0..steps {
            self.scene.update(self.clock.interval());
        }
        for kind in self.scene.due_image_retries() {
            let src = self
                .scene
                .fish_kinds()
                .index_of(&kind)
                .and_then(|i| self.scene.fish_kinds().get(i))
                .map(|k| k.src.clone());
            if let (Some(img), Some(src)) = (self.images.get(&kind), src) {
                log::debug!("retrying fish image '{kind}'");
                img.set_src(&src);
            }
        }
        render::draw(&self.ctx, &self.scene, &self.images);
    }

    fn resize(&mut self) {
        let (width, height) = viewport(&self.window);
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.scene.notify_resize(width, height);
    }

    fn teardown(mut self) {
        if let Some(id) = self.frame_id {
            self.window.cancel_animation_frame(id).ok();
        }
        self.frame.borrow_mut().take();
        for l in &self.listeners {
            l.target
                .remove_event_listener_with_callback(l.event, l.closure.as_ref().unchecked_ref())
                .ok();
        }
        for img in self.images.values() {
            img.set_onload(None);
            img.set_onerror(None);
        }
        self.image_handlers.clear();
        if self.owns_canvas {
            self.canvas.remove();
        } else {
            let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
            self.ctx.clear_rect(0.0, 0.0, w, h);
        }
        log::info!("water scene stopped (generation {})", self.generation);
    }
}
