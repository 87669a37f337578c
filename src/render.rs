//! Canvas2D render pass.
//!
//! Reads the scene and paints it back-to-front. Every drawing call that can
//! fail is `.ok()`-ed where it is made, so one bad entity never aborts a frame.

use std::collections::HashMap;
use std::f64::consts::TAU;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::geom::{Segment, Vec2};
use crate::scene::{
    BackgroundFeature, Coral, CoralShape, Fish, Plant, TrailKind, WaterScene,
};

/// Vertical drift of background rock per percent of water level away from 50 %.
const PARALLAX_PX_PER_PCT: f64 = 0.8;

const PLANT_COLORS: [&str; 3] = ["#2f7d4a", "#3a8f3f", "#4c9a5e"];
const CORAL_COLORS: [&str; 4] = ["#e0785c", "#d45d8c", "#f2a65a", "#b676d6"];

pub fn draw(ctx: &CanvasRenderingContext2d, scene: &WaterScene, images: &HashMap<String, HtmlImageElement>) {
    let (w, h) = (scene.width(), scene.height());
    ctx.set_global_alpha(1.0);
    ctx.clear_rect(0.0, 0.0, w, h);

    let shift = (50.0 - scene.water_level_pct()) * PARALLAX_PX_PER_PCT;
    for feature in &scene.decorations().features {
        draw_feature(ctx, feature, shift);
    }
    draw_water(ctx, scene);
    for coral in &scene.decorations().corals {
        draw_coral(ctx, coral);
    }
    for plant in &scene.decorations().plants {
        draw_plant(ctx, plant);
    }
    for fish in scene.fish() {
        let Some(kind) = scene.fish_kinds().get(fish.kind) else { continue };
        if !scene.fish_kinds().is_ready(fish.kind) {
            continue;
        }
        if let Some(img) = images.get(&kind.kind) {
            draw_fish(ctx, fish, img);
        }
    }
    draw_particles(ctx, scene);
    ctx.set_global_alpha(1.0);
}

fn draw_feature(ctx: &CanvasRenderingContext2d, f: &BackgroundFeature, shift: f64) {
    let o = f.origin + Vec2::new(0.0, shift * f.parallax);
    ctx.set_fill_style_str("rgba(40,58,72,0.55)");
    ctx.begin_path();
    ctx.move_to(o.x + f.start.x, o.y + f.start.y);
    for c in &f.outline {
        ctx.bezier_curve_to(o.x + c.c1.x, o.y + c.c1.y, o.x + c.c2.x, o.y + c.c2.y, o.x + c.to.x, o.y + c.to.y);
    }
    ctx.close_path();
    ctx.fill();
    if let Some(cave) = f.cave {
        ctx.set_fill_style_str("rgba(8,16,24,0.6)");
        ctx.begin_path();
        ctx.ellipse(o.x + cave.center.x, o.y + cave.center.y, cave.rx, cave.ry, 0.0, 0.0, TAU).ok();
        ctx.fill();
    }
}

fn draw_water(ctx: &CanvasRenderingContext2d, scene: &WaterScene) {
    let (w, h) = (scene.width(), scene.height());
    let wave = scene.wave();
    let top = wave.crest();

    let gradient = ctx.create_linear_gradient(0.0, top, 0.0, h);
    gradient.add_color_stop(0.0, "rgba(64,164,223,0.55)").ok();
    gradient.add_color_stop(1.0, "rgba(10,48,92,0.8)").ok();
    ctx.set_fill_style_canvas_gradient(&gradient);

    if scene.reduced() {
        ctx.fill_rect(0.0, wave.base(), w, h - wave.base());
        return;
    }
    let points = wave.points();
    let Some(first) = points.first() else { return };
    ctx.begin_path();
    ctx.move_to(0.0, h);
    ctx.line_to(first.x, first.y);
    for p in &points[1..] {
        ctx.line_to(p.x, p.y);
    }
    ctx.line_to(w, h);
    ctx.close_path();
    ctx.fill();

    ctx.set_stroke_style_str("rgba(255,255,255,0.35)");
    ctx.set_line_width(1.5);
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in &points[1..] {
        ctx.line_to(p.x, p.y);
    }
    ctx.stroke();
}

fn draw_segments(ctx: &CanvasRenderingContext2d, segments: &[Segment]) {
    for s in segments {
        ctx.set_line_width(s.width.max(0.5));
        ctx.begin_path();
        ctx.move_to(s.from.x, s.from.y);
        ctx.line_to(s.to.x, s.to.y);
        ctx.stroke();
    }
}

fn draw_plant(ctx: &CanvasRenderingContext2d, p: &Plant) {
    ctx.save();
    ctx.translate(p.origin.x, p.origin.y).ok();
    ctx.rotate(p.sway.angle(p.nibble)).ok();
    ctx.set_line_cap("round");
    ctx.set_stroke_style_str(PLANT_COLORS[p.tint as usize % PLANT_COLORS.len()]);
    draw_segments(ctx, &p.segments);
    ctx.restore();
}

fn draw_coral(ctx: &CanvasRenderingContext2d, c: &Coral) {
    let color = CORAL_COLORS[c.tint as usize % CORAL_COLORS.len()];
    ctx.save();
    ctx.translate(c.origin.x, c.origin.y).ok();
    ctx.rotate(c.sway.angle(c.nibble)).ok();
    match &c.shape {
        CoralShape::Branches(segments) => {
            ctx.set_line_cap("round");
            ctx.set_stroke_style_str(color);
            draw_segments(ctx, segments);
        }
        CoralShape::Blob(outline) => {
            if let Some(first) = outline.first() {
                // brain coral sits on the floor, outline is centred on the origin
                let lift = -c.size * 0.35;
                ctx.set_fill_style_str(color);
                ctx.begin_path();
                ctx.move_to(first.x, first.y + lift);
                for p in &outline[1..] {
                    ctx.line_to(p.x, p.y + lift);
                }
                ctx.close_path();
                ctx.fill();

                ctx.set_stroke_style_str("rgba(0,0,0,0.18)");
                ctx.set_line_width(1.0);
                ctx.begin_path();
                for p in outline.iter().step_by(2) {
                    ctx.move_to(0.0, lift);
                    ctx.line_to(p.x * 0.8, p.y * 0.8 + lift);
                }
                ctx.stroke();
            }
        }
    }
    ctx.restore();
}

fn draw_fish(ctx: &CanvasRenderingContext2d, f: &Fish, img: &HtmlImageElement) {
    let (hw, hh) = (f.half_width(), f.half_height());
    ctx.save();
    ctx.set_global_alpha(f.opacity.clamp(0.0, 1.0));
    ctx.translate(f.pos.x, f.pos.y).ok();
    if f.mirrored() {
        ctx.scale(-1.0, 1.0).ok();
    }
    ctx.rotate(f.wiggle()).ok();
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, -hw, -hh, hw * 2.0, hh * 2.0)
        .ok();
    ctx.restore();
}

fn draw_particles(ctx: &CanvasRenderingContext2d, scene: &WaterScene) {
    ctx.set_stroke_style_str("rgba(255,255,255,0.9)");
    ctx.set_line_width(1.0);
    for b in scene.bubbles() {
        ctx.set_global_alpha(b.opacity);
        ctx.begin_path();
        ctx.arc(b.pos.x, b.pos.y, b.size, 0.0, TAU).ok();
        ctx.stroke();
    }

    for t in scene.trail() {
        ctx.set_global_alpha(t.opacity);
        ctx.set_fill_style_str(match t.kind {
            TrailKind::Cursor => "#cfeeff",
            TrailKind::Splash { .. } => "#e8f7ff",
        });
        ctx.begin_path();
        ctx.arc(t.pos.x, t.pos.y, t.size, 0.0, TAU).ok();
        ctx.fill();
    }

    ctx.set_stroke_style_str("#b8d8f0");
    for d in scene.drops() {
        ctx.set_global_alpha(d.opacity);
        ctx.begin_path();
        ctx.move_to(d.pos.x, d.pos.y - d.length);
        ctx.line_to(d.pos.x, d.pos.y);
        ctx.stroke();
    }
}
