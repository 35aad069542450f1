use crate::{
    foundation::{
        color::StrokeColor,
        core::{Affine, Canvas, Point, Vec2},
        math::displace_along_normal,
    },
    model::{
        document::Document,
        layer::{AnimationSettings, Layer},
        stroke::Stroke,
    },
    render::shake::ShakeSource,
};

/// Backend-agnostic draw list for a single frame.
///
/// Coordinates stay in world space; `transform` maps them onto the output canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenePlan {
    /// Output size.
    pub canvas: Canvas,
    /// World to output mapping.
    pub transform: Affine,
    /// Opaque fill drawn before any layer.
    pub background: StrokeColor,
    /// Contributing layers, bottom to top.
    pub layers: Vec<LayerPass>,
}

/// One layer's strokes composited as a group at `opacity`.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerPass {
    /// Group alpha applied when compositing the layer.
    pub opacity: f32,
    /// Strokes in paint order.
    pub ops: Vec<DrawOp>,
}

/// A single stroke, already animated for the frame's time.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Filled circle for single-point strokes.
    Disc {
        /// Disc center.
        center: Point,
        /// Disc radius.
        radius: f64,
        /// Stroke color.
        color: StrokeColor,
        /// Animation offset applied when drawing.
        offset: Vec2,
    },
    /// Round-joined, round-capped polyline.
    Polyline {
        /// Polyline vertices.
        points: Vec<Point>,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: StrokeColor,
        /// Animation offset applied when drawing.
        offset: Vec2,
    },
}

impl DrawOp {
    /// Shake offset applied to the op.
    pub fn offset(&self) -> Vec2 {
        match self {
            DrawOp::Disc { offset, .. } | DrawOp::Polyline { offset, .. } => *offset,
        }
    }

    /// Whether this op is a single-point dot.
    pub fn is_disc(&self) -> bool {
        matches!(self, DrawOp::Disc { .. })
    }
}

impl ScenePlan {
    /// Draw ops across all layers.
    pub fn op_count(&self) -> usize {
        self.layers.iter().map(|l| l.ops.len()).sum()
    }
}

/// Width of a stroke at `t` after breathing, floored at 1 while breathing is active.
pub fn breathing_width(stroke: &Stroke, anim: &AnimationSettings, t: f64) -> f64 {
    if anim.breathing_stroke > 0.0 {
        let w = stroke.original_size
            + (t * 0.1 * anim.animation_speed + stroke.birth_time).sin() * anim.breathing_stroke;
        w.max(1.0)
    } else {
        stroke.original_size
    }
}

/// Wiggled copy of the stroke's points. Point 0 never moves and each displacement direction uses
/// the unmodified previous point.
pub fn wiggle_points(stroke: &Stroke, anim: &AnimationSettings, t: f64) -> Vec<Point> {
    let amp = anim.wiggle_intensity;
    if amp <= 0.0 {
        return stroke.points.clone();
    }
    let phase = t * 0.1 * anim.animation_speed + stroke.birth_time * 0.01;
    stroke
        .points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if i == 0 {
                return p;
            }
            let prev = stroke.points[i - 1];
            let amount = (phase + i as f64 * 0.5).sin() * amp;
            displace_along_normal(prev, p, amount)
        })
        .collect()
}

fn shake_offset(anim: &AnimationSettings, shake: &mut dyn ShakeSource) -> Vec2 {
    if anim.shake_intensity > 0.0 {
        let scale = anim.shake_intensity * anim.animation_speed;
        let dx = (shake.next_unit() - 0.5) * scale;
        let dy = (shake.next_unit() - 0.5) * scale;
        Vec2::new(dx, dy)
    } else {
        Vec2::ZERO
    }
}

pub(crate) fn stroke_op(
    stroke: &Stroke,
    anim: &AnimationSettings,
    t: f64,
    shake: &mut dyn ShakeSource,
) -> Option<DrawOp> {
    if stroke.points.is_empty() {
        return None;
    }
    let offset = shake_offset(anim, shake);
    let width = breathing_width(stroke, anim, t);
    if stroke.is_dot() {
        return Some(DrawOp::Disc {
            center: stroke.points[0],
            radius: width / 2.0,
            color: stroke.color,
            offset,
        });
    }
    Some(DrawOp::Polyline {
        points: wiggle_points(stroke, anim, t),
        width,
        color: stroke.color,
        offset,
    })
}

fn layer_pass(layer: &Layer, t: f64, shake: &mut dyn ShakeSource) -> LayerPass {
    let anim = &layer.animation_settings;
    LayerPass {
        opacity: layer.opacity,
        ops: layer
            .strokes
            .iter()
            .filter_map(|s| stroke_op(s, anim, t, shake))
            .collect(),
    }
}

/// Evaluate every animation effect at `render_time` and produce the frame's draw list.
///
/// Hidden and empty layers are skipped without consuming shake samples.
#[tracing::instrument(skip(doc, shake), fields(layers = doc.layers.len()))]
pub fn build_scene_plan(
    doc: &Document,
    render_time: f64,
    canvas: Canvas,
    shake: &mut dyn ShakeSource,
) -> ScenePlan {
    let layers = doc
        .layers
        .iter()
        .filter(|l| l.contributes())
        .map(|l| layer_pass(l, render_time, shake))
        .collect();
    ScenePlan {
        canvas,
        transform: canvas.world_to_canvas(),
        background: StrokeColor::WHITE,
        layers,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
