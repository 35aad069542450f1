use kurbo::{Cap, Join, Shape, Stroke, StrokeOpts};

use crate::{
    foundation::{
        color::StrokeColor,
        core::{Affine, Canvas, Point, Vec2},
        error::{DrawerzError, DrawerzResult},
    },
    render::{
        backend::FrameRGBA,
        composite::over_in_place,
        plan::{DrawOp, LayerPass, ScenePlan},
    },
};

/// Flattening tolerance for circles and stroke outlines, in world units.
const TOLERANCE: f64 = 0.1;

/// CPU raster backend powered by `vello_cpu`.
///
/// Strokes are expanded to fill outlines with `kurbo` and filled, so round joins and caps do not
/// depend on backend stroking support.
#[derive(Default)]
pub struct CpuRenderer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("has_ctx", &self.ctx.is_some())
            .finish()
    }
}

impl CpuRenderer {
    /// Renderer with no raster context yet; one is created on first render.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_ctx_mut<R>(
        &mut self,
        canvas: Canvas,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> DrawerzResult<R>,
    ) -> DrawerzResult<R> {
        let (width, height) = canvas_u16(canvas)?;
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    /// Rasterize a full frame: background, then every layer group bottom to top.
    pub fn render(&mut self, plan: &ScenePlan) -> DrawerzResult<FrameRGBA> {
        let canvas = plan.canvas;
        let (width, height) = canvas_u16(canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        self.with_ctx_mut(canvas, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(plan.background.to_vello(1.0));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(canvas.width),
                f64::from(canvas.height),
            ));
            for layer in &plan.layers {
                draw_layer(ctx, plan.transform, layer);
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;
        let frame = FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
        };
        frame.check_len()?;
        Ok(frame)
    }

    /// Draw one straight pen segment on top of an existing frame at layer `opacity`.
    ///
    /// Used for incremental live drawing; the next full render replaces it.
    #[allow(clippy::too_many_arguments)]
    pub fn render_stroke_segment(
        &mut self,
        frame: &mut FrameRGBA,
        transform: Affine,
        from: Point,
        to: Point,
        color: StrokeColor,
        width: f64,
        opacity: f32,
    ) -> DrawerzResult<()> {
        frame.check_len()?;
        let canvas = frame.canvas();
        let (w, h) = canvas_u16(canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.with_ctx_mut(canvas, |ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color.to_vello(1.0));
            let outline = polyline_outline(&[from, to], width, Vec2::ZERO);
            ctx.fill_path(&bezpath_to_cpu(&outline));
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        })?;
        over_in_place(&mut frame.data, pixmap.data_as_u8_slice(), opacity)
    }
}

fn draw_layer(ctx: &mut vello_cpu::RenderContext, transform: Affine, layer: &LayerPass) {
    let opacity = layer.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    let grouped = opacity < 1.0;
    if grouped {
        ctx.push_opacity_layer(opacity);
    }
    for op in &layer.ops {
        let (path, color) = match op {
            DrawOp::Disc {
                center,
                radius,
                color,
                offset,
            } => (
                kurbo::Circle::new(*center + *offset, radius.max(0.0)).to_path(TOLERANCE),
                *color,
            ),
            DrawOp::Polyline {
                points,
                width,
                color,
                offset,
            } => (polyline_outline(points, *width, *offset), *color),
        };
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(color.to_vello(1.0));
        ctx.fill_path(&bezpath_to_cpu(&path));
    }
    if grouped {
        ctx.pop_layer();
    }
}

/// Fill outline of a round-joined, round-capped polyline.
///
/// A polyline whose points all coincide has no direction to stroke along; its round caps still
/// cover a dot of diameter `width`.
fn polyline_outline(points: &[Point], width: f64, offset: Vec2) -> kurbo::BezPath {
    if let Some(&first) = points.first()
        && points.iter().all(|&p| p == first)
    {
        return kurbo::Circle::new(first + offset, width.max(0.0) / 2.0).to_path(TOLERANCE);
    }
    let mut path = kurbo::BezPath::new();
    let mut it = points.iter();
    if let Some(&first) = it.next() {
        path.move_to(first + offset);
        for &p in it {
            path.line_to(p + offset);
        }
    }
    let style = Stroke::new(width.max(0.0))
        .with_join(Join::Round)
        .with_caps(Cap::Round);
    kurbo::stroke(path, &style, &StrokeOpts::default(), TOLERANCE)
}

fn canvas_u16(canvas: Canvas) -> DrawerzResult<(u16, u16)> {
    let w = u16::try_from(canvas.width)
        .map_err(|_| DrawerzError::validation(format!("width {} exceeds u16", canvas.width)))?;
    let h = u16::try_from(canvas.height)
        .map_err(|_| DrawerzError::validation(format!("height {} exceeds u16", canvas.height)))?;
    if w == 0 || h == 0 {
        return Err(DrawerzError::validation("canvas width/height must be non-zero"));
    }
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
