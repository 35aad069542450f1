//! Scene rendering.
//!
//! Rendering is split in two steps: [`plan::build_scene_plan`] evaluates every animation effect
//! for one instant and produces a [`plan::ScenePlan`], then [`cpu::CpuRenderer`] rasterizes it.

/// Presentation surface and frame buffers.
pub mod backend;
pub(crate) mod composite;
/// CPU raster backend.
pub mod cpu;
/// Live animation clock.
pub mod live;
/// Backend-agnostic per-frame draw lists.
pub mod plan;
/// Randomness for the shake effect.
pub mod shake;

use crate::{
    foundation::{core::Canvas, error::DrawerzResult},
    model::document::Document,
    render::{backend::FrameRGBA, cpu::CpuRenderer, shake::ShakeSource},
};

/// Build and rasterize one frame.
pub fn render_document(
    renderer: &mut CpuRenderer,
    doc: &Document,
    render_time: f64,
    canvas: Canvas,
    shake: &mut dyn ShakeSource,
) -> DrawerzResult<FrameRGBA> {
    let plan = plan::build_scene_plan(doc, render_time, canvas, shake);
    renderer.render(&plan)
}
