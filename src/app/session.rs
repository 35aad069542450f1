use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::{
    encode::{ffmpeg::EncoderEngine, gif::GifSink, sink::FrameSink},
    export::{ExportFormat, ExportJob, ExportOutcome, ExportParams, run_export},
    foundation::{
        color::StrokeColor,
        config::EngineConfig,
        core::Canvas,
        error::{DrawerzError, DrawerzResult},
    },
    history::{History, Snapshot},
    host::{Downloader, Notifier},
    import::svg::import_svg,
    interact::controller::{
        ControllerEffect, InteractionController, PointerCapture, PointerSample, ToolState,
    },
    io::{
        files::{ImportKind, classify_import, sketch_file_name},
        sketch,
    },
    model::{
        document::{Document, LayerMove, LayerOpError},
        ids::LayerId,
        layer::AnimParam,
        stroke::Tool,
    },
    render::{
        backend::{FrameRGBA, RenderSurface},
        cpu::CpuRenderer,
        live::LiveAnimation,
        render_document,
        shake::{Rng64, ShakeSource},
    },
};

/// The editor: sole owner of the document, its history and every piece of live state.
///
/// Intent methods take a history snapshot before mutating, ask the [`Notifier`] before destructive
/// actions and report refusals and failures through it as well as through the returned error.
pub struct Session<N, D> {
    config: EngineConfig,
    doc: Document,
    history: History,
    tools: ToolState,
    controller: InteractionController,
    renderer: CpuRenderer,
    surface: RenderSurface,
    live: LiveAnimation,
    shake: Box<dyn ShakeSource>,
    encoder: EncoderEngine,
    notifier: N,
    downloader: D,
}

impl<N: Notifier, D: Downloader> Session<N, D> {
    /// Fresh document with one layer; the live clock starts running.
    pub fn new(config: EngineConfig, notifier: N, downloader: D) -> DrawerzResult<Self> {
        config.validate()?;
        let mut live = LiveAnimation::new();
        live.start();
        Ok(Self {
            doc: Document::new(config.animation_defaults),
            history: History::new(config.history_depth),
            tools: ToolState {
                tool: Tool::Pen,
                size: config.tool.size,
                color: config.tool.color,
            },
            controller: InteractionController::new(),
            renderer: CpuRenderer::new(),
            surface: RenderSurface::new(config.world),
            live,
            shake: Box::new(Rng64::from_entropy()),
            encoder: EncoderEngine::new(config.ffmpeg_bin.clone()),
            config,
            notifier,
            downloader,
        })
    }

    /// Replace the shake randomness, e.g. with a seeded generator.
    pub fn with_shake(mut self, shake: impl ShakeSource + 'static) -> Self {
        self.shake = Box::new(shake);
        self
    }

    /// Active engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The document being edited.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Undo/redo state.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current tool, size and color.
    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    /// Live animation clock.
    pub fn live(&self) -> &LiveAnimation {
        &self.live
    }

    /// Host notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Mutable access to the host notifier.
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Host downloader.
    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    /// MP4 encoder gate and load state.
    pub fn encoder(&self) -> &EncoderEngine {
        &self.encoder
    }

    /// Last presented frame, if any.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.surface.frame()
    }

    /// Size of the presentation surface.
    pub fn surface_canvas(&self) -> Canvas {
        self.surface.canvas()
    }

    /// Alert with `title` (or the error's own title) and hand the error back.
    fn report<T>(&mut self, title: Option<&str>, res: DrawerzResult<T>) -> DrawerzResult<T> {
        if let Err(e) = &res {
            let title = title.unwrap_or_else(|| e.title());
            let message = match e {
                DrawerzError::Precondition(m)
                | DrawerzError::Parse(m)
                | DrawerzError::Environment(m)
                | DrawerzError::Unsupported(m)
                | DrawerzError::Validation(m) => m.clone(),
                other => other.to_string(),
            };
            self.notifier.alert(title, &message);
        }
        res
    }

    /// Apply `f`; when it reports a change, the pre-change state becomes an undo step.
    fn undoable<T>(
        &mut self,
        f: impl FnOnce(&mut Document) -> Result<(T, bool), LayerOpError>,
    ) -> DrawerzResult<T> {
        let before = Snapshot::capture(&self.doc);
        let res = f(&mut self.doc)
            .map(|(out, changed)| {
                if changed {
                    self.history.record(before);
                }
                out
            })
            .map_err(DrawerzError::from);
        self.report(None, res)
    }

    /// Re-render the whole scene at the live clock onto the surface.
    pub fn render_live(&mut self) -> DrawerzResult<()> {
        let frame = render_document(
            &mut self.renderer,
            &self.doc,
            self.live.time(),
            self.surface.canvas(),
            &mut *self.shake,
        )?;
        self.surface.present(frame)
    }

    /// Advance the live clock one tick; renders when the loop is running.
    pub fn tick(&mut self) -> DrawerzResult<bool> {
        if !self.live.tick() {
            return Ok(false);
        }
        self.render_live()?;
        Ok(true)
    }

    /// Resume the live clock.
    pub fn start_live(&mut self) {
        self.live.start();
    }

    /// Pause the live clock; the current frame stays presented.
    pub fn stop_live(&mut self) {
        self.live.stop();
    }

    /// Resize the presentation surface and redraw at the new size.
    pub fn resize_surface(&mut self, canvas: Canvas) -> DrawerzResult<()> {
        canvas.validate()?;
        self.surface.resize(canvas);
        self.render_live()
    }

    fn apply_effect(&mut self, effect: ControllerEffect) -> DrawerzResult<()> {
        match effect {
            ControllerEffect::Segment {
                from,
                to,
                color,
                width,
                opacity,
            } => {
                let transform = self.surface.canvas().world_to_canvas();
                match self.surface.frame_mut() {
                    Some(frame) => self.renderer.render_stroke_segment(
                        frame, transform, from, to, color, width, opacity,
                    ),
                    None => self.render_live(),
                }
            }
            ControllerEffect::Redraw => self.render_live(),
        }
    }

    /// Switch between pen and eraser.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.tool = tool;
    }

    /// Pen width and eraser diameter, in world units.
    pub fn set_stroke_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.tools.size = size;
        }
    }

    /// Color for new pen strokes and imported shapes without one.
    pub fn set_stroke_color(&mut self, color: StrokeColor) {
        self.tools.color = color;
    }

    /// Returns `false` when the sample was ignored.
    pub fn pointer_down(
        &mut self,
        sample: &PointerSample,
        capture: &mut dyn PointerCapture,
    ) -> DrawerzResult<bool> {
        let started = self.controller.pointer_down(
            &mut self.doc,
            &mut self.history,
            sample,
            &self.tools,
            self.live.time(),
            capture,
        );
        if started && self.tools.tool == Tool::Pen {
            // The new stroke is a dot until the first move.
            self.render_live()?;
        }
        Ok(started)
    }

    /// Feed coalesced move samples to the active gesture.
    pub fn pointer_move(&mut self, samples: &[PointerSample]) -> DrawerzResult<()> {
        let effects = self
            .controller
            .pointer_move(&mut self.doc, samples, &self.tools);
        for effect in effects {
            self.apply_effect(effect)?;
        }
        Ok(())
    }

    /// Finish the active gesture.
    pub fn pointer_up(
        &mut self,
        sample: &PointerSample,
        capture: &mut dyn PointerCapture,
    ) -> DrawerzResult<()> {
        match self.controller.pointer_up(sample, capture) {
            Some(effect) => self.apply_effect(effect),
            None => Ok(()),
        }
    }

    /// Same as [`Self::pointer_up`].
    pub fn pointer_leave(
        &mut self,
        sample: &PointerSample,
        capture: &mut dyn PointerCapture,
    ) -> DrawerzResult<()> {
        self.pointer_up(sample, capture)
    }

    /// Same as [`Self::pointer_up`].
    pub fn pointer_cancel(
        &mut self,
        sample: &PointerSample,
        capture: &mut dyn PointerCapture,
    ) -> DrawerzResult<()> {
        self.pointer_up(sample, capture)
    }

    /// Add a layer above the active one and activate it.
    pub fn add_layer(&mut self) -> LayerId {
        self.history.record_document(&self.doc);
        let id = self.doc.create_layer(self.config.animation_defaults);
        tracing::debug!(layer = %id, "layer added");
        id
    }

    /// Selection changes are not undo steps.
    pub fn set_active_layer(&mut self, id: &LayerId) -> DrawerzResult<()> {
        let res = self.doc.set_active_layer(id).map_err(DrawerzError::from);
        self.report(None, res)
    }

    /// Delete after confirmation. Returns `false` when the user declined.
    pub fn delete_layer(&mut self, id: &LayerId) -> DrawerzResult<bool> {
        if self.doc.layers.len() <= 1 {
            let res: DrawerzResult<bool> =
                Err(DrawerzError::precondition("Cannot delete the last layer."));
            return self.report(Some("Action Denied"), res);
        }
        let Some(name) = self.doc.layer(id).map(|l| l.name.clone()) else {
            let res: DrawerzResult<bool> = Err(LayerOpError::UnknownLayer(id.clone()).into());
            return self.report(None, res);
        };
        if !self
            .notifier
            .confirm("Confirm Deletion", &format!("Delete layer \"{name}\"?"))
        {
            return Ok(false);
        }
        self.undoable(|doc| doc.delete_layer(id).map(|_| ((), true)))?;
        self.render_live()?;
        Ok(true)
    }

    /// Returns `false` at the stack boundary.
    pub fn move_layer(&mut self, id: &LayerId, dir: LayerMove) -> DrawerzResult<bool> {
        let moved = self.undoable(|doc| doc.move_layer(id, dir).map(|m| (m, m)))?;
        if moved {
            self.render_live()?;
        }
        Ok(moved)
    }

    /// Rename a layer; a blank name falls back to its position.
    pub fn rename_layer(&mut self, id: &LayerId, name: &str) -> DrawerzResult<()> {
        self.undoable(|doc| {
            let old = doc
                .layer(id)
                .map(|l| l.name.clone())
                .ok_or_else(|| LayerOpError::UnknownLayer(id.clone()))?;
            doc.rename_layer(id, name)?;
            let changed = doc.layer(id).is_some_and(|l| l.name != old);
            Ok(((), changed))
        })
    }

    /// Returns the new visibility.
    pub fn toggle_visibility(&mut self, id: &LayerId) -> DrawerzResult<bool> {
        let visible = self.undoable(|doc| doc.toggle_visibility(id).map(|v| (v, true)))?;
        self.render_live()?;
        Ok(visible)
    }

    /// Set layer opacity from a percentage.
    pub fn set_opacity_percent(&mut self, id: &LayerId, percent: f64) -> DrawerzResult<()> {
        self.undoable(|doc| doc.set_opacity_percent(id, percent).map(|()| ((), true)))?;
        self.render_live()
    }

    /// Change one animation parameter of a layer.
    pub fn set_animation_param(
        &mut self,
        id: &LayerId,
        param: AnimParam,
        value: f64,
    ) -> DrawerzResult<()> {
        self.undoable(|doc| {
            doc.set_animation_param(id, param, value)
                .map(|()| ((), true))
        })
    }

    /// Clear the active layer after confirmation.
    pub fn clear_active_layer(&mut self) -> DrawerzResult<bool> {
        let Some(layer) = self.doc.active_layer() else {
            let res: DrawerzResult<bool> = Err(LayerOpError::NoActiveLayer.into());
            return self.report(Some("Clear Layer"), res);
        };
        if layer.is_empty() {
            let res: DrawerzResult<bool> =
                Err(DrawerzError::precondition("Active layer is already empty."));
            return self.report(Some("Clear Layer"), res);
        }
        let (id, name) = (layer.id.clone(), layer.name.clone());
        if !self.notifier.confirm(
            "Confirm Clear Layer",
            &format!("Clear all strokes from layer \"{name}\"?"),
        ) {
            return Ok(false);
        }
        self.undoable(|doc| doc.clear_layer(&id).map(|_| ((), true)))?;
        self.render_live()?;
        Ok(true)
    }

    /// Clear every layer after confirmation.
    pub fn clear_all_layers(&mut self) -> DrawerzResult<bool> {
        if self.doc.is_empty() {
            let res: DrawerzResult<bool> =
                Err(DrawerzError::precondition("All layers are already empty."));
            return self.report(Some("Clear All Layers"), res);
        }
        if !self
            .notifier
            .confirm("Confirm Clear All", "Clear strokes from ALL layers?")
        {
            return Ok(false);
        }
        self.undoable(|doc| Ok(((), doc.clear_all_layers() > 0)))?;
        self.render_live()?;
        Ok(true)
    }

    /// Restore the previous snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> DrawerzResult<bool> {
        if !self.history.undo_document(&mut self.doc) {
            return Ok(false);
        }
        self.render_live()?;
        Ok(true)
    }

    /// Reapply the last undone snapshot.
    pub fn redo(&mut self) -> DrawerzResult<bool> {
        if !self.history.redo_document(&mut self.doc) {
            return Ok(false);
        }
        self.render_live()?;
        Ok(true)
    }

    /// Serialize the document and hand it to the downloader.
    pub fn save(&mut self, now: OffsetDateTime) -> DrawerzResult<Option<PathBuf>> {
        let res = (|| -> DrawerzResult<Option<PathBuf>> {
            let json = sketch::to_json(&self.doc)?;
            let name = sketch_file_name(now)?;
            self.downloader.deliver(&name, json.into_bytes())
        })();
        let path = self.report(Some("Save Sketch"), res)?;
        self.notifier
            .alert("Save Sketch", "Sketch saved as .drz file!");
        Ok(path)
    }

    /// Replace the document with a `.drz` sketch as one undo step.
    pub fn load_sketch(&mut self, json: &str) -> DrawerzResult<()> {
        let res = sketch::load_into(
            &mut self.doc,
            &mut self.history,
            json,
            self.config.animation_defaults,
        );
        self.report(Some("Load Error"), res)?;
        self.render_live()?;
        self.notifier.alert("Load Sketch", "Sketch loaded!");
        Ok(())
    }

    /// Append the shapes of `markup` to the active layer. Returns the number of strokes added.
    pub fn import_svg(&mut self, markup: &str) -> DrawerzResult<usize> {
        if self.doc.active_layer().is_none() {
            let res: DrawerzResult<usize> = Err(DrawerzError::precondition(
                "No active layer to import SVG content into. Please add or select a layer.",
            ));
            return self.report(Some("SVG Import Error"), res);
        }
        let res = import_svg(
            &mut self.doc,
            &mut self.history,
            markup,
            self.tools.color,
            self.tools.size,
            self.live.time(),
        );
        let n = self.report(Some("SVG Import Error"), res)?;
        self.render_live()?;
        self.notifier
            .alert("SVG Import", "SVG content imported to active layer.");
        Ok(n)
    }

    /// Route a file by extension to the sketch loader or the SVG importer.
    pub fn open_file(&mut self, path: &Path) -> DrawerzResult<ImportKind> {
        let kind = self.report(None, classify_import(path))?;
        let text = std::fs::read_to_string(path).map_err(|e| {
            DrawerzError::parse(format!("Error reading file '{}'. {e}", path.display()))
        });
        let text = self.report(Some("Load Error"), text)?;
        match kind {
            ImportKind::Sketch => self.load_sketch(&text)?,
            ImportKind::Svg => {
                self.import_svg(&text)?;
            }
        }
        Ok(kind)
    }

    /// Speed applied to the export clock: the active layer's animation speed.
    pub fn global_speed(&self) -> f64 {
        self.doc
            .active_layer()
            .map_or(self.config.animation_defaults.animation_speed, |l| {
                l.animation_settings.animation_speed
            })
    }

    /// Render and encode the animation, then deliver it.
    pub fn export(
        &mut self,
        format: ExportFormat,
        now: OffsetDateTime,
    ) -> DrawerzResult<ExportOutcome> {
        if !self.doc.has_visible_content() {
            let res: DrawerzResult<ExportOutcome> =
                Err(DrawerzError::precondition("No visible content to export."));
            return self.report(Some("Export Error"), res);
        }
        let mut sink: Box<dyn FrameSink> = match format {
            ExportFormat::Mp4 => {
                let gate = self
                    .encoder
                    .check_capability()
                    .and_then(|()| self.encoder.ensure_loaded());
                self.report(None, gate)?;
                Box::new(self.encoder.sink())
            }
            ExportFormat::Gif => Box::new(GifSink::new()),
        };
        let params = ExportParams::for_format(
            &self.config,
            format,
            self.global_speed(),
            self.live.time(),
        );
        let params = self.report(Some("Export Error"), params)?;
        self.export_with(&mut *sink, &params, now)
    }

    /// Run an export into a caller-provided sink.
    pub fn export_with(
        &mut self,
        sink: &mut dyn FrameSink,
        params: &ExportParams,
        now: OffsetDateTime,
    ) -> DrawerzResult<ExportOutcome> {
        let job = ExportJob {
            doc: &self.doc,
            renderer: &mut self.renderer,
            surface: &mut self.surface,
            live: &mut self.live,
            shake: &mut *self.shake,
        };
        let res = run_export(
            job,
            params,
            sink,
            &mut self.downloader,
            &mut self.notifier,
            now,
        );
        // The surface was resized back and holds no frame until redrawn.
        let redraw = self.render_live();
        let out = self.report(None, res)?;
        redraw?;
        let kind = sink.extension().to_ascii_uppercase();
        self.notifier
            .alert("Export Complete", &format!("Animation exported as {kind}!"));
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/session.rs"]
mod tests;
