use time::OffsetDateTime;

use crate::{
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        config::EngineConfig,
        core::{Canvas, Fps, FrameIndex},
        error::{DrawerzError, DrawerzResult},
    },
    host::{Downloader, Notifier},
    io::files::animation_file_name,
    model::document::Document,
    render::{
        backend::RenderSurface, cpu::CpuRenderer, live::LiveAnimation, render_document,
        shake::ShakeSource,
    },
};

/// Animation output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// H.264 video through `ffmpeg`.
    Mp4,
    /// Looping animated GIF.
    Gif,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "mp4",
            ExportFormat::Gif => "gif",
        }
    }

    /// Frame rate configured for this format.
    pub fn fps(self, cfg: &EngineConfig) -> DrawerzResult<Fps> {
        match self {
            ExportFormat::Mp4 => Fps::whole(cfg.mp4_fps),
            ExportFormat::Gif => Fps::whole(cfg.gif_fps),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = DrawerzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(ExportFormat::Mp4),
            "gif" => Ok(ExportFormat::Gif),
            other => Err(DrawerzError::validation(format!(
                "unknown export format \"{other}\" (expected mp4 or gif)"
            ))),
        }
    }
}

/// Frame schedule of one export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportParams {
    /// Output size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Number of frames to render.
    pub frame_count: u64,
    /// Live clock value of frame 0.
    pub start_time: f64,
    /// Live-clock ticks between consecutive frames.
    pub time_step: f64,
    /// Global animation speed the step was derived from.
    pub speed: f64,
}

impl ExportParams {
    /// `time_step = speed * live_ticks_per_second / fps`, so the export plays at the same pace as
    /// the live preview.
    pub fn new(
        canvas: Canvas,
        fps: Fps,
        duration_secs: u32,
        live_ticks_per_second: u32,
        speed: f64,
        start_time: f64,
    ) -> Self {
        Self {
            canvas,
            fps,
            frame_count: fps.secs_to_frames_floor(f64::from(duration_secs)),
            start_time,
            time_step: speed * f64::from(live_ticks_per_second) / fps.as_f64(),
            speed,
        }
    }

    /// Schedule for `format` using the configured size, rate and duration.
    pub fn for_format(
        cfg: &EngineConfig,
        format: ExportFormat,
        speed: f64,
        start_time: f64,
    ) -> DrawerzResult<Self> {
        Ok(Self::new(
            cfg.export,
            format.fps(cfg)?,
            cfg.export_duration_secs,
            cfg.live_ticks_per_second,
            speed,
            start_time,
        ))
    }

    /// Render time of frame `i`.
    pub fn time_at(&self, i: u64) -> f64 {
        self.start_time + i as f64 * self.time_step
    }
}

/// Live state an export borrows for its duration.
pub struct ExportJob<'a> {
    /// Document to render.
    pub doc: &'a Document,
    /// Renderer reused for every frame.
    pub renderer: &'a mut CpuRenderer,
    /// Presentation surface; resized for the export and restored after.
    pub surface: &'a mut RenderSurface,
    /// Live clock; stopped during the export and restored after.
    pub live: &'a mut LiveAnimation,
    /// Randomness for shaken layers.
    pub shake: &'a mut dyn ShakeSource,
}

/// Result of a successful export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOutcome {
    /// Timestamped name the file was delivered under.
    pub file_name: String,
    /// Frames rendered.
    pub frames: u64,
    /// Encoded size in bytes.
    pub bytes: usize,
    /// Where the downloader put the file, if on disk.
    pub path: Option<std::path::PathBuf>,
}

/// Puts the surface size and the live clock back when dropped.
struct Restore<'a> {
    surface: &'a mut RenderSurface,
    live: &'a mut LiveAnimation,
    canvas: Canvas,
    time: f64,
    was_running: bool,
}

impl<'a> Restore<'a> {
    fn suspend(surface: &'a mut RenderSurface, live: &'a mut LiveAnimation) -> Self {
        let guard = Self {
            canvas: surface.canvas(),
            time: live.time(),
            was_running: live.is_running(),
            surface,
            live,
        };
        guard.live.stop();
        guard
    }
}

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        self.surface.resize(self.canvas);
        self.live.set_time(self.time);
        if self.was_running {
            self.live.start();
        }
        tracing::debug!(time = self.time, resumed = self.was_running, "live state restored");
    }
}

/// Attach a frame number to an error raised while producing that frame.
fn at_frame(i: u64, err: DrawerzError) -> DrawerzError {
    match err {
        DrawerzError::Export {
            frame: None,
            message,
        } => DrawerzError::export(Some(i), message),
        e @ DrawerzError::Export { .. } => e,
        other => DrawerzError::export(Some(i), other.to_string()),
    }
}

/// Render every frame of `params` into `sink` and deliver the encoded file.
///
/// The live loop is suspended and the surface resized to the export canvas for the duration;
/// both are restored before returning, whether the export succeeded or not. `sink.cleanup()` is
/// always called.
#[tracing::instrument(skip_all, fields(frames = params.frame_count, ext = sink.extension()))]
pub fn run_export(
    job: ExportJob<'_>,
    params: &ExportParams,
    sink: &mut dyn FrameSink,
    downloader: &mut dyn Downloader,
    notifier: &mut dyn Notifier,
    now: OffsetDateTime,
) -> DrawerzResult<ExportOutcome> {
    let ExportJob {
        doc,
        renderer,
        surface,
        live,
        shake,
    } = job;

    if !doc.has_visible_content() {
        return Err(DrawerzError::precondition("No visible content to export."));
    }
    params.canvas.validate()?;
    if params.speed <= 0.0 {
        tracing::warn!(speed = params.speed, "export with non-positive speed");
        let effect = if sink.extension() == "gif" {
            "The exported GIF will not be animated."
        } else {
            "The exported video will not show animation."
        };
        notifier.alert(
            "Export Warning",
            &format!("Global Animation Speed is zero or less. {effect}"),
        );
    }

    let file_name = animation_file_name(now, sink.extension())?;
    tracing::info!(
        file = %file_name,
        step = params.time_step,
        width = params.canvas.width,
        height = params.canvas.height,
        "export started"
    );

    let guard = Restore::suspend(surface, live);
    guard.surface.resize(params.canvas);

    let result = (|| -> DrawerzResult<ExportOutcome> {
        sink.begin(SinkConfig::new(params.canvas, params.fps))?;
        for i in 0..params.frame_count {
            let t = params.time_at(i);
            guard.live.set_time(t);
            let frame = render_document(renderer, doc, t, params.canvas, &mut *shake)
                .map_err(|e| at_frame(i, e))?;
            sink.push_frame(FrameIndex(i), &frame)
                .map_err(|e| at_frame(i, e))?;
            guard.surface.present(frame).map_err(|e| at_frame(i, e))?;
        }
        let bytes = sink.finish()?;
        let len = bytes.len();
        let path = downloader.deliver(&file_name, bytes)?;
        Ok(ExportOutcome {
            file_name: file_name.clone(),
            frames: params.frame_count,
            bytes: len,
            path,
        })
    })();

    sink.cleanup();
    drop(guard);

    match &result {
        Ok(out) => tracing::info!(file = %out.file_name, bytes = out.bytes, "export finished"),
        Err(e) => tracing::warn!(error = %e, "export aborted"),
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
