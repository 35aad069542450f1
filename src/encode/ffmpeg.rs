use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::encode::sink::{FrameSink, SinkConfig, check_order};
use crate::foundation::config::ENV_FFMPEG;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{DrawerzError, DrawerzResult};
use crate::render::backend::FrameRGBA;

/// x264 speed/size tradeoff.
pub const MP4_PRESET: &str = "medium";
/// x264 constant rate factor.
pub const MP4_CRF: u8 = 20;

const FRAME_PATTERN: &str = "frame%04d.png";
const OUTPUT_NAME: &str = "output.mp4";

/// Return `true` when `bin -version` runs successfully.
pub fn is_ffmpeg_available(bin: &str) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_ffmpeg_available("ffmpeg")
}

/// Capability gate and one-time initialization for MP4 encoding.
#[derive(Debug, Clone)]
pub struct EncoderEngine {
    bin: String,
    version: Option<String>,
}

impl Default for EncoderEngine {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl EncoderEngine {
    /// Engine for the given binary name or path. Nothing is probed yet.
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            version: None,
        }
    }

    /// Encoder binary.
    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Refuse early when the encoder binary cannot run at all.
    pub fn check_capability(&self) -> DrawerzResult<()> {
        if is_ffmpeg_available(&self.bin) {
            return Ok(());
        }
        tracing::warn!(bin = %self.bin, "mp4 encoder not available");
        Err(DrawerzError::environment(format!(
            "MP4 export needs ffmpeg, but '{}' could not be run. Install ffmpeg and put it on \
             PATH, or set {ENV_FFMPEG} to the binary location.",
            self.bin
        )))
    }

    /// Probe the encoder once; later calls are free.
    pub fn ensure_loaded(&mut self) -> DrawerzResult<()> {
        if self.version.is_some() {
            return Ok(());
        }
        let out = Command::new(&self.bin)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                DrawerzError::environment(format!("failed to start '{}': {e}", self.bin))
            })?;
        if !out.status.success() {
            return Err(DrawerzError::environment(format!(
                "'{}' exited with status {} while listing encoders",
                self.bin, out.status
            )));
        }
        if !String::from_utf8_lossy(&out.stdout).contains("libx264") {
            return Err(DrawerzError::environment(format!(
                "'{}' was built without the libx264 encoder required for MP4 export",
                self.bin
            )));
        }
        let version = Command::new(&self.bin)
            .arg("-version")
            .output()
            .ok()
            .and_then(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .lines()
                    .next()
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| "ffmpeg".to_owned());
        tracing::info!(%version, "mp4 encoder ready");
        self.version = Some(version);
        Ok(())
    }

    /// Whether [`Self::ensure_loaded`] has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.version.is_some()
    }

    /// First line of `-version` once loaded.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// A fresh MP4 sink driving this engine's binary.
    pub fn sink(&self) -> Mp4Sink {
        Mp4Sink::new(self.bin.clone())
    }
}

/// MP4 sink: frames are written as PNG files into a scratch directory as they arrive and
/// `ffmpeg` assembles them at `finish`.
#[derive(Debug)]
pub struct Mp4Sink {
    bin: String,
    scratch: Option<PathBuf>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl Mp4Sink {
    /// Sink running `bin` at finish.
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            scratch: None,
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Scratch directory while the sink is active.
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_deref()
    }
}

/// Arguments for assembling numbered PNG frames in `dir` into an H.264 MP4.
pub fn mp4_args(fps: Fps, dir: &Path) -> Vec<String> {
    vec![
        "-y".to_owned(),
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-r".to_owned(),
        format!("{}/{}", fps.num, fps.den),
        "-i".to_owned(),
        dir.join(FRAME_PATTERN).display().to_string(),
        "-c:v".to_owned(),
        "libx264".to_owned(),
        "-preset".to_owned(),
        MP4_PRESET.to_owned(),
        "-crf".to_owned(),
        MP4_CRF.to_string(),
        "-pix_fmt".to_owned(),
        "yuv420p".to_owned(),
        dir.join(OUTPUT_NAME).display().to_string(),
    ]
}

fn scratch_dir_path() -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    std::env::temp_dir().join(format!(
        "drawerz_export_{}_{}_{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

impl FrameSink for Mp4Sink {
    fn extension(&self) -> &'static str {
        "mp4"
    }

    fn begin(&mut self, cfg: SinkConfig) -> DrawerzResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(DrawerzError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(DrawerzError::validation(
                "mp4 sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(DrawerzError::validation(
                "mp4 sink width/height must be even (required for yuv420p output)",
            ));
        }
        self.cleanup();

        let dir = scratch_dir_path();
        std::fs::create_dir_all(&dir).map_err(|e| {
            DrawerzError::export(
                None,
                format!("failed to create scratch directory '{}': {e}", dir.display()),
            )
        })?;
        tracing::debug!(dir = %dir.display(), "mp4 scratch directory created");
        self.scratch = Some(dir);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> DrawerzResult<()> {
        let (Some(cfg), Some(dir)) = (self.cfg, self.scratch.as_ref()) else {
            return Err(DrawerzError::export(Some(idx.0), "mp4 sink not started"));
        };
        cfg.check_frame(frame)?;
        check_order(&mut self.last_idx, idx)?;

        // Numbered densely from zero, as the image2 demuxer expects.
        let path = dir.join(format!("frame{:04}.png", self.written));
        image::save_buffer_with_format(
            &path,
            &frame.to_rgb8(),
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .map_err(|e| DrawerzError::export(Some(idx.0), format!("failed to write frame: {e}")))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> DrawerzResult<Vec<u8>> {
        let (Some(cfg), Some(dir)) = (self.cfg.take(), self.scratch.clone()) else {
            return Err(DrawerzError::export(None, "mp4 sink not started"));
        };
        if self.written == 0 {
            return Err(DrawerzError::export(None, "no frames to encode"));
        }

        let mut child = Command::new(&self.bin)
            .args(mp4_args(cfg.fps, &dir))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DrawerzError::export(
                    None,
                    format!("failed to spawn ffmpeg (is it installed and on PATH?): {e}"),
                )
            })?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DrawerzError::export(None, "failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        let status = child.wait().map_err(|e| {
            DrawerzError::export(None, format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| DrawerzError::export(None, "ffmpeg stderr drain thread panicked"))?
            .map_err(|e| DrawerzError::export(None, format!("ffmpeg stderr read failed: {e}")))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(DrawerzError::export(
                None,
                format!("ffmpeg exited with status {status}: {}", stderr.trim()),
            ));
        }

        let out = dir.join(OUTPUT_NAME);
        std::fs::read(&out).map_err(|e| {
            DrawerzError::export(None, format!("failed to read '{}': {e}", out.display()))
        })
    }

    fn cleanup(&mut self) {
        if let Some(dir) = self.scratch.take()
            && let Err(e) = std::fs::remove_dir_all(&dir)
        {
            tracing::debug!(dir = %dir.display(), error = %e, "scratch cleanup failed");
        }
        self.cfg = None;
    }
}

impl Drop for Mp4Sink {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
