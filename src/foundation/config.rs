use std::{io::Read, path::Path};

use anyhow::Context;

use crate::{
    foundation::{
        color::StrokeColor,
        core::{Canvas, Fps},
        error::{DrawerzError, DrawerzResult},
    },
    model::layer::AnimationSettings,
};

/// Environment variable overriding the encoder binary.
pub const ENV_FFMPEG: &str = "DRAWERZ_FFMPEG";
/// Environment variable overriding the export size (`WxH`).
pub const ENV_EXPORT_SIZE: &str = "DRAWERZ_EXPORT_SIZE";

/// Pen defaults applied to a fresh session.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    /// Brush diameter in world units.
    pub size: f64,
    /// Pen color.
    pub color: StrokeColor,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: StrokeColor::BLACK,
        }
    }
}

/// Engine-wide settings. Every field has a default, so partial JSON files are accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Live preview surface size. Stroke coordinates always live in the fixed world space.
    pub world: Canvas,
    /// Output size for video and GIF export.
    pub export: Canvas,
    /// Animation settings copied into every new layer.
    pub animation_defaults: AnimationSettings,
    /// Initial pen settings.
    pub tool: ToolDefaults,
    /// Maximum number of undo snapshots.
    pub history_depth: usize,
    /// Live animation clock rate.
    pub live_ticks_per_second: u32,
    /// Length of an exported animation.
    pub export_duration_secs: u32,
    /// MP4 frame rate.
    pub mp4_fps: u32,
    /// GIF frame rate.
    pub gif_fps: u32,
    /// Encoder executable name or path.
    pub ffmpeg_bin: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world: Canvas::WORLD,
            export: Canvas::WORLD,
            animation_defaults: AnimationSettings::default(),
            tool: ToolDefaults::default(),
            history_depth: 30,
            live_ticks_per_second: 60,
            export_duration_secs: 15,
            mp4_fps: 30,
            gif_fps: 10,
            ffmpeg_bin: "ffmpeg".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config from a reader and validate it.
    pub fn from_reader(mut r: impl Read) -> DrawerzResult<Self> {
        let mut s = String::new();
        r.read_to_string(&mut s)
            .context("read engine config")
            .map_err(DrawerzError::from)?;
        let cfg: Self = serde_json::from_str(&s)
            .map_err(|e| DrawerzError::validation(format!("config json parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> DrawerzResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open engine config {}", path.display()))
            .map_err(DrawerzError::from)?;
        Self::from_reader(f)
    }

    /// Apply `DRAWERZ_*` environment overrides.
    pub fn with_env_overrides(self) -> DrawerzResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> DrawerzResult<Self> {
        if let Some(bin) = lookup(ENV_FFMPEG).filter(|v| !v.trim().is_empty()) {
            self.ffmpeg_bin = bin.trim().to_owned();
        }
        if let Some(size) = lookup(ENV_EXPORT_SIZE).filter(|v| !v.trim().is_empty()) {
            self.export = size.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject zero sizes, rates and depths.
    pub fn validate(&self) -> DrawerzResult<()> {
        self.world.validate()?;
        self.export.validate()?;
        if self.history_depth == 0 {
            return Err(DrawerzError::validation("history_depth must be > 0"));
        }
        if self.live_ticks_per_second == 0 {
            return Err(DrawerzError::validation("live_ticks_per_second must be > 0"));
        }
        if self.export_duration_secs == 0 {
            return Err(DrawerzError::validation("export_duration_secs must be > 0"));
        }
        Fps::whole(self.mp4_fps)?;
        Fps::whole(self.gif_fps)?;
        if !self.tool.size.is_finite() || self.tool.size <= 0.0 {
            return Err(DrawerzError::validation("tool.size must be finite and > 0"));
        }
        if self.ffmpeg_bin.trim().is_empty() {
            return Err(DrawerzError::validation("ffmpeg_bin must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
