use crate::foundation::error::{DrawerzError, DrawerzResult};

pub use kurbo::{Affine, Point, Vec2};

/// Canonical world width; every stroke point is stored in this space.
pub const WORLD_WIDTH: u32 = 1920;
/// Canonical world height.
pub const WORLD_HEIGHT: u32 = 1080;

/// 0-based index of an exported frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> DrawerzResult<Self> {
        if den == 0 {
            return Err(DrawerzError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(DrawerzError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number FPS.
    pub fn whole(num: u32) -> DrawerzResult<Self> {
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The world-space canvas used for live preview.
    pub const WORLD: Canvas = Canvas {
        width: WORLD_WIDTH,
        height: WORLD_HEIGHT,
    };

    /// Create a validated canvas. The CPU raster backend addresses pixels with `u16`.
    pub fn new(width: u32, height: u32) -> DrawerzResult<Self> {
        let c = Self { width, height };
        c.validate()?;
        Ok(c)
    }

    /// Reject zero or oversized dimensions.
    pub fn validate(self) -> DrawerzResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DrawerzError::validation("canvas width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(DrawerzError::validation(format!(
                "canvas {}x{} exceeds the {} pixel limit per axis",
                self.width,
                self.height,
                u16::MAX
            )));
        }
        Ok(())
    }

    /// Number of bytes of a tightly packed RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Transform mapping world coordinates onto this canvas.
    pub fn world_to_canvas(self) -> Affine {
        Affine::scale_non_uniform(
            f64::from(self.width) / f64::from(WORLD_WIDTH),
            f64::from(self.height) / f64::from(WORLD_HEIGHT),
        )
    }
}

impl std::str::FromStr for Canvas {
    type Err = DrawerzError;

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| DrawerzError::validation(format!("expected WxH, got \"{s}\"")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| DrawerzError::validation(format!("invalid dimension \"{v}\": {e}")))
        };
        Canvas::new(parse(w)?, parse(h)?)
    }
}

/// Persisted pan/zoom state. Part of the save format; rendering ignores it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    /// Zoom factor.
    #[serde(default = "one")]
    pub scale: f64,
    /// Horizontal pan.
    #[serde(rename = "offsetX", default)]
    pub offset_x: f64,
    /// Vertical pan.
    #[serde(rename = "offsetY", default)]
    pub offset_y: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
