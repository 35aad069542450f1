use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::sink::{FrameSink, SinkConfig, check_order};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{DrawerzError, DrawerzResult};
use crate::render::backend::FrameRGBA;

/// NeuQuant sampling speed, 1 (best) to 30 (fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Animated GIF sink. Frames are flattened over white and held in memory until `finish`.
#[derive(Debug, Default)]
pub struct GifSink {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    frames: Vec<RgbaImage>,
}

impl GifSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames collected so far.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSink for GifSink {
    fn extension(&self) -> &'static str {
        "gif"
    }

    fn begin(&mut self, cfg: SinkConfig) -> DrawerzResult<()> {
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(DrawerzError::validation("gif frames are limited to 65535 px"));
        }
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> DrawerzResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| DrawerzError::export(Some(idx.0), "gif sink not started"))?;
        cfg.check_frame(frame)?;
        check_order(&mut self.last_idx, idx)?;
        let img = RgbaImage::from_raw(frame.width, frame.height, frame.to_opaque_rgba8())
            .ok_or_else(|| DrawerzError::export(Some(idx.0), "frame buffer size mismatch"))?;
        self.frames.push(img);
        Ok(())
    }

    fn finish(&mut self) -> DrawerzResult<Vec<u8>> {
        let cfg = self
            .cfg
            .ok_or_else(|| DrawerzError::export(None, "gif sink not started"))?;
        if self.frames.is_empty() {
            return Err(DrawerzError::export(None, "no frames to encode"));
        }
        let delay = Delay::from_numer_denom_ms(1000 * cfg.fps.den, cfg.fps.num);
        let mut bytes = Vec::new();
        {
            let mut enc = GifEncoder::new_with_speed(&mut bytes, QUANTIZE_SPEED);
            enc.set_repeat(Repeat::Infinite)
                .map_err(|e| DrawerzError::export(None, format!("gif encode failed: {e}")))?;
            for (i, img) in self.frames.drain(..).enumerate() {
                enc.encode_frame(Frame::from_parts(img, 0, 0, delay))
                    .map_err(|e| {
                        DrawerzError::export(Some(i as u64), format!("gif encode failed: {e}"))
                    })?;
            }
        }
        tracing::debug!(bytes = bytes.len(), "gif encoded");
        Ok(bytes)
    }

    fn cleanup(&mut self) {
        self.frames.clear();
        self.cfg = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
