use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{DrawerzError, DrawerzResult};
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

impl SinkConfig {
    /// Build a config from the export canvas and rate.
    pub fn new(canvas: Canvas, fps: Fps) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            fps,
        }
    }

    pub(crate) fn check_frame(&self, frame: &FrameRGBA) -> DrawerzResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(DrawerzError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        frame.check_len()
    }
}

/// Sink contract for consuming rendered frames in export order.
///
/// `push_frame` is called with strictly increasing indices. `cleanup` is always called last,
/// after `finish` or after a failure, and must be safe to call more than once.
pub trait FrameSink {
    /// File extension of the encoded output, without the dot.
    fn extension(&self) -> &'static str;
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> DrawerzResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> DrawerzResult<()>;
    /// Encode everything pushed so far and return the file bytes.
    fn finish(&mut self) -> DrawerzResult<Vec<u8>>;
    /// Release scratch resources.
    fn cleanup(&mut self);
}

/// Reject out-of-order pushes.
pub(crate) fn check_order(last: &mut Option<FrameIndex>, idx: FrameIndex) -> DrawerzResult<()> {
    if let Some(prev) = *last
        && idx.0 <= prev.0
    {
        return Err(DrawerzError::export(
            Some(idx.0),
            "sink received out-of-order frame index",
        ));
    }
    *last = Some(idx);
    Ok(())
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    /// Frames in export order.
    pub(crate) frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
    cleanups: usize,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Every frame pushed, in order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `finish` ran.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of `cleanup` calls seen.
    pub fn cleanups(&self) -> usize {
        self.cleanups
    }
}

impl FrameSink for InMemorySink {
    fn extension(&self) -> &'static str {
        "raw"
    }

    fn begin(&mut self, cfg: SinkConfig) -> DrawerzResult<()> {
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> DrawerzResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| DrawerzError::export(Some(idx.0), "sink not started"))?;
        cfg.check_frame(frame)?;
        check_order(&mut self.last_idx, idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn finish(&mut self) -> DrawerzResult<Vec<u8>> {
        self.finished = true;
        Ok(self
            .frames
            .iter()
            .flat_map(|(_, f)| f.data.iter().copied())
            .collect())
    }

    fn cleanup(&mut self) {
        self.cleanups += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
