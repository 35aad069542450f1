use crate::foundation::{
    core::Canvas,
    error::{DrawerzError, DrawerzResult},
    math::flatten_over_white,
};

/// A rendered frame as premultiplied RGBA8 pixels, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Opaque frame filled with one color.
    pub fn solid(canvas: Canvas, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(canvas.rgba_len());
        for _ in 0..(canvas.width as usize * canvas.height as usize) {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Frame size.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight RGB bytes composited over white, for encoders without alpha.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&flatten_over_white([px[0], px[1], px[2], px[3]]));
        }
        out
    }

    /// Straight, opaque RGBA bytes.
    pub fn to_opaque_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let [r, g, b] = flatten_over_white([px[0], px[1], px[2], px[3]]);
            out.extend_from_slice(&[r, g, b, 255]);
        }
        out
    }

    pub(crate) fn check_len(&self) -> DrawerzResult<()> {
        if self.data.len() != self.canvas().rgba_len() {
            return Err(DrawerzError::validation(format!(
                "frame buffer has {} bytes, expected {} for {}x{}",
                self.data.len(),
                self.canvas().rgba_len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// The presentation surface: the last full frame plus the size it is drawn at.
///
/// Resizing drops the pixels; callers re-render the whole scene afterwards.
#[derive(Clone, Debug)]
pub struct RenderSurface {
    canvas: Canvas,
    frame: Option<FrameRGBA>,
}

impl RenderSurface {
    /// Empty surface of the given size.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            frame: None,
        }
    }

    /// Current size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Change size. A no-op when unchanged; otherwise the stale frame is discarded.
    pub fn resize(&mut self, canvas: Canvas) {
        if self.canvas != canvas {
            tracing::debug!(
                from = ?self.canvas,
                to = ?canvas,
                "render surface resized"
            );
            self.canvas = canvas;
            self.frame = None;
        }
    }

    /// Last presented frame.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    /// Last presented frame, for incremental drawing.
    pub fn frame_mut(&mut self) -> Option<&mut FrameRGBA> {
        self.frame.as_mut()
    }

    /// Install a full frame. Frames of a different size are rejected.
    pub fn present(&mut self, frame: FrameRGBA) -> DrawerzResult<()> {
        if frame.canvas() != self.canvas {
            return Err(DrawerzError::validation(format!(
                "frame {}x{} does not match surface {}x{}",
                frame.width, frame.height, self.canvas.width, self.canvas.height
            )));
        }
        self.frame = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
