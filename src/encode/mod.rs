//! Encoding sinks.
//!
//! Sinks consume rendered frames in export order and hand back the encoded file bytes.

/// `ffmpeg`-based MP4 output and the encoder capability gate.
pub mod ffmpeg;
/// Animated GIF output through the `image` crate.
pub mod gif;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
