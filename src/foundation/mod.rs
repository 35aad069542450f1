//! Shared primitives: geometry, colors, configuration and the error taxonomy.

/// Stroke colors and their textual forms.
pub mod color;
/// Engine configuration with environment overrides.
pub mod config;
/// Canvas, frame rate and world-space geometry.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
