//! Offline animation export.
//!
//! Frames are rendered at a fixed virtual time step, strictly in order, and handed to a
//! [`crate::encode::sink::FrameSink`]. Live state touched by an export is restored on every exit
//! path.

/// Frame schedule and the export driver.
pub mod pipeline;

pub use pipeline::{ExportFormat, ExportJob, ExportOutcome, ExportParams, run_export};
