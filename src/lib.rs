//! drawerz is a layered sketching engine with procedural stroke animation.
//!
//! Strokes are drawn into independent layers, each with its own wiggle, breathing, shake and
//! speed settings. The crate is headless: a host feeds pointer samples and ticks into a
//! [`Session`] and presents the frames it renders.
//!
//! - Edit a [`Document`] through a [`Session`], with snapshot undo/redo
//! - Render any instant with [`render::render_document`]
//! - Save and load `.drz` sketches, import SVG shapes
//! - Export MP4 (system `ffmpeg`) or GIF animations frame by frame into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Editor session: state ownership and intent-level operations.
pub mod app;
/// Encoding sinks.
pub mod encode;
/// Offline animation export.
pub mod export;
/// Snapshot undo/redo.
pub mod history;
/// Host-provided hooks.
pub mod host;
/// Vector markup import.
pub mod import;
/// Pointer input handling.
pub mod interact;
/// Sketch persistence and file naming.
pub mod io;
/// Document model.
pub mod model;
/// Scene rendering.
pub mod render;

pub use crate::foundation::color::StrokeColor;
pub use crate::foundation::config::{ENV_EXPORT_SIZE, ENV_FFMPEG, EngineConfig, ToolDefaults};
pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, Point, Vec2, ViewTransform, WORLD_HEIGHT, WORLD_WIDTH,
};
pub use crate::foundation::error::{DrawerzError, DrawerzResult};

pub use crate::app::{Command, Session, command_for};
pub use crate::encode::ffmpeg::{EncoderEngine, Mp4Sink, is_ffmpeg_on_path};
pub use crate::encode::gif::GifSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::export::{ExportFormat, ExportJob, ExportOutcome, ExportParams, run_export};
pub use crate::history::{History, Snapshot};
pub use crate::host::{
    DirDownloader, Downloader, LogNotifier, MemoryDownloader, Notifier, RecordingNotifier,
};
pub use crate::interact::controller::{
    ControllerEffect, InteractionController, NoCapture, PointerCapture, PointerKind,
    PointerSample, ToolState,
};
pub use crate::model::document::{Document, LayerMove, LayerOpError};
pub use crate::model::ids::{LayerId, StrokeId};
pub use crate::model::layer::{AnimParam, AnimationSettings, Layer};
pub use crate::model::stroke::{Stroke, Tool};
pub use crate::render::backend::{FrameRGBA, RenderSurface};
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::live::LiveAnimation;
pub use crate::render::plan::{DrawOp, LayerPass, ScenePlan, build_scene_plan};
pub use crate::render::shake::{CenteredShake, Rng64, ScriptedShake, ShakeSource};
