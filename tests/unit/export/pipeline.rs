use super::*;
use crate::{
    encode::sink::InMemorySink,
    foundation::{color::StrokeColor, core::Point},
    host::{MemoryDownloader, RecordingNotifier},
    model::stroke::Stroke,
    render::{backend::FrameRGBA, shake::CenteredShake},
};

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

fn drawn_doc() -> Document {
    let mut doc = Document::default();
    doc.active_layer_mut().unwrap().strokes.push(Stroke::from_points(
        vec![Point::new(100.0, 100.0), Point::new(1800.0, 900.0)],
        StrokeColor::BLACK,
        40.0,
        0.0,
    ));
    doc
}

fn small_params(speed: f64) -> ExportParams {
    ExportParams::new(
        Canvas::new(16, 10).unwrap(),
        Fps::whole(10).unwrap(),
        1,
        60,
        speed,
        42.0,
    )
}

struct Live {
    renderer: CpuRenderer,
    surface: RenderSurface,
    live: LiveAnimation,
    shake: CenteredShake,
}

impl Live {
    fn new() -> Self {
        let mut live = LiveAnimation::new();
        live.set_time(42.0);
        live.start();
        Self {
            renderer: CpuRenderer::new(),
            surface: RenderSurface::new(Canvas::WORLD),
            live,
            shake: CenteredShake,
        }
    }

    fn job<'a>(&'a mut self, doc: &'a Document) -> ExportJob<'a> {
        ExportJob {
            doc,
            renderer: &mut self.renderer,
            surface: &mut self.surface,
            live: &mut self.live,
            shake: &mut self.shake,
        }
    }

    fn assert_restored(&self) {
        assert_eq!(self.surface.canvas(), Canvas::WORLD);
        assert_eq!(self.live.time(), 42.0);
        assert!(self.live.is_running());
    }
}

#[test]
fn default_schedule_matches_formats() {
    let cfg = EngineConfig::default();
    let mp4 = ExportParams::for_format(&cfg, ExportFormat::Mp4, 1.0, 0.0).unwrap();
    assert_eq!(mp4.frame_count, 450);
    assert_eq!(mp4.time_step, 2.0);
    let gif = ExportParams::for_format(&cfg, ExportFormat::Gif, 1.0, 5.0).unwrap();
    assert_eq!(gif.frame_count, 150);
    assert_eq!(gif.time_step, 6.0);
    assert_eq!(gif.time_at(0), 5.0);
    assert_eq!(gif.time_at(3), 23.0);
    assert_eq!("GIF".parse::<ExportFormat>().unwrap(), ExportFormat::Gif);
    assert!("webm".parse::<ExportFormat>().is_err());
}

#[test]
fn export_renders_every_frame_in_order_and_restores() {
    let doc = drawn_doc();
    let mut live = Live::new();
    let mut sink = InMemorySink::new();
    let mut down = MemoryDownloader::default();
    let mut notes = RecordingNotifier::default();

    let out = run_export(
        live.job(&doc),
        &small_params(1.0),
        &mut sink,
        &mut down,
        &mut notes,
        now(),
    )
    .unwrap();

    assert_eq!(out.frames, 10);
    assert_eq!(out.file_name, "drawerz_animation_2023-11-14T22-13-20.raw");
    assert_eq!(sink.frames().len(), 10);
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!((frame.width, frame.height), (16, 10));
    }
    assert!(sink.is_finished());
    assert_eq!(sink.cleanups(), 1);
    assert_eq!(down.files.len(), 1);
    assert_eq!(down.files[0].1.len(), out.bytes);
    assert!(notes.alerts.is_empty());
    live.assert_restored();
}

#[test]
fn nothing_visible_is_refused() {
    let mut doc = drawn_doc();
    let id = doc.layers[0].id.clone();
    doc.toggle_visibility(&id).unwrap();
    let mut live = Live::new();
    let mut sink = InMemorySink::new();
    let err = run_export(
        live.job(&doc),
        &small_params(1.0),
        &mut sink,
        &mut MemoryDownloader::default(),
        &mut RecordingNotifier::default(),
        now(),
    )
    .unwrap_err();
    assert!(matches!(err, DrawerzError::Precondition(_)));
    assert!(err.to_string().contains("No visible content"));
    assert!(sink.config().is_none());
    live.assert_restored();
}

#[test]
fn non_positive_speed_warns_and_freezes_time() {
    let doc = drawn_doc();
    let mut live = Live::new();
    let mut sink = InMemorySink::new();
    let mut notes = RecordingNotifier::default();
    let params = small_params(0.0);
    assert_eq!(params.time_step, 0.0);
    run_export(
        live.job(&doc),
        &params,
        &mut sink,
        &mut MemoryDownloader::default(),
        &mut notes,
        now(),
    )
    .unwrap();
    assert!(notes.alerted("Global Animation Speed is zero or less"));
    let first = &sink.frames()[0].1;
    assert!(sink.frames().iter().all(|(_, f)| f == first));
}

struct FailAt {
    at: u64,
    inner: InMemorySink,
}

impl FrameSink for FailAt {
    fn extension(&self) -> &'static str {
        "mp4"
    }

    fn begin(&mut self, cfg: SinkConfig) -> DrawerzResult<()> {
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> DrawerzResult<()> {
        if idx.0 == self.at {
            return Err(DrawerzError::validation("disk full"));
        }
        self.inner.push_frame(idx, frame)
    }

    fn finish(&mut self) -> DrawerzResult<Vec<u8>> {
        self.inner.finish()
    }

    fn cleanup(&mut self) {
        self.inner.cleanup();
    }
}

#[test]
fn frame_failure_aborts_with_frame_number_and_cleans_up() {
    let doc = drawn_doc();
    let mut live = Live::new();
    let mut sink = FailAt {
        at: 3,
        inner: InMemorySink::new(),
    };
    let mut down = MemoryDownloader::default();
    let err = run_export(
        live.job(&doc),
        &small_params(1.0),
        &mut sink,
        &mut down,
        &mut RecordingNotifier::default(),
        now(),
    )
    .unwrap_err();
    assert!(matches!(err, DrawerzError::Export { frame: Some(3), .. }));
    assert!(err.to_string().contains("at frame 4"));
    assert_eq!(sink.inner.frames().len(), 3);
    assert!(!sink.inner.is_finished());
    assert_eq!(sink.inner.cleanups(), 1);
    assert!(down.files.is_empty());
    live.assert_restored();
}
