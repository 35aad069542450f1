use super::*;
use crate::{
    app::shortcuts::Command,
    encode::sink::InMemorySink,
    foundation::core::{Fps, Point},
    host::{MemoryDownloader, RecordingNotifier},
    interact::controller::NoCapture,
    io::files::ImportKind,
    render::shake::CenteredShake,
};

type TestSession = Session<RecordingNotifier, MemoryDownloader>;

fn config() -> EngineConfig {
    EngineConfig {
        world: Canvas::new(64, 36).unwrap(),
        export: Canvas::new(32, 18).unwrap(),
        ffmpeg_bin: "drawerz-no-such-ffmpeg-binary".to_owned(),
        ..EngineConfig::default()
    }
}

fn session(answer: bool) -> TestSession {
    Session::new(
        config(),
        RecordingNotifier::answering(answer),
        MemoryDownloader::default(),
    )
    .unwrap()
    .with_shake(CenteredShake)
}

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

fn draw(s: &mut TestSession, pts: &[(f64, f64)]) {
    let first = PointerSample::mouse(Point::new(pts[0].0, pts[0].1));
    assert!(s.pointer_down(&first, &mut NoCapture).unwrap());
    let moves: Vec<_> = pts[1..]
        .iter()
        .map(|&(x, y)| first.at(Point::new(x, y)))
        .collect();
    s.pointer_move(&moves).unwrap();
    s.pointer_up(&first, &mut NoCapture).unwrap();
}

fn active_strokes(s: &TestSession) -> usize {
    s.document().active_layer().map_or(0, |l| l.strokes.len())
}

#[test]
fn drawing_is_one_undo_step() {
    let mut s = session(true);
    draw(&mut s, &[(100.0, 100.0), (200.0, 150.0), (300.0, 120.0)]);
    let layer = s.document().active_layer().unwrap();
    assert_eq!(layer.strokes.len(), 1);
    assert_eq!(layer.strokes[0].points.len(), 3);
    let drawn = layer.strokes[0].clone();
    assert!(s.frame().is_some());

    assert!(s.undo().unwrap());
    assert_eq!(active_strokes(&s), 0);
    assert!(s.redo().unwrap());
    assert_eq!(s.document().active_layer().unwrap().strokes[0], drawn);
    assert!(!s.redo().unwrap());
}

#[test]
fn eraser_removes_touched_stroke() {
    let mut s = session(true);
    draw(&mut s, &[(100.0, 100.0), (200.0, 100.0)]);
    s.set_tool(Tool::Eraser);
    s.set_stroke_size(10.0);
    draw(&mut s, &[(203.0, 100.0), (203.0, 100.0)]);
    assert_eq!(active_strokes(&s), 0);
    assert!(s.undo().unwrap());
    assert_eq!(active_strokes(&s), 1);
}

#[test]
fn layer_ops_are_undoable() {
    let mut s = session(true);
    let bottom = s.document().layers[0].id.clone();
    let top = s.add_layer();
    assert_eq!(s.document().layers.len(), 2);

    assert!(s.move_layer(&top, LayerMove::Down).unwrap());
    assert_eq!(s.document().layers[0].id, top);
    assert!(!s.move_layer(&top, LayerMove::Down).unwrap());

    s.rename_layer(&bottom, "  ink ").unwrap();
    assert_eq!(s.document().layer(&bottom).unwrap().name, "ink");
    assert!(!s.toggle_visibility(&bottom).unwrap());
    s.set_opacity_percent(&bottom, 40.0).unwrap();
    s.set_animation_param(&bottom, AnimParam::Shake, 5.0).unwrap();

    let depth = s.history().undo_len();
    assert_eq!(depth, 6);
    for _ in 0..depth {
        assert!(s.undo().unwrap());
    }
    assert_eq!(s.document().layers.len(), 1);
    assert_eq!(s.document().layers[0].name, "Layer 1");
    assert!(s.document().is_active(&bottom));
}

#[test]
fn unknown_layer_is_reported() {
    let mut s = session(true);
    let ghost = LayerId::from("ghost");
    assert!(s.toggle_visibility(&ghost).is_err());
    assert!(s.notifier().alerted("unknown layer"));
    assert!(!s.history().can_undo());
}

#[test]
fn delete_requires_confirmation() {
    let mut s = session(false);
    let first = s.document().layers[0].id.clone();
    assert!(matches!(
        s.delete_layer(&first),
        Err(DrawerzError::Precondition(_))
    ));
    assert!(s.notifier().alerted("Cannot delete the last layer."));

    let second = s.add_layer();
    assert!(!s.delete_layer(&second).unwrap());
    assert_eq!(s.document().layers.len(), 2);
    assert_eq!(s.notifier().confirms.len(), 1);
    assert!(s.notifier().confirms[0].1.contains("Layer 2"));

    s.notifier_mut().answer = true;
    assert!(s.delete_layer(&second).unwrap());
    assert_eq!(s.document().layers.len(), 1);
    assert!(s.document().is_active(&first));
}

#[test]
fn clearing_checks_for_content_then_confirms() {
    let mut s = session(true);
    assert!(s.clear_active_layer().is_err());
    assert!(s.notifier().alerted("Active layer is already empty."));
    assert!(s.clear_all_layers().is_err());
    assert!(s.notifier().alerted("All layers are already empty."));

    draw(&mut s, &[(10.0, 10.0), (20.0, 20.0)]);
    s.add_layer();
    draw(&mut s, &[(30.0, 10.0), (40.0, 20.0)]);
    assert!(s.clear_active_layer().unwrap());
    assert_eq!(s.document().stroke_count(), 1);
    assert!(s.clear_all_layers().unwrap());
    assert_eq!(s.document().stroke_count(), 0);
    assert!(s.undo().unwrap());
    assert_eq!(s.document().stroke_count(), 1);
}

#[test]
fn save_and_load_round_trip() {
    let mut s = session(true);
    assert!(s.save(now()).is_err());
    assert!(s.notifier().alerted("Canvas empty."));

    draw(&mut s, &[(10.0, 10.0), (20.0, 20.0), (30.0, 5.0)]);
    s.save(now()).unwrap();
    let (name, bytes) = s.downloader().files[0].clone();
    assert_eq!(name, "drawerz_sketch_2023-11-14T22-13-20.drz");
    let saved = s.document().clone();

    let mut other = session(true);
    other
        .load_sketch(std::str::from_utf8(&bytes).unwrap())
        .unwrap();
    assert_eq!(other.document(), &saved);
    assert!(other.notifier().alerted("Sketch loaded!"));
    assert!(other.undo().unwrap());
    assert_eq!(other.document().stroke_count(), 0);
}

#[test]
fn bad_sketch_leaves_document_alone() {
    let mut s = session(true);
    draw(&mut s, &[(10.0, 10.0), (20.0, 20.0)]);
    let before = s.document().clone();
    assert!(s.load_sketch(r#"{"nope":1}"#).is_err());
    assert_eq!(s.document(), &before);
    assert!(s.notifier().alerted("Missing 'layers' data"));
}

#[test]
fn svg_import_adds_strokes_with_current_tool() {
    let mut s = session(true);
    s.set_stroke_color(StrokeColor::rgb(0, 0, 255));
    let n = s
        .import_svg(r#"<svg width="100" height="50"><rect x="0" y="0" width="100" height="50"/></svg>"#)
        .unwrap();
    assert_eq!(n, 1);
    let stroke = &s.document().active_layer().unwrap().strokes[0];
    assert_eq!(stroke.points.len(), 5);
    assert_eq!(stroke.points[0], stroke.points[4]);
    assert_eq!(stroke.color, StrokeColor::rgb(0, 0, 255));
    assert!(s.notifier().alerted("SVG content imported"));
    assert!(s.undo().unwrap());
    assert_eq!(active_strokes(&s), 0);
}

#[test]
fn open_file_routes_by_extension() {
    let mut s = session(true);
    assert!(matches!(
        s.open_file(Path::new("art.psd")),
        Err(DrawerzError::Unsupported(_))
    ));
    assert!(s.notifier().alerted("Please export as SVG."));

    let dir = std::env::temp_dir().join(format!("drawerz_open_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let svg = dir.join("line.svg");
    std::fs::write(
        &svg,
        r#"<svg viewBox="0 0 10 10"><line x1="0" y1="0" x2="10" y2="10"/></svg>"#,
    )
    .unwrap();
    assert_eq!(s.open_file(&svg).unwrap(), ImportKind::Svg);
    assert_eq!(active_strokes(&s), 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn export_restores_live_state_and_reports() {
    let mut s = session(true);
    assert!(s.export(ExportFormat::Gif, now()).is_err());
    assert!(s.notifier().alerted("No visible content to export."));

    draw(&mut s, &[(100.0, 100.0), (900.0, 500.0)]);
    s.tick().unwrap();
    let time = s.live().time();
    let params = ExportParams::new(
        s.config().export,
        Fps::whole(10).unwrap(),
        1,
        60,
        s.global_speed(),
        time,
    );
    let mut sink = InMemorySink::new();
    let out = s.export_with(&mut sink, &params, now()).unwrap();
    assert_eq!(out.frames, 10);
    assert_eq!(sink.frames()[0].1.width, 32);
    assert_eq!(s.surface_canvas(), s.config().world);
    assert_eq!(s.frame().map(|f| f.width), Some(64));
    assert_eq!(s.live().time(), time);
    assert!(s.live().is_running());
    assert!(s.notifier().alerted("Animation exported as"));
}

#[test]
fn mp4_export_is_gated_on_encoder() {
    let mut s = session(true);
    draw(&mut s, &[(100.0, 100.0), (900.0, 500.0)]);
    let err = s.export(ExportFormat::Mp4, now()).unwrap_err();
    assert!(matches!(err, DrawerzError::Environment(_)));
    assert!(s.notifier().alerted("MP4 export needs ffmpeg"));
    assert!(s.downloader().files.is_empty());
    assert!(!s.encoder().is_loaded());
}

#[test]
fn bad_export_schedule_is_reported() {
    let mut s = session(true);
    draw(&mut s, &[(100.0, 100.0), (900.0, 500.0)]);
    s.config.gif_fps = 0;
    let err = s.export(ExportFormat::Gif, now()).unwrap_err();
    assert!(matches!(err, DrawerzError::Validation(_)));
    assert!(
        s.notifier()
            .alerts
            .iter()
            .any(|(title, msg)| title == "Export Error" && msg.contains("Fps num"))
    );
    assert!(s.downloader().files.is_empty());
}

#[test]
fn commands_switch_tools() {
    let mut s = session(true);
    assert!(s.run_command(Command::Eraser, now()).unwrap());
    assert_eq!(s.tools().tool, Tool::Eraser);
    assert!(s.run_command(Command::Pen, now()).unwrap());
    assert_eq!(s.tools().tool, Tool::Pen);
    assert!(!s.run_command(Command::Open, now()).unwrap());
    assert!(s.run_command(Command::Undo, now()).unwrap());
}

#[test]
fn tick_only_advances_while_running() {
    let mut s = session(true);
    assert!(s.tick().unwrap());
    assert_eq!(s.live().time(), 1.0);
    s.stop_live();
    assert!(!s.tick().unwrap());
    assert_eq!(s.live().time(), 1.0);
    s.start_live();
    s.resize_surface(Canvas::new(20, 10).unwrap()).unwrap();
    assert_eq!(s.frame().map(|f| (f.width, f.height)), Some((20, 10)));
}
