use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.history_depth, 30);
    assert_eq!(cfg.mp4_fps, 30);
    assert_eq!(cfg.gif_fps, 10);
    assert_eq!(cfg.export_duration_secs, 15);
    assert_eq!(cfg.export, Canvas::WORLD);
    assert_eq!(cfg.tool.size, 10.0);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = EngineConfig::from_reader(r##"{"gif_fps": 12, "tool": {"color": "#ff0000"}}"##.as_bytes())
        .unwrap();
    assert_eq!(cfg.gif_fps, 12);
    assert_eq!(cfg.tool.color, StrokeColor::rgb(255, 0, 0));
    assert_eq!(cfg.tool.size, 10.0);
    assert_eq!(cfg.mp4_fps, 30);
}

#[test]
fn zero_values_are_rejected() {
    assert!(EngineConfig::from_reader(r#"{"history_depth": 0}"#.as_bytes()).is_err());
    assert!(EngineConfig::from_reader(r#"{"mp4_fps": 0}"#.as_bytes()).is_err());
    assert!(EngineConfig::from_reader("not json".as_bytes()).is_err());
}

#[test]
fn env_overrides_apply() {
    let cfg = EngineConfig::default()
        .with_overrides_from(|k| match k {
            ENV_FFMPEG => Some("/opt/bin/ffmpeg".to_owned()),
            ENV_EXPORT_SIZE => Some("640x360".to_owned()),
            _ => None,
        })
        .unwrap();
    assert_eq!(cfg.ffmpeg_bin, "/opt/bin/ffmpeg");
    assert_eq!(cfg.export, Canvas::new(640, 360).unwrap());

    let bad = EngineConfig::default().with_overrides_from(|k| {
        (k == ENV_EXPORT_SIZE).then(|| "wide".to_owned())
    });
    assert!(bad.is_err());
}
