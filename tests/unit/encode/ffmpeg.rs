use super::*;
use crate::foundation::core::Canvas;

const MISSING_BIN: &str = "drawerz-no-such-ffmpeg-binary";

#[test]
fn args_use_h264_yuv420p_and_rate() {
    let args = mp4_args(Fps::whole(30).unwrap(), Path::new("/tmp/x"));
    let joined = args.join(" ");
    assert!(joined.starts_with("-y -loglevel error -r 30/1 -i "));
    assert!(joined.contains("frame%04d.png"));
    assert!(joined.contains("-c:v libx264 -preset medium -crf 20 -pix_fmt yuv420p"));
    assert!(joined.ends_with("output.mp4"));
}

#[test]
fn missing_binary_fails_capability_check() {
    let mut engine = EncoderEngine::new(MISSING_BIN);
    let err = engine.check_capability().unwrap_err();
    assert!(matches!(err, DrawerzError::Environment(_)));
    assert!(err.to_string().contains(ENV_FFMPEG));
    assert!(engine.ensure_loaded().is_err());
    assert!(!engine.is_loaded());
    assert_eq!(engine.version(), None);
}

#[test]
fn odd_dimensions_are_rejected() {
    let mut sink = Mp4Sink::new(MISSING_BIN);
    let cfg = SinkConfig::new(Canvas::new(3, 2).unwrap(), Fps::whole(30).unwrap());
    assert!(matches!(sink.begin(cfg), Err(DrawerzError::Validation(_))));
    assert!(sink.scratch_dir().is_none());
}

#[test]
fn frames_land_in_scratch_and_cleanup_removes_it() {
    let canvas = Canvas::new(4, 2).unwrap();
    let mut sink = Mp4Sink::new(MISSING_BIN);
    sink.begin(SinkConfig::new(canvas, Fps::whole(30).unwrap()))
        .unwrap();
    let frame = FrameRGBA::solid(canvas, [10, 20, 30]);
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    let dir = sink.scratch_dir().unwrap().to_path_buf();
    assert!(dir.join("frame0000.png").is_file());
    assert!(dir.join("frame0001.png").is_file());

    assert!(matches!(sink.finish(), Err(DrawerzError::Export { .. })));
    sink.cleanup();
    sink.cleanup();
    assert!(!dir.exists());
}
