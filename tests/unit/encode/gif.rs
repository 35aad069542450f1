use std::io::Cursor;
use std::time::Duration;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;

use super::*;
use crate::foundation::core::{Canvas, Fps};

#[test]
fn encodes_looping_gif_with_frame_delay() {
    let canvas = Canvas::new(4, 4).unwrap();
    let mut sink = GifSink::new();
    sink.begin(SinkConfig::new(canvas, Fps::whole(10).unwrap()))
        .unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::solid(canvas, [255, 255, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(1), &FrameRGBA::solid(canvas, [0, 0, 0]))
        .unwrap();
    assert_eq!(sink.frame_count(), 2);

    let bytes = sink.finish().unwrap();
    assert_eq!(&bytes[..3], b"GIF");
    let frames = GifDecoder::new(Cursor::new(bytes))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(Duration::from(frames[0].delay()), Duration::from_millis(100));
    assert_eq!(frames[1].buffer().get_pixel(0, 0).0[..3], [0, 0, 0]);
}

#[test]
fn transparent_pixels_flatten_to_white() {
    let canvas = Canvas::new(2, 2).unwrap();
    let mut sink = GifSink::new();
    sink.begin(SinkConfig::new(canvas, Fps::whole(10).unwrap()))
        .unwrap();
    let clear = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
    };
    sink.push_frame(FrameIndex(0), &clear).unwrap();
    let bytes = sink.finish().unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 255]);
}

#[test]
fn finish_without_frames_fails() {
    let mut sink = GifSink::new();
    sink.begin(SinkConfig::new(
        Canvas::new(2, 2).unwrap(),
        Fps::whole(10).unwrap(),
    ))
    .unwrap();
    assert!(matches!(sink.finish(), Err(DrawerzError::Export { .. })));
}
