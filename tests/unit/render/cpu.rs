use super::*;
use crate::render::plan::ScenePlan;

fn small() -> Canvas {
    Canvas::new(64, 48).unwrap()
}

fn plan_with(ops: Vec<DrawOp>, opacity: f32) -> ScenePlan {
    ScenePlan {
        canvas: small(),
        transform: Affine::IDENTITY,
        background: StrokeColor::WHITE,
        layers: vec![LayerPass { opacity, ops }],
    }
}

#[test]
fn empty_plan_is_opaque_white() {
    let mut r = CpuRenderer::new();
    let frame = r
        .render(&ScenePlan {
            canvas: small(),
            transform: Affine::IDENTITY,
            background: StrokeColor::WHITE,
            layers: Vec::new(),
        })
        .unwrap();
    assert_eq!(frame.width, 64);
    assert!(frame.data.chunks_exact(4).all(|p| p == [255, 255, 255, 255]));
}

#[test]
fn disc_paints_its_center() {
    let mut r = CpuRenderer::new();
    let frame = r
        .render(&plan_with(
            vec![DrawOp::Disc {
                center: Point::new(20.0, 20.0),
                radius: 6.0,
                color: StrokeColor::rgb(255, 0, 0),
                offset: Vec2::ZERO,
            }],
            1.0,
        ))
        .unwrap();
    assert_eq!(frame.pixel(20, 20), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(40, 40), Some([255, 255, 255, 255]));
}

#[test]
fn polyline_covers_its_path_and_offset_moves_it() {
    let mut r = CpuRenderer::new();
    let op = |dy: f64| DrawOp::Polyline {
        points: vec![Point::new(5.0, 10.0), Point::new(55.0, 10.0)],
        width: 4.0,
        color: StrokeColor::BLACK,
        offset: Vec2::new(0.0, dy),
    };
    let a = r.render(&plan_with(vec![op(0.0)], 1.0)).unwrap();
    assert_eq!(a.pixel(30, 10), Some([0, 0, 0, 255]));
    let b = r.render(&plan_with(vec![op(20.0)], 1.0)).unwrap();
    assert_eq!(b.pixel(30, 10), Some([255, 255, 255, 255]));
    assert_eq!(b.pixel(30, 30), Some([0, 0, 0, 255]));
}

#[test]
fn layer_opacity_blends_with_background() {
    let mut r = CpuRenderer::new();
    let frame = r
        .render(&plan_with(
            vec![DrawOp::Disc {
                center: Point::new(32.0, 24.0),
                radius: 10.0,
                color: StrokeColor::BLACK,
                offset: Vec2::ZERO,
            }],
            0.5,
        ))
        .unwrap();
    let px = frame.pixel(32, 24).unwrap();
    assert!((120..=135).contains(&px[0]), "got {px:?}");
}

#[test]
fn identical_plans_render_identically() {
    let mut r = CpuRenderer::new();
    let plan = plan_with(
        vec![DrawOp::Polyline {
            points: vec![Point::new(1.0, 1.0), Point::new(30.0, 40.0), Point::new(60.0, 5.0)],
            width: 3.0,
            color: StrokeColor::rgb(0, 0, 255),
            offset: Vec2::ZERO,
        }],
        0.8,
    );
    assert_eq!(r.render(&plan).unwrap(), r.render(&plan).unwrap());
}

#[test]
fn segment_draws_over_existing_frame() {
    let mut r = CpuRenderer::new();
    let mut frame = FrameRGBA::solid(small(), [255, 255, 255]);
    r.render_stroke_segment(
        &mut frame,
        Affine::IDENTITY,
        Point::new(10.0, 30.0),
        Point::new(50.0, 30.0),
        StrokeColor::rgb(0, 128, 0),
        6.0,
        1.0,
    )
    .unwrap();
    assert_eq!(frame.pixel(30, 30), Some([0, 128, 0, 255]));
    assert_eq!(frame.pixel(30, 5), Some([255, 255, 255, 255]));
}

#[test]
fn coincident_polyline_points_draw_a_round_dot() {
    let mut r = CpuRenderer::new();
    let plan = plan_with(
        vec![DrawOp::Polyline {
            points: vec![Point::new(30.0, 24.0), Point::new(30.0, 24.0)],
            width: 20.0,
            color: StrokeColor::BLACK,
            offset: Vec2::ZERO,
        }],
        1.0,
    );
    assert_eq!(plan.op_count(), 1);
    let frame = r.render(&plan).unwrap();
    assert_eq!(frame.pixel(30, 24), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(37, 24), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(45, 24), Some([255, 255, 255, 255]));
}

#[test]
fn zero_length_segment_draws_a_dot() {
    let mut r = CpuRenderer::new();
    let mut frame = FrameRGBA::solid(small(), [255, 255, 255]);
    r.render_stroke_segment(
        &mut frame,
        Affine::IDENTITY,
        Point::new(20.0, 20.0),
        Point::new(20.0, 20.0),
        StrokeColor::rgb(0, 128, 0),
        10.0,
        1.0,
    )
    .unwrap();
    assert_eq!(frame.pixel(20, 20), Some([0, 128, 0, 255]));
    assert_eq!(frame.pixel(20, 40), Some([255, 255, 255, 255]));
}
