use super::*;
use crate::render::shake::{CenteredShake, ScriptedShake};

fn still() -> AnimationSettings {
    AnimationSettings {
        wiggle_intensity: 0.0,
        breathing_stroke: 0.0,
        shake_intensity: 0.0,
        animation_speed: 1.0,
    }
}

fn doc_with(anim: AnimationSettings, strokes: Vec<Stroke>) -> Document {
    let mut d = Document::new(anim);
    d.layers[0].strokes = strokes;
    d
}

fn line(points: &[(f64, f64)]) -> Stroke {
    Stroke::from_points(
        points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        StrokeColor::BLACK,
        10.0,
        0.0,
    )
}

#[test]
fn single_point_becomes_disc_with_half_width_radius() {
    let d = doc_with(still(), vec![line(&[(5.0, 5.0)])]);
    let plan = build_scene_plan(&d, 0.0, Canvas::WORLD, &mut CenteredShake);
    assert_eq!(
        plan.layers[0].ops,
        vec![DrawOp::Disc {
            center: Point::new(5.0, 5.0),
            radius: 5.0,
            color: StrokeColor::BLACK,
            offset: Vec2::ZERO,
        }]
    );
}

#[test]
fn multi_point_never_becomes_disc() {
    let d = doc_with(
        AnimationSettings::default(),
        vec![line(&[(0.0, 0.0), (10.0, 0.0)])],
    );
    for t in [0.0, 7.0, 123.0] {
        let plan = build_scene_plan(&d, t, Canvas::WORLD, &mut CenteredShake);
        assert!(!plan.layers[0].ops[0].is_disc());
    }
}

#[test]
fn hidden_and_empty_layers_are_skipped() {
    let mut d = doc_with(still(), vec![line(&[(1.0, 1.0)])]);
    d.create_layer(still());
    assert_eq!(
        build_scene_plan(&d, 0.0, Canvas::WORLD, &mut CenteredShake)
            .layers
            .len(),
        1
    );
    d.layers[0].is_visible = false;
    let plan = build_scene_plan(&d, 0.0, Canvas::WORLD, &mut CenteredShake);
    assert!(plan.layers.is_empty());
}

#[test]
fn breathing_follows_sine_and_floors_at_one() {
    let anim = AnimationSettings {
        breathing_stroke: 3.0,
        ..still()
    };
    let mut s = line(&[(0.0, 0.0), (1.0, 0.0)]);
    s.birth_time = 2.0;
    let t = 40.0;
    let expected = 10.0 + (t * 0.1 + 2.0_f64).sin() * 3.0;
    assert!((breathing_width(&s, &anim, t) - expected).abs() < 1e-12);

    s.original_size = 0.5;
    let big = AnimationSettings {
        breathing_stroke: 100.0,
        ..still()
    };
    // sin(0) is zero, so pick a time where the sine is strongly negative.
    let trough = (3.0 * std::f64::consts::FRAC_PI_2 - 2.0) / 0.1;
    assert_eq!(breathing_width(&s, &big, trough), 1.0);
}

#[test]
fn wiggle_keeps_first_point_and_uses_original_neighbors() {
    let anim = AnimationSettings {
        wiggle_intensity: 4.0,
        ..still()
    };
    let s = line(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
    let t = 3.0;
    let pts = wiggle_points(&s, &anim, t);
    assert_eq!(pts[0], Point::new(0.0, 0.0));
    for (i, p) in pts.iter().enumerate().skip(1) {
        let amount = (t * 0.1 + i as f64 * 0.5).sin() * 4.0;
        assert!((p.x - 10.0 * i as f64).abs() < 1e-9);
        assert!((p.y - amount).abs() < 1e-9);
    }
}

#[test]
fn shake_draws_x_then_y_per_stroke() {
    let anim = AnimationSettings {
        shake_intensity: 10.0,
        animation_speed: 2.0,
        ..still()
    };
    let d = doc_with(anim, vec![line(&[(0.0, 0.0)]), line(&[(1.0, 1.0)])]);
    let mut shake = ScriptedShake::new(vec![1.0, 0.0, 0.75, 0.25]);
    let plan = build_scene_plan(&d, 0.0, Canvas::WORLD, &mut shake);
    assert_eq!(shake.draws(), 4);
    assert_eq!(plan.layers[0].ops[0].offset(), Vec2::new(10.0, -10.0));
    assert_eq!(plan.layers[0].ops[1].offset(), Vec2::new(5.0, -5.0));
}

#[test]
fn zero_amplitudes_are_time_invariant() {
    assert!(still().is_static());
    assert!(!AnimationSettings::default().is_static());
    let d = doc_with(still(), vec![line(&[(0.0, 0.0), (30.0, 40.0), (90.0, 10.0)])]);
    let a = build_scene_plan(&d, 0.0, Canvas::WORLD, &mut CenteredShake);
    let b = build_scene_plan(&d, 987.5, Canvas::WORLD, &mut CenteredShake);
    assert_eq!(a, b);
}

#[test]
fn export_canvas_scales_world() {
    let d = doc_with(still(), vec![line(&[(0.0, 0.0)])]);
    let canvas = Canvas::new(960, 540).unwrap();
    let plan = build_scene_plan(&d, 0.0, canvas, &mut CenteredShake);
    assert_eq!(plan.transform, Affine::scale(0.5));
    assert_eq!(plan.background, StrokeColor::WHITE);
}
