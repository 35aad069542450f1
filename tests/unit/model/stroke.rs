use super::*;

#[test]
fn new_stroke_is_a_pen_dot() {
    let s = Stroke::new(Point::new(1.0, 2.0), StrokeColor::BLACK, 8.0, 42.0);
    assert!(s.is_dot());
    assert_eq!(s.tool, Tool::Pen);
    assert_eq!(s.original_size, 8.0);
    assert_eq!(s.birth_time, 42.0);
}

#[test]
fn push_point_turns_dot_into_polyline() {
    let mut s = Stroke::new(Point::new(0.0, 0.0), StrokeColor::BLACK, 4.0, 0.0);
    s.push_point(Point::new(5.0, 5.0));
    assert!(!s.is_dot());
    assert_eq!(s.last_point(), Some(Point::new(5.0, 5.0)));
}

#[test]
fn serializes_with_camel_case_fields() {
    let s = Stroke::from_points(
        vec![Point::new(1.0, 2.0)],
        StrokeColor::rgb(255, 0, 0),
        3.0,
        7.0,
    );
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["originalSize"], 3.0);
    assert_eq!(v["birthTime"], 7.0);
    assert_eq!(v["tool"], "pen");
    assert_eq!(v["color"], "#ff0000");
    assert_eq!(v["points"][0]["x"], 1.0);
}

#[test]
fn touches_is_inclusive() {
    let s = Stroke::from_points(
        vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        StrokeColor::BLACK,
        2.0,
        0.0,
    );
    assert!(s.touches(Point::new(100.0, 5.0), 5.0));
    assert!(!s.touches(Point::new(50.0, 5.0), 5.0));
}
