use super::*;

#[test]
fn hex_roundtrips_lowercase() {
    let c = StrokeColor::from_hex("#FF8000").unwrap();
    assert_eq!(c, StrokeColor::rgb(255, 128, 0));
    assert_eq!(c.to_hex(), "#ff8000");
    assert_eq!(StrokeColor::from_hex("#f80").unwrap(), StrokeColor::rgb(255, 136, 0));
    assert!(StrokeColor::from_hex("#12345").is_err());
    assert!(StrokeColor::from_hex("#gg0000").is_err());
}

#[test]
fn css_forms() {
    assert_eq!(StrokeColor::from_css("red"), Some(StrokeColor::rgb(255, 0, 0)));
    assert_eq!(StrokeColor::from_css(" Navy "), Some(StrokeColor::rgb(0, 0, 128)));
    assert_eq!(
        StrokeColor::from_css("rgb(10, 20, 30)"),
        Some(StrokeColor::rgb(10, 20, 30))
    );
    assert_eq!(
        StrokeColor::from_css("rgb(100%, 0%, 50%)"),
        Some(StrokeColor::rgb(255, 0, 128))
    );
    assert_eq!(
        StrokeColor::from_css("rgb(50%, 20%, 0%)"),
        Some(StrokeColor::rgb(128, 51, 0))
    );
    assert_eq!(StrokeColor::from_css("none"), None);
    assert_eq!(StrokeColor::from_css("url(#grad)"), None);
}

#[test]
fn serde_uses_hex_string() {
    let v = serde_json::to_value(StrokeColor::rgb(1, 2, 3)).unwrap();
    assert_eq!(v, serde_json::json!("#010203"));
    let back: StrokeColor = serde_json::from_value(serde_json::json!("blue")).unwrap();
    assert_eq!(back, StrokeColor::rgb(0, 0, 255));
    assert!(serde_json::from_value::<StrokeColor>(serde_json::json!("nope")).is_err());
}
