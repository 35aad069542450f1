use super::*;
use crate::{
    foundation::{color::StrokeColor, core::Point},
    model::{layer::AnimationSettings, stroke::Stroke},
};

fn doc_with_strokes(n: usize) -> Document {
    let mut d = Document::default();
    for i in 0..n {
        d.layers[0].strokes.push(Stroke::new(
            Point::new(i as f64, 0.0),
            StrokeColor::BLACK,
            2.0,
            0.0,
        ));
    }
    d
}

#[test]
fn empty_history_cannot_undo_or_redo() {
    let mut h = History::default();
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    let mut d = Document::default();
    let before = d.clone();
    assert!(!h.undo_document(&mut d));
    assert!(!h.redo_document(&mut d));
    assert_eq!(d, before);
}

#[test]
fn undo_then_redo_restores_both_states() {
    let mut h = History::default();
    let mut d = doc_with_strokes(0);
    h.record_document(&d);
    d.layers[0]
        .strokes
        .push(Stroke::new(Point::ZERO, StrokeColor::BLACK, 2.0, 0.0));
    let after = d.clone();

    assert!(h.undo_document(&mut d));
    assert_eq!(d.stroke_count(), 0);
    assert!(h.can_redo());

    assert!(h.redo_document(&mut d));
    assert_eq!(d, after);
    assert!(!h.can_redo());
}

#[test]
fn record_clears_redo() {
    let mut h = History::default();
    let mut d = doc_with_strokes(1);
    h.record_document(&d);
    d.clear_all_layers();
    h.undo_document(&mut d);
    assert_eq!(h.redo_len(), 1);
    h.record_document(&d);
    assert!(!h.can_redo());
}

#[test]
fn depth_is_capped_with_oldest_evicted() {
    let mut h = History::new(3);
    for i in 0..5 {
        h.record(Snapshot::capture(&doc_with_strokes(i)));
    }
    assert_eq!(h.undo_len(), 3);
    let mut d = doc_with_strokes(99);
    let mut seen = Vec::new();
    while h.undo_document(&mut d) {
        seen.push(d.stroke_count());
    }
    assert_eq!(seen, [4, 3, 2]);
}

#[test]
fn restore_replaces_active_selection() {
    let mut h = History::default();
    let mut d = Document::default();
    let original_active = d.active_layer_id.clone();
    h.record_document(&d);
    d.create_layer(AnimationSettings::default());
    assert_ne!(d.active_layer_id, original_active);
    h.undo_document(&mut d);
    assert_eq!(d.active_layer_id, original_active);
    assert_eq!(d.layers.len(), 1);
}
