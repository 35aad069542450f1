use crate::{
    foundation::{color::StrokeColor, core::Point},
    history::History,
    model::{document::Document, ids::StrokeId, stroke::Stroke, stroke::Tool},
};

/// Kind of device behind a pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerKind {
    #[default]
    /// Mouse; only the main button draws.
    Mouse,
    /// Stylus.
    Pen,
    /// Finger.
    Touch,
}

/// One pointer event, already mapped into world space by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Host pointer id, used for capture.
    pub pointer_id: u32,
    /// Only the primary pointer draws.
    pub is_primary: bool,
    /// Device kind.
    pub kind: PointerKind,
    /// Pressed button; `0` is the main mouse button.
    pub button: i16,
    /// Position in world space.
    pub position: Point,
}

impl PointerSample {
    /// Primary mouse sample with the main button.
    pub fn mouse(position: Point) -> Self {
        Self {
            pointer_id: 1,
            is_primary: true,
            kind: PointerKind::Mouse,
            button: 0,
            position,
        }
    }

    /// Same pointer at another position.
    pub fn at(self, position: Point) -> Self {
        Self { position, ..self }
    }
}

/// Host hook that routes all events of a pointer to the canvas while a gesture runs.
pub trait PointerCapture {
    /// Route further events of `pointer_id` to the canvas.
    fn capture(&mut self, pointer_id: u32);
    /// Stop routing events of `pointer_id`.
    fn release(&mut self, pointer_id: u32);
}

/// Capture sink for hosts without pointer capture.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer_id: u32) {}
    fn release(&mut self, _pointer_id: u32) {}
}

/// Current tool selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolState {
    /// Selected tool.
    pub tool: Tool,
    /// Pen width, and eraser diameter.
    pub size: f64,
    /// Pen color.
    pub color: StrokeColor,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            size: 10.0,
            color: StrokeColor::BLACK,
        }
    }
}

/// What the presentation layer should do after an input event.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEffect {
    /// Draw one new pen segment incrementally.
    Segment {
        /// Segment start point.
        from: Point,
        /// Segment end point.
        to: Point,
        /// Stroke color.
        color: StrokeColor,
        /// Stroke width.
        width: f64,
        /// Stroke opacity.
        opacity: f32,
    },
    /// Something was removed; re-render the whole scene.
    Redraw,
}

#[derive(Clone, Debug, PartialEq)]
enum GestureState {
    Idle,
    Drawing {
        pointer_id: u32,
        tool: Tool,
        last: Point,
        stroke: Option<StrokeId>,
    },
}

/// Turns a pointer stream into stroke additions and erasures on the active layer.
///
/// One history snapshot is taken per gesture, at pointer-down.
#[derive(Clone, Debug)]
pub struct InteractionController {
    state: GestureState,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    /// Idle controller.
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Whether a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, GestureState::Drawing { .. })
    }

    /// Start a gesture. Returns `false` when the sample is ignored.
    pub fn pointer_down(
        &mut self,
        doc: &mut Document,
        history: &mut History,
        sample: &PointerSample,
        tools: &ToolState,
        now: f64,
        capture: &mut dyn PointerCapture,
    ) -> bool {
        if !sample.is_primary {
            return false;
        }
        if sample.kind == PointerKind::Mouse && sample.button != 0 {
            return false;
        }
        if !doc.active_layer().is_some_and(|l| l.is_visible) {
            return false;
        }

        history.record_document(doc);
        capture.capture(sample.pointer_id);

        let stroke = match tools.tool {
            Tool::Pen => {
                let s = Stroke::new(sample.position, tools.color, tools.size, now);
                let id = s.id.clone();
                if let Some(layer) = doc.active_layer_mut() {
                    layer.strokes.push(s);
                }
                Some(id)
            }
            Tool::Eraser => None,
        };

        tracing::trace!(tool = ?tools.tool, pointer = sample.pointer_id, "gesture started");
        self.state = GestureState::Drawing {
            pointer_id: sample.pointer_id,
            tool: tools.tool,
            last: sample.position,
            stroke,
        };
        true
    }

    /// Process coalesced move samples in order.
    pub fn pointer_move(
        &mut self,
        doc: &mut Document,
        samples: &[PointerSample],
        tools: &ToolState,
    ) -> Vec<ControllerEffect> {
        let mut effects = Vec::new();
        for sample in samples {
            if !sample.is_primary {
                continue;
            }
            let GestureState::Drawing {
                tool, last, stroke, ..
            } = &mut self.state
            else {
                break;
            };
            let Some(layer) = doc.active_layer_mut() else {
                break;
            };
            if !layer.is_visible {
                break;
            }
            let p = sample.position;
            let mut abort = false;
            match *tool {
                Tool::Eraser => {
                    let radius = tools.size / 2.0;
                    let before = layer.strokes.len();
                    // Topmost first so indices stay valid while removing.
                    for i in (0..layer.strokes.len()).rev() {
                        let s = &layer.strokes[i];
                        if s.tool == Tool::Pen && s.touches(p, radius) {
                            layer.strokes.remove(i);
                        }
                    }
                    if layer.strokes.len() != before
                        && effects.last() != Some(&ControllerEffect::Redraw)
                    {
                        effects.push(ControllerEffect::Redraw);
                    }
                    *last = p;
                }
                Tool::Pen => {
                    let opacity = layer.opacity;
                    let current = layer
                        .strokes
                        .last_mut()
                        .filter(|s| s.tool == Tool::Pen && Some(&s.id) == stroke.as_ref());
                    match current {
                        Some(current) => {
                            current.push_point(p);
                            effects.push(ControllerEffect::Segment {
                                from: *last,
                                to: p,
                                color: current.color,
                                width: current.size,
                                opacity,
                            });
                            *last = p;
                        }
                        None => abort = true,
                    }
                }
            }
            if abort {
                tracing::debug!("in-progress stroke vanished, aborting gesture");
                self.state = GestureState::Idle;
                break;
            }
        }
        effects
    }

    /// End the gesture on pointer up, leave or cancel.
    pub fn pointer_up(
        &mut self,
        sample: &PointerSample,
        capture: &mut dyn PointerCapture,
    ) -> Option<ControllerEffect> {
        if !sample.is_primary {
            return None;
        }
        let GestureState::Drawing {
            pointer_id, tool, ..
        } = std::mem::replace(&mut self.state, GestureState::Idle)
        else {
            return None;
        };
        capture.release(pointer_id);
        (tool == Tool::Eraser).then_some(ControllerEffect::Redraw)
    }

    /// Alias of [`Self::pointer_up`] for pointer-leave.
    pub fn pointer_leave(
        &mut self,
        sample: &PointerSample,
        capture: &mut dyn PointerCapture,
    ) -> Option<ControllerEffect> {
        self.pointer_up(sample, capture)
    }

    /// Alias of [`Self::pointer_up`] for pointer-cancel.
    pub fn pointer_cancel(
        &mut self,
        sample: &PointerSample,
        capture: &mut dyn PointerCapture,
    ) -> Option<ControllerEffect> {
        self.pointer_up(sample, capture)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interact/controller.rs"]
mod tests;
