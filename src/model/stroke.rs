use crate::{
    foundation::{color::StrokeColor, core::Point},
    model::ids::StrokeId,
};

/// Drawing tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Adds strokes.
    #[default]
    Pen,
    /// Removes whole strokes it touches. Never stored on a stroke.
    Eraser,
}

/// A freehand polyline in world space.
///
/// Only `points` changes after creation; the animation baseline, color and phase are fixed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Stable id.
    pub id: StrokeId,
    /// World-space points in drawing order; never empty.
    pub points: Vec<Point>,
    /// Stroke color.
    pub color: StrokeColor,
    /// Width at creation. Kept alongside `original_size` for file compatibility.
    pub size: f64,
    /// Always [`Tool::Pen`] for stored strokes.
    pub tool: Tool,
    /// Baseline width that breathing oscillates around.
    pub original_size: f64,
    /// Live clock value at creation, used as the animation phase offset.
    pub birth_time: f64,
}

impl Stroke {
    /// New pen stroke starting at `first`.
    pub fn new(first: Point, color: StrokeColor, size: f64, birth_time: f64) -> Self {
        Self::from_points(vec![first], color, size, birth_time)
    }

    /// New pen stroke from a complete point list.
    pub fn from_points(points: Vec<Point>, color: StrokeColor, size: f64, birth_time: f64) -> Self {
        Self {
            id: StrokeId::fresh(),
            points,
            color,
            size,
            tool: Tool::Pen,
            original_size: size,
            birth_time,
        }
    }

    /// Append a point while drawing.
    pub fn push_point(&mut self, p: Point) {
        self.points.push(p);
    }

    /// A single-point stroke renders as a filled dot.
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }

    /// Most recent point.
    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// True when any point lies within `radius` of `center` (inclusive).
    pub fn touches(&self, center: Point, radius: f64) -> bool {
        self.points
            .iter()
            .any(|&p| crate::foundation::math::point_in_circle(p, center, radius))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/stroke.rs"]
mod tests;
