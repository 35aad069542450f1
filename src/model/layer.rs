use crate::model::{ids::LayerId, stroke::Stroke};

/// Per-layer procedural animation parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSettings {
    /// Amplitude of the perpendicular point displacement.
    pub wiggle_intensity: f64,
    /// Amplitude of the stroke width oscillation.
    pub breathing_stroke: f64,
    /// Amplitude of the per-frame random stroke offset.
    pub shake_intensity: f64,
    /// Multiplier applied to the clock for every effect above.
    pub animation_speed: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            wiggle_intensity: 2.0,
            breathing_stroke: 2.0,
            shake_intensity: 0.0,
            animation_speed: 1.0,
        }
    }
}

/// Addresses one field of [`AnimationSettings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimParam {
    /// [`AnimationSettings::wiggle_intensity`].
    Wiggle,
    /// [`AnimationSettings::breathing_stroke`].
    Breathing,
    /// [`AnimationSettings::shake_intensity`].
    Shake,
    /// [`AnimationSettings::animation_speed`].
    Speed,
}

impl AnimationSettings {
    /// Read one parameter.
    pub fn get(&self, param: AnimParam) -> f64 {
        match param {
            AnimParam::Wiggle => self.wiggle_intensity,
            AnimParam::Breathing => self.breathing_stroke,
            AnimParam::Shake => self.shake_intensity,
            AnimParam::Speed => self.animation_speed,
        }
    }

    /// Write one parameter.
    pub fn set(&mut self, param: AnimParam, value: f64) {
        let slot = match param {
            AnimParam::Wiggle => &mut self.wiggle_intensity,
            AnimParam::Breathing => &mut self.breathing_stroke,
            AnimParam::Shake => &mut self.shake_intensity,
            AnimParam::Speed => &mut self.animation_speed,
        };
        *slot = value;
    }

    /// All amplitudes zero: the layer renders identically at every time.
    pub fn is_static(&self) -> bool {
        self.wiggle_intensity <= 0.0 && self.breathing_stroke <= 0.0 && self.shake_intensity <= 0.0
    }
}

impl std::str::FromStr for AnimParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wiggle" | "wiggleIntensity" => Ok(Self::Wiggle),
            "breathing" | "breathingStroke" => Ok(Self::Breathing),
            "shake" | "shakeIntensity" => Ok(Self::Shake),
            "speed" | "animationSpeed" => Ok(Self::Speed),
            other => Err(format!("unknown animation parameter \"{other}\"")),
        }
    }
}

/// An independently animated stack entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Stable id.
    pub id: LayerId,
    /// Display name.
    pub name: String,
    /// Paint order is vector order.
    pub strokes: Vec<Stroke>,
    /// Procedural animation applied to every stroke of the layer.
    pub animation_settings: AnimationSettings,
    /// Hidden layers are not rendered, drawn on or erased.
    pub is_visible: bool,
    /// Layer alpha in `[0, 1]`.
    pub opacity: f32,
}

impl Layer {
    /// Visible, fully opaque, empty layer.
    pub fn new(name: impl Into<String>, animation_settings: AnimationSettings) -> Self {
        Self {
            id: LayerId::fresh(),
            name: name.into(),
            strokes: Vec::new(),
            animation_settings,
            is_visible: true,
            opacity: 1.0,
        }
    }

    /// Set opacity, clamped to `0..=1`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Whether the layer has no strokes.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Visible and non-empty.
    pub fn contributes(&self) -> bool {
        self.is_visible && !self.strokes.is_empty()
    }

    /// Points across all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points.len()).sum()
    }
}
