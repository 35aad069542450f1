use crate::{
    foundation::{
        core::ViewTransform,
        error::DrawerzError,
    },
    model::{
        ids::LayerId,
        layer::{AnimParam, AnimationSettings, Layer},
    },
};

/// Refusals of layer-stack operations. Nothing is mutated when one of these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerOpError {
    #[error("cannot delete the last layer")]
    /// The stack must keep at least one layer.
    LastLayer,
    #[error("unknown layer \"{0}\"")]
    /// No layer has this id.
    UnknownLayer(LayerId),
    #[error("no active layer")]
    /// The operation needs an active layer and there is none.
    NoActiveLayer,
}

impl From<LayerOpError> for DrawerzError {
    fn from(e: LayerOpError) -> Self {
        DrawerzError::precondition(e.to_string())
    }
}

/// Direction for [`Document::move_layer`]. `Up` moves towards the top of the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerMove {
    /// Towards the top of the stack.
    Up,
    /// Towards the bottom of the stack.
    Down,
}

/// The layer stack, bottom to top, plus the active selection.
///
/// The active flag is never stored on layers; it is derived from `active_layer_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Bottom to top.
    pub layers: Vec<Layer>,
    /// Selected layer; the target of drawing and imports.
    pub active_layer_id: Option<LayerId>,
    /// Saved with the sketch; not used for rendering.
    pub view_transform: ViewTransform,
}

impl Document {
    /// One visible, active layer named `Layer 1`.
    pub fn new(defaults: AnimationSettings) -> Self {
        let first = Layer::new("Layer 1", defaults);
        let id = first.id.clone();
        Self {
            layers: vec![first],
            active_layer_id: Some(id),
            view_transform: ViewTransform::default(),
        }
    }

    /// Stack position of a layer.
    pub fn layer_index(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    /// Look up a layer by id, mutably.
    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    fn require_mut(&mut self, id: &LayerId) -> Result<&mut Layer, LayerOpError> {
        self.layers
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| LayerOpError::UnknownLayer(id.clone()))
    }

    /// The selected layer, if any.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer_id.as_ref().and_then(|id| self.layer(id))
    }

    /// The selected layer, mutably.
    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active_layer_id.clone()?;
        self.layer_mut(&id)
    }

    /// Whether `id` is the selected layer.
    pub fn is_active(&self, id: &LayerId) -> bool {
        self.active_layer_id.as_ref() == Some(id)
    }

    /// Select a layer. Not an undo step.
    pub fn set_active_layer(&mut self, id: &LayerId) -> Result<(), LayerOpError> {
        if self.layer_index(id).is_none() {
            return Err(LayerOpError::UnknownLayer(id.clone()));
        }
        self.active_layer_id = Some(id.clone());
        Ok(())
    }

    /// Insert a new layer directly above the active one and activate it.
    pub fn create_layer(&mut self, defaults: AnimationSettings) -> LayerId {
        let layer = Layer::new(format!("Layer {}", self.layers.len() + 1), defaults);
        let id = layer.id.clone();
        let active_idx = self
            .active_layer_id
            .as_ref()
            .and_then(|a| self.layer_index(a));
        match active_idx {
            Some(i) if i + 1 < self.layers.len() => self.layers.insert(i + 1, layer),
            _ => self.layers.push(layer),
        }
        self.active_layer_id = Some(id.clone());
        id
    }

    /// Remove a layer. If it was active, the layer below it (or the new bottom) becomes active.
    pub fn delete_layer(&mut self, id: &LayerId) -> Result<Layer, LayerOpError> {
        if self.layers.len() <= 1 {
            return Err(LayerOpError::LastLayer);
        }
        let idx = self
            .layer_index(id)
            .ok_or_else(|| LayerOpError::UnknownLayer(id.clone()))?;
        let removed = self.layers.remove(idx);
        if self.is_active(id) {
            let next = idx.saturating_sub(1).min(self.layers.len() - 1);
            self.active_layer_id = Some(self.layers[next].id.clone());
        }
        Ok(removed)
    }

    /// Swap with the neighbor in `dir`. Returns `false` at the stack boundary.
    pub fn move_layer(&mut self, id: &LayerId, dir: LayerMove) -> Result<bool, LayerOpError> {
        let idx = self
            .layer_index(id)
            .ok_or_else(|| LayerOpError::UnknownLayer(id.clone()))?;
        let other = match dir {
            LayerMove::Up if idx + 1 < self.layers.len() => idx + 1,
            LayerMove::Down if idx > 0 => idx - 1,
            _ => return Ok(false),
        };
        self.layers.swap(idx, other);
        Ok(true)
    }

    /// Trimmed rename; a blank name falls back to `Layer {position}`.
    pub fn rename_layer(&mut self, id: &LayerId, name: &str) -> Result<(), LayerOpError> {
        let idx = self
            .layer_index(id)
            .ok_or_else(|| LayerOpError::UnknownLayer(id.clone()))?;
        let trimmed = name.trim();
        self.layers[idx].name = if trimmed.is_empty() {
            format!("Layer {}", idx + 1)
        } else {
            trimmed.to_owned()
        };
        Ok(())
    }

    /// Flip visibility, returning the new state.
    pub fn toggle_visibility(&mut self, id: &LayerId) -> Result<bool, LayerOpError> {
        let layer = self.require_mut(id)?;
        layer.is_visible = !layer.is_visible;
        Ok(layer.is_visible)
    }

    /// Percent in `0..=100`, clamped, stored as a fraction.
    pub fn set_opacity_percent(&mut self, id: &LayerId, percent: f64) -> Result<(), LayerOpError> {
        let layer = self.require_mut(id)?;
        layer.set_opacity((percent.clamp(0.0, 100.0) / 100.0) as f32);
        Ok(())
    }

    /// Set one animation parameter on a layer.
    pub fn set_animation_param(
        &mut self,
        id: &LayerId,
        param: AnimParam,
        value: f64,
    ) -> Result<(), LayerOpError> {
        let layer = self.require_mut(id)?;
        layer.animation_settings.set(param, value);
        Ok(())
    }

    /// Drop every stroke of one layer. Returns how many were removed.
    pub fn clear_layer(&mut self, id: &LayerId) -> Result<usize, LayerOpError> {
        let layer = self.require_mut(id)?;
        let n = layer.strokes.len();
        layer.strokes.clear();
        Ok(n)
    }

    /// Drop every stroke of every layer. Returns how many were removed.
    pub fn clear_all_layers(&mut self) -> usize {
        self.layers
            .iter_mut()
            .map(|l| {
                let n = l.strokes.len();
                l.strokes.clear();
                n
            })
            .sum()
    }

    /// At least one visible layer holds a stroke.
    pub fn has_visible_content(&self) -> bool {
        self.layers.iter().any(Layer::contributes)
    }

    /// Every layer is strokeless.
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Layer::is_empty)
    }

    /// Strokes across all layers.
    pub fn stroke_count(&self) -> usize {
        self.layers.iter().map(|l| l.strokes.len()).sum()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(AnimationSettings::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/document.rs"]
mod tests;
