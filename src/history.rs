//! Snapshot undo/redo.

use std::collections::VecDeque;

use crate::{
    foundation::core::ViewTransform,
    model::{document::Document, ids::LayerId, layer::Layer},
};

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 30;

/// Deep copy of everything an undo step restores.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Layer stack, bottom to top.
    pub layers: Vec<Layer>,
    /// Selected layer.
    pub active_layer_id: Option<LayerId>,
    /// Persisted view transform.
    pub view_transform: ViewTransform,
}

impl Snapshot {
    /// Deep copy of the document state.
    pub fn capture(doc: &Document) -> Self {
        Self {
            layers: doc.layers.clone(),
            active_layer_id: doc.active_layer_id.clone(),
            view_transform: doc.view_transform,
        }
    }

    /// Replace the document state wholesale.
    pub fn apply_to(self, doc: &mut Document) {
        doc.layers = self.layers;
        doc.active_layer_id = self.active_layer_id;
        doc.view_transform = self.view_transform;
    }
}

/// Bounded undo stack with a redo stack that any new record invalidates.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    /// History keeping at most `max_depth` undo steps (at least one).
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            undo: VecDeque::with_capacity(max_depth),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Maximum number of undo steps kept.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Push a pre-mutation snapshot, evicting the oldest beyond the cap, and clear redo.
    pub fn record(&mut self, snap: Snapshot) {
        if self.undo.len() >= self.max_depth {
            self.undo.pop_front();
            tracing::debug!(max_depth = self.max_depth, "history full, evicted oldest snapshot");
        }
        self.undo.push_back(snap);
        self.redo.clear();
    }

    /// Convenience for `record(Snapshot::capture(doc))`.
    pub fn record_document(&mut self, doc: &Document) {
        self.record(Snapshot::capture(doc));
    }

    /// Pop the latest undo entry, pushing `current` onto redo. `None` leaves both stacks alone.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let prev = self.undo.pop_back()?;
        self.redo.push(current);
        Some(prev)
    }

    /// Pop the latest redo entry, pushing `current` onto undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        if self.undo.len() >= self.max_depth {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
    }

    /// Undo against a live document. Returns `true` when something was restored.
    pub fn undo_document(&mut self, doc: &mut Document) -> bool {
        match self.undo(Snapshot::capture(doc)) {
            Some(prev) => {
                prev.apply_to(doc);
                true
            }
            None => false,
        }
    }

    /// Redo against a live document. Returns `true` when something was restored.
    pub fn redo_document(&mut self, doc: &mut Document) -> bool {
        match self.redo(Snapshot::capture(doc)) {
            Some(next) => {
                next.apply_to(doc);
                true
            }
            None => false,
        }
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps held.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps held.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
#[path = "../tests/unit/history.rs"]
mod tests;
