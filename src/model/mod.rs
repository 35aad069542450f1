//! Layer/stroke document model.

/// Layer stack and the operations that reorder, rename and clear it.
pub mod document;
/// Stable string identifiers for layers and strokes.
pub mod ids;
/// A single layer with its animation settings.
pub mod layer;
/// Freehand strokes.
pub mod stroke;
