//! Vector markup import.

/// SVG element to point-sequence conversion.
pub mod svg;
