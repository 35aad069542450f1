//! Pointer input to document mutations.

/// Pen/eraser gesture state machine.
pub mod controller;
