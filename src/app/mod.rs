//! Editor session and keyboard command mapping.

/// Session state and intent-level operations.
pub mod session;
/// Keyboard shortcuts.
pub mod shortcuts;

pub use session::Session;
pub use shortcuts::{Command, command_for};
