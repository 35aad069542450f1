//! Persistence and file naming.

/// Timestamped output names and import routing by extension.
pub mod files;
/// The `.drz` sketch format.
pub mod sketch;
