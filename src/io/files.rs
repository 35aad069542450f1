use std::path::Path;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::foundation::error::{DrawerzError, DrawerzResult};

/// What an incoming file should be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    /// A `.drz` sketch that replaces the document.
    Sketch,
    /// Vector markup appended to the active layer.
    Svg,
}

/// Route a file by its extension (case-insensitive).
pub fn classify_import(path: impl AsRef<Path>) -> DrawerzResult<ImportKind> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "drz" => Ok(ImportKind::Sketch),
        "svg" => Ok(ImportKind::Svg),
        "psd" | "clip" => Err(DrawerzError::unsupported(format!(
            "Direct import of .{} files is not supported. Please export as SVG.",
            ext.to_ascii_uppercase()
        ))),
        _ => Err(DrawerzError::unsupported(
            "Unsupported file. Please load a .drz or .svg file.",
        )),
    }
}

/// `YYYY-MM-DDTHH-MM-SS` in UTC, safe for file names.
pub fn timestamp(at: OffsetDateTime) -> DrawerzResult<String> {
    let full = at
        .to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| DrawerzError::Other(anyhow::anyhow!("format timestamp: {e}")))?;
    Ok(full.chars().take(19).collect::<String>().replace(':', "-"))
}

/// `drawerz_sketch_<timestamp>.drz`.
pub fn sketch_file_name(at: OffsetDateTime) -> DrawerzResult<String> {
    Ok(format!("drawerz_sketch_{}.drz", timestamp(at)?))
}

/// Name for an exported animation; `ext` is `mp4` or `gif`.
pub fn animation_file_name(at: OffsetDateTime, ext: &str) -> DrawerzResult<String> {
    Ok(format!("drawerz_animation_{}.{ext}", timestamp(at)?))
}

#[cfg(test)]
#[path = "../../tests/unit/io/files.rs"]
mod tests;
