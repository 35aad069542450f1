use time::OffsetDateTime;

use crate::{
    app::session::Session,
    export::ExportFormat,
    foundation::error::DrawerzResult,
    host::{Downloader, Notifier},
    model::stroke::Tool,
};

/// An editor action reachable from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Save the sketch as `.drz`.
    Save,
    /// Ask the host for a file to open.
    Open,
    /// Export the animation as MP4.
    ExportMp4,
    /// Clear the active layer.
    ClearLayer,
    /// Clear every layer.
    ClearAll,
    /// Undo the last step.
    Undo,
    /// Redo the last undone step.
    Redo,
    /// Select the pen.
    Pen,
    /// Select the eraser.
    Eraser,
}

/// Map a key press to a command. `ctrl` covers Ctrl and Cmd; `key` is the logical key name.
///
/// Hosts should not forward keys typed into text fields.
pub fn command_for(key: &str, ctrl: bool, shift: bool) -> Option<Command> {
    let key = key.to_ascii_lowercase();
    match (key.as_str(), ctrl, shift) {
        ("s", true, _) => Some(Command::Save),
        ("o", true, _) => Some(Command::Open),
        ("e", true, _) => Some(Command::ExportMp4),
        ("delete" | "backspace", true, true) => Some(Command::ClearAll),
        ("delete" | "backspace", true, false) => Some(Command::ClearLayer),
        ("z", true, false) => Some(Command::Undo),
        ("y", true, _) | ("z", true, true) => Some(Command::Redo),
        ("p", false, _) => Some(Command::Pen),
        ("e", false, _) => Some(Command::Eraser),
        _ => None,
    }
}

impl<N: Notifier, D: Downloader> Session<N, D> {
    /// Execute a command. Returns `false` for commands the host must complete itself.
    pub fn run_command(&mut self, cmd: Command, now: OffsetDateTime) -> DrawerzResult<bool> {
        tracing::debug!(?cmd, "command");
        match cmd {
            Command::Save => {
                self.save(now)?;
            }
            Command::Open => return Ok(false),
            Command::ExportMp4 => {
                self.export(ExportFormat::Mp4, now)?;
            }
            Command::ClearLayer => {
                self.clear_active_layer()?;
            }
            Command::ClearAll => {
                self.clear_all_layers()?;
            }
            Command::Undo => {
                self.undo()?;
            }
            Command::Redo => {
                self.redo()?;
            }
            Command::Pen => self.set_tool(Tool::Pen),
            Command::Eraser => self.set_tool(Tool::Eraser),
        }
        Ok(true)
    }
}
