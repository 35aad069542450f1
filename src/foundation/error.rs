/// Convenience result type used across drawerz.
pub type DrawerzResult<T> = Result<T, DrawerzError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DrawerzError {
    /// Invalid user-provided arguments or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A user action was refused before any mutation happened.
    #[error("action refused: {0}")]
    Precondition(String),

    /// Malformed sketch file or vector markup.
    #[error("parse error: {0}")]
    Parse(String),

    /// The execution environment lacks a required capability.
    #[error("environment error: {0}")]
    Environment(String),

    /// Import of a file type that is deliberately not supported.
    #[error("unsupported import: {0}")]
    Unsupported(String),

    /// Failure while producing or encoding export frames.
    #[error("export error{}: {message}", frame_suffix(.frame))]
    Export {
        /// 0-based frame index that failed, when the failure is tied to one frame.
        frame: Option<u64>,
        /// Underlying failure message.
        message: String,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn frame_suffix(frame: &Option<u64>) -> String {
    match frame {
        Some(f) => format!(" at frame {}", f + 1),
        None => String::new(),
    }
}

impl DrawerzError {
    /// Build a [`DrawerzError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrawerzError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`DrawerzError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`DrawerzError::Environment`] value.
    pub fn environment(msg: impl Into<String>) -> Self {
        Self::Environment(msg.into())
    }

    /// Build a [`DrawerzError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`DrawerzError::Export`] value, optionally tied to a frame.
    pub fn export(frame: Option<u64>, msg: impl Into<String>) -> Self {
        Self::Export {
            frame,
            message: msg.into(),
        }
    }

    /// Short user-facing title for notification dialogs.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid Input",
            Self::Precondition(_) => "Action Denied",
            Self::Parse(_) => "Load Error",
            Self::Environment(_) => "Export Prerequisite Missing",
            Self::Unsupported(_) => "Import Not Supported",
            Self::Export { .. } => "Export Error",
            Self::Other(_) => "Error",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
