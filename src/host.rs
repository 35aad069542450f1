//! Hooks the embedding application provides: user notification and file delivery.

use std::path::{Path, PathBuf};

use crate::foundation::error::{DrawerzError, DrawerzResult};

/// Modal user notification.
pub trait Notifier {
    /// Show a message; returns when acknowledged.
    fn alert(&mut self, title: &str, message: &str);
    /// Ask a yes/no question.
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Receives finished files (saved sketches, exported animations).
pub trait Downloader {
    /// Deliver `bytes` under `file_name`. Returns where it ended up, if on disk.
    fn deliver(&mut self, file_name: &str, bytes: Vec<u8>) -> DrawerzResult<Option<PathBuf>>;
}

/// Notifier for non-interactive hosts: alerts go to the log, confirmations get a fixed answer.
#[derive(Clone, Copy, Debug)]
pub struct LogNotifier {
    /// Answer to every confirmation.
    pub assume_yes: bool,
}

impl Notifier for LogNotifier {
    fn alert(&mut self, title: &str, message: &str) {
        tracing::info!(title, "{message}");
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        tracing::info!(title, answer = self.assume_yes, "{message}");
        self.assume_yes
    }
}

/// Records every call; confirmations return `answer`.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    /// Value returned from every confirmation.
    pub answer: bool,
    /// `(title, message)` of every alert.
    pub alerts: Vec<(String, String)>,
    /// `(title, message)` of every confirmation.
    pub confirms: Vec<(String, String)>,
}

impl RecordingNotifier {
    /// Notifier whose confirmations all return `answer`.
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    /// Whether any alert message contains `needle`.
    pub fn alerted(&self, needle: &str) -> bool {
        self.alerts.iter().any(|(_, m)| m.contains(needle))
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&mut self, title: &str, message: &str) {
        self.alerts.push((title.to_owned(), message.to_owned()));
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self.confirms.push((title.to_owned(), message.to_owned()));
        self.answer
    }
}

/// Writes delivered files into a directory.
#[derive(Clone, Debug)]
pub struct DirDownloader {
    dir: PathBuf,
}

impl DirDownloader {
    /// Deliver into `dir`, creating it on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Downloader for DirDownloader {
    fn deliver(&mut self, file_name: &str, bytes: Vec<u8>) -> DrawerzResult<Option<PathBuf>> {
        use anyhow::Context as _;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create output directory '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, &bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))
            .map_err(DrawerzError::from)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "file delivered");
        Ok(Some(path))
    }
}

/// Keeps delivered files in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryDownloader {
    /// `(file name, bytes)` in delivery order.
    pub files: Vec<(String, Vec<u8>)>,
}

impl Downloader for MemoryDownloader {
    fn deliver(&mut self, file_name: &str, bytes: Vec<u8>) -> DrawerzResult<Option<PathBuf>> {
        self.files.push((file_name.to_owned(), bytes));
        Ok(None)
    }
}
