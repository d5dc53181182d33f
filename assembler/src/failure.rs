//! Records of best-effort per-file faults.
//!
//! Filtering and archiving keep going when a single file cannot be read or
//! written. Each such fault is captured as a [`FileFailure`] and handed back
//! to the caller so it can decide whether to report or escalate.

use camino::Utf8PathBuf;
use std::fmt;

/// The assembly phase in which a per-file fault happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePhase {
    /// Copying or token-filtering into the staging directory.
    Filter,
    /// Reading a file or writing its archive entry.
    Archive,
    /// Finalising the archive stream.
    Finish,
}

impl fmt::Display for FailurePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Filter => "filter",
            Self::Archive => "archive",
            Self::Finish => "finish",
        };
        f.write_str(label)
    }
}

/// A single file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// The file (or archive) the fault relates to.
    pub path: Utf8PathBuf,
    /// Where in the pipeline the fault happened.
    pub phase: FailurePhase,
    /// Rendered form of the underlying error.
    pub message: String,
}

impl FileFailure {
    /// Create a failure record from any displayable error.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, phase: FailurePhase, err: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            phase,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.phase, self.path, self.message)
    }
}
