//! Error types for the docs assembler.
//!
//! This module defines semantic error variants for the fatal failures of an
//! assembly or install run. Skippable conditions (missing or empty source
//! directories, an archive with no entries) and best-effort per-file faults
//! are not errors; they are logged and reported through
//! [`crate::failure::FileFailure`] records instead.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort an assembly or install run.
#[derive(Debug, Error)]
pub enum AssemblerError {
    /// A configured source path exists but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: Utf8PathBuf,
    },

    /// A source directory exists but its contents cannot be listed.
    #[error("can not read directory {path}: {reason}")]
    UnreadableDirectory {
        /// The offending directory.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// An archive from a previous run could not be removed.
    #[error("could not delete {path}")]
    DestinationNotDeletable {
        /// Path of the stale archive.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The build output directory could not be created.
    #[error("could not create output directory {path}")]
    OutputDirectory {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archive file itself could not be opened for writing.
    #[error("could not create archive {path}")]
    ArchiveCreation {
        /// Destination path of the archive.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The filtering staging directory could not be cleared.
    #[error("could not clear staging directory {path}")]
    StagingCleanup {
        /// The staging directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The project descriptor could not be loaded.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The artifact attachment collaborator rejected the archive.
    #[error("failed to attach {path}: {reason}")]
    AttachFailed {
        /// The archive that was being attached.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Per-file faults occurred and the run is configured to escalate them.
    #[error("{count} file(s) could not be assembled; first failure: {first}")]
    PartialAssembly {
        /// Number of recorded failures.
        count: usize,
        /// Rendered form of the first failure.
        first: String,
    },

    /// The requested test run did not succeed.
    #[error("tests matching {filter} failed: {reason}")]
    TestsFailed {
        /// The test filter expression that was run.
        filter: String,
        /// Description of the failure.
        reason: String,
    },

    /// The install goal found no docs to install.
    #[error("there are no docs to install")]
    NothingToInstall,

    /// Copying the archive into the local repository failed.
    #[error("failed to install {path}: {reason}")]
    InstallFailed {
        /// The file that was being installed.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// No local repository was configured and none could be derived.
    #[error("could not determine local repository; pass --local-repo")]
    LocalRepositoryUnknown,

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`AssemblerError`].
pub type Result<T> = std::result::Result<T, AssemblerError>;
