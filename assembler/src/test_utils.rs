//! Shared test utilities for the docs assembler crate.
//!
//! In-memory collaborators that record what the goals asked of them, for use
//! by behaviour tests that should not touch a real repository or run real
//! test commands.

use crate::attach::{ArtifactAttacher, AttachedArtifact};
use crate::error::{AssemblerError, Result};
use crate::install::{ArtifactInstaller, InstallCoordinates};
use crate::test_runner::TestRunner;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;

/// Records every attachment request.
#[derive(Debug, Default)]
pub struct RecordingAttacher {
    attached: RefCell<Vec<AttachedArtifact>>,
}

impl RecordingAttacher {
    /// Create an attacher with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the attachments recorded so far.
    #[must_use]
    pub fn attached(&self) -> Vec<AttachedArtifact> {
        self.attached.borrow().clone()
    }
}

impl ArtifactAttacher for RecordingAttacher {
    fn attach(&self, artifact: &AttachedArtifact) -> Result<()> {
        self.attached.borrow_mut().push(artifact.clone());
        Ok(())
    }
}

/// Records installation requests and reports a path under a fake root.
#[derive(Debug)]
pub struct RecordingInstaller {
    root: Utf8PathBuf,
    installed: RefCell<Vec<(InstallCoordinates, Utf8PathBuf)>>,
}

impl RecordingInstaller {
    /// Create an installer that pretends to install under `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            installed: RefCell::new(Vec::new()),
        }
    }

    /// Return the `(coordinates, file)` pairs recorded so far.
    #[must_use]
    pub fn installed(&self) -> Vec<(InstallCoordinates, Utf8PathBuf)> {
        self.installed.borrow().clone()
    }
}

impl ArtifactInstaller for RecordingInstaller {
    fn install(&self, coordinates: &InstallCoordinates, file: &Utf8Path) -> Result<Utf8PathBuf> {
        self.installed
            .borrow_mut()
            .push((coordinates.clone(), file.to_owned()));
        Ok(self
            .root
            .join(coordinates.directory())
            .join(coordinates.artifact_filename()))
    }
}

/// A test runner with a fixed verdict that records the filters it ran.
#[derive(Debug)]
pub struct StubTestRunner {
    passes: bool,
    runs: RefCell<Vec<String>>,
}

impl StubTestRunner {
    /// A runner whose tests always pass.
    #[must_use]
    pub fn passing() -> Self {
        Self {
            passes: true,
            runs: RefCell::new(Vec::new()),
        }
    }

    /// A runner whose tests always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            passes: false,
            runs: RefCell::new(Vec::new()),
        }
    }

    /// Return the filters run so far.
    #[must_use]
    pub fn runs(&self) -> Vec<String> {
        self.runs.borrow().clone()
    }
}

impl TestRunner for StubTestRunner {
    fn run_tests(&self, filter: &str) -> Result<()> {
        self.runs.borrow_mut().push(filter.to_owned());
        if self.passes {
            Ok(())
        } else {
            Err(AssemblerError::TestsFailed {
                filter: filter.to_owned(),
                reason: "stubbed failure".to_owned(),
            })
        }
    }
}
