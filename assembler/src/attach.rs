//! Attaching the docs archive to the build.
//!
//! An attached artifact is a secondary output of the build, identified by
//! the project coordinates plus a type and classifier. The
//! [`FileArtifactRegistry`] records attachments in
//! `<build>/attached-artifacts.json` so that later build steps can find
//! them.

use crate::error::{AssemblerError, Result};
use crate::project::Project;
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;

/// File name of the attachment registry inside the build directory.
pub const REGISTRY_FILENAME: &str = "attached-artifacts.json";

/// A secondary build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedArtifact {
    /// Group identifier of the owning project.
    pub group_id: String,
    /// Artifact identifier of the owning project.
    pub artifact_id: String,
    /// Version of the owning project.
    pub version: String,
    /// Artifact type, e.g. `jar`.
    #[serde(rename = "type")]
    pub artifact_type: String,
    /// Classifier distinguishing this output from the main artifact.
    pub classifier: String,
    /// Location of the file.
    pub file: Utf8PathBuf,
}

impl AttachedArtifact {
    /// Describe `file` as an attachment of `project`.
    #[must_use]
    pub fn new(project: &Project, artifact_type: &str, classifier: &str, file: &Utf8Path) -> Self {
        let coordinates = project.coordinates();
        Self {
            group_id: coordinates.group_id.to_string(),
            artifact_id: coordinates.artifact_id.to_string(),
            version: coordinates.version.to_string(),
            artifact_type: artifact_type.to_owned(),
            classifier: classifier.to_owned(),
            file: file.to_owned(),
        }
    }

    fn same_slot(&self, other: &Self) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
            && self.artifact_type == other.artifact_type
            && self.classifier == other.classifier
    }
}

/// Registers secondary outputs with the build.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactAttacher {
    /// Attach `artifact` to the current build.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblerError::AttachFailed`] when the attachment cannot
    /// be recorded.
    fn attach(&self, artifact: &AttachedArtifact) -> Result<()>;
}

/// Persists attachments to a JSON file, one entry per slot.
#[derive(Debug, Clone)]
pub struct FileArtifactRegistry {
    path: Utf8PathBuf,
}

impl FileArtifactRegistry {
    /// Use the registry file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the registry in the build directory of `project`.
    #[must_use]
    pub fn for_project(project: &Project) -> Self {
        Self::new(project.build_dir().join(REGISTRY_FILENAME))
    }

    /// Return the registry file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read the recorded attachments. A missing registry is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblerError::Io`] when the file exists but cannot be
    /// read, and [`AssemblerError::AttachFailed`] when it is not valid JSON.
    pub fn load(&self) -> Result<Vec<AttachedArtifact>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map_err(|e| AssemblerError::AttachFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn store(&self, artifacts: &[AttachedArtifact]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(artifacts).map_err(std::io::Error::other)?;
        fs::write(&self.path, json)
    }
}

impl ArtifactAttacher for FileArtifactRegistry {
    fn attach(&self, artifact: &AttachedArtifact) -> Result<()> {
        let mut artifacts = self.load().unwrap_or_else(|e| {
            warn!("Discarding unreadable attachment registry {}: {e}", self.path);
            Vec::new()
        });
        artifacts.retain(|existing| !existing.same_slot(artifact));
        artifacts.push(artifact.clone());

        self.store(&artifacts)
            .map_err(|e| AssemblerError::AttachFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        info!(
            "Attached {} ({}:{}) to {}:{}:{}",
            artifact.file,
            artifact.artifact_type,
            artifact.classifier,
            artifact.group_id,
            artifact.artifact_id,
            artifact.version
        );
        Ok(())
    }
}
