//! Project descriptor loading.
//!
//! Projects describe themselves in a `docs.toml` file at their base
//! directory. The `[project]` table supplies coordinates and the build output
//! directory, `[properties]` supplies the values used by token filtering, and
//! the `[docs]` and `[install]` tables configure the two goals. Command-line
//! flags are layered on top by the binary.

use crate::project::{DEFAULT_BUILD_DIRNAME, Project, ProjectCoordinates};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// File name of the project descriptor looked up in the base directory.
pub const CONFIG_FILENAME: &str = "docs.toml";

/// Errors raised while loading a project descriptor.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The descriptor could not be read.
    #[error("failed to read {path}")]
    Read {
        /// Path of the descriptor.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The descriptor is not valid TOML or does not match the schema.
    #[error("invalid {path}")]
    Parse {
        /// Path of the descriptor.
        path: Utf8PathBuf,
        /// The TOML deserialisation error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// A project coordinate cannot be used in file names.
    #[error("invalid {field} \"{value}\": {reason}")]
    InvalidCoordinate {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Description of the violated constraint.
        reason: String,
    },
}

/// The parsed contents of `docs.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Project identity and layout.
    pub project: ProjectSection,
    /// Values substituted into filtered files.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Assembly settings shared by both goals.
    #[serde(default)]
    pub docs: DocsSection,
    /// Settings used only by the install goal.
    #[serde(default)]
    pub install: InstallSection,
}

/// The `[project]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Group identifier, e.g. `org.neo4j.doc`.
    pub group_id: String,
    /// Artifact identifier; the first component of the archive name.
    pub artifact_id: String,
    /// Project version; the second component of the archive name.
    pub version: String,
    /// Build output directory, relative to the base directory.
    #[serde(default = "ProjectSection::default_build_directory")]
    pub build_directory: String,
}

impl ProjectSection {
    fn default_build_directory() -> String {
        DEFAULT_BUILD_DIRNAME.to_owned()
    }
}

/// The `[docs]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DocsSection {
    /// Directories to include. Replaces the defaults (`src/docs` and
    /// `<build>/docs`) when present.
    pub source_directories: Option<Vec<Utf8PathBuf>>,
    /// Substitute `${...}` and `@...@` tokens in text files.
    pub filter: bool,
    /// Log a warning whenever a later source directory overrides an entry.
    pub warn_on_conflicts: bool,
    /// Fail the run when any single file could not be filtered or archived.
    pub fail_on_file_errors: bool,
}

/// The `[install]` table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSection {
    /// Root of the local artifact repository [default: `~/.m2/repository`].
    pub local_repository: Option<Utf8PathBuf>,
    /// Command used to run a named test; `{test}` is replaced by the filter.
    pub test_command: Option<Vec<String>>,
    /// Seconds to wait for the test command before giving up.
    pub test_timeout_secs: u64,
}

impl InstallSection {
    const DEFAULT_TEST_TIMEOUT_SECS: u64 = 30 * 60;
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            local_repository: None,
            test_command: None,
            test_timeout_secs: Self::DEFAULT_TEST_TIMEOUT_SECS,
        }
    }
}

impl DocsConfig {
    /// Load and parse the descriptor at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents do not match the schema.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(path, &source)
    }

    /// Parse descriptor contents; `path` is used only for error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `source` does not match the schema.
    pub fn from_toml_str(path: &Utf8Path, source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source: Box::new(source),
        })
    }

    /// Build the [`Project`] described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCoordinate`] when a coordinate is not
    /// usable in file names.
    pub fn project(&self, base_dir: &Utf8Path) -> Result<Project, ConfigError> {
        let coordinates = ProjectCoordinates::parse(
            &self.project.group_id,
            &self.project.artifact_id,
            &self.project.version,
        )?;
        Ok(Project::new(coordinates, base_dir)
            .with_build_dir(self.project.build_directory.as_str())
            .with_properties(self.properties.clone()))
    }
}
