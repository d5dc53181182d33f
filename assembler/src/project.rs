//! Project identity and layout.
//!
//! A [`Project`] carries the coordinates used to name and install the docs
//! archive, the directories the assembler reads from and writes to, and the
//! property map that token filtering resolves against.

use crate::config::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::fmt;

/// Default build output directory, relative to the project base directory.
pub const DEFAULT_BUILD_DIRNAME: &str = "target";

macro_rules! coordinate {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Return the coordinate as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ConfigError;

            fn try_from(value: &str) -> Result<Self, ConfigError> {
                validate_coordinate($field, value)?;
                Ok(Self(value.to_owned()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> Result<Self, ConfigError> {
                validate_coordinate($field, &value)?;
                Ok(Self(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

coordinate!(
    /// A validated group identifier such as `org.neo4j.doc`.
    GroupId,
    "group_id"
);

coordinate!(
    /// A validated artifact identifier such as `neo4j-manual`.
    ArtifactId,
    "artifact_id"
);

coordinate!(
    /// A validated version string such as `1.9-SNAPSHOT`.
    Version,
    "version"
);

/// Coordinates are embedded in file names and repository paths, so they must
/// be non-empty and free of whitespace and path separators. Group
/// identifiers must also have no empty `.`-separated segments.
fn validate_coordinate(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if value.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if value == "." || value == ".." {
        Some("must not be a relative path component")
    } else if field == "group_id" && value.split('.').any(str::is_empty) {
        // Each segment becomes one repository directory.
        Some("must not contain empty segments")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidCoordinate {
            field,
            value: value.to_owned(),
            reason: reason.to_owned(),
        }),
        None => Ok(()),
    }
}

/// The identity of the project whose docs are assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCoordinates {
    /// The project's group identifier.
    pub group_id: GroupId,
    /// The project's artifact identifier.
    pub artifact_id: ArtifactId,
    /// The project's version.
    pub version: Version,
}

impl ProjectCoordinates {
    /// Validate and bundle raw coordinate strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCoordinate`] naming the first field that
    /// fails validation.
    pub fn parse(group_id: &str, artifact_id: &str, version: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            group_id: GroupId::try_from(group_id)?,
            artifact_id: ArtifactId::try_from(artifact_id)?,
            version: Version::try_from(version)?,
        })
    }
}

impl fmt::Display for ProjectCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A project: coordinates, directory layout, and filter properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    coordinates: ProjectCoordinates,
    base_dir: Utf8PathBuf,
    build_dir: Utf8PathBuf,
    properties: BTreeMap<String, String>,
}

impl Project {
    /// Create a project rooted at `base_dir` with the default build directory.
    #[must_use]
    pub fn new(coordinates: ProjectCoordinates, base_dir: impl Into<Utf8PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let build_dir = base_dir.join(DEFAULT_BUILD_DIRNAME);
        Self {
            coordinates,
            base_dir,
            build_dir,
            properties: BTreeMap::new(),
        }
    }

    /// Override the build output directory. Relative paths are resolved
    /// against the base directory.
    #[must_use]
    pub fn with_build_dir(mut self, build_dir: impl AsRef<Utf8Path>) -> Self {
        self.build_dir = self.resolve(build_dir.as_ref());
        self
    }

    /// Replace the user-defined filter properties.
    #[must_use]
    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Return the project coordinates.
    #[must_use]
    pub fn coordinates(&self) -> &ProjectCoordinates {
        &self.coordinates
    }

    /// Return the project base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Return the build output directory.
    #[must_use]
    pub fn build_dir(&self) -> &Utf8Path {
        &self.build_dir
    }

    /// Resolve `path` against the base directory unless it is absolute.
    #[must_use]
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Return the property map used for token filtering.
    ///
    /// User properties are merged with the built-in `project.*` entries; the
    /// built-ins win on a clash.
    #[must_use]
    pub fn filter_properties(&self) -> BTreeMap<String, String> {
        let mut merged = self.properties.clone();
        let builtins = [
            ("project.groupId", self.coordinates.group_id.to_string()),
            ("project.artifactId", self.coordinates.artifact_id.to_string()),
            ("project.version", self.coordinates.version.to_string()),
            ("project.basedir", self.base_dir.to_string()),
            ("project.build.directory", self.build_dir.to_string()),
        ];
        for (key, value) in builtins {
            merged.insert(key.to_owned(), value);
        }
        merged
    }
}
