//! Docs archive naming policy.
//!
//! The archive is named deterministically from the project identity and a
//! fixed classifier/type pair: `<artifactId>-<version>-docs.jar`.

use crate::project::{ArtifactId, Version};
use std::fmt;

/// Classifier distinguishing the docs archive from the main artifact.
pub const CLASSIFIER: &str = "docs";

/// Artifact type (and file extension) of the docs archive.
pub const ARTIFACT_TYPE: &str = "jar";

/// A fully-qualified docs archive name.
///
/// # Examples
///
/// ```
/// use docs_assembler::naming::ArchiveName;
/// use docs_assembler::project::{ArtifactId, Version};
///
/// let artifact_id = ArtifactId::try_from("foo").expect("valid artifact id");
/// let version = Version::try_from("1.0").expect("valid version");
/// let name = ArchiveName::new(&artifact_id, &version);
/// assert_eq!(name.to_string(), "foo-1.0-docs.jar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    artifact_id: ArtifactId,
    version: Version,
}

impl ArchiveName {
    /// Create an archive name from validated coordinates.
    #[must_use]
    pub fn new(artifact_id: &ArtifactId, version: &Version) -> Self {
        Self {
            artifact_id: artifact_id.clone(),
            version: version.clone(),
        }
    }

    /// Return the archive file name.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{CLASSIFIER}.{ARTIFACT_TYPE}",
            self.artifact_id, self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::release("foo", "1.0", "foo-1.0-docs.jar")]
    #[case::snapshot("neo4j-manual", "1.9-SNAPSHOT", "neo4j-manual-1.9-SNAPSHOT-docs.jar")]
    fn filename_follows_convention(
        #[case] artifact_id: &str,
        #[case] version: &str,
        #[case] expected: &str,
    ) {
        let artifact_id = ArtifactId::try_from(artifact_id).expect("valid artifact id");
        let version = Version::try_from(version).expect("valid version");

        assert_eq!(ArchiveName::new(&artifact_id, &version).filename(), expected);
    }
}
