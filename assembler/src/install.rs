//! Installing the docs archive into a local artifact repository.
//!
//! The repository uses the conventional layout:
//! `<repo>/<group path>/<artifactId>/<version>/<artifactId>-<version>[-<classifier>].<packaging>`,
//! where the group path is the group identifier with `.` replaced by `/`.

use crate::dirs::BaseDirs;
use crate::error::{AssemblerError, Result};
use crate::naming::{ARTIFACT_TYPE, CLASSIFIER};
use crate::project::Project;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::fs;

/// Name of the project descriptor installed alongside the archive.
pub const POM_FILENAME: &str = "pom.xml";

/// Coordinates and options for one installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCoordinates {
    /// Group identifier.
    pub group_id: String,
    /// Artifact identifier.
    pub artifact_id: String,
    /// Version.
    pub version: String,
    /// Classifier appended to the file name.
    pub classifier: String,
    /// Packaging, used as the file extension.
    pub packaging: String,
    /// Whether to write a minimal project descriptor when `pom_file` is
    /// absent.
    pub generate_pom: bool,
    /// An existing project descriptor to install next to the file.
    pub pom_file: Option<Utf8PathBuf>,
}

impl InstallCoordinates {
    /// Coordinates of the docs archive of `project`.
    ///
    /// The project's `pom.xml` is included when it exists. No descriptor is
    /// ever generated.
    #[must_use]
    pub fn docs(project: &Project) -> Self {
        let coordinates = project.coordinates();
        let pom = project.base_dir().join(POM_FILENAME);
        Self {
            group_id: coordinates.group_id.to_string(),
            artifact_id: coordinates.artifact_id.to_string(),
            version: coordinates.version.to_string(),
            classifier: CLASSIFIER.to_owned(),
            packaging: ARTIFACT_TYPE.to_owned(),
            generate_pom: false,
            pom_file: pom.is_file().then_some(pom),
        }
    }

    /// Return the repository-relative directory for these coordinates.
    #[must_use]
    pub fn directory(&self) -> Utf8PathBuf {
        let mut dir: Utf8PathBuf = self.group_id.split('.').collect();
        dir.push(&self.artifact_id);
        dir.push(&self.version);
        dir
    }

    /// Return the file name of the installed artifact.
    #[must_use]
    pub fn artifact_filename(&self) -> String {
        if self.classifier.is_empty() {
            format!("{}-{}.{}", self.artifact_id, self.version, self.packaging)
        } else {
            format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, self.classifier, self.packaging
            )
        }
    }

    /// Return the file name of the installed project descriptor.
    #[must_use]
    pub fn pom_filename(&self) -> String {
        format!("{}-{}.pom", self.artifact_id, self.version)
    }

    /// Render a minimal project descriptor for these coordinates.
    #[must_use]
    pub fn minimal_pom(&self) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n",
                "  <modelVersion>4.0.0</modelVersion>\n",
                "  <groupId>{}</groupId>\n",
                "  <artifactId>{}</artifactId>\n",
                "  <version>{}</version>\n",
                "  <description>POM was created by docs-assembler</description>\n",
                "</project>\n",
            ),
            self.group_id, self.artifact_id, self.version
        )
    }
}

/// Installs files into an artifact repository.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactInstaller {
    /// Install `file` under `coordinates`, returning the installed path.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblerError::InstallFailed`] when the file cannot be
    /// copied into the repository.
    fn install(&self, coordinates: &InstallCoordinates, file: &Utf8Path) -> Result<Utf8PathBuf>;
}

/// Installs into a repository directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalRepositoryInstaller {
    root: Utf8PathBuf,
}

impl LocalRepositoryInstaller {
    /// Install into the repository rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the repository root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl ArtifactInstaller for LocalRepositoryInstaller {
    fn install(&self, coordinates: &InstallCoordinates, file: &Utf8Path) -> Result<Utf8PathBuf> {
        let dir = self.root.join(coordinates.directory());
        let target = dir.join(coordinates.artifact_filename());
        let failed = |path: &Utf8Path, e: std::io::Error| AssemblerError::InstallFailed {
            path: path.to_owned(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&dir).map_err(|e| failed(&dir, e))?;
        info!("Installing {file} to {target}");
        fs::copy(file, &target).map_err(|e| failed(file, e))?;

        let pom_target = dir.join(coordinates.pom_filename());
        match &coordinates.pom_file {
            Some(pom) => {
                info!("Installing {pom} to {pom_target}");
                fs::copy(pom, &pom_target).map_err(|e| failed(pom, e))?;
            }
            None if coordinates.generate_pom => {
                info!("Writing generated descriptor to {pom_target}");
                fs::write(&pom_target, coordinates.minimal_pom())
                    .map_err(|e| failed(&pom_target, e))?;
            }
            None => {}
        }
        Ok(target)
    }
}

/// Return the conventional local repository, `<home>/.m2/repository`.
///
/// # Errors
///
/// Returns [`AssemblerError::LocalRepositoryUnknown`] when the home
/// directory cannot be determined.
pub fn default_local_repository(dirs: &dyn BaseDirs) -> Result<Utf8PathBuf> {
    dirs.home_dir()
        .map(|home| home.join(".m2").join("repository"))
        .ok_or(AssemblerError::LocalRepositoryUnknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::MockBaseDirs;
    use crate::project::ProjectCoordinates;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Setup {
        _temp_dir: TempDir,
        root: Utf8PathBuf,
        project: Project,
    }

    #[fixture]
    fn setup() -> Setup {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("utf8 temp dir");
        let coordinates =
            ProjectCoordinates::parse("com.example", "foo", "1.0").expect("valid coordinates");
        let project = Project::new(coordinates, root.join("project"));
        fs::create_dir_all(project.build_dir()).expect("mkdir build");
        Setup {
            _temp_dir: temp_dir,
            root,
            project,
        }
    }

    fn jar(setup: &Setup) -> Utf8PathBuf {
        let path = setup.project.build_dir().join("foo-1.0-docs.jar");
        fs::write(&path, b"jar bytes").expect("write jar");
        path
    }

    #[rstest]
    fn docs_coordinates_use_fixed_classifier_and_packaging(setup: Setup) {
        let coordinates = InstallCoordinates::docs(&setup.project);
        assert_eq!(coordinates.classifier, "docs");
        assert_eq!(coordinates.packaging, "jar");
        assert!(!coordinates.generate_pom);
        assert!(coordinates.pom_file.is_none());
        assert_eq!(coordinates.directory(), Utf8PathBuf::from("com/example/foo/1.0"));
        assert_eq!(coordinates.artifact_filename(), "foo-1.0-docs.jar");
    }

    #[rstest]
    fn installs_under_group_path(setup: Setup) {
        let file = jar(&setup);
        let installer = LocalRepositoryInstaller::new(setup.root.join("repo"));

        let installed = installer
            .install(&InstallCoordinates::docs(&setup.project), &file)
            .expect("install succeeds");

        assert_eq!(
            installed,
            setup.root.join("repo/com/example/foo/1.0/foo-1.0-docs.jar")
        );
        assert_eq!(fs::read(installed).expect("read"), b"jar bytes");
    }

    #[rstest]
    fn installs_existing_pom_alongside(setup: Setup) {
        let file = jar(&setup);
        fs::write(setup.project.base_dir().join("pom.xml"), "<project/>").expect("write pom");
        let installer = LocalRepositoryInstaller::new(setup.root.join("repo"));

        installer
            .install(&InstallCoordinates::docs(&setup.project), &file)
            .expect("install succeeds");

        let pom = setup.root.join("repo/com/example/foo/1.0/foo-1.0.pom");
        assert_eq!(fs::read_to_string(pom).expect("read pom"), "<project/>");
    }

    #[rstest]
    fn generates_pom_only_when_asked(setup: Setup) {
        let file = jar(&setup);
        let installer = LocalRepositoryInstaller::new(setup.root.join("repo"));
        let pom = setup.root.join("repo/com/example/foo/1.0/foo-1.0.pom");
        let mut coordinates = InstallCoordinates::docs(&setup.project);

        installer.install(&coordinates, &file).expect("install succeeds");
        assert!(!pom.exists());

        coordinates.generate_pom = true;
        installer.install(&coordinates, &file).expect("install succeeds");
        let generated = fs::read_to_string(pom).expect("read pom");
        assert!(generated.contains("<groupId>com.example</groupId>"));
        assert!(generated.contains("<artifactId>foo</artifactId>"));
        assert!(generated.contains("<version>1.0</version>"));
    }

    #[rstest]
    fn existing_pom_wins_over_generation(setup: Setup) {
        let file = jar(&setup);
        fs::write(setup.project.base_dir().join("pom.xml"), "<project/>").expect("write pom");
        let installer = LocalRepositoryInstaller::new(setup.root.join("repo"));
        let mut coordinates = InstallCoordinates::docs(&setup.project);
        coordinates.generate_pom = true;

        installer.install(&coordinates, &file).expect("install succeeds");

        let pom = setup.root.join("repo/com/example/foo/1.0/foo-1.0.pom");
        assert_eq!(fs::read_to_string(pom).expect("read pom"), "<project/>");
    }

    #[rstest]
    fn missing_file_fails(setup: Setup) {
        let installer = LocalRepositoryInstaller::new(setup.root.join("repo"));
        let missing = setup.project.build_dir().join("absent.jar");

        let err = installer
            .install(&InstallCoordinates::docs(&setup.project), &missing)
            .expect_err("install fails");

        assert!(matches!(err, AssemblerError::InstallFailed { path, .. } if path == missing));
    }

    #[rstest]
    fn classifier_is_optional_in_file_name(setup: Setup) {
        let mut coordinates = InstallCoordinates::docs(&setup.project);
        coordinates.classifier.clear();
        assert_eq!(coordinates.artifact_filename(), "foo-1.0.jar");
    }

    #[rstest]
    fn default_repository_is_under_home() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_home_dir()
            .returning(|| Some(Utf8PathBuf::from("/home/docs")));

        assert_eq!(
            default_local_repository(&dirs).expect("repository"),
            Utf8PathBuf::from("/home/docs/.m2/repository")
        );
    }

    #[rstest]
    fn unknown_home_is_an_error() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_home_dir().returning(|| None);

        assert!(matches!(
            default_local_repository(&dirs),
            Err(AssemblerError::LocalRepositoryUnknown)
        ));
    }
}
