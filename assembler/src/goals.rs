//! The two user-facing goals: `assemble` and `install`.
//!
//! `assemble` builds and attaches the docs archive. `install` optionally
//! gates on a test run, assembles, and copies the archive into the local
//! repository.

use crate::assembler::{AssemblyOptions, AssemblyOutcome, DocsAssembler};
use crate::attach::ArtifactAttacher;
use crate::error::{AssemblerError, Result};
use crate::filter::ResourceFilteringEngine;
use crate::install::{ArtifactInstaller, InstallCoordinates};
use crate::project::Project;
use crate::test_runner::TestRunner;
use camino::Utf8PathBuf;
use log::info;

/// Collaborators used by the install goal.
pub struct InstallContext<'a> {
    /// Records the assembled archive as a build output.
    pub attacher: &'a dyn ArtifactAttacher,
    /// Performs token filtering when enabled.
    pub engine: &'a dyn ResourceFilteringEngine,
    /// Runs the gating test.
    pub test_runner: &'a dyn TestRunner,
    /// Copies the archive into the repository.
    pub installer: &'a dyn ArtifactInstaller,
}

/// Assemble and attach the docs archive.
///
/// # Errors
///
/// Propagates any fatal error from [`DocsAssembler::assemble`].
pub fn assemble_goal(
    project: &Project,
    options: &AssemblyOptions,
    attacher: &dyn ArtifactAttacher,
    engine: &dyn ResourceFilteringEngine,
) -> Result<AssemblyOutcome> {
    DocsAssembler::new(project, attacher, engine).assemble(options)
}

/// Run the optional test, assemble, then install the archive.
///
/// Returns the installed path of the archive.
///
/// # Errors
///
/// Returns [`AssemblerError::TestsFailed`] when the gating test fails (in
/// which case nothing is assembled), [`AssemblerError::NothingToInstall`]
/// when there are no docs, and any error from assembly or installation.
pub fn install_goal(
    project: &Project,
    options: &AssemblyOptions,
    test: Option<&str>,
    context: &InstallContext<'_>,
) -> Result<Utf8PathBuf> {
    if let Some(filter) = test {
        info!("Running test: {filter}");
        context.test_runner.run_tests(filter)?;
    }

    let outcome = assemble_goal(project, options, context.attacher, context.engine)?;
    let AssemblyOutcome::Assembled(report) = outcome else {
        return Err(AssemblerError::NothingToInstall);
    };

    let coordinates = InstallCoordinates::docs(project);
    let installed = context.installer.install(&coordinates, &report.archive)?;
    info!("Installed {installed}");
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attach::MockArtifactAttacher;
    use crate::filter::TokenFilteringEngine;
    use crate::install::MockArtifactInstaller;
    use crate::project::ProjectCoordinates;
    use crate::test_runner::MockTestRunner;
    use crate::test_utils::{RecordingAttacher, RecordingInstaller, StubTestRunner};
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        project: Project,
    }

    impl Fixture {
        fn with_docs(self) -> Self {
            let dir = self.project.base_dir().join("src/docs");
            fs::create_dir_all(&dir).expect("mkdir");
            fs::write(dir.join("index.txt"), "docs").expect("write");
            self
        }
    }

    #[fixture]
    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().expect("temp dir");
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("utf8 temp dir");
        let coordinates =
            ProjectCoordinates::parse("com.example", "foo", "1.0").expect("valid coordinates");
        Fixture {
            _temp_dir: temp_dir,
            project: Project::new(coordinates, base),
        }
    }

    #[rstest]
    fn failing_test_stops_before_assembly(fixture: Fixture) {
        let fixture = fixture.with_docs();
        let mut test_runner = MockTestRunner::new();
        test_runner
            .expect_run_tests()
            .withf(|filter| filter == "DocsIT")
            .returning(|filter| {
                Err(AssemblerError::TestsFailed {
                    filter: filter.to_owned(),
                    reason: "exit status 1".to_owned(),
                })
            });
        let mut attacher = MockArtifactAttacher::new();
        attacher.expect_attach().times(0);
        let mut installer = MockArtifactInstaller::new();
        installer.expect_install().times(0);
        let context = InstallContext {
            attacher: &attacher,
            engine: &TokenFilteringEngine,
            test_runner: &test_runner,
            installer: &installer,
        };

        let result = install_goal(
            &fixture.project,
            &AssemblyOptions::default(),
            Some("DocsIT"),
            &context,
        );

        assert!(matches!(result, Err(AssemblerError::TestsFailed { .. })));
        assert!(!fixture.project.build_dir().join("foo-1.0-docs.jar").exists());
    }

    #[rstest]
    fn install_without_test_skips_runner(fixture: Fixture) {
        let fixture = fixture.with_docs();
        let mut test_runner = MockTestRunner::new();
        test_runner.expect_run_tests().times(0);
        let mut attacher = MockArtifactAttacher::new();
        attacher.expect_attach().times(1).returning(|_| Ok(()));
        let mut installer = MockArtifactInstaller::new();
        installer
            .expect_install()
            .withf(|coordinates, file| {
                coordinates.classifier == "docs" && file.as_str().ends_with("foo-1.0-docs.jar")
            })
            .times(1)
            .returning(|_, _| Ok(Utf8PathBuf::from("/repo/com/example/foo/1.0/foo-1.0-docs.jar")));
        let context = InstallContext {
            attacher: &attacher,
            engine: &TokenFilteringEngine,
            test_runner: &test_runner,
            installer: &installer,
        };

        let installed = install_goal(&fixture.project, &AssemblyOptions::default(), None, &context)
            .expect("install succeeds");

        assert_eq!(
            installed,
            Utf8PathBuf::from("/repo/com/example/foo/1.0/foo-1.0-docs.jar")
        );
    }

    #[rstest]
    fn passing_test_installs_the_attached_archive(fixture: Fixture) {
        let fixture = fixture.with_docs();
        let attacher = RecordingAttacher::new();
        let test_runner = StubTestRunner::passing();
        let installer = RecordingInstaller::new("/repo");
        let context = InstallContext {
            attacher: &attacher,
            engine: &TokenFilteringEngine,
            test_runner: &test_runner,
            installer: &installer,
        };

        let installed = install_goal(
            &fixture.project,
            &AssemblyOptions::default(),
            Some("DocsIT"),
            &context,
        )
        .expect("install succeeds");

        assert_eq!(test_runner.runs(), vec!["DocsIT".to_owned()]);
        assert_eq!(attacher.attached().len(), 1);
        let recorded = installer.installed();
        let (coordinates, file) = recorded.first().expect("one install");
        assert_eq!(recorded.len(), 1);
        assert_eq!(coordinates.artifact_id, "foo");
        assert_eq!(file, &fixture.project.build_dir().join("foo-1.0-docs.jar"));
        assert_eq!(
            installed,
            Utf8PathBuf::from("/repo/com/example/foo/1.0/foo-1.0-docs.jar")
        );
    }

    #[rstest]
    fn nothing_to_install_is_an_error(fixture: Fixture) {
        let mut test_runner = MockTestRunner::new();
        test_runner.expect_run_tests().returning(|_| Ok(()));
        let mut attacher = MockArtifactAttacher::new();
        attacher.expect_attach().times(0);
        let mut installer = MockArtifactInstaller::new();
        installer.expect_install().times(0);
        let context = InstallContext {
            attacher: &attacher,
            engine: &TokenFilteringEngine,
            test_runner: &test_runner,
            installer: &installer,
        };

        let result = install_goal(
            &fixture.project,
            &AssemblyOptions::default(),
            Some("DocsIT"),
            &context,
        );

        assert!(matches!(result, Err(AssemblerError::NothingToInstall)));
    }
}
