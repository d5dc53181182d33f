//! Source directory resolution.
//!
//! Turns the configured list of source paths, or the two conventional
//! defaults, into an ordered list of directories that exist, are readable,
//! and contain at least one entry. Missing and empty directories are skipped;
//! paths that exist but are not readable directories abort the run.

use crate::error::{AssemblerError, Result};
use crate::project::Project;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::fs;
use std::io::ErrorKind;

/// Name of the conventional docs directory under `src/` and the build dir.
pub const DOCS_DIRNAME: &str = "docs";

/// Outcome of validating a single candidate directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Include,
    Missing,
    Empty,
}

/// Return the default source directories, in order: `<base>/src/docs`, then
/// `<build>/docs`.
#[must_use]
pub fn default_directories(project: &Project) -> Vec<Utf8PathBuf> {
    vec![
        project.base_dir().join("src").join(DOCS_DIRNAME),
        project.build_dir().join(DOCS_DIRNAME),
    ]
}

/// Resolve and validate the source directories for an assembly run.
///
/// When `configured` is `None` the [`default_directories`] are used. Relative
/// configured paths are resolved against the project base directory. Order
/// is preserved and duplicates are kept.
///
/// # Errors
///
/// Returns [`AssemblerError::NotADirectory`] when a candidate exists but is
/// not a directory, and [`AssemblerError::UnreadableDirectory`] when its
/// contents cannot be listed.
pub fn resolve_directories(
    configured: Option<&[Utf8PathBuf]>,
    project: &Project,
) -> Result<Vec<Utf8PathBuf>> {
    let candidates = match configured {
        Some(paths) => paths.iter().map(|p| project.resolve(p)).collect(),
        None => {
            info!("No directories configured, using defaults.");
            default_directories(project)
        }
    };

    let mut directories = Vec::with_capacity(candidates.len());
    for dir in candidates {
        match check_candidate(&dir)? {
            Candidate::Include => directories.push(dir),
            Candidate::Missing => info!("Skipping, does not exist: {dir}"),
            Candidate::Empty => info!("Skipping, is empty: {dir}"),
        }
    }
    Ok(directories)
}

/// Classify one candidate. Type and readability are checked before
/// emptiness so a regular file is never mistaken for an empty directory.
fn check_candidate(dir: &Utf8Path) -> Result<Candidate> {
    let metadata = match fs::metadata(dir) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Candidate::Missing),
        Err(e) => return Err(unreadable(dir, &e)),
    };

    if !metadata.is_dir() {
        return Err(AssemblerError::NotADirectory {
            path: dir.to_owned(),
        });
    }

    let mut entries = fs::read_dir(dir).map_err(|e| unreadable(dir, &e))?;
    match entries.next() {
        None => Ok(Candidate::Empty),
        Some(Ok(_)) => Ok(Candidate::Include),
        Some(Err(e)) => Err(unreadable(dir, &e)),
    }
}

fn unreadable(dir: &Utf8Path, err: &std::io::Error) -> AssemblerError {
    AssemblerError::UnreadableDirectory {
        path: dir.to_owned(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectCoordinates;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Workspace {
        _temp_dir: TempDir,
        project: Project,
    }

    #[fixture]
    fn workspace() -> Workspace {
        let temp_dir = TempDir::new().expect("temp dir");
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("utf8 temp dir");
        let coordinates =
            ProjectCoordinates::parse("org.example", "foo", "1.0").expect("valid coordinates");
        Workspace {
            _temp_dir: temp_dir,
            project: Project::new(coordinates, base),
        }
    }

    fn populated(dir: &Utf8Path) {
        fs::create_dir_all(dir).expect("mkdir");
        fs::write(dir.join("index.txt"), b"docs").expect("write");
    }

    #[rstest]
    fn defaults_are_src_docs_then_build_docs(workspace: Workspace) {
        let base = workspace.project.base_dir();
        assert_eq!(
            default_directories(&workspace.project),
            vec![base.join("src/docs"), base.join("target/docs")]
        );
    }

    #[rstest]
    fn defaults_include_only_existing_non_empty(workspace: Workspace) {
        let base = workspace.project.base_dir().to_owned();
        populated(&base.join("target/docs"));
        fs::create_dir_all(base.join("src/docs")).expect("mkdir empty");

        let dirs = resolve_directories(None, &workspace.project).expect("resolution succeeds");

        assert_eq!(dirs, vec![base.join("target/docs")]);
    }

    #[rstest]
    fn defaults_keep_fixed_order(workspace: Workspace) {
        let base = workspace.project.base_dir().to_owned();
        populated(&base.join("target/docs"));
        populated(&base.join("src/docs"));

        let dirs = resolve_directories(None, &workspace.project).expect("resolution succeeds");

        assert_eq!(dirs, vec![base.join("src/docs"), base.join("target/docs")]);
    }

    #[rstest]
    fn configured_relative_paths_resolve_against_base(workspace: Workspace) {
        let base = workspace.project.base_dir().to_owned();
        populated(&base.join("manual"));

        let configured = [Utf8PathBuf::from("manual"), Utf8PathBuf::from("missing")];
        let dirs = resolve_directories(Some(configured.as_slice()), &workspace.project)
            .expect("resolution succeeds");

        assert_eq!(dirs, vec![base.join("manual")]);
    }

    #[rstest]
    fn configured_duplicates_are_kept(workspace: Workspace) {
        let base = workspace.project.base_dir().to_owned();
        populated(&base.join("manual"));

        let configured = [base.join("manual"), base.join("manual")];
        let dirs = resolve_directories(Some(configured.as_slice()), &workspace.project)
            .expect("resolution succeeds");

        assert_eq!(dirs.len(), 2);
    }

    #[rstest]
    fn regular_file_is_a_configuration_error(workspace: Workspace) {
        let file = workspace.project.base_dir().join("notes.txt");
        fs::write(&file, b"not a directory").expect("write");

        let err = resolve_directories(Some(std::slice::from_ref(&file)), &workspace.project)
            .expect_err("expected a configuration error");

        assert!(matches!(err, AssemblerError::NotADirectory { path } if path == file));
    }

    #[rstest]
    fn empty_regular_file_is_not_skipped(workspace: Workspace) {
        let file = workspace.project.base_dir().join("empty.txt");
        fs::write(&file, b"").expect("write");

        let result = resolve_directories(Some(std::slice::from_ref(&file)), &workspace.project);

        assert!(matches!(result, Err(AssemblerError::NotADirectory { .. })));
    }

    #[cfg(unix)]
    #[rstest]
    fn unreadable_directory_is_a_configuration_error(workspace: Workspace) {
        use std::os::unix::fs::PermissionsExt;

        // Root can list directories regardless of permissions.
        if unsafe { libc::geteuid() } == 0 {
            return;
        }

        let dir = workspace.project.base_dir().join("locked");
        populated(&dir);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).expect("chmod");

        let result = resolve_directories(Some(std::slice::from_ref(&dir)), &workspace.project);

        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).expect("restore");
        assert!(matches!(
            result,
            Err(AssemblerError::UnreadableDirectory { .. })
        ));
    }
}
