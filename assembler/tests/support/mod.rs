//! Test support utilities for docs assembler behavioural tests.
//!
//! Provides a temporary project layout and helpers for inspecting the
//! archives the goals produce.

use camino::{Utf8Path, Utf8PathBuf};
use docs_assembler::project::{Project, ProjectCoordinates};
use std::fs;
use std::io::Read;
use tempfile::TempDir;

/// A project rooted in a temporary directory.
pub struct ProjectFixture {
    _temp_dir: TempDir,
    /// The project under test.
    pub project: Project,
}

impl ProjectFixture {
    /// Create a project with the given coordinates in a fresh directory.
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let base = Utf8PathBuf::try_from(temp_dir.path().join("project")).expect("utf8 temp dir");
        fs::create_dir_all(&base).expect("mkdir project");
        let coordinates =
            ProjectCoordinates::parse(group_id, artifact_id, version).expect("valid coordinates");
        Self {
            _temp_dir: temp_dir,
            project: Project::new(coordinates, base),
        }
    }

    /// Return the directory that holds the project, for sibling fixtures.
    pub fn scratch_dir(&self) -> Utf8PathBuf {
        self.project
            .base_dir()
            .parent()
            .expect("project dir has a parent")
            .to_owned()
    }

    /// Write `contents` to `relative` beneath the project base directory.
    pub fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.project.base_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }
}

/// List the entry names of the zip archive at `path`, in archive order.
pub fn zip_entries(path: &Utf8Path) -> Vec<String> {
    let file = fs::File::open(path).expect("open archive");
    let mut archive = zip::ZipArchive::new(file).expect("read archive");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_owned())
        .collect()
}

/// Read the entry `name` of the zip archive at `path` as text.
pub fn zip_entry_text(path: &Utf8Path, name: &str) -> String {
    let file = fs::File::open(path).expect("open archive");
    let mut archive = zip::ZipArchive::new(file).expect("read archive");
    let mut entry = archive.by_name(name).expect("entry exists");
    let mut contents = String::new();
    entry.read_to_string(&mut contents).expect("read entry");
    contents
}
