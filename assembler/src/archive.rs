//! Docs archive creation.
//!
//! Recursively adds every regular file beneath each source root to a zip
//! archive, naming entries by their `/`-separated path relative to that
//! root. Roots are processed in order and later roots replace entries of the
//! same name. Entries are written in sorted order with a fixed timestamp, so
//! identical inputs yield identical archives.

use crate::error::{AssemblerError, Result};
use crate::failure::{FailurePhase, FileFailure};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// What [`ArchiveWriter::write`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Path of the archive file.
    pub path: Utf8PathBuf,
    /// Names of the entries written, in archive order.
    pub entries: Vec<String>,
    /// Files that could not be added, and any finalisation fault.
    pub failures: Vec<FileFailure>,
}

/// Writes source directories into a single zip archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveWriter {
    warn_on_conflicts: bool,
}

impl ArchiveWriter {
    /// Create a writer that silently lets later roots win on name clashes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning whenever a later root replaces an existing entry.
    #[must_use]
    pub fn warn_on_conflicts(mut self, warn: bool) -> Self {
        self.warn_on_conflicts = warn;
        self
    }

    /// Write all files beneath `roots` to a fresh archive at `destination`.
    ///
    /// Files that cannot be read are skipped and reported in the returned
    /// [`ArchiveReport`]. A failure to finalise the archive is also reported
    /// there rather than raised.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblerError::DestinationNotDeletable`] when a previous
    /// archive cannot be removed, [`AssemblerError::OutputDirectory`] when
    /// the parent directory cannot be created, and
    /// [`AssemblerError::ArchiveCreation`] when the archive file cannot be
    /// opened.
    pub fn write(&self, destination: &Utf8Path, roots: &[Utf8PathBuf]) -> Result<ArchiveReport> {
        info!("Creating docs archive.");
        prepare_destination(destination)?;

        let mut failures = Vec::new();
        let mut entries = BTreeMap::new();
        for root in roots {
            info!("Adding source directory: {root}");
            self.collect_entries(root, destination, &mut entries, &mut failures);
        }

        let file = fs::File::create(destination).map_err(|source| {
            AssemblerError::ArchiveCreation {
                path: destination.to_owned(),
                source,
            }
        })?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut written = Vec::with_capacity(entries.len());
        for (name, source) in entries {
            match add_entry(&mut zip, &name, &source, options) {
                Ok(()) => {
                    debug!("Adding: {name}");
                    written.push(name);
                }
                Err(e) => {
                    error!("Could not add {source}: {e}");
                    failures.push(FileFailure::new(source, FailurePhase::Archive, e));
                }
            }
        }

        if let Err(e) = zip.finish() {
            error!("Could not finish {destination}: {e}");
            failures.push(FileFailure::new(destination, FailurePhase::Finish, e));
        }

        Ok(ArchiveReport {
            path: destination.to_owned(),
            entries: written,
            failures,
        })
    }

    fn collect_entries(
        &self,
        root: &Utf8Path,
        destination: &Utf8Path,
        entries: &mut BTreeMap<String, Utf8PathBuf>,
        failures: &mut Vec<FileFailure>,
    ) {
        let walker = walkdir::WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().and_then(Utf8Path::from_path).unwrap_or(root);
                    error!("Could not read {path}: {e}");
                    failures.push(FileFailure::new(path, FailurePhase::Archive, &e));
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                failures.push(FileFailure::new(
                    root,
                    FailurePhase::Archive,
                    format!("non UTF-8 path {}", entry.path().display()),
                ));
                continue;
            };
            if path == destination {
                continue;
            }
            let Some(name) = entry_name(root, path) else {
                continue;
            };
            let previous = entries.insert(name, path.to_owned());
            if let (true, Some(previous)) = (self.warn_on_conflicts, previous) {
                warn!("{path} overrides {previous}");
            }
        }
    }
}

/// Compute the archive entry name of `path` beneath `root`.
fn entry_name(root: &Utf8Path, path: &Utf8Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let name = relative
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/");
    (!name.is_empty()).then_some(name)
}

fn add_entry(
    zip: &mut ZipWriter<fs::File>,
    name: &str,
    source: &Utf8Path,
    options: SimpleFileOptions,
) -> std::io::Result<()> {
    // Read before starting the entry so a failed read leaves no stub behind.
    let contents = fs::read(source)?;
    zip.start_file(name, options)?;
    zip.write_all(&contents)
}

/// Make sure the parent directory exists and remove any stale archive.
fn prepare_destination(destination: &Utf8Path) -> Result<()> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| AssemblerError::OutputDirectory {
            path: parent.to_owned(),
            source,
        })?;
    }

    match fs::remove_file(destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(AssemblerError::DestinationNotDeletable {
            path: destination.to_owned(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
