//! The assembly pipeline.
//!
//! Resolve source directories, optionally filter them into a staging
//! directory, write the docs archive, apply the failure policy, and attach
//! the archive to the build.

use crate::archive::ArchiveWriter;
use crate::attach::{ArtifactAttacher, AttachedArtifact};
use crate::error::{AssemblerError, Result};
use crate::failure::FileFailure;
use crate::filter::{ContentFilterer, FilterConfig, ResourceFilteringEngine};
use crate::naming::{ARTIFACT_TYPE, ArchiveName, CLASSIFIER};
use crate::project::Project;
use crate::resolver::resolve_directories;
use camino::{Utf8Path, Utf8PathBuf};
use log::{error, info, warn};
use std::fs;

/// Per-run assembly settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Directories to include; `None` selects the conventional defaults.
    pub source_directories: Option<Vec<Utf8PathBuf>>,
    /// Filter sources through the token engine before archiving.
    pub filter: bool,
    /// Log a warning when a later directory replaces an archive entry.
    pub warn_on_conflicts: bool,
    /// Turn any per-file failure into a fatal error.
    pub fail_on_file_errors: bool,
}

/// Summary of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Path of the attached archive.
    pub archive: Utf8PathBuf,
    /// Names of the archive entries.
    pub entries: Vec<String>,
    /// Files skipped during filtering or archiving.
    pub failures: Vec<FileFailure>,
}

/// Result of an assembly run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// An archive was written and attached.
    Assembled(AssemblyReport),
    /// There were no docs, so no archive exists and nothing was attached.
    NothingToAssemble,
}

impl AssemblyOutcome {
    /// Return the report when an archive was produced.
    #[must_use]
    pub fn report(&self) -> Option<&AssemblyReport> {
        match self {
            Self::Assembled(report) => Some(report),
            Self::NothingToAssemble => None,
        }
    }
}

/// Assembles and attaches the docs archive of one project.
pub struct DocsAssembler<'a> {
    project: &'a Project,
    attacher: &'a dyn ArtifactAttacher,
    engine: &'a dyn ResourceFilteringEngine,
    filter_config: FilterConfig,
}

impl<'a> DocsAssembler<'a> {
    /// Create an assembler for `project` using the given collaborators.
    #[must_use]
    pub fn new(
        project: &'a Project,
        attacher: &'a dyn ArtifactAttacher,
        engine: &'a dyn ResourceFilteringEngine,
    ) -> Self {
        Self {
            project,
            attacher,
            engine,
            filter_config: FilterConfig::default(),
        }
    }

    /// Replace the set of extensions exempt from filtering.
    #[must_use]
    pub fn with_filter_config(mut self, filter_config: FilterConfig) -> Self {
        self.filter_config = filter_config;
        self
    }

    /// Return where the archive for this project is written.
    #[must_use]
    pub fn archive_path(&self) -> Utf8PathBuf {
        let coordinates = self.project.coordinates();
        let name = ArchiveName::new(&coordinates.artifact_id, &coordinates.version);
        self.project.build_dir().join(name.filename())
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the configuration errors raised by directory resolution,
    /// staging and archive creation, [`AssemblerError::PartialAssembly`]
    /// when per-file failures occurred and `fail_on_file_errors` is set,
    /// and any error from the attacher.
    pub fn assemble(&self, options: &AssemblyOptions) -> Result<AssemblyOutcome> {
        info!(
            "Filtering is: {}",
            if options.filter { "on" } else { "off" }
        );

        let directories =
            resolve_directories(options.source_directories.as_deref(), self.project)?;
        if directories.is_empty() {
            warn!("There are no docs to assemble.");
            return Ok(AssemblyOutcome::NothingToAssemble);
        }

        let mut failures = Vec::new();
        let roots = if options.filter {
            let staging = ContentFilterer::staging_dir(self.project);
            let config = self
                .filter_config
                .clone()
                .warn_on_conflicts(options.warn_on_conflicts);
            let filterer = ContentFilterer::new(self.engine, config);
            failures.extend(filterer.filter(self.project, &directories, &staging)?);
            vec![staging]
        } else {
            directories
        };

        let destination = self.archive_path();
        let archive = ArchiveWriter::new()
            .warn_on_conflicts(options.warn_on_conflicts)
            .write(&destination, &roots)?;
        failures.extend(archive.failures);

        if archive.entries.is_empty() {
            warn!("There were no docs to assemble.");
            remove_empty_archive(&destination);
            return Ok(AssemblyOutcome::NothingToAssemble);
        }

        match failures.first() {
            Some(first) if options.fail_on_file_errors => {
                return Err(AssemblerError::PartialAssembly {
                    count: failures.len(),
                    first: first.to_string(),
                });
            }
            Some(_) => warn!("{} file(s) could not be assembled.", failures.len()),
            None => {}
        }

        self.attacher.attach(&AttachedArtifact::new(
            self.project,
            ARTIFACT_TYPE,
            CLASSIFIER,
            &destination,
        ))?;

        Ok(AssemblyOutcome::Assembled(AssemblyReport {
            archive: destination,
            entries: archive.entries,
            failures,
        }))
    }
}

fn remove_empty_archive(path: &Utf8Path) {
    if let Err(e) = fs::remove_file(path) {
        error!("Could not remove empty archive {path}: {e}");
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
