//! Token filtering of documentation sources into a staging directory.
//!
//! When filtering is enabled the resolved source directories are copied into
//! `<build>/docs-filtered-staging/`, with `${key}` and `@key@` tokens in text
//! files replaced by project properties. Binary formats are copied verbatim.
//! The originals are never modified.
//!
//! The copy itself is performed by a [`ResourceFilteringEngine`]; the
//! [`ContentFilterer`] only prepares the staging directory and describes the
//! work as a [`ResourcesExecution`].

use crate::error::{AssemblerError, Result};
use crate::failure::{FailurePhase, FileFailure};
use crate::project::Project;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use thiserror::Error;

/// Name of the staging directory created under the build output directory.
pub const STAGING_DIRNAME: &str = "docs-filtered-staging";

/// Extensions never filtered by the assembler: token substitution would
/// corrupt these formats.
pub const DEFAULT_NON_FILTERED_EXTENSIONS: &[&str] = &["tiff", "tif", "pdf", "zip", "gz"];

/// Raster image extensions the filtering engine always copies verbatim,
/// regardless of the caller's list.
pub const ENGINE_NON_FILTERED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "gif", "bmp", "png"];

/// Encoding used to decode and re-encode filtered text.
pub const ENCODING: &str = "UTF-8";

/// Errors that stop a filtering engine before it processes any file.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The target directory could not be created.
    #[error("could not create filter target {path}: {source}")]
    Target {
        /// The target directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The engine does not support the requested encoding.
    #[error("unsupported encoding {0}")]
    UnsupportedEncoding(String),
}

/// Immutable filtering settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    non_filtered_extensions: Vec<String>,
    warn_on_conflicts: bool,
}

impl FilterConfig {
    /// Create a configuration exempting the given extensions (without the
    /// leading dot, compared case-insensitively).
    #[must_use]
    pub fn new<I, S>(non_filtered_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            non_filtered_extensions: non_filtered_extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_ascii_lowercase())
                .collect(),
            warn_on_conflicts: false,
        }
    }

    /// Log a warning whenever a later directory replaces a staged file.
    #[must_use]
    pub fn warn_on_conflicts(mut self, warn: bool) -> Self {
        self.warn_on_conflicts = warn;
        self
    }

    /// Return the exempt extensions.
    #[must_use]
    pub fn non_filtered_extensions(&self) -> &[String] {
        &self.non_filtered_extensions
    }

    /// Return whether staged overrides are logged.
    #[must_use]
    pub fn warns_on_conflicts(&self) -> bool {
        self.warn_on_conflicts
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_NON_FILTERED_EXTENSIONS)
    }
}

/// One directory to copy into the target, as seen by the filtering engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// The directory, relative to the resources base directory when it lies
    /// beneath it, absolute otherwise.
    pub directory: Utf8PathBuf,
    /// Whether token substitution applies to this resource.
    pub filtering: bool,
}

/// A complete description of a filtering job.
#[derive(Debug)]
pub struct ResourcesExecution<'a> {
    /// Directories to copy, in order. Later resources overwrite earlier ones.
    pub resources: Vec<Resource>,
    /// Directory against which relative resource paths are resolved.
    pub resources_base_dir: &'a Utf8Path,
    /// Directory receiving the filtered copies.
    pub target_dir: &'a Utf8Path,
    /// Text encoding of filtered files.
    pub encoding: &'a str,
    /// Extensions copied verbatim even when filtering is on.
    pub non_filtered_extensions: &'a [String],
    /// Values substituted for tokens.
    pub properties: &'a BTreeMap<String, String>,
    /// Whether to warn when a later resource replaces a copied file.
    pub warn_on_conflicts: bool,
}

/// A component that copies resources into a target directory, filtering
/// text files on the way.
pub trait ResourceFilteringEngine {
    /// Execute the filtering job.
    ///
    /// Per-file faults are returned as [`FileFailure`] records; the engine
    /// continues with the remaining files.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the job cannot start at all.
    fn filter_resources(
        &self,
        execution: &ResourcesExecution<'_>,
    ) -> std::result::Result<Vec<FileFailure>, FilterError>;
}

/// The default engine: recursive copy with `${key}` and `@key@` substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenFilteringEngine;

impl ResourceFilteringEngine for TokenFilteringEngine {
    fn filter_resources(
        &self,
        execution: &ResourcesExecution<'_>,
    ) -> std::result::Result<Vec<FileFailure>, FilterError> {
        if !execution.encoding.eq_ignore_ascii_case(ENCODING) {
            return Err(FilterError::UnsupportedEncoding(
                execution.encoding.to_owned(),
            ));
        }
        fs::create_dir_all(execution.target_dir).map_err(|source| FilterError::Target {
            path: execution.target_dir.to_owned(),
            source,
        })?;

        let mut failures = Vec::new();
        let mut copied = BTreeMap::new();
        for resource in &execution.resources {
            let root = execution.resources_base_dir.join(&resource.directory);
            copy_resource(execution, resource, &root, &mut copied, &mut failures);
        }
        Ok(failures)
    }
}

fn copy_resource(
    execution: &ResourcesExecution<'_>,
    resource: &Resource,
    root: &Utf8Path,
    copied: &mut BTreeMap<Utf8PathBuf, Utf8PathBuf>,
    failures: &mut Vec<FileFailure>,
) {
    // The target may live beneath a source root; never copy it into itself.
    let walker = walkdir::WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != execution.target_dir.as_std_path());
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .and_then(Utf8Path::from_path)
                    .unwrap_or(root);
                failures.push(FileFailure::new(path, FailurePhase::Filter, &e));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        let Some(source) = Utf8Path::from_path(entry.path()) else {
            failures.push(FileFailure::new(
                root,
                FailurePhase::Filter,
                format!("non UTF-8 path {}", entry.path().display()),
            ));
            continue;
        };
        let Ok(relative) = source.strip_prefix(root) else {
            continue;
        };
        let destination = execution.target_dir.join(relative);
        let filter = resource.filtering && is_filterable(source, execution.non_filtered_extensions);
        if let Err(e) = copy_file(source, &destination, filter.then_some(execution.properties)) {
            failures.push(FileFailure::new(source, FailurePhase::Filter, e));
            continue;
        }
        let previous = copied.insert(destination, source.to_owned());
        if let (true, Some(previous)) = (execution.warn_on_conflicts, previous) {
            warn!("{source} overrides {previous}");
        }
    }
}

fn copy_file(
    source: &Utf8Path,
    destination: &Utf8Path,
    properties: Option<&BTreeMap<String, String>>,
) -> std::io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    let Some(properties) = properties else {
        debug!("Copying: {source}");
        fs::copy(source, destination)?;
        return Ok(());
    };

    let bytes = fs::read(source)?;
    match String::from_utf8(bytes) {
        Ok(text) => {
            debug!("Filtering: {source}");
            fs::write(destination, interpolate(&text, properties))
        }
        Err(not_text) => {
            debug!("Copying undecodable file verbatim: {source}");
            fs::write(destination, not_text.into_bytes())
        }
    }
}

/// Return whether `path` is eligible for token substitution.
#[must_use]
pub fn is_filterable(path: &Utf8Path, non_filtered_extensions: &[String]) -> bool {
    let Some(extension) = path.extension() else {
        return true;
    };
    let extension = extension.to_ascii_lowercase();
    !ENGINE_NON_FILTERED_EXTENSIONS.contains(&extension.as_str())
        && !non_filtered_extensions.contains(&extension)
}

/// Replace `${key}` and `@key@` tokens in `input` with property values.
///
/// Tokens naming unknown properties are left untouched, as are `@` pairs
/// whose body is empty or contains whitespace.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use docs_assembler::filter::interpolate;
///
/// let mut properties = BTreeMap::new();
/// properties.insert("project.version".to_owned(), "1.0".to_owned());
///
/// assert_eq!(
///     interpolate("v${project.version} / @project.version@ / ${other}", &properties),
///     "v1.0 / 1.0 / ${other}"
/// );
/// ```
#[must_use]
pub fn interpolate(input: &str, properties: &BTreeMap<String, String>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(['$', '@']) {
        let (head, tail) = rest.split_at(start);
        output.push_str(head);
        match resolve_token(tail, properties) {
            Some((value, consumed)) => {
                output.push_str(value);
                rest = tail.get(consumed..).unwrap_or_default();
            }
            None => {
                // Both delimiters are single-byte ASCII.
                let (delimiter, after) = tail.split_at(1);
                output.push_str(delimiter);
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}

/// Resolve a token at the start of `tail`, returning the value and the
/// number of bytes the token occupies.
fn resolve_token<'p>(
    tail: &str,
    properties: &'p BTreeMap<String, String>,
) -> Option<(&'p str, usize)> {
    let (key, delimiters) = if let Some(body) = tail.strip_prefix("${") {
        let (key, _) = body.split_once('}')?;
        (key, 3)
    } else {
        let body = tail.strip_prefix('@')?;
        let (key, _) = body.split_once('@')?;
        (key, 2)
    };
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    properties
        .get(key)
        .map(|value| (value.as_str(), key.len() + delimiters))
}

/// Prepares the staging directory and delegates copying to an engine.
pub struct ContentFilterer<'a> {
    engine: &'a dyn ResourceFilteringEngine,
    config: FilterConfig,
}

impl<'a> ContentFilterer<'a> {
    /// Create a filterer using `engine` and the given settings.
    #[must_use]
    pub fn new(engine: &'a dyn ResourceFilteringEngine, config: FilterConfig) -> Self {
        Self { engine, config }
    }

    /// Return the staging directory used for `project`.
    #[must_use]
    pub fn staging_dir(project: &Project) -> Utf8PathBuf {
        project.build_dir().join(STAGING_DIRNAME)
    }

    /// Clear `target` and fill it with filtered copies of `directories`.
    ///
    /// Engine failures are logged and returned as failure records; the
    /// caller proceeds with whatever was produced.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblerError::StagingCleanup`] when a previous staging
    /// directory cannot be removed.
    pub fn filter(
        &self,
        project: &Project,
        directories: &[Utf8PathBuf],
        target: &Utf8Path,
    ) -> Result<Vec<FileFailure>> {
        info!("Filter target: {target}");
        clear_directory(target)?;

        let resources = directories
            .iter()
            .map(|dir| {
                info!("Adding source directory: {dir}");
                Resource {
                    directory: dir
                        .strip_prefix(project.base_dir())
                        .map_or_else(|_| dir.clone(), Utf8Path::to_owned),
                    filtering: true,
                }
            })
            .collect();
        let properties = project.filter_properties();
        let execution = ResourcesExecution {
            resources,
            resources_base_dir: project.base_dir(),
            target_dir: target,
            encoding: ENCODING,
            non_filtered_extensions: self.config.non_filtered_extensions(),
            properties: &properties,
            warn_on_conflicts: self.config.warns_on_conflicts(),
        };

        match self.engine.filter_resources(&execution) {
            Ok(failures) => {
                for failure in &failures {
                    error!("{failure}");
                }
                Ok(failures)
            }
            Err(e) => {
                error!("{e}");
                Ok(vec![FileFailure::new(target, FailurePhase::Filter, e)])
            }
        }
    }
}

/// Remove `dir` and everything beneath it. A missing directory is fine.
fn clear_directory(dir: &Utf8Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(AssemblerError::StagingCleanup {
            path: dir.to_owned(),
            source,
        }),
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
