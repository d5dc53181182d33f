//! Running a named test before installation.
//!
//! The install goal can gate installation on a test run. The test is run by
//! an external command (by default `mvn surefire:test -Dtest=<filter>`) in
//! the project base directory, with its output passed straight through to
//! the terminal. The run has a timeout to prevent indefinite hangs.

use crate::error::{AssemblerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Placeholder replaced by the test filter in each command argument.
pub const TEST_PLACEHOLDER: &str = "{test}";

/// Command used when none is configured.
pub const DEFAULT_TEST_COMMAND: &[&str] = &["mvn", "surefire:test", "-Dtest={test}"];

/// Default timeout for a test run (30 minutes).
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Runs tests selected by a filter expression.
#[cfg_attr(test, mockall::automock)]
pub trait TestRunner {
    /// Run the tests matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblerError::TestsFailed`] when the tests fail or
    /// cannot be run.
    fn run_tests(&self, filter: &str) -> Result<()>;
}

/// Runs tests by spawning an external command.
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    command: Vec<String>,
    working_dir: Utf8PathBuf,
    timeout: Duration,
}

impl CommandTestRunner {
    /// Create a runner for `command`, executed in `working_dir`.
    ///
    /// An empty `command` falls back to [`DEFAULT_TEST_COMMAND`].
    #[must_use]
    pub fn new(command: Vec<String>, working_dir: impl Into<Utf8PathBuf>) -> Self {
        let command = if command.is_empty() {
            DEFAULT_TEST_COMMAND.iter().map(|&arg| arg.to_owned()).collect()
        } else {
            command
        };
        Self {
            command,
            working_dir: working_dir.into(),
            timeout: DEFAULT_TEST_TIMEOUT,
        }
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return the command line that would run `filter`.
    #[must_use]
    pub fn command_line(&self, filter: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| arg.replace(TEST_PLACEHOLDER, filter))
            .collect()
    }

    /// Return the working directory of the command.
    #[must_use]
    pub fn working_dir(&self) -> &Utf8Path {
        &self.working_dir
    }
}

impl TestRunner for CommandTestRunner {
    fn run_tests(&self, filter: &str) -> Result<()> {
        let failed = |reason: String| AssemblerError::TestsFailed {
            filter: filter.to_owned(),
            reason,
        };

        let command_line = self.command_line(filter);
        let Some((program, args)) = command_line.split_first() else {
            return Err(failed("empty test command".to_owned()));
        };
        info!("Running tests: {}", command_line.join(" "));
        debug!("Working directory: {}", self.working_dir);

        let mut child = Command::new(program)
            .args(args)
            .current_dir(self.working_dir.as_std_path())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| failed(format!("failed to run `{program}`: {e}")))?;

        match child
            .wait_timeout(self.timeout)
            .map_err(|e| failed(e.to_string()))?
        {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(failed(format!("`{program}` exited with {status}"))),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(failed(format!(
                    "timed out after {} seconds",
                    self.timeout.as_secs()
                )))
            }
        }
    }
}
