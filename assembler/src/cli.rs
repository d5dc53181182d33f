//! CLI argument definitions for the docs assembler.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::assembler::AssemblyOptions;
use crate::config::DocsSection;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Assemble project documentation into a docs jar.
#[derive(Parser, Debug)]
#[command(name = "docs-assembler")]
#[command(version, about)]
#[command(long_about = concat!(
    "Assemble project documentation into a docs jar.\n\n",
    "Documentation directories (by default src/docs and <build>/docs) are ",
    "optionally token-filtered and packed into <artifactId>-<version>-docs.jar ",
    "in the build directory, then attached to the build.\n\n",
    "The project is described by docs.toml in the project directory.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Assemble the docs jar:\n",
    "    $ docs-assembler assemble\n\n",
    "  Assemble with token filtering from an explicit directory:\n",
    "    $ docs-assembler assemble --filter --source-dir manual\n\n",
    "  Run a test, then install into the local repository:\n",
    "    $ docs-assembler install --test DocsIT\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Project base directory [default: current directory].
    #[arg(short = 'C', long, value_name = "DIR", global = true)]
    pub project_dir: Option<Utf8PathBuf>,

    /// Project descriptor [default: docs.toml in the project directory].
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet",
        global = true
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbosity", global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Assemble the docs jar and attach it to the build.
    Assemble(AssembleArgs),

    /// Assemble the docs jar and install it into the local repository.
    Install(InstallArgs),
}

/// Arguments shared by both goals.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleArgs {
    /// Source directory to include (can be repeated); replaces the defaults.
    #[arg(long = "source-dir", value_name = "DIR")]
    pub source_dir: Vec<Utf8PathBuf>,

    /// Substitute `${...}` and `@...@` tokens in text files.
    #[arg(long)]
    pub filter: bool,
}

impl AssembleArgs {
    /// Layer these flags over the `[docs]` configuration table.
    ///
    /// `--source-dir` replaces any configured list; `--filter` can enable
    /// filtering but never disable it.
    ///
    /// # Examples
    ///
    /// ```
    /// use docs_assembler::cli::AssembleArgs;
    /// use docs_assembler::config::DocsSection;
    ///
    /// let args = AssembleArgs { filter: true, ..AssembleArgs::default() };
    /// let options = args.to_options(&DocsSection::default());
    /// assert!(options.filter);
    /// assert!(options.source_directories.is_none());
    /// ```
    #[must_use]
    pub fn to_options(&self, docs: &DocsSection) -> AssemblyOptions {
        let source_directories = if self.source_dir.is_empty() {
            docs.source_directories.clone()
        } else {
            Some(self.source_dir.clone())
        };
        AssemblyOptions {
            source_directories,
            filter: self.filter || docs.filter,
            warn_on_conflicts: docs.warn_on_conflicts,
            fail_on_file_errors: docs.fail_on_file_errors,
        }
    }
}

/// Arguments for the install command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallArgs {
    /// Assembly arguments.
    #[command(flatten)]
    pub assemble: AssembleArgs,

    /// Run the tests matching NAME before assembling.
    #[arg(long, value_name = "NAME")]
    pub test: Option<String>,

    /// Local repository root [default: ~/.m2/repository].
    #[arg(long, value_name = "DIR")]
    pub local_repo: Option<Utf8PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
