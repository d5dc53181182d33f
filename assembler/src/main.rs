//! Docs assembler CLI entrypoint.
//!
//! Loads the project descriptor, layers command-line flags over it, and runs
//! either the `assemble` or the `install` goal.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use docs_assembler::assembler::AssemblyOutcome;
use docs_assembler::attach::FileArtifactRegistry;
use docs_assembler::cli::{Cli, Command, InstallArgs};
use docs_assembler::config::{CONFIG_FILENAME, DocsConfig, InstallSection};
use docs_assembler::dirs::{BaseDirs, SystemBaseDirs};
use docs_assembler::error::{AssemblerError, Result};
use docs_assembler::filter::TokenFilteringEngine;
use docs_assembler::goals::{InstallContext, assemble_goal, install_goal};
use docs_assembler::install::{LocalRepositoryInstaller, default_local_repository};
use docs_assembler::project::Project;
use docs_assembler::test_runner::CommandTestRunner;
use log::{LevelFilter, info};
use std::io::Write;
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    // RUST_LOG, when set, overrides the level chosen by -v/-q.
    let initialised = env_logger::Builder::new()
        .filter_level(log_level(cli))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .try_init();
    if initialised.is_err() {
        // A logger is already installed; keep it.
    }
}

fn log_level(cli: &Cli) -> LevelFilter {
    if cli.quiet {
        return LevelFilter::Warn;
    }
    match cli.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| project_dir.join(CONFIG_FILENAME));
    let config = DocsConfig::load(&config_path)?;
    let project = config.project(&project_dir)?;
    info!("Project {}", project.coordinates());

    let attacher = FileArtifactRegistry::for_project(&project);
    let engine = TokenFilteringEngine;

    match &cli.command {
        Command::Assemble(args) => {
            let options = args.to_options(&config.docs);
            match assemble_goal(&project, &options, &attacher, &engine)? {
                AssemblyOutcome::Assembled(report) => {
                    info!("Assembled {} ({} entries)", report.archive, report.entries.len());
                }
                AssemblyOutcome::NothingToAssemble => {}
            }
        }
        Command::Install(args) => {
            let options = args.assemble.to_options(&config.docs);
            let test_runner = test_runner(&config.install, &project);
            let repository = local_repository(args, &config.install, &SystemBaseDirs)?;
            let installer = LocalRepositoryInstaller::new(repository);
            let context = InstallContext {
                attacher: &attacher,
                engine: &engine,
                test_runner: &test_runner,
                installer: &installer,
            };
            let installed = install_goal(&project, &options, args.test.as_deref(), &context)?;
            write_stderr_line(stderr, format!("Installed {installed}"));
        }
    }
    Ok(())
}

/// Use the `-C` directory when given, otherwise the current directory.
fn resolve_project_dir(project_dir: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| e.into_io_error())?;
    Ok(match project_dir {
        Some(dir) if dir.is_absolute() => dir.to_owned(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

fn test_runner(install: &InstallSection, project: &Project) -> CommandTestRunner {
    CommandTestRunner::new(
        install.test_command.clone().unwrap_or_default(),
        project.base_dir(),
    )
    .with_timeout(Duration::from_secs(install.test_timeout_secs))
}

/// Pick the repository root: `--local-repo`, then configuration, then the
/// conventional per-user location.
fn local_repository(
    args: &InstallArgs,
    install: &InstallSection,
    dirs: &dyn BaseDirs,
) -> Result<Utf8PathBuf> {
    match args
        .local_repo
        .as_ref()
        .or(install.local_repository.as_ref())
    {
        Some(repository) => Ok(repository.clone()),
        None => default_local_repository(dirs),
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, error_chain(&err));
            1
        }
    }
}

/// Render an error followed by its sources.
fn error_chain(err: &AssemblerError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // Some variants already embed their source in the message.
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct FixedHome(Option<Utf8PathBuf>);

    impl BaseDirs for FixedHome {
        fn home_dir(&self) -> Option<Utf8PathBuf> {
            self.0.clone()
        }
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = AssemblerError::NotADirectory {
            path: Utf8PathBuf::from("/work/notes.txt"),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("not a directory: /work/notes.txt"));
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = AssemblerError::ArchiveCreation {
            path: Utf8PathBuf::from("/work/target/foo-1.0-docs.jar"),
            source: std::io::Error::other("disk full"),
        };
        let message = error_chain(&err);
        assert!(message.ends_with(": disk full"));
    }

    #[rstest]
    #[case::default(&["docs-assembler", "assemble"], LevelFilter::Info)]
    #[case::quiet(&["docs-assembler", "-q", "assemble"], LevelFilter::Warn)]
    #[case::verbose(&["docs-assembler", "-v", "assemble"], LevelFilter::Debug)]
    #[case::very_verbose(&["docs-assembler", "-vv", "assemble"], LevelFilter::Trace)]
    fn log_level_follows_flags(#[case] argv: &[&str], #[case] expected: LevelFilter) {
        let cli = Cli::parse_from(argv);
        assert_eq!(log_level(&cli), expected);
    }

    #[rstest]
    #[case::flag(Some("/cli"), Some("/config"), "/cli")]
    #[case::config(None, Some("/config"), "/config")]
    #[case::home(None, None, "/home/docs/.m2/repository")]
    fn local_repository_precedence(
        #[case] flag: Option<&str>,
        #[case] configured: Option<&str>,
        #[case] expected: &str,
    ) {
        let args = InstallArgs {
            local_repo: flag.map(Utf8PathBuf::from),
            ..InstallArgs::default()
        };
        let install = InstallSection {
            local_repository: configured.map(Utf8PathBuf::from),
            ..InstallSection::default()
        };
        let dirs = FixedHome(Some(Utf8PathBuf::from("/home/docs")));

        let repository = local_repository(&args, &install, &dirs).expect("repository");
        assert_eq!(repository, Utf8PathBuf::from(expected));
    }

    #[test]
    fn local_repository_requires_home_without_configuration() {
        let result = local_repository(
            &InstallArgs::default(),
            &InstallSection::default(),
            &FixedHome(None),
        );
        assert!(matches!(result, Err(AssemblerError::LocalRepositoryUnknown)));
    }

    #[test]
    fn project_dir_is_resolved_against_cwd() {
        let cwd = Utf8PathBuf::try_from(std::env::current_dir().expect("cwd")).expect("utf8 cwd");
        assert_eq!(
            resolve_project_dir(Some(Utf8Path::new("docs-project"))).expect("resolved"),
            cwd.join("docs-project")
        );
        assert_eq!(resolve_project_dir(None).expect("resolved"), cwd);
    }
}
