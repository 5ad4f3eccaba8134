//! CLI command definitions and handlers

mod doctor;
mod init;
mod inspect;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use run::RunOptions;

/// flutter-ci - CI checks for Flutter projects
#[derive(Parser, Debug)]
#[command(name = "flutter-ci")]
#[command(
    version,
    about = "Run Flutter CI checks (pub get, outdated, analyze, tests + coverage) and report on the pull request",
    long_about = "Runs a fixed sequence of checks against a Flutter project and writes a \
Markdown report. Inside a pull request the report is posted as a comment.\n\n\
Run without a subcommand to check the current directory:\n  \
flutter-ci .",
    after_help = "\
Examples:
  flutter-ci .                          Run all checks in the current directory
  flutter-ci run app --no-tests         Skip the test step
  flutter-ci run . --format json -o ci.json
  flutter-ci bump --old 1.2.3 --new 2.0.0
  flutter-ci coverage --lcov build/lcov.info
  flutter-ci doctor                     Check the environment

Environment:
  CHECK_OUTDATED, ANALYZE, RUN_TESTS, COMMENT_PR   step toggles (default true)
  FLUTTER_CMD                                       Flutter command (default flutter)
  PR_NUMBER, GITHUB_TOKEN, GITHUB_REPOSITORY        PR comment target"
)]
pub struct Cli {
    /// Path to the Flutter project (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the CI checks and write the report
    #[command(after_help = "\
Examples:
  flutter-ci run .                       Run every enabled step
  flutter-ci run . --no-analyze          Skip static analysis
  flutter-ci run . --no-comment          Never comment on the PR
  flutter-ci run . --strict              Exit 1 if any step failed")]
    Run(RunOptions),

    /// Classify the upgrade between two versions (major, minor, patch, same, other, unknown)
    Bump {
        /// Current version
        #[arg(long)]
        old: String,
        /// Candidate version
        #[arg(long)]
        new: String,
    },

    /// Summarize an LCOV tracefile
    Coverage {
        /// Tracefile (default: coverage/lcov.info under the project path)
        #[arg(long, short = 'l')]
        lcov: Option<PathBuf>,
    },

    /// Check environment setup (Flutter command, project, GitHub variables)
    Doctor,

    /// Write an example flutter-ci.toml into the project
    Init,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(options)) => run::run(&cli.path, options),
        Some(Commands::Bump { old, new }) => inspect::bump(&old, &new),
        Some(Commands::Coverage { lcov }) => inspect::coverage(&cli.path, lcov.as_deref()),
        Some(Commands::Doctor) => doctor::run(&cli.path),
        Some(Commands::Init) => init::run(&cli.path),
        None => {
            check_unknown_subcommand(&cli.path)?;
            run::run(&cli.path, RunOptions::default())
        }
    }
}

/// Check if the path looks like a mistyped subcommand and bail with a helpful message
fn check_unknown_subcommand(path: &std::path::Path) -> Result<()> {
    let path_str = path.to_string_lossy();
    let looks_like_command = !path.exists()
        && !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.starts_with('.');
    if looks_like_command {
        anyhow::bail!(
            "Unknown command '{}'. Run 'flutter-ci --help' for available commands.\n\nDid you mean one of: run, bump, coverage, doctor, init?",
            path_str
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::parse_from([
            "flutter-ci", "run", "app", "--no-tests", "--format", "json", "--strict",
        ]);
        assert_eq!(cli.path, PathBuf::from("app"));
        match cli.command {
            Some(Commands::Run(opts)) => {
                assert!(opts.no_tests);
                assert!(!opts.no_analyze);
                assert!(opts.strict);
                assert_eq!(opts.format, "json");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_bump() {
        let cli = Cli::parse_from(["flutter-ci", "bump", "--old", "1.0.0", "--new", "2.0.0"]);
        match cli.command {
            Some(Commands::Bump { old, new }) => assert_eq!((old.as_str(), new.as_str()), ("1.0.0", "2.0.0")),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.path, PathBuf::from("."));
    }

    #[test]
    fn test_unknown_subcommand_detection() {
        assert!(check_unknown_subcommand(std::path::Path::new("anaylze")).is_err());
        assert!(check_unknown_subcommand(std::path::Path::new(".")).is_ok());
        assert!(check_unknown_subcommand(std::path::Path::new("./missing")).is_ok());
    }
}
