//! The CI pipeline
//!
//! Steps run one after another against the project directory:
//! `pub get`, `pub outdated`, `analyze`, then `test --coverage`. A failing
//! step is recorded in the report and the next step still runs.

mod analyze;
mod outdated;
mod pub_get;
mod test_run;

pub use analyze::count_issues;
pub use outdated::{parse_outdated, select_payload, OutdatedError};

use crate::config::CiConfig;
use crate::models::{CiReport, StepKind, StepReport};
use crate::runner::{split_command, with_args, CommandOutput, CommandRunner, RunError};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

/// Everything a step needs to run
pub struct CheckContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub config: &'a CiConfig,
    pub project: &'a Path,
    flutter: Vec<String>,
    /// Echo command output and GitHub Actions group markers to the console
    pub echo: bool,
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap()
}

impl<'a> CheckContext<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a CiConfig, project: &'a Path) -> Self {
        Self {
            runner,
            config,
            project,
            flutter: split_command(&config.flutter.command),
            echo: true,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Whether `kind` is enabled by configuration
    pub fn enabled(&self, kind: StepKind) -> bool {
        let steps = &self.config.steps;
        match kind {
            StepKind::PubGet => true,
            StepKind::Outdated => steps.outdated,
            StepKind::Analyze => steps.analyze,
            StepKind::Tests => steps.tests,
        }
    }

    /// Run `flutter <args>` in the project, wrapped in a log group when labelled.
    ///
    /// The exit status is not checked here; callers decide via
    /// [`CommandOutput::ensure_success`].
    pub fn flutter(&self, args: &[&str], label: Option<&str>) -> Result<CommandOutput, RunError> {
        let argv = with_args(&self.flutter, args);

        if self.echo {
            if let Some(label) = label {
                println!("::group::{}", label);
            }
            println!("➤ Running: {}", argv.join(" "));
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!("{}...", argv.join(" ")));
        spinner.enable_steady_tick(Duration::from_millis(100));
        let result = self.runner.run(&argv, self.project);
        spinner.finish_and_clear();

        if self.echo {
            if let Ok(output) = &result {
                if !output.stdout.is_empty() {
                    println!("{}", output.stdout);
                }
                if !output.stderr.is_empty() {
                    eprintln!("{}", output.stderr);
                }
            }
            if label.is_some() {
                println!("::endgroup::");
            }
        }

        result
    }
}

/// Run every step and collect the report.
pub fn run_pipeline(ctx: &CheckContext<'_>) -> CiReport {
    let mut report = CiReport::new(&ctx.config.report.title, ctx.project.to_path_buf());
    for kind in StepKind::ALL {
        report.push(run_step(ctx, kind));
    }
    report
}

/// Run one step, turning a disabled flag or an error into its report entry.
pub fn run_step(ctx: &CheckContext<'_>, kind: StepKind) -> StepReport {
    if !ctx.enabled(kind) {
        let flag = kind.env_flag().unwrap_or("config");
        info!("Skipping {} (disabled via {})", kind.label(), flag);
        return StepReport::skipped(kind, format!("disabled via {}", flag));
    }

    let result = match kind {
        StepKind::PubGet => pub_get::run(ctx),
        StepKind::Outdated => outdated::run(ctx),
        StepKind::Analyze => analyze::run(ctx),
        StepKind::Tests => test_run::run(ctx),
    };

    result.unwrap_or_else(|e| {
        error!("{} failed: {:#}", kind.label(), e);
        StepReport::failed(kind, format!("{:#}", e))
    })
}
