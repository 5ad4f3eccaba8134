//! Run command - execute the checks, write the report, comment on the PR

use crate::checks::{run_pipeline, CheckContext};
use crate::config::CiConfig;
use crate::github::{CommentPlan, GithubClient};
use crate::models::CiReport;
use crate::reporters::{self, OutputFormat};
use crate::runner::ProcessRunner;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

#[derive(Args, Debug, Clone)]
pub struct RunOptions {
    /// Report format written to the output file: markdown (or md), json
    #[arg(long, short = 'f', default_value = "markdown", value_parser = ["markdown", "md", "json"])]
    pub format: String,

    /// Report file, relative to the project directory (default: [report].path
    /// from flutter-ci.toml, or ci_report.md)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Skip the outdated dependency scan
    #[arg(long)]
    pub no_outdated: bool,

    /// Skip static analysis
    #[arg(long)]
    pub no_analyze: bool,

    /// Skip tests and coverage
    #[arg(long)]
    pub no_tests: bool,

    /// Never comment on the pull request
    #[arg(long)]
    pub no_comment: bool,

    /// Exit with code 1 if any step failed
    #[arg(long)]
    pub strict: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            format: "markdown".to_string(),
            output: None,
            no_outdated: false,
            no_analyze: false,
            no_tests: false,
            no_comment: false,
            strict: false,
        }
    }
}

impl RunOptions {
    /// CLI flags only ever turn steps off.
    pub fn apply(&self, config: &mut CiConfig) {
        let steps = &mut config.steps;
        steps.outdated &= !self.no_outdated;
        steps.analyze &= !self.no_analyze;
        steps.tests &= !self.no_tests;
        steps.comment_pr &= !self.no_comment;
    }

    /// Where the report goes. Relative paths resolve against the project.
    pub fn output_path(&self, config: &CiConfig, project: &Path) -> PathBuf {
        match &self.output {
            Some(output) => project.join(output),
            None => config.report_path(project),
        }
    }
}

pub fn run(path: &Path, options: RunOptions) -> Result<()> {
    let project = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !project.is_dir() {
        anyhow::bail!("Path is not a directory: {}", project.display());
    }

    let format = OutputFormat::from_str(&options.format)?;
    let mut config = CiConfig::load(&project);
    options.apply(&mut config);
    info!("Running Flutter CI checks in {}", project.display());

    let runner = ProcessRunner::new(config.flutter.timeout_secs);
    let ctx = CheckContext::new(&runner, &config, &project);
    let report = run_pipeline(&ctx);

    let output_path = options.output_path(&config, &project);
    let rendered = reporters::report_with_format(&report, format)?;
    std::fs::write(&output_path, &rendered)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    print!("{}", reporters::report_with_format(&report, OutputFormat::Text)?);
    println!(
        "\n{} Report written to {}",
        style("📄").bold(),
        style(output_path.display()).cyan()
    );

    if config.steps.comment_pr {
        comment_on_pr(&report)?;
    } else {
        println!("💬 Skipping PR comment (COMMENT_PR is false)");
    }

    if options.strict && report.has_failures() {
        eprintln!("Failing due to --strict: {} step(s) failed", report.failed_steps().count());
        std::process::exit(1);
    }
    Ok(())
}

/// Post the Markdown report on the pull request, if there is one.
///
/// Missing credentials and API errors are reported but never fail the run.
fn comment_on_pr(report: &CiReport) -> Result<()> {
    let (target, token) = match CommentPlan::from_env() {
        Ok(CommentPlan::NotPullRequest) => {
            println!("⚠️ Not a pull request, skipping PR comment.");
            return Ok(());
        }
        Ok(CommentPlan::Post { target, token }) => (target, token),
        Err(e) => {
            error!("Cannot comment on PR: {}", e);
            eprintln!("❌ {}.", e);
            return Ok(());
        }
    };

    let body = reporters::report_with_format(report, OutputFormat::Markdown)?;
    println!("📬 Commenting on PR #{}...", target.number);

    match GithubClient::new(token).post_comment(&target, &body) {
        Ok(response) => {
            if let Some(url) = response.html_url {
                println!("{} Comment posted: {}", style("✓").green(), url);
            }
        }
        Err(e) => {
            error!("Failed to comment on PR #{}: {}", target.number, e);
            eprintln!("❌ Failed to comment on PR #{}: {}", target.number, e);
        }
    }
    Ok(())
}
