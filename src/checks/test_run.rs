//! Test run with coverage (`flutter test --coverage`)

use super::CheckContext;
use crate::coverage::LcovReport;
use crate::models::{
    CoverageOutcome, FileCoverageEntry, StepDetail, StepKind, StepReport, StepStatus, TestsDetail,
};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Read and summarize the tracefile.
///
/// A missing file is an expected outcome; any other I/O error is not.
pub fn read_coverage(path: &Path, lowest_files: usize) -> Result<CoverageOutcome> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No tracefile at {}", path.display());
            return Ok(CoverageOutcome::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let report = LcovReport::parse(&content);
    let Some(summary) = report.summary() else {
        return Ok(CoverageOutcome::NoData);
    };

    info!(
        "Coverage: {:.2}% ({}/{} lines, {})",
        summary.percent, summary.covered, summary.total, summary.tier
    );

    let lowest_files = report
        .lowest_files(lowest_files)
        .into_iter()
        .map(|(file, s)| FileCoverageEntry {
            path: file.path.clone(),
            covered: s.covered,
            total: s.total,
            percent: s.percent,
        })
        .collect();

    Ok(CoverageOutcome::Measured {
        summary,
        lowest_files,
    })
}

pub fn run(ctx: &CheckContext<'_>) -> Result<StepReport> {
    let output = ctx
        .flutter(
            &["test", "--coverage", "--no-pub"],
            Some(StepKind::Tests.label()),
        )?
        .ensure_success()?;

    let coverage = read_coverage(
        &ctx.config.lcov_path(ctx.project),
        ctx.config.coverage.lowest_files,
    )?;
    let status = match coverage {
        CoverageOutcome::Measured { .. } => StepStatus::Passed,
        CoverageOutcome::NoData | CoverageOutcome::Missing { .. } => StepStatus::Warning,
    };

    Ok(StepReport::new(
        StepKind::Tests,
        status,
        StepDetail::Tests(TestsDetail {
            coverage,
            output: output.stdout,
        }),
    ))
}
