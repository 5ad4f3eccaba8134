//! Static analysis (`flutter analyze`)
//!
//! The analyzer exits non-zero whenever it finds anything, so the exit code
//! is not treated as a failure. Issue lines look like
//!
//! ```text
//!    info • Avoid `print` calls in production code • lib/main.dart:7:3 • avoid_print
//! warning - lib/main.dart:9:7 - Unused import - unused_import
//! ```

use super::CheckContext;
use crate::models::{AnalysisDetail, IssueCounts, StepDetail, StepKind, StepReport, StepStatus};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static ISSUE_LINE: OnceLock<Regex> = OnceLock::new();

fn issue_line() -> &'static Regex {
    ISSUE_LINE.get_or_init(|| Regex::new(r"^\s*(error|warning|info)\s+(?:•|-)\s+\S").unwrap())
}

/// Count issue lines by severity.
pub fn count_issues(output: &str) -> IssueCounts {
    let mut counts = IssueCounts::default();
    for caps in output.lines().filter_map(|l| issue_line().captures(l)) {
        match &caps[1] {
            "error" => counts.errors += 1,
            "warning" => counts.warnings += 1,
            _ => counts.infos += 1,
        }
    }
    counts
}

fn has_issues(stdout: &str) -> bool {
    stdout.contains('•') || stdout.to_lowercase().contains("warning")
}

pub fn run(ctx: &CheckContext<'_>) -> Result<StepReport> {
    let output = ctx.flutter(&["analyze", "--no-pub"], Some(StepKind::Analyze.label()))?;

    let has_issues = has_issues(&output.stdout);
    let detail = AnalysisDetail {
        has_issues,
        counts: count_issues(&output.stdout),
        stdout: output.stdout,
        stderr: output.stderr,
    };
    let status = if has_issues {
        StepStatus::Warning
    } else {
        StepStatus::Passed
    };

    Ok(StepReport::new(
        StepKind::Analyze,
        status,
        StepDetail::Analysis(detail),
    ))
}
