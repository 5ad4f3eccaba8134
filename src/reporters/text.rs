//! Text (terminal) reporter with colors

use crate::models::{CiReport, CoverageOutcome, OutdatedDetail, StepDetail, StepStatus};
use anyhow::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Status tag padded to a fixed width before colouring, so rows line up.
fn status_tag(status: &StepStatus) -> String {
    let (colour, tag) = match status {
        StepStatus::Passed => (GREEN, "[ok]"),
        StepStatus::Warning => (YELLOW, "[warn]"),
        StepStatus::Failed { .. } => (RED, "[fail]"),
        StepStatus::Skipped { .. } => (DIM, "[skip]"),
    };
    format!("{colour}{tag:<6}{RESET}")
}

fn step_note(status: &StepStatus, detail: &StepDetail) -> String {
    match (status, detail) {
        (StepStatus::Failed { error }, _) => error.clone(),
        (StepStatus::Skipped { reason }, _) => reason.clone(),
        (_, StepDetail::Outdated(OutdatedDetail::Packages { packages })) => {
            format!("{} outdated", packages.len())
        }
        (_, StepDetail::Outdated(OutdatedDetail::Unparseable { .. })) => {
            "output not understood".to_string()
        }
        (_, StepDetail::Analysis(a)) if a.has_issues => format!(
            "{} errors, {} warnings, {} infos",
            a.counts.errors, a.counts.warnings, a.counts.infos
        ),
        (_, StepDetail::Analysis(_)) => "no issues".to_string(),
        (_, StepDetail::Tests(t)) => match &t.coverage {
            CoverageOutcome::Measured { summary, .. } => {
                format!("coverage {:.2}% ({})", summary.percent, summary.tier)
            }
            CoverageOutcome::NoData => "no coverage data".to_string(),
            CoverageOutcome::Missing { .. } => "coverage missing".to_string(),
        },
        (_, StepDetail::None) => String::new(),
    }
}

/// Render report as a short terminal summary
pub fn render(report: &CiReport) -> Result<String> {
    let mut out = String::new();
    out.push_str(&format!("\n{BOLD}Flutter CI Checks{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));

    for step in &report.steps {
        out.push_str(&format!(
            "{} {:<28} {}\n",
            status_tag(&step.status),
            step.kind.label(),
            step_note(&step.status, &step.detail)
        ));
    }

    let failed = report.failed_steps().count();
    if failed > 0 {
        out.push_str(&format!("\n{RED}{BOLD}{} step(s) failed{RESET}\n", failed));
    } else {
        out.push_str(&format!("\n{GREEN}{BOLD}All steps completed{RESET}\n"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StepKind, StepReport};
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_summary() {
        let out = render(&test_report()).unwrap();
        assert!(out.contains("Check for outdated packages"));
        assert!(out.contains("1 outdated"));
        assert!(out.contains("0 errors, 1 warnings, 0 infos"));
        assert!(out.contains("coverage 75.00% (good)"));
        assert!(out.contains("All steps completed"));
    }

    #[test]
    fn test_status_tags_same_visible_width() {
        let visible = |s: String| {
            [GREEN, YELLOW, RED, DIM, RESET]
                .iter()
                .fold(s, |acc, code| acc.replace(code, ""))
        };
        let widths: Vec<usize> = [
            StepStatus::Passed,
            StepStatus::Warning,
            StepStatus::Failed { error: "x".into() },
            StepStatus::Skipped { reason: "y".into() },
        ]
        .iter()
        .map(|s| visible(status_tag(s)).chars().count())
        .collect();
        assert_eq!(widths, vec![6, 6, 6, 6]);
    }

    #[test]
    fn test_text_failures_counted() {
        let mut report = test_report();
        report.steps[3] = StepReport::failed(StepKind::Tests, "Command failed: flutter test");
        let out = render(&report).unwrap();
        assert!(out.contains("Command failed: flutter test"));
        assert!(out.contains("1 step(s) failed"));
    }
}
