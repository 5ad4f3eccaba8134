//! Markdown reporter for GitHub-flavored Markdown output
//!
//! This is the format written to the report file and posted as the pull
//! request comment.

use crate::models::{
    AnalysisDetail, CiReport, CoverageOutcome, OutdatedDetail, OutdatedPackage, StepDetail,
    StepKind, StepReport, StepStatus, TestsDetail,
};
use anyhow::Result;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &CiReport) -> Result<String> {
    let mut md = format!("# {}\n\n", report.title);

    for step in &report.steps {
        md.push_str(&render_step(step));
    }

    md.push_str(&render_footer(report));
    Ok(md)
}

fn render_step(step: &StepReport) -> String {
    // `pub get` only shows up when something went wrong
    if step.kind == StepKind::PubGet && !step.is_failed() {
        return String::new();
    }

    let mut md = format!("## {}\n\n", step.kind.label());

    match &step.status {
        StepStatus::Failed { error } => {
            md.push_str(&format!("❌ **{} failed:** {}\n\n", step.kind.label(), error));
            return md;
        }
        StepStatus::Skipped { reason } => {
            md.push_str(&format!("⏭️ _Skipped ({})_\n\n", reason));
            return md;
        }
        StepStatus::Passed | StepStatus::Warning => {}
    }

    match &step.detail {
        StepDetail::Outdated(detail) => md.push_str(&render_outdated(detail)),
        StepDetail::Analysis(detail) => md.push_str(&render_analysis(detail)),
        StepDetail::Tests(detail) => md.push_str(&render_tests(detail)),
        StepDetail::None => md.push_str("✅ Done\n\n"),
    }
    md
}

/// Keep `|` inside a value from ending the table cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

fn cell(value: &Option<String>) -> String {
    value.as_deref().map_or_else(|| "—".to_string(), escape_cell)
}

fn render_package_row(pkg: &OutdatedPackage) -> String {
    format!(
        "| {} | {} | {} | {} | {} {} |\n",
        escape_cell(&pkg.name),
        cell(&pkg.current),
        cell(&pkg.upgradable),
        cell(&pkg.latest),
        pkg.bump.emoji(),
        pkg.bump
    )
}

fn render_outdated(detail: &OutdatedDetail) -> String {
    match detail {
        OutdatedDetail::Unparseable { error } => {
            format!("⚠️ Couldn't parse `flutter pub outdated` output: {}\n\n", error)
        }
        OutdatedDetail::Packages { packages } if packages.is_empty() => {
            "✅ All packages are up to date.\n\n".to_string()
        }
        OutdatedDetail::Packages { packages } => {
            let mut md = String::from(
                "| Package | Current | Upgradable | Latest | Bump |\n\
                 |---------|---------|------------|--------|------|\n",
            );
            for pkg in packages {
                md.push_str(&render_package_row(pkg));
            }
            md.push('\n');
            md
        }
    }
}

fn code_block(content: &str) -> String {
    format!("```\n{}\n```\n\n", content.trim())
}

fn render_analysis(detail: &AnalysisDetail) -> String {
    let mut md = String::new();

    if !detail.stderr.is_empty() {
        md.push_str("#### 🔍 Lint Summary\n\n");
        md.push_str(&code_block(&detail.stderr));
    }

    if detail.has_issues {
        let counts = &detail.counts;
        if counts.total() > 0 {
            md.push_str(&format!(
                "❌ **Run analysis found issues**: {} errors, {} warnings, {} infos\n\n",
                counts.errors, counts.warnings, counts.infos
            ));
        } else {
            md.push_str("❌ **Run analysis found issues**\n\n");
        }
    } else {
        md.push_str("✅ **No lint issues found**\n\n");
    }

    if !detail.stdout.is_empty() {
        md.push_str("#### ❗ Lint Issues\n\n");
        md.push_str(&code_block(&detail.stdout));
    }
    md
}

fn render_tests(detail: &TestsDetail) -> String {
    let mut md = String::from("### 🧪 Test Coverage\n\n");

    match &detail.coverage {
        CoverageOutcome::Measured {
            summary,
            lowest_files,
        } => {
            md.push_str(&format!(
                "**{:.2}%** {} {} ({}/{} lines)\n\n",
                summary.percent,
                summary.tier.emoji(),
                summary.tier.message(),
                summary.covered,
                summary.total
            ));
            if !lowest_files.is_empty() {
                md.push_str("<details>\n<summary>Least covered files</summary>\n\n");
                md.push_str("| File | Lines | Coverage |\n|------|-------|----------|\n");
                for file in lowest_files {
                    md.push_str(&format!(
                        "| `{}` | {}/{} | {:.2}% |\n",
                        escape_cell(&file.path.display().to_string()),
                        file.covered,
                        file.total,
                        file.percent
                    ));
                }
                md.push_str("\n</details>\n\n");
            }
        }
        CoverageOutcome::NoData => md.push_str("⚠️ No coverage data found.\n\n"),
        CoverageOutcome::Missing { .. } => {
            md.push_str("⚠️ `lcov.info` not found — coverage missing.\n\n")
        }
    }

    md.push_str("### 🧪 Test Results\n\n");
    md.push_str(&code_block(&detail.output));
    md
}

fn render_footer(report: &CiReport) -> String {
    format!(
        "---\n\n_Generated by flutter-ci {} on {}_\n",
        env!("CARGO_PKG_VERSION"),
        report.generated_at
    )
}
