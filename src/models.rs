//! Report data model
//!
//! Each check produces a [`StepReport`]; the pipeline collects them into a
//! [`CiReport`] which the reporters render.

use crate::coverage::CoverageSummary;
use crate::versions::BumpTag;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Steps in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    PubGet,
    Outdated,
    Analyze,
    Tests,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [
        StepKind::PubGet,
        StepKind::Outdated,
        StepKind::Analyze,
        StepKind::Tests,
    ];

    /// Heading used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::PubGet => "Resolve dependencies",
            StepKind::Outdated => "Check for outdated packages",
            StepKind::Analyze => "Run analysis",
            StepKind::Tests => "Run tests",
        }
    }

    /// Environment flag that gates the step (`pub get` always runs)
    pub fn env_flag(&self) -> Option<&'static str> {
        match self {
            StepKind::PubGet => None,
            StepKind::Outdated => Some(crate::config::ENV_CHECK_OUTDATED),
            StepKind::Analyze => Some(crate::config::ENV_ANALYZE),
            StepKind::Tests => Some(crate::config::ENV_RUN_TESTS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    /// Completed, but found something worth a look
    Warning,
    Failed { error: String },
    Skipped { reason: String },
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub kind: StepKind,
    #[serde(flatten)]
    pub status: StepStatus,
    #[serde(skip_serializing_if = "StepDetail::is_empty", default)]
    pub detail: StepDetail,
}

impl StepReport {
    pub fn new(kind: StepKind, status: StepStatus, detail: StepDetail) -> Self {
        Self {
            kind,
            status,
            detail,
        }
    }

    pub fn failed(kind: StepKind, error: impl std::fmt::Display) -> Self {
        Self::new(
            kind,
            StepStatus::Failed {
                error: error.to_string(),
            },
            StepDetail::None,
        )
    }

    pub fn skipped(kind: StepKind, reason: impl Into<String>) -> Self {
        Self::new(
            kind,
            StepStatus::Skipped {
                reason: reason.into(),
            },
            StepDetail::None,
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, StepStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetail {
    #[default]
    None,
    Outdated(OutdatedDetail),
    Analysis(AnalysisDetail),
    Tests(TestsDetail),
}

impl StepDetail {
    pub fn is_empty(&self) -> bool {
        matches!(self, StepDetail::None)
    }
}

/// A dependency with a newer resolvable version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutdatedPackage {
    pub name: String,
    pub kind: Option<String>,
    pub current: Option<String>,
    pub upgradable: Option<String>,
    pub latest: Option<String>,
    pub bump: BumpTag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OutdatedDetail {
    Packages { packages: Vec<OutdatedPackage> },
    /// The tool output could not be understood
    Unparseable { error: String },
}

/// Issue counts by severity from `flutter analyze`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueCounts {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetail {
    pub has_issues: bool,
    pub counts: IssueCounts,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCoverageEntry {
    pub path: PathBuf,
    pub covered: usize,
    pub total: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CoverageOutcome {
    Measured {
        summary: CoverageSummary,
        lowest_files: Vec<FileCoverageEntry>,
    },
    /// Tracefile present but without line data
    NoData,
    /// Tracefile not written
    Missing { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestsDetail {
    pub coverage: CoverageOutcome,
    pub output: String,
}

/// The full report for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CiReport {
    pub title: String,
    pub generated_at: String,
    pub project: PathBuf,
    pub steps: Vec<StepReport>,
}

impl CiReport {
    pub fn new(title: impl Into<String>, project: PathBuf) -> Self {
        Self {
            title: title.into(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            project,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, step: StepReport) {
        self.steps.push(step);
    }

    pub fn step(&self, kind: StepKind) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.is_failed())
    }

    pub fn has_failures(&self) -> bool {
        self.failed_steps().next().is_some()
    }
}
