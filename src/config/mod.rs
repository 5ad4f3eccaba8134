//! Configuration for a CI run
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `flutter-ci.toml` in the project directory
//! 3. Environment variables (`FLUTTER_CMD`, `CHECK_OUTDATED`, `ANALYZE`,
//!    `RUN_TESTS`, `COMMENT_PR`)
//! 4. CLI flags (applied by the `run` command)
//!
//! ```toml
//! # flutter-ci.toml
//! [flutter]
//! command = "fvm flutter"
//! timeout_secs = 1800
//!
//! [steps]
//! outdated = true
//! analyze = true
//! tests = true
//! comment_pr = false
//!
//! [outdated]
//! include_transitive = false
//!
//! [coverage]
//! lcov_path = "coverage/lcov.info"
//! lowest_files = 5
//!
//! [report]
//! path = "ci_report.md"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in the project directory
pub const CONFIG_FILE: &str = "flutter-ci.toml";

pub const ENV_FLUTTER_CMD: &str = "FLUTTER_CMD";
pub const ENV_CHECK_OUTDATED: &str = "CHECK_OUTDATED";
pub const ENV_ANALYZE: &str = "ANALYZE";
pub const ENV_RUN_TESTS: &str = "RUN_TESTS";
pub const ENV_COMMENT_PR: &str = "COMMENT_PR";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CiConfig {
    pub flutter: FlutterConfig,
    pub steps: StepToggles,
    pub outdated: OutdatedConfig,
    pub coverage: CoverageConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FlutterConfig {
    /// Command used to invoke Flutter, split on whitespace
    pub command: String,
    /// Per-command timeout in seconds (0 = none)
    pub timeout_secs: u64,
}

impl Default for FlutterConfig {
    fn default() -> Self {
        Self {
            command: "flutter".to_string(),
            timeout_secs: 0,
        }
    }
}

/// Which optional steps run. `pub get` always runs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StepToggles {
    pub outdated: bool,
    pub analyze: bool,
    pub tests: bool,
    pub comment_pr: bool,
}

impl Default for StepToggles {
    fn default() -> Self {
        Self {
            outdated: true,
            analyze: true,
            tests: true,
            comment_pr: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutdatedConfig {
    /// List transitive dependencies as well as direct/dev ones
    pub include_transitive: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CoverageConfig {
    /// Tracefile written by `flutter test --coverage`, relative to the project
    pub lcov_path: PathBuf,
    /// How many least-covered files to list (0 = none)
    pub lowest_files: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            lcov_path: PathBuf::from("coverage/lcov.info"),
            lowest_files: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Report file, relative to the project
    pub path: PathBuf,
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ci_report.md"),
            title: "🛠️ Flutter CI Checks Report".to_string(),
        }
    }
}

impl CiConfig {
    /// Load defaults, the project file, then environment overrides.
    pub fn load(project: &Path) -> Self {
        let mut config = Self::load_file(project);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Defaults overlaid with `flutter-ci.toml`, if present and valid.
    pub fn load_file(project: &Path) -> Self {
        let path = project.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No {} found, using defaults", CONFIG_FILE);
            return Self::default();
        }
        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(toml::from_str::<CiConfig>(&content)?))
        {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply environment overrides through `lookup` (injectable for tests).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cmd) = lookup(ENV_FLUTTER_CMD).filter(|c| !c.trim().is_empty()) {
            self.flutter.command = cmd;
        }
        let toggles = [
            (ENV_CHECK_OUTDATED, &mut self.steps.outdated),
            (ENV_ANALYZE, &mut self.steps.analyze),
            (ENV_RUN_TESTS, &mut self.steps.tests),
            (ENV_COMMENT_PR, &mut self.steps.comment_pr),
        ];
        for (key, flag) in toggles {
            if let Some(value) = lookup(key) {
                *flag = flag_enabled(&value);
            }
        }
    }

    pub fn lcov_path(&self, project: &Path) -> PathBuf {
        project.join(&self.coverage.lcov_path)
    }

    pub fn report_path(&self, project: &Path) -> PathBuf {
        project.join(&self.report.path)
    }
}

/// Only a case-insensitive `true` enables a step.
pub fn flag_enabled(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Example file written by `flutter-ci init`
pub const EXAMPLE_CONFIG: &str = r#"# flutter-ci configuration
# Environment variables (CHECK_OUTDATED, ANALYZE, RUN_TESTS, COMMENT_PR,
# FLUTTER_CMD) override these values.

[flutter]
# Command used to invoke Flutter (e.g. "fvm flutter")
command = "flutter"
# Kill any single command after this many seconds (0 = no limit)
timeout_secs = 0

[steps]
outdated = true
analyze = true
tests = true
comment_pr = true

[outdated]
# Also list transitive dependencies
include_transitive = false

[coverage]
lcov_path = "coverage/lcov.info"
# Least-covered files to list in the report (0 disables the table)
lowest_files = 5

[report]
path = "ci_report.md"
"#;
