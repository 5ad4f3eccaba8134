//! Outdated dependency scan (`flutter pub outdated --json`)
//!
//! Payload shape:
//!
//! ```json
//! {"packages": [{
//!     "package": "http", "kind": "direct",
//!     "current": {"version": "0.13.6"}, "upgradable": {"version": "0.13.6"},
//!     "resolvable": {"version": "1.2.0"}, "latest": {"version": "1.2.0"}
//! }]}
//! ```
//!
//! Any of the version objects may be `null` or missing.

use super::CheckContext;
use crate::models::{OutdatedDetail, OutdatedPackage, StepDetail, StepKind, StepReport, StepStatus};
use crate::versions::{classify, BumpTag};
use anyhow::Result;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum OutdatedError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("expected 'packages' to be a list")]
    PackagesNotList,
}

/// `entry[field].version` as a non-blank string.
///
/// A field of the wrong shape reads as absent, so one odd field never hides
/// the rest of the entry.
fn version(entry: &Value, field: &str) -> Option<String> {
    entry
        .get(field)
        .and_then(|v| v.get("version"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn text(entry: &Value, field: &str) -> Option<String> {
    entry.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Pick the stream holding the JSON document.
///
/// Some Flutter versions print the report on stderr.
pub fn select_payload<'o>(stdout: &'o str, stderr: &'o str) -> &'o str {
    if stdout.trim_start().starts_with('{') {
        stdout
    } else {
        stderr
    }
}

/// Parse the payload into the packages that can be upgraded.
///
/// The upgrade target is `resolvable`, falling back to `upgradable`. A package
/// is listed when it has a target whose bump against `current` is not `same`.
pub fn parse_outdated(
    payload: &str,
    include_transitive: bool,
) -> Result<Vec<OutdatedPackage>, OutdatedError> {
    let data: Value = serde_json::from_str(payload)?;
    let object = data.as_object().ok_or(OutdatedError::NotAnObject)?;

    let entries = match object.get("packages") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(OutdatedError::PackagesNotList),
    };

    let mut outdated = Vec::new();
    for entry in entries {
        if !entry.is_object() {
            debug!("Skipping non-object package entry: {}", entry);
            continue;
        }
        let kind = text(entry, "kind");
        if !include_transitive && kind.as_deref() == Some("transitive") {
            continue;
        }

        let current = version(entry, "current");
        let Some(upgradable) = version(entry, "resolvable").or_else(|| version(entry, "upgradable"))
        else {
            continue;
        };

        let bump = match &current {
            Some(current) => classify(current, &upgradable),
            None => BumpTag::Unknown,
        };
        if bump == BumpTag::Same {
            continue;
        }

        let name = text(entry, "package").unwrap_or_else(|| {
            warn!("Package entry without a name: {}", entry);
            String::new()
        });
        outdated.push(OutdatedPackage {
            name,
            kind,
            current,
            upgradable: Some(upgradable),
            latest: version(entry, "latest"),
            bump,
        });
    }

    Ok(outdated)
}

pub fn run(ctx: &CheckContext<'_>) -> Result<StepReport> {
    let output = ctx
        .flutter(
            &["pub", "outdated", "--json"],
            Some(StepKind::Outdated.label()),
        )?
        .ensure_success()?;

    let payload = select_payload(&output.stdout, &output.stderr);
    let (status, detail) = match parse_outdated(payload, ctx.config.outdated.include_transitive) {
        Ok(packages) if packages.is_empty() => {
            (StepStatus::Passed, OutdatedDetail::Packages { packages })
        }
        Ok(packages) => (StepStatus::Warning, OutdatedDetail::Packages { packages }),
        Err(e) => {
            warn!("Couldn't parse `flutter pub outdated` output: {}", e);
            (
                StepStatus::Warning,
                OutdatedDetail::Unparseable {
                    error: e.to_string(),
                },
            )
        }
    };

    Ok(StepReport::new(
        StepKind::Outdated,
        status,
        StepDetail::Outdated(detail),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::ScriptedRunner;
    use crate::config::CiConfig;

    const PAYLOAD: &str = r#"{
        "packages": [
            {
                "package": "mockito",
                "kind": "direct",
                "current": {"version": "5.0.0"},
                "upgradable": {"version": "5.1.0"},
                "resolvable": {"version": "5.1.0"},
                "latest": {"version": "5.2.0"}
            },
            {
                "package": "toster",
                "kind": "transitive",
                "current": {"version": "5.0.0"},
                "upgradable": {"version": "5.1.0"},
                "resolvable": {"version": "5.1.0"},
                "latest": {"version": "5.2.0"}
            },
            {
                "package": "path",
                "kind": "direct",
                "current": {"version": "1.9.0"},
                "upgradable": {"version": "1.9.0"},
                "resolvable": {"version": "1.9.0"},
                "latest": {"version": "1.9.0"}
            }
        ]
    }"#;

    #[test]
    fn test_direct_outdated_listed_transitive_excluded() {
        let packages = parse_outdated(PAYLOAD, false).unwrap();
        assert_eq!(packages.len(), 1);
        let mockito = &packages[0];
        assert_eq!(mockito.name, "mockito");
        assert_eq!(mockito.current.as_deref(), Some("5.0.0"));
        assert_eq!(mockito.upgradable.as_deref(), Some("5.1.0"));
        assert_eq!(mockito.latest.as_deref(), Some("5.2.0"));
        assert_eq!(mockito.bump, BumpTag::Minor);
    }

    #[test]
    fn test_include_transitive() {
        let names: Vec<_> = parse_outdated(PAYLOAD, true)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["mockito", "toster"]);
    }

    #[test]
    fn test_resolvable_preferred_over_upgradable() {
        let payload = r#"{"packages": [{
            "package": "http", "kind": "direct",
            "current": {"version": "0.13.6"},
            "upgradable": {"version": "0.13.6"},
            "resolvable": {"version": "1.2.0"},
            "latest": {"version": "1.2.0"}
        }]}"#;
        let packages = parse_outdated(payload, false).unwrap();
        assert_eq!(packages[0].upgradable.as_deref(), Some("1.2.0"));
        assert_eq!(packages[0].bump, BumpTag::Major);
    }

    #[test]
    fn test_missing_fields_are_absent_not_empty() {
        let payload = r#"{"packages": [
            {"package": "new_dep", "kind": "direct", "current": null,
             "resolvable": {"version": "2.0.0"}, "latest": null},
            {"package": "gone", "kind": "direct", "current": {"version": "1.0.0"},
             "resolvable": null, "upgradable": null},
            {"package": "weird", "kind": "dev", "current": {"version": "main"},
             "resolvable": {"version": "1.0.0"}}
        ]}"#;
        let packages = parse_outdated(payload, false).unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "new_dep");
        assert_eq!(packages[0].current, None);
        assert_eq!(packages[0].latest, None);
        assert_eq!(packages[0].bump, BumpTag::Unknown);
        assert_eq!(packages[1].name, "weird");
        assert_eq!(packages[1].bump, BumpTag::Unknown);
    }

    #[test]
    fn test_invalid_entries_skipped() {
        let packages = parse_outdated(r#"{"packages": [null, 3, "x"]}"#, false).unwrap();
        assert!(packages.is_empty());
        let packages =
            parse_outdated(r#"{"packages": [{"package": "a", "current": "1.0.0"}]}"#, false)
                .unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn test_malformed_field_degrades_to_none() {
        let payload = r#"{"packages": [
            {"package": "http", "kind": "direct",
             "current": {"version": "0.13.6"}, "resolvable": {"version": "1.2.0"},
             "latest": "1.2.0"},
            {"package": "dio", "kind": "direct",
             "current": {"version": 5}, "resolvable": {"version": "5.4.0"}}
        ]}"#;
        let packages = parse_outdated(payload, false).unwrap();
        assert_eq!(packages.len(), 2);

        let http = &packages[0];
        assert_eq!(http.name, "http");
        assert_eq!(http.latest, None);
        assert_eq!(http.bump, BumpTag::Major);

        let dio = &packages[1];
        assert_eq!(dio.current, None);
        assert_eq!(dio.upgradable.as_deref(), Some("5.4.0"));
        assert_eq!(dio.bump, BumpTag::Unknown);
    }

    #[test]
    fn test_invalid_payloads() {
        assert!(matches!(
            parse_outdated(r#"{"packages": "not a list"}"#, false),
            Err(OutdatedError::PackagesNotList)
        ));
        assert!(matches!(
            parse_outdated("Resolving dependencies...", false),
            Err(OutdatedError::Json(_))
        ));
        assert!(matches!(parse_outdated("[]", false), Err(OutdatedError::NotAnObject)));
        assert!(parse_outdated("{}", false).unwrap().is_empty());
    }

    #[test]
    fn test_select_payload() {
        assert_eq!(select_payload("  {\"a\":1}", "err"), "  {\"a\":1}");
        assert_eq!(select_payload("Resolving...", "{}"), "{}");
    }

    #[test]
    fn test_step_reports_unparseable_output_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new().ok(0, "", r#"{"packages": "not a list"}"#);
        let config = CiConfig::default();
        let ctx = CheckContext::new(&runner, &config, dir.path()).quiet();

        let step = run(&ctx).unwrap();

        assert_eq!(step.status, StepStatus::Warning);
        assert!(matches!(
            step.detail,
            StepDetail::Outdated(OutdatedDetail::Unparseable { .. })
        ));
    }

    #[test]
    fn test_step_up_to_date_passes() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new().ok(0, r#"{"packages": [null]}"#, "");
        let config = CiConfig::default();
        let ctx = CheckContext::new(&runner, &config, dir.path()).quiet();

        let step = run(&ctx).unwrap();

        assert_eq!(step.status, StepStatus::Passed);
    }

    #[test]
    fn test_step_nonzero_exit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new().ok(65, "", "boom");
        let config = CiConfig::default();
        let ctx = CheckContext::new(&runner, &config, dir.path()).quiet();

        let err = run(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "Command failed: flutter pub outdated --json");
    }
}
