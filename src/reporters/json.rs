//! JSON reporter
//!
//! Outputs the full CiReport as pretty-printed JSON.

use crate::models::CiReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &CiReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        let steps = parsed["steps"].as_array().expect("steps array");
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[1]["kind"], "outdated");
        assert_eq!(steps[1]["status"], "warning");
        assert_eq!(steps[1]["detail"]["packages"][0]["bump"], "minor");
        assert_eq!(steps[3]["detail"]["coverage"]["summary"]["tier"], "good");
    }

    #[test]
    fn test_json_round_trips() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let back: CiReport = serde_json::from_str(&json_str).expect("deserialize report");
        assert_eq!(back, report);
    }
}
