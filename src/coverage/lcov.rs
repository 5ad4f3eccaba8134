//! LCOV tracefile parsing
//!
//! Only the records needed for line coverage are read:
//!
//! ```text
//! SF:lib/main.dart
//! DA:3,1
//! DA:4,0
//! end_of_record
//! ```
//!
//! Everything else (`FN`, `BRDA`, `LF`, `LH`, ...) is ignored.

use super::{summarize, CoverageSummary};
use std::path::PathBuf;
use tracing::debug;

/// Line hits for one source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileCoverage {
    pub path: PathBuf,
    pub hits: Vec<u64>,
}

impl FileCoverage {
    pub fn summary(&self) -> Option<CoverageSummary> {
        summarize(&self.hits)
    }
}

/// Parsed tracefile, one entry per `SF:` record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LcovReport {
    pub files: Vec<FileCoverage>,
}

impl LcovReport {
    pub fn parse(content: &str) -> Self {
        let mut files = Vec::new();
        let mut current: Option<FileCoverage> = None;

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if let Some(path) = line.strip_prefix("SF:") {
                if let Some(done) = current.take() {
                    files.push(done);
                }
                current = Some(FileCoverage {
                    path: PathBuf::from(path),
                    hits: Vec::new(),
                });
            } else if let Some(data) = line.strip_prefix("DA:") {
                match parse_hit_count(data) {
                    // DA lines before any SF still count toward the total
                    Some(count) => current.get_or_insert_with(FileCoverage::default).hits.push(count),
                    None => debug!("Skipping malformed lcov line {}: {}", lineno + 1, line),
                }
            } else if line == "end_of_record" {
                if let Some(done) = current.take() {
                    files.push(done);
                }
            }
        }

        if let Some(done) = current {
            files.push(done);
        }

        Self { files }
    }

    /// Flat per-line hit counts across every file
    pub fn hits(&self) -> impl Iterator<Item = u64> + '_ {
        self.files.iter().flat_map(|f| f.hits.iter().copied())
    }

    pub fn summary(&self) -> Option<CoverageSummary> {
        summarize(self.hits())
    }

    /// Files with the lowest coverage, worst first. Files without lines are skipped.
    pub fn lowest_files(&self, limit: usize) -> Vec<(&FileCoverage, CoverageSummary)> {
        let mut ranked: Vec<_> = self
            .files
            .iter()
            .filter_map(|f| f.summary().map(|s| (f, s)))
            .filter(|(_, s)| s.covered < s.total)
            .collect();
        ranked.sort_by(|a, b| {
            a.1.percent
                .total_cmp(&b.1.percent)
                .then_with(|| b.1.total.cmp(&a.1.total))
                .then_with(|| a.0.path.cmp(&b.0.path))
        });
        ranked.truncate(limit);
        ranked
    }
}

/// `<line>,<hits>[,<checksum>]` -> hits
fn parse_hit_count(data: &str) -> Option<u64> {
    let mut fields = data.split(',');
    fields.next()?.trim().parse::<u64>().ok()?;
    fields.next()?.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageTier;

    const SAMPLE: &str = "\
SF:lib/main.dart
DA:3,1
DA:4,0
DA:5,12
LF:3
LH:2
end_of_record
SF:lib/util.dart
FN:1,helper
DA:1,0
DA:2,0
DA:3,4,abcdef
end_of_record
";

    #[test]
    fn test_parse_files_and_hits() {
        let report = LcovReport::parse(SAMPLE);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].path, PathBuf::from("lib/main.dart"));
        assert_eq!(report.files[0].hits, vec![1, 0, 12]);
        assert_eq!(report.files[1].hits, vec![0, 0, 4]);
    }

    #[test]
    fn test_nonzero_counts_are_covered() {
        // 12 and 4 hits count as covered, not only literal 1
        let summary = LcovReport::parse(SAMPLE).summary().unwrap();
        assert_eq!(summary.covered, 3);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.percent, 50.0);
        assert_eq!(summary.tier, CoverageTier::Fair);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let report = LcovReport::parse("SF:a.dart\nDA:1,1\nDA:oops\nDA:2,x\nDA:3\nDA:4,0\n");
        assert_eq!(report.files[0].hits, vec![1, 0]);
    }

    #[test]
    fn test_empty_tracefile_is_no_data() {
        assert!(LcovReport::parse("").summary().is_none());
        assert!(LcovReport::parse("TN:\nSF:a.dart\nend_of_record\n").summary().is_none());
    }

    #[test]
    fn test_missing_end_of_record() {
        let report = LcovReport::parse("SF:a.dart\nDA:1,1");
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.summary().unwrap().percent, 100.0);
    }

    #[test]
    fn test_lowest_files_worst_first() {
        let report = LcovReport::parse(SAMPLE);
        let lowest = report.lowest_files(5);
        assert_eq!(lowest.len(), 2);
        assert_eq!(lowest[0].0.path, PathBuf::from("lib/util.dart"));
        assert_eq!(report.lowest_files(1).len(), 1);
        assert!(report.lowest_files(0).is_empty());
    }
}
