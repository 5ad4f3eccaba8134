//! Line coverage summaries
//!
//! Reduces per-line hit indicators to a percentage and a qualitative tier.
//! An empty input has no percentage at all: "no data" is a distinct outcome
//! from 0%.

mod lcov;

pub use lcov::{FileCoverage, LcovReport};

use serde::{Deserialize, Serialize};

/// A single executable-line entry: anything that can say whether the line ran.
pub trait LineHit {
    fn executed(&self) -> bool;
}

impl LineHit for bool {
    fn executed(&self) -> bool {
        *self
    }
}

impl LineHit for u64 {
    fn executed(&self) -> bool {
        *self > 0
    }
}

impl<T: LineHit> LineHit for &T {
    fn executed(&self) -> bool {
        (**self).executed()
    }
}

/// Qualitative coverage bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CoverageTier {
    /// Map a percentage to its tier, highest threshold first.
    pub fn from_percent(percent: f64) -> Self {
        match percent {
            p if p >= 90.0 => CoverageTier::Excellent,
            p if p >= 75.0 => CoverageTier::Good,
            p if p >= 50.0 => CoverageTier::Fair,
            _ => CoverageTier::Poor,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            CoverageTier::Excellent => "🟢",
            CoverageTier::Good => "🟡",
            CoverageTier::Fair => "🟠",
            CoverageTier::Poor => "🔴",
        }
    }

    /// Advisory line shown next to the percentage
    pub fn message(&self) -> &'static str {
        match self {
            CoverageTier::Excellent => "Solid coverage – nice work!",
            CoverageTier::Good => "Not bad, just a few gaps.",
            CoverageTier::Fair => "Kinda patchy, could use more tests.",
            CoverageTier::Poor => "Yikes. Test coverage needs love.",
        }
    }
}

impl std::fmt::Display for CoverageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageTier::Excellent => write!(f, "excellent"),
            CoverageTier::Good => write!(f, "good"),
            CoverageTier::Fair => write!(f, "fair"),
            CoverageTier::Poor => write!(f, "poor"),
        }
    }
}

/// Coverage ratio over a non-empty set of lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub covered: usize,
    pub total: usize,
    pub percent: f64,
    pub tier: CoverageTier,
}

/// Summarize line hits. Returns `None` when there are no lines.
pub fn summarize<I>(records: I) -> Option<CoverageSummary>
where
    I: IntoIterator,
    I::Item: LineHit,
{
    let (covered, total) = records
        .into_iter()
        .fold((0usize, 0usize), |(covered, total), hit| {
            (covered + usize::from(hit.executed()), total + 1)
        });

    if total == 0 {
        return None;
    }

    let percent = covered as f64 * 100.0 / total as f64;
    Some(CoverageSummary {
        covered,
        total,
        percent,
        tier: CoverageTier::from_percent(percent),
    })
}
