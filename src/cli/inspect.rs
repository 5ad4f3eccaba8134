//! `bump` and `coverage` commands: the classifiers on their own, for scripts

use crate::config::CiConfig;
use crate::coverage::LcovReport;
use crate::versions::classify;
use anyhow::{Context, Result};
use std::path::Path;

/// Print the bump tag, e.g. `minor`. Unparseable versions print `unknown`.
pub fn bump(old: &str, new: &str) -> Result<()> {
    let tag = classify(old, new);
    println!("{}", tag);
    Ok(())
}

/// Print `<percent> <tier>` for a tracefile, or `no data`.
pub fn coverage(project: &Path, lcov: Option<&Path>) -> Result<()> {
    let path = match lcov {
        Some(p) => p.to_path_buf(),
        None => CiConfig::load_file(project).lcov_path(project),
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match LcovReport::parse(&content).summary() {
        Some(summary) => println!(
            "{:.2}% {} ({}/{} lines) {} {}",
            summary.percent,
            summary.tier,
            summary.covered,
            summary.total,
            summary.tier.emoji(),
            summary.tier.message()
        ),
        None => println!("no data"),
    }
    Ok(())
}
