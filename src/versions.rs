//! Version parsing and upgrade classification
//!
//! Versions reported by `flutter pub outdated` are semver-like strings:
//! `major.minor.patch`, optionally followed by a pre-release or build suffix
//! (`1.2.3-beta.1`, `1.2.3+4`). Classification compares two of them and
//! reports how large the upgrade is.
//!
//! Malformed input is expected (versions come straight out of tool output),
//! so nothing here returns an error: a version that fails to parse makes the
//! whole classification `Unknown`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// A parsed `major.minor.patch[suffix]` version.
///
/// The suffix keeps its leading separator (`-` or `+`), so `1.0.0-1` and
/// `1.0.0+1` are different versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub suffix: Option<String>,
}

/// Outcome of comparing two versions by their numeric triple only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrder {
    /// Triple ordering (suffix ignored)
    Ordered(Ordering),
    /// Equal triple, different suffix: not comparable
    Unordered,
}

impl Version {
    /// Parse a version, returning `None` on anything malformed.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        let split_at = s.find(['-', '+']).unwrap_or(s.len());
        let (core, suffix) = s.split_at(split_at);

        // A separator with nothing after it is not a suffix
        if suffix.len() == 1 {
            return None;
        }

        let mut parts = core.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            major,
            minor,
            patch,
            suffix: (!suffix.is_empty()).then(|| suffix.to_string()),
        })
    }

    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// Compare by major, then minor, then patch.
    ///
    /// Equal triples with different suffixes are `Unordered` rather than equal.
    pub fn compare(&self, other: &Version) -> VersionOrder {
        match self.triple().cmp(&other.triple()) {
            Ordering::Equal if self.suffix != other.suffix => VersionOrder::Unordered,
            ord => VersionOrder::Ordered(ord),
        }
    }
}

fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s).ok_or_else(|| InvalidVersion(s.to_string()))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "{}", suffix)?;
        }
        Ok(())
    }
}

/// Error for [`Version::from_str`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version: '{0}'")]
pub struct InvalidVersion(pub String);

/// Size of the change between two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpTag {
    Major,
    Minor,
    Patch,
    Same,
    Other,
    Unknown,
}

impl BumpTag {
    /// Marker shown next to the tag in reports
    pub fn emoji(&self) -> &'static str {
        match self {
            BumpTag::Major => "🔴",
            BumpTag::Minor => "🟠",
            BumpTag::Patch => "🟡",
            BumpTag::Same => "🟢",
            BumpTag::Other => "⚪️",
            BumpTag::Unknown => "⚠️",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BumpTag::Major => "major",
            BumpTag::Minor => "minor",
            BumpTag::Patch => "patch",
            BumpTag::Same => "same",
            BumpTag::Other => "other",
            BumpTag::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for BumpTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the upgrade from `old` to `new`.
pub fn classify(old: &str, new: &str) -> BumpTag {
    match (Version::parse(old), Version::parse(new)) {
        (Some(old), Some(new)) => classify_versions(&old, &new),
        _ => BumpTag::Unknown,
    }
}

/// Classify the upgrade between two already-parsed versions.
///
/// Major dominates minor, minor dominates patch. Downgrades are `Other`.
pub fn classify_versions(old: &Version, new: &Version) -> BumpTag {
    if new.major != old.major {
        return if new.major > old.major {
            BumpTag::Major
        } else {
            BumpTag::Other
        };
    }
    if new.minor != old.minor {
        return if new.minor > old.minor {
            BumpTag::Minor
        } else {
            BumpTag::Other
        };
    }
    match old.compare(new) {
        VersionOrder::Ordered(Ordering::Less) => BumpTag::Patch,
        VersionOrder::Ordered(Ordering::Equal) => BumpTag::Same,
        VersionOrder::Ordered(Ordering::Greater) | VersionOrder::Unordered => BumpTag::Other,
    }
}
