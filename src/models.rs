//! Core data types for Goliath.

use crate::error::PatchError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Leading `<major>.<minor>` digits; anything after the minor digits is kept verbatim.
static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)(?:\.([0-9]+))?").expect("Invalid version regex")
});

/// Oldest minor release whose linker layout carries the patched lines.
pub const MIN_SUPPORTED_MINOR: u32 = 15;

/// A Go release identifier such as `1.18.3`.
///
/// Only the minor component is interpreted; major and patch stay textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoVersion {
    pub raw: String,
    pub major: String,
    pub minor: u32,
    pub patch: Option<String>,
}

impl GoVersion {
    /// Parse a dotted version string.
    ///
    /// The minor component is the text between the first and second dot (or
    /// the end of the string); its leading digits are its numeric value, so
    /// `1.21rc2` parses with minor 21.
    pub fn parse(raw: &str) -> Result<Self, PatchError> {
        let malformed = || PatchError::MalformedVersion(raw.to_string());
        let caps = VERSION_REGEX.captures(raw).ok_or_else(malformed)?;

        let minor = caps[2].parse::<u32>().map_err(|_| malformed())?;

        Ok(GoVersion {
            raw: raw.to_string(),
            major: caps[1].to_string(),
            minor,
            patch: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    /// Whether the patch set knows this release's linker layout.
    pub fn is_supported(&self) -> bool {
        self.minor >= MIN_SUPPORTED_MINOR
    }
}

impl FromStr for GoVersion {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoVersion::parse(s)
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Version-scoped working directory: `<cwd>/go-<version>/`.
///
/// Created by the fetch stage and left on disk after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Workspace for `version` under `cwd`. Nothing is created on disk.
    pub fn for_version(cwd: &Path, version: &str) -> Self {
        Workspace {
            root: cwd.join(format!("go-{}", version)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Transient download target, removed after extraction.
    pub fn archive_path(&self) -> PathBuf {
        self.root.join("go.tar.gz")
    }

    /// Extracted Go source tree.
    pub fn tree(&self) -> PathBuf {
        self.root.join("go")
    }

    /// Directory the build script runs from.
    pub fn src_dir(&self) -> PathBuf {
        self.tree().join("src")
    }
}

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Fetching,
    Patching,
    Building,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildPhase::Fetching => "fetch",
            BuildPhase::Patching => "patch",
            BuildPhase::Building => "build",
        };
        f.write_str(name)
    }
}

/// What happened when a single named patch was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The marker matched `matches` lines and the file was rewritten.
    Applied { matches: usize },
    /// The file exists but no line carries the marker; it was left untouched.
    MarkerNotFound,
    /// An optional target is missing from this release.
    TargetAbsent,
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied { .. })
    }
}

/// Outcome of one patch against one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRecord {
    pub name: String,          // Patch
    pub target: PathBuf,       // File
    pub outcome: PatchOutcome, // Result
}

/// Everything the patch stage did, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub records: Vec<PatchRecord>,
}

impl PatchReport {
    pub fn applied(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_applied()).count()
    }

    /// Patches whose marker no longer appears upstream.
    pub fn drifted(&self) -> impl Iterator<Item = &PatchRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome == PatchOutcome::MarkerNotFound)
    }

    pub fn outcome_of(&self, name: &str) -> Option<PatchOutcome> {
        self.records.iter().find(|r| r.name == name).map(|r| r.outcome)
    }
}
