//! Core data model: packages, rule tables, and conflict choices.

use serde::Deserialize;
use std::path::PathBuf;

/// File name of the configuration fragment a package may carry.
pub const CONFIG_FRAGMENT: &str = "mod.cfg";

/// Subdirectory under which a package keeps its archives.
pub const DATA_DIR: &str = "Data";

/// Glob matching archive files inside a package's `Data` directory.
pub const ARCHIVE_GLOB: &str = "*.pak";

/// A discovered mod package.
///
/// Built once at scan time and never mutated for the rest of the run.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub dir: PathBuf,
    /// Path to the package's `mod.cfg`, if it has one.
    pub cfg_path: Option<PathBuf>,
    /// Archive files under `Data/`, sorted by file name.
    pub archives: Vec<PathBuf>,
}

impl Package {
    /// Whether the package contributes anything to a merge.
    pub fn is_valid(&self) -> bool {
        self.cfg_path.is_some() || !self.archives.is_empty()
    }
}

/// A declared mutually-exclusive pair of packages.
///
/// Detection treats the pair as unordered, but the first/second orientation
/// is exactly what the prompt's "1" and "2" options refer to, so it is
/// preserved as declared in the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConflictRule {
    pub first: String,
    pub second: String,
}

/// Force-excludes `excluded` whenever `dominant` survives conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverrideRule {
    pub excluded: String,
    pub dominant: String,
}

/// The static rule tables: conflicts to resolve and overrides to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleSet {
    #[serde(default, rename = "conflict")]
    pub conflicts: Vec<ConflictRule>,
    #[serde(default, rename = "override")]
    pub overrides: Vec<OverrideRule>,
}

impl RuleSet {
    /// Rule tables shipped with the tool, covering the sleekmodularhud
    /// mod family. An external rules file replaces these wholesale.
    pub fn builtin() -> Self {
        let conflicts = [
            ("sleekmodularhud_noPBIndicators", "sleekmodularhud_noCompassBorders"),
            ("sleekmodularhud_noCrimeRabbit", "sleekmodularhud_noCrimeStealth"),
            ("sleekmodularhud_noCursor", "sleekmodularhud_noNormalCursor"),
            ("sleekmodularhud_noLetterbox", "sleekmodularhud_noLetterbox4k"),
        ]
        .into_iter()
        .map(|(first, second)| ConflictRule { first: first.to_string(), second: second.to_string() })
        .collect();

        let overrides = vec![OverrideRule {
            excluded: "sleekmodularhud_ultrawide".to_string(),
            dominant: "sleekmodularhud_noLetterbox4k".to_string(),
        }];

        Self { conflicts, overrides }
    }
}

/// The operator's answer for one conflict pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    KeepFirst,
    KeepSecond,
    KeepNeither,
}

impl ConflictChoice {
    /// Parse a prompt answer. Anything other than "1", "2", or "3"
    /// (after trimming) is invalid and triggers a re-prompt.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::KeepFirst),
            "2" => Some(Self::KeepSecond),
            "3" => Some(Self::KeepNeither),
            _ => None,
        }
    }
}
