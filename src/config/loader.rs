//! Rules file loading

use crate::domain::RuleSet;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up inside the mod root when no --rules flag is given.
pub const RULES_FILE: &str = "modmerge.toml";

/// Load the rule tables.
///
/// An explicitly-provided file must read and parse cleanly. An
/// auto-discovered file that fails to parse is warned about and the built-in
/// tables are used instead. No file at all means built-in tables.
pub fn load_rules(root: &Path, rules_path: Option<&Path>) -> Result<RuleSet> {
    let rules_path_provided = rules_path.is_some();

    let discovered = match rules_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_rules_file(root),
    };

    let Some(rules_file) = discovered else {
        return Ok(RuleSet::builtin());
    };

    let content = fs::read_to_string(&rules_file)
        .with_context(|| format!("Failed reading rules file: {}", rules_file.display()))?;

    match toml::from_str::<RuleSet>(&content) {
        Ok(rules) => Ok(rules),
        Err(e) if rules_path_provided => {
            Err(e).with_context(|| format!("Invalid rules file: {}", rules_file.display()))
        }
        Err(e) => {
            // Auto-discovered: warn and fall back to the built-in tables
            tracing::warn!(
                "Failed to parse auto-discovered rules file {}: {}",
                rules_file.display(),
                e
            );
            Ok(RuleSet::builtin())
        }
    }
}

fn discover_rules_file(root: &Path) -> Option<PathBuf> {
    let path = root.join(RULES_FILE);
    path.is_file().then_some(path)
}
