//! Configuration fragment merging
//!
//! Collects every non-empty trimmed line from the included packages'
//! `mod.cfg` files into one deduplicated set and emits it sorted. Sorting is
//! the only ordering guarantee; no source ordering survives.

use crate::domain::Package;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

/// Merge the config fragments of every included package into one text blob.
///
/// Packages without a fragment contribute nothing. Duplicate lines collapse
/// to a single occurrence no matter which package supplied them.
pub fn merge_config_fragments(
    included: &BTreeSet<String>,
    packages: &BTreeMap<String, Package>,
) -> Result<String> {
    let mut lines = BTreeSet::new();

    for name in included {
        let Some(package) = packages.get(name) else { continue };
        let Some(cfg_path) = &package.cfg_path else { continue };

        let text = fs::read_to_string(cfg_path)
            .with_context(|| format!("Failed reading {}", cfg_path.display()))?;
        for line in text.lines() {
            let line = line.trim();
            if !line.is_empty() {
                lines.insert(line.to_string());
            }
        }
    }

    // BTreeSet iterates in ascending lexicographic order.
    Ok(lines.into_iter().collect::<Vec<_>>().join("\n"))
}
