//! Package discovery
//!
//! Classifies the immediate subdirectories of the mod root. A directory is a
//! valid package when it carries a `mod.cfg` directly inside it, or at least
//! one archive under its `Data` subdirectory. Everything else is silently
//! ignored, including the reserved output directory.

use crate::domain::{Package, ARCHIVE_GLOB, CONFIG_FRAGMENT, DATA_DIR};
use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Scan `root` for valid packages, skipping the directory named `reserved`.
///
/// Returns packages keyed by directory name, in sorted name order. The scan
/// is read-only; filesystem errors propagate.
pub fn discover_packages(root: &Path, reserved: &str) -> Result<BTreeMap<String, Package>> {
    let archive_matcher = Glob::new(ARCHIVE_GLOB)
        .context("Invalid archive glob")?
        .compile_matcher();

    let mut packages = BTreeMap::new();

    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed reading mod root: {}", root.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue, // non-UTF-8 directory names can't be rule targets
        };
        if name == reserved {
            continue;
        }

        let dir = entry.path();
        let cfg = dir.join(CONFIG_FRAGMENT);
        let cfg_path = cfg.is_file().then_some(cfg);
        let archives = list_archives(&dir.join(DATA_DIR), &archive_matcher)?;

        let package = Package { name: name.clone(), dir, cfg_path, archives };
        if !package.is_valid() {
            tracing::debug!("Ignoring {}: no {} and no archives", name, CONFIG_FRAGMENT);
            continue;
        }

        tracing::debug!(
            "Discovered package {} (cfg: {}, archives: {})",
            name,
            package.cfg_path.is_some(),
            package.archives.len()
        );
        packages.insert(name, package);
    }

    Ok(packages)
}

/// List archive files directly inside `data_dir`, sorted by file name.
///
/// A missing `Data` directory is not an error; it just contributes nothing.
fn list_archives(data_dir: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>> {
    if !data_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("Failed reading data directory: {}", data_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if matcher.is_match(Path::new(&entry.file_name())) {
            archives.push(entry.path());
        }
    }

    archives.sort();
    Ok(archives)
}
