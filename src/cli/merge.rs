//! Merge command implementation
//!
//! The orchestrator: discovery, conflict resolution, then both mergers,
//! writing the combined package under the output directory.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::config::load_rules;
use crate::domain::{CONFIG_FRAGMENT, DATA_DIR};
use crate::merge::{merge_archives, merge_config_fragments};
use crate::resolve::{resolve_inclusion, ConsoleDecisions, DecisionProvider, ScriptedDecisions};
use crate::scan::discover_packages;

#[derive(Args)]
pub struct MergeArgs {
    /// Directory containing the mod packages
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Name of the output directory created under PATH
    #[arg(short, long, value_name = "DIR", default_value = "merged")]
    pub output: String,

    /// File name of the combined archive written under <output>/Data
    #[arg(long, value_name = "NAME", default_value = "merged.pak")]
    pub archive_name: String,

    /// Rules file (TOML); defaults to modmerge.toml in PATH, then built-in tables
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Scripted conflict answer (1, 2, or 3); repeat once per detected
    /// conflict, in rule-table order, instead of prompting
    #[arg(long = "choose", value_name = "CHOICE")]
    pub choices: Vec<String>,
}

pub fn run(args: MergeArgs) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid mod root: {}", args.path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }
    if args.output.is_empty()
        || args.output.contains(['/', '\\'])
        || args.output == "."
        || args.output == ".."
    {
        anyhow::bail!("Output must be a plain directory name, got: {}", args.output);
    }

    let rules = load_rules(&root, args.rules.as_deref())?;
    let packages = discover_packages(&root, &args.output)?;
    if packages.is_empty() {
        anyhow::bail!("No valid mod packages found under {}", root.display());
    }

    let mut decisions: Box<dyn DecisionProvider> = if args.choices.is_empty() {
        Box::new(ConsoleDecisions)
    } else {
        Box::new(ScriptedDecisions::from_raw(&args.choices)?)
    };
    let included = resolve_inclusion(&packages, &rules, decisions.as_mut())?;

    // Clear any previous merge before writing anything.
    let out_dir = root.join(&args.output);
    if out_dir.exists() {
        fs::remove_dir_all(&out_dir)
            .with_context(|| format!("Failed clearing previous output: {}", out_dir.display()))?;
    }
    let out_data = out_dir.join(DATA_DIR);
    fs::create_dir_all(&out_data)
        .with_context(|| format!("Failed creating output directory: {}", out_data.display()))?;

    let merged_cfg = merge_config_fragments(&included, &packages)?;
    let cfg_path = out_dir.join(CONFIG_FRAGMENT);
    fs::write(&cfg_path, merged_cfg)
        .with_context(|| format!("Failed writing {}", cfg_path.display()))?;
    tracing::debug!("Wrote {}", cfg_path.display());

    let archive_path = out_data.join(&args.archive_name);
    let wrote_archive = merge_archives(&included, &packages, &archive_path)
        .with_context(|| format!("Failed writing {}", archive_path.display()))?;
    if wrote_archive {
        tracing::debug!("Wrote {}", archive_path.display());
    } else {
        tracing::debug!("No archives to merge; skipped {}", args.archive_name);
    }

    println!(
        "{} Merged {} package(s) into {}",
        console::style("✓").green(),
        included.len(),
        out_dir.display()
    );
    Ok(())
}
