//! Info command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::load_rules;
use crate::scan::discover_packages;

#[derive(Args)]
pub struct InfoArgs {
    /// Directory containing the mod packages
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Output directory name skipped during discovery
    #[arg(short, long, value_name = "DIR", default_value = "merged")]
    pub output: String,

    /// Rules file (TOML); defaults to modmerge.toml in PATH, then built-in tables
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let root = args.path.canonicalize()?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let rules = load_rules(&root, args.rules.as_deref())?;
    let packages = discover_packages(&root, &args.output)?;

    println!("Mod root: {}", root.display());
    println!("Packages found: {}", packages.len());
    for package in packages.values() {
        let cfg = if package.cfg_path.is_some() { "mod.cfg" } else { "no mod.cfg" };
        println!("  {} ({}, {} archive(s))", package.name, cfg, package.archives.len());
        for archive in &package.archives {
            if let Some(name) = archive.file_name().and_then(|n| n.to_str()) {
                println!("    Data/{}", name);
            }
        }
    }

    // Only rules whose sides are all present can fire.
    let triggered: Vec<_> = rules
        .conflicts
        .iter()
        .filter(|c| packages.contains_key(&c.first) && packages.contains_key(&c.second))
        .collect();
    if triggered.is_empty() {
        println!("Conflicts to resolve: none");
    } else {
        println!("Conflicts to resolve:");
        for conflict in triggered {
            println!("  {} vs {}", conflict.first, conflict.second);
        }
    }

    let applicable: Vec<_> = rules
        .overrides
        .iter()
        .filter(|o| packages.contains_key(&o.excluded) && packages.contains_key(&o.dominant))
        .collect();
    if !applicable.is_empty() {
        println!("Overrides that may apply:");
        for rule in applicable {
            println!("  {} is dropped when {} is kept", rule.excluded, rule.dominant);
        }
    }

    Ok(())
}
