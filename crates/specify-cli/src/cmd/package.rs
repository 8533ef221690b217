use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use specify_core::agent::Agent;
use specify_core::bundle::package_all;
use specify_core::script::ScriptType;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PackageArgs {
    /// Output directory, relative to the project root
    #[arg(long, default_value = "dist")]
    out: PathBuf,

    /// Version label used in asset names
    #[arg(long, default_value = concat!("v", env!("CARGO_PKG_VERSION")))]
    version: String,

    /// Agents to package (default: all)
    #[arg(long, value_delimiter = ',')]
    agents: Vec<Agent>,

    /// Script types to package (default: sh,ps)
    #[arg(long, value_delimiter = ',')]
    scripts: Vec<ScriptType>,
}

pub fn run(root: &Path, args: PackageArgs, json: bool) -> anyhow::Result<()> {
    let out_dir = root.join(&args.out);
    let agents = if args.agents.is_empty() {
        Agent::all().to_vec()
    } else {
        args.agents
    };
    let scripts = if args.scripts.is_empty() {
        ScriptType::all().to_vec()
    } else {
        args.scripts
    };

    let written = package_all(&out_dir, &args.version, &agents, &scripts)
        .with_context(|| format!("failed to package bundles into {}", out_dir.display()))?;

    if json {
        return print_json(&written);
    }
    for path in &written {
        println!("  created: {}", path.display());
    }
    println!("\nPackaged {} bundle(s) into {}", written.len(), out_dir.display());
    Ok(())
}
