use crate::output::{print_fields, print_json};
use anyhow::Context;
use clap::Subcommand;
use specify_core::feature::setup_plan;
use std::path::Path;

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Copy the plan template into the current feature directory
    Setup {
        /// Overwrite an existing plan.md
        #[arg(long)]
        force: bool,
    },
}

pub fn run(
    root: &Path,
    subcmd: PlanSubcommand,
    feature: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        PlanSubcommand::Setup { force } => setup(root, feature, force, json),
    }
}

fn setup(root: &Path, feature: Option<&str>, force: bool, json: bool) -> anyhow::Result<()> {
    let plan = setup_plan(root, feature, force).context("failed to set up plan")?;

    if json {
        return print_json(&plan);
    }
    print_fields(&plan)?;
    if plan.created {
        println!("  created: {}", plan.impl_plan.display());
    } else {
        println!("  exists:  {} (use --force to overwrite)", plan.impl_plan.display());
    }
    Ok(())
}
