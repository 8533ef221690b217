use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use specify_core::agent::Agent;
use specify_core::config::Config;
use specify_core::context::update_agent_context;
use specify_core::feature::FeaturePaths;
use std::path::Path;

#[derive(Subcommand)]
pub enum ContextSubcommand {
    /// Record the current plan's stack in agent context files
    Update {
        /// Only update this agent's file (default: every existing context file)
        #[arg(long)]
        agent: Option<Agent>,
    },
}

pub fn run(
    root: &Path,
    subcmd: ContextSubcommand,
    feature: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ContextSubcommand::Update { agent } => update(root, feature, agent, json),
    }
}

fn update(root: &Path, feature: Option<&str>, agent: Option<Agent>, json: bool) -> anyhow::Result<()> {
    let fallback = Config::load_optional(root)
        .context("failed to load .specify/config.yaml")?
        .map(|cfg| cfg.ai)
        .unwrap_or(Agent::Claude);

    let fp = FeaturePaths::resolve(root, feature).context("failed to resolve current feature")?;
    let updates = update_agent_context(root, &fp, agent, fallback)
        .context("failed to update agent context")?;

    if json {
        return print_json(&updates);
    }

    let rows = updates
        .iter()
        .map(|u| {
            vec![
                u.agent.display_name().to_string(),
                if u.created { "created" } else { "updated" }.to_string(),
                u.path
                    .strip_prefix(root)
                    .unwrap_or(&u.path)
                    .display()
                    .to_string(),
            ]
        })
        .collect();
    print_table(&["AGENT", "ACTION", "FILE"], rows);
    Ok(())
}
