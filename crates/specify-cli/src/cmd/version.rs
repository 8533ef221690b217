use crate::output::print_json;
use anyhow::Context;
use specify_core::config::Config;
use std::path::Path;

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_optional(root).context("failed to load .specify/config.yaml")?;

    if json {
        let project = config.as_ref().map(|cfg| {
            serde_json::json!({
                "name": cfg.project.name,
                "ai": cfg.ai,
                "script": cfg.script,
                "template": cfg.template,
                "initialized_with": cfg.cli_version,
                "initialized_at": cfg.initialized_at,
            })
        });
        return print_json(&serde_json::json!({
            "cli_version": CLI_VERSION,
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "project": project,
        }));
    }

    println!("specify {CLI_VERSION}");
    println!("Platform: {}/{}", std::env::consts::OS, std::env::consts::ARCH);

    let Some(cfg) = config else {
        println!("No project found at {}", root.display());
        return Ok(());
    };
    println!("\nProject:     {}", cfg.project.name);
    println!("AI agent:    {}", cfg.ai.display_name());
    println!("Scripts:     {}", cfg.script.description());
    println!("Templates:   {}", cfg.template);
    println!(
        "Initialized: {} (specify {})",
        cfg.initialized_at.format("%Y-%m-%d %H:%M UTC"),
        cfg.cli_version
    );
    Ok(())
}
