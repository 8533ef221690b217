//! Tool availability checks.

use crate::agent::Agent;
use crate::paths;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct ToolCheck {
    pub tool: String,
    pub purpose: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_url: Option<String>,
}

/// Locate `name` on PATH. `claude` is also found at `~/.claude/local/claude`,
/// where `claude migrate-installer` moves it.
pub fn locate_tool(name: &str) -> Option<PathBuf> {
    if name == "claude" {
        if let Ok(local) = paths::claude_local_bin() {
            if local.is_file() {
                return Some(local);
            }
        }
    }
    which::which(name).ok()
}

pub fn check_tool(name: &str) -> bool {
    locate_tool(name).is_some()
}

fn probe(tool: &str, purpose: &str, install_url: Option<&str>) -> ToolCheck {
    let path = locate_tool(tool);
    tracing::debug!(tool, found = path.is_some(), "checked tool");
    ToolCheck {
        tool: tool.to_string(),
        purpose: purpose.to_string(),
        found: path.is_some(),
        path,
        install_url: install_url.map(str::to_string),
    }
}

/// git, every agent CLI, and both VS Code channels.
pub fn check_all() -> Vec<ToolCheck> {
    let mut checks = vec![probe("git", "Version control", Some("https://git-scm.com/downloads"))];
    for &agent in Agent::all() {
        if let Some(tool) = agent.cli_tool() {
            checks.push(probe(tool, agent.display_name(), agent.install_url()));
        }
    }
    checks.push(probe("code", "Visual Studio Code", None));
    checks.push(probe("code-insiders", "Visual Studio Code Insiders", None));
    checks
}
