//! Per-agent template bundles.
//!
//! A bundle is every file one (agent, script type) combination needs:
//! `.specify/` memory, scripts and templates plus the agent's slash commands.
//! Bundles are published as zip release assets and can also be written
//! straight into a project when working offline.

use crate::agent::{Agent, CommandFormat};
use crate::archive;
use crate::error::Result;
use crate::paths;
use crate::script::ScriptType;
use crate::templates::{self, CommandTemplate};
use regex::Regex;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File name prefix shared by every template release asset.
pub const ASSET_PREFIX: &str = "spec-kit-template";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// Path relative to the project root, always `/`-separated.
    pub path: String,
    pub contents: String,
    pub executable: bool,
}

#[derive(Debug, Clone)]
pub struct Bundle {
    pub agent: Agent,
    pub script: ScriptType,
    pub files: Vec<BundleFile>,
}

/// `spec-kit-template-<agent>-<script>`, the part of an asset name that
/// identifies the combination.
pub fn asset_stem(agent: Agent, script: ScriptType) -> String {
    format!("{ASSET_PREFIX}-{agent}-{script}")
}

pub fn asset_name(agent: Agent, script: ScriptType, version: &str) -> String {
    format!("{}-{version}.zip", asset_stem(agent, script))
}

impl Bundle {
    pub fn build(agent: Agent, script: ScriptType) -> Self {
        let mut files = Vec::new();

        files.push(BundleFile {
            path: paths::CONSTITUTION_FILE.to_string(),
            contents: templates::CONSTITUTION_TEMPLATE.to_string(),
            executable: false,
        });

        for file in script.files() {
            files.push(BundleFile {
                path: format!(
                    "{}/{}/{}.{}",
                    paths::SCRIPTS_DIR,
                    script.dir_name(),
                    file.name,
                    script.extension()
                ),
                contents: file.content.to_string(),
                executable: script == ScriptType::Sh,
            });
        }

        for (name, content) in templates::document_templates() {
            files.push(BundleFile {
                path: format!("{}/{name}", paths::TEMPLATES_DIR),
                contents: content.to_string(),
                executable: false,
            });
        }

        for cmd in templates::commands() {
            files.push(BundleFile {
                path: format!(
                    "{}/{}.{}",
                    agent.commands_dir(),
                    cmd.name,
                    agent.command_extension()
                ),
                contents: render_command(cmd, agent, script),
                executable: false,
            });
        }

        if agent == Agent::Copilot {
            files.push(BundleFile {
                path: paths::VSCODE_SETTINGS.to_string(),
                contents: templates::VSCODE_SETTINGS.to_string(),
                executable: false,
            });
        }

        Self {
            agent,
            script,
            files,
        }
    }

    /// Serialize the bundle as a zip archive into `writer`.
    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> Result<W> {
        use zip::write::SimpleFileOptions;

        let mut zip = zip::ZipWriter::new(writer);
        for file in &self.files {
            let mode = if file.executable { 0o755 } else { 0o644 };
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .unix_permissions(mode);
            zip.start_file(file.path.as_str(), options)?;
            zip.write_all(file.contents.as_bytes())?;
        }
        Ok(zip.finish()?)
    }

    /// Write every file into `dest` with the same rules as archive extraction.
    pub fn materialize(&self, dest: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let rel = PathBuf::from(&file.path);
            let mode = if file.executable { 0o755 } else { 0o644 };
            archive::install_file(dest, &rel, file.contents.as_bytes(), Some(mode))?;
            written.push(rel);
        }
        tracing::debug!(
            agent = %self.agent,
            script = %self.script,
            files = written.len(),
            "materialized embedded bundle"
        );
        Ok(written)
    }
}

/// Build and zip every requested combination into `out_dir`.
pub fn package_all(
    out_dir: &Path,
    version: &str,
    agents: &[Agent],
    scripts: &[ScriptType],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(agents.len() * scripts.len());
    for &agent in agents {
        for &script in scripts {
            let bundle = Bundle::build(agent, script);
            let path = out_dir.join(asset_name(agent, script, version));
            let file = std::fs::File::create(&path)?;
            bundle.write_zip(file)?;
            tracing::info!(path = %path.display(), "packaged bundle");
            written.push(path);
        }
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Command rendering
// ---------------------------------------------------------------------------

static BARE_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn bare_path_re() -> &'static Regex {
    BARE_PATH_RE.get_or_init(|| {
        Regex::new(r"(^|[^.\w/-])(memory|scripts|templates)/").unwrap()
    })
}

/// Point bare `memory/`, `scripts/` and `templates/` references at `.specify/`.
pub fn rewrite_paths(body: &str) -> String {
    bare_path_re()
        .replace_all(body, "${1}.specify/${2}/")
        .into_owned()
}

/// Render one command template for an agent and script type.
pub fn render_command(cmd: &CommandTemplate, agent: Agent, script: ScriptType) -> String {
    let format = agent.command_format();
    let mut body = rewrite_paths(cmd.body);
    if let Some(call) = cmd.script {
        body = body.replace("{SCRIPT}", &call.render(script));
    }
    if let Some(call) = cmd.agent_script {
        body = body.replace("{AGENT_SCRIPT}", &call.render(script));
    }
    let body = body
        .replace("{ARGS}", format.args_placeholder())
        .replace("__AGENT__", agent.as_str());

    match format {
        CommandFormat::Markdown => markdown_command(cmd.description, &body),
        CommandFormat::Toml => toml_command(cmd.description, &body),
    }
}

fn markdown_command(description: &str, body: &str) -> String {
    format!(
        r#"---
description: {description}
---

{body}"#
    )
}

fn toml_command(description: &str, prompt: &str) -> String {
    let description = description.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"description = "{description}"

prompt = """
{prompt}"""
"#
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn command(name: &str) -> &'static CommandTemplate {
        templates::commands().iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn rewrite_paths_skips_already_qualified() {
        let out = rewrite_paths("see `memory/constitution.md` and .specify/scripts/bash/x.sh");
        assert_eq!(
            out,
            "see `.specify/memory/constitution.md` and .specify/scripts/bash/x.sh"
        );
        assert_eq!(rewrite_paths("templates/a.md"), ".specify/templates/a.md");
        assert_eq!(rewrite_paths("specs/001-x/spec.md"), "specs/001-x/spec.md");
    }

    #[test]
    fn no_placeholders_survive_rendering() {
        for &agent in Agent::all() {
            for &script in ScriptType::all() {
                for cmd in templates::commands() {
                    let out = render_command(cmd, agent, script);
                    for token in ["{SCRIPT}", "{AGENT_SCRIPT}", "{ARGS}", "__AGENT__"] {
                        assert!(!out.contains(token), "{agent}/{script}/{}: {token}", cmd.name);
                    }
                }
            }
        }
    }

    #[test]
    fn markdown_command_has_front_matter_and_arguments() {
        let out = render_command(command("specify"), Agent::Claude, ScriptType::Sh);
        assert!(out.starts_with("---\ndescription: Create or update the feature specification"));
        assert!(out.contains(".specify/scripts/bash/create-new-feature.sh --json \"$ARGUMENTS\""));
        assert!(out.contains("`.specify/templates/spec-template.md`"));
    }

    #[test]
    fn toml_command_uses_args_placeholder() {
        let out = render_command(command("plan"), Agent::Gemini, ScriptType::Ps);
        assert!(out.starts_with("description = \"Execute the implementation planning workflow"));
        assert!(out.contains("prompt = \"\"\"\n"));
        assert!(out.contains("{{args}}"));
        assert!(out.contains(".specify/scripts/powershell/setup-plan.ps1 -Json"));
        assert!(out.contains("update-agent-context.ps1 -AgentType gemini"));
        assert!(out.trim_end().ends_with("\"\"\""));
    }

    #[test]
    fn bundle_contains_only_selected_script_variant() {
        let bundle = Bundle::build(Agent::Claude, ScriptType::Sh);
        let paths: Vec<_> = bundle.files.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&".specify/memory/constitution.md"));
        assert!(paths.contains(&".specify/scripts/bash/create-new-feature.sh"));
        assert!(paths.contains(&".specify/templates/plan-template.md"));
        assert!(paths.contains(&".claude/commands/implement.md"));
        assert!(!paths.iter().any(|p| p.contains("powershell")));
        assert!(!paths.contains(&".vscode/settings.json"));

        let scripts: Vec<_> = bundle.files.iter().filter(|f| f.executable).collect();
        assert_eq!(scripts.len(), ScriptType::Sh.files().len());
    }

    #[test]
    fn copilot_bundle_ships_prompt_files_and_settings() {
        let bundle = Bundle::build(Agent::Copilot, ScriptType::Ps);
        let paths: Vec<_> = bundle.files.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&".github/prompts/plan.prompt.md"));
        assert!(paths.contains(&".vscode/settings.json"));
        assert!(bundle.files.iter().all(|f| !f.executable));
    }

    #[test]
    fn zip_round_trips_through_extraction() {
        let bundle = Bundle::build(Agent::Qwen, ScriptType::Sh);
        let bytes = bundle.write_zip(Cursor::new(Vec::new())).unwrap().into_inner();
        let dir = TempDir::new().unwrap();
        let written = archive::extract_zip(&bytes, dir.path()).unwrap();
        assert_eq!(written.len(), bundle.files.len());
        let plan = std::fs::read_to_string(dir.path().join(".qwen/commands/plan.toml")).unwrap();
        assert!(plan.contains("{{args}}"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let script = dir.path().join(".specify/scripts/bash/setup-plan.sh");
            let mode = std::fs::metadata(script).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn package_all_names_assets() {
        let dir = TempDir::new().unwrap();
        let out = package_all(
            dir.path(),
            "v0.1.0",
            &[Agent::Claude, Agent::Gemini],
            ScriptType::all(),
        )
        .unwrap();
        assert_eq!(out.len(), 4);
        assert!(dir
            .path()
            .join("spec-kit-template-gemini-ps-v0.1.0.zip")
            .exists());
    }
}
