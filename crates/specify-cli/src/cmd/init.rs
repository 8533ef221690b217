use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use specify_core::{
    agent::Agent,
    archive,
    bundle::Bundle,
    check,
    config::{Config, TemplateSource},
    git, io, paths,
    release::{self, ClientOptions, ReleaseClient},
    script::ScriptType,
    SpecifyError,
};
use std::path::{Path, PathBuf};

const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from Specify template";

#[derive(Args)]
pub struct InitArgs {
    /// Name of the new project directory ('.' for the current directory)
    project: Option<String>,

    /// Initialize in the current directory instead of creating a new one
    #[arg(long)]
    here: bool,

    /// AI agent to set up (claude, gemini, copilot, cursor-agent, qwen, opencode,
    /// codex, windsurf, kilocode, auggie, roo, q)
    #[arg(long)]
    ai: Option<Agent>,

    /// Script type: sh or ps (default: ps on Windows, sh elsewhere)
    #[arg(long)]
    script: Option<ScriptType>,

    /// Skip checking that the agent's CLI is installed
    #[arg(long)]
    ignore_agent_tools: bool,

    /// Skip git repository initialization
    #[arg(long)]
    no_git: bool,

    /// Merge into a non-empty current directory without complaint
    #[arg(long)]
    force: bool,

    /// Disable TLS certificate verification for downloads
    #[arg(long)]
    skip_tls: bool,

    /// GitHub token for API requests (default: GH_TOKEN or GITHUB_TOKEN)
    #[arg(long)]
    github_token: Option<String>,

    /// Use the templates built into this binary instead of downloading
    #[arg(long, conflicts_with = "template_archive")]
    offline: bool,

    /// Use a local template zip instead of downloading
    #[arg(long)]
    template_archive: Option<PathBuf>,

    #[arg(long, env = "SPECIFY_GITHUB_API", default_value = release::DEFAULT_API_BASE, hide = true)]
    github_api: String,

    #[arg(long, env = "SPECIFY_TEMPLATE_REPO", default_value = release::DEFAULT_REPO, hide = true)]
    template_repo: String,
}

#[derive(Serialize)]
struct InitSummary {
    project: String,
    path: PathBuf,
    ai: Agent,
    script: ScriptType,
    template: TemplateSource,
    files: usize,
    executable_scripts: usize,
    git: GitOutcome,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum GitOutcome {
    Initialized,
    Existing,
    Skipped,
    Failed,
}

pub fn run(args: InitArgs, json: bool) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let here = args.here || args.project.as_deref() == Some(".");

    let (project_dir, created_dir) = match (&args.project, here) {
        (Some(name), true) if name != "." => {
            anyhow::bail!("cannot combine a project name with --here")
        }
        (_, true) => (cwd.clone(), false),
        (Some(name), false) => {
            let dir = cwd.join(name);
            if dir.exists() {
                anyhow::bail!("directory '{}' already exists", dir.display());
            }
            (dir, true)
        }
        (None, false) => anyhow::bail!("specify a project name, '.', or --here"),
    };

    if here && io::dir_has_entries(&project_dir) && !args.force {
        anyhow::bail!(
            "current directory is not empty; template files will be merged and may overwrite \
             existing ones (pass --force to continue)"
        );
    }

    let project_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let agent = args.ai.unwrap_or(Agent::Claude);
    let script = args.script.unwrap_or_else(ScriptType::platform_default);

    if !args.ignore_agent_tools {
        if let Some(tool) = agent.cli_tool() {
            if !check::check_tool(tool) {
                return Err(SpecifyError::ToolMissing {
                    tool: tool.to_string(),
                    agent: agent.display_name().to_string(),
                    url: agent.install_url().unwrap_or("its vendor").to_string(),
                }
                .into());
            }
        }
    }

    let mut use_git = !args.no_git;
    if use_git && !git::is_available() {
        tracing::warn!("git not found; skipping repository initialization");
        use_git = false;
    }

    if !json {
        println!("Initializing {project_name} in: {}", project_dir.display());
        println!("  agent:   {}", agent.display_name());
        println!("  scripts: {}", script.description());
    }

    if created_dir {
        io::ensure_dir(&project_dir)
            .with_context(|| format!("failed to create {}", project_dir.display()))?;
    }

    let installed = match install_templates(&project_dir, &args, agent, script, json) {
        Ok(installed) => installed,
        Err(e) => {
            if created_dir {
                if let Err(cleanup) = std::fs::remove_dir_all(&project_dir) {
                    tracing::warn!(error = %cleanup, "failed to remove partially created project");
                }
            }
            return Err(e);
        }
    };

    let fixed = io::ensure_executable_scripts(&paths::scripts_dir(&project_dir))
        .context("failed to set script permissions")?;
    if !json && !fixed.is_empty() {
        println!("  updated: {} script(s) made executable", fixed.len());
    }

    let config = Config::new(&project_name, agent, script, installed.source.clone());
    config
        .save(&project_dir)
        .context("failed to write .specify/config.yaml")?;
    if !json {
        println!("  created: {}", paths::CONFIG_FILE);
    }

    let git_outcome = if !use_git {
        GitOutcome::Skipped
    } else if git::is_repo(&project_dir) {
        GitOutcome::Existing
    } else {
        match git::init_repo(&project_dir, INITIAL_COMMIT_MESSAGE) {
            Ok(()) => GitOutcome::Initialized,
            Err(e) => {
                tracing::warn!(error = %e, "git repository initialization failed");
                GitOutcome::Failed
            }
        }
    };
    if !json {
        match git_outcome {
            GitOutcome::Initialized => println!("  created: git repository"),
            GitOutcome::Existing => println!("  exists:  git repository"),
            GitOutcome::Failed => println!("  warning: git repository initialization failed"),
            GitOutcome::Skipped => {}
        }
    }

    if json {
        return print_json(&InitSummary {
            project: project_name,
            path: project_dir,
            ai: agent,
            script,
            template: installed.source,
            files: installed.files,
            executable_scripts: fixed.len(),
            git: git_outcome,
        });
    }

    print_security_notice(agent);
    print_next_steps(&project_dir, created_dir, agent);
    Ok(())
}

// ---------------------------------------------------------------------------
// Template installation
// ---------------------------------------------------------------------------

struct Installed {
    source: TemplateSource,
    files: usize,
}

fn install_templates(
    dest: &Path,
    args: &InitArgs,
    agent: Agent,
    script: ScriptType,
    json: bool,
) -> anyhow::Result<Installed> {
    if let Some(path) = &args.template_archive {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read template archive {}", path.display()))?;
        let written = archive::extract_zip(&bytes, dest)
            .with_context(|| format!("failed to extract {}", path.display()))?;
        if !json {
            println!("  extracted: {} ({} files)", path.display(), written.len());
        }
        return Ok(Installed {
            source: TemplateSource::Archive { path: path.clone() },
            files: written.len(),
        });
    }

    if args.offline {
        let written = Bundle::build(agent, script)
            .materialize(dest)
            .context("failed to write built-in templates")?;
        if !json {
            println!("  created: {} files from built-in templates", written.len());
        }
        return Ok(Installed {
            source: TemplateSource::Embedded,
            files: written.len(),
        });
    }

    let client = ReleaseClient::new(ClientOptions {
        api_base: args.github_api.clone(),
        repo: args.template_repo.clone(),
        token: release::resolve_token(args.github_token.as_deref()),
        skip_tls: args.skip_tls,
        ..ClientOptions::default()
    })
    .context("failed to build HTTP client")?;

    let latest = client
        .latest_release()
        .with_context(|| format!("failed to fetch latest release of {}", args.template_repo))?;
    let asset = release::find_template_asset(&latest, agent, script)?;
    if !json {
        println!("  downloading: {} ({} bytes)", asset.name, asset.size);
    }
    let bytes = client
        .download(asset)
        .with_context(|| format!("failed to download {}", asset.name))?;
    let written = archive::extract_zip(&bytes, dest)
        .with_context(|| format!("failed to extract {}", asset.name))?;
    if !json {
        println!("  extracted: {} files from {}", written.len(), latest.tag_name);
    }
    Ok(Installed {
        source: TemplateSource::Release {
            tag: latest.tag_name.clone(),
        },
        files: written.len(),
    })
}

// ---------------------------------------------------------------------------
// Closing messages
// ---------------------------------------------------------------------------

fn print_security_notice(agent: Agent) {
    println!("\nAgent folder security:");
    println!(
        "  Some agents store credentials, auth tokens or other private artifacts in {}.",
        agent.folder()
    );
    println!(
        "  Consider adding {} (or parts of it) to .gitignore to avoid leaking them.",
        agent.folder()
    );
}

fn print_next_steps(project_dir: &Path, created_dir: bool, agent: Agent) {
    println!("\nProject ready. Next steps:");
    let mut step = 1;
    if created_dir {
        println!("  {step}. cd {}", project_dir.display());
        step += 1;
    }
    if agent == Agent::Codex {
        println!(
            "  {step}. export CODEX_HOME={}",
            project_dir.join(".codex").display()
        );
        step += 1;
    }
    println!("  {step}. Start {} and use the slash commands:", agent.display_name());
    for (cmd, what) in [
        ("/constitution", "establish project principles"),
        ("/specify", "create the feature specification"),
        ("/clarify", "resolve underspecified areas (optional, before /plan)"),
        ("/plan", "create the implementation plan"),
        ("/tasks", "generate actionable tasks"),
        ("/analyze", "cross-check artifacts (optional, before /implement)"),
        ("/checklist", "generate requirement-quality checklists (optional)"),
        ("/implement", "execute the tasks"),
    ] {
        println!("       {cmd:<14} {what}");
    }
}
