//! Agent context files (`CLAUDE.md`, `GEMINI.md`, ...).
//!
//! After a plan is written its technical context is folded into the files
//! agents read standing guidance from, so later sessions know the stack.

use crate::agent::Agent;
use crate::error::{Result, SpecifyError};
use crate::feature::FeaturePaths;
use crate::{io, paths, templates};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const ACTIVE_TECHNOLOGIES: &str = "## Active Technologies";
const RECENT_CHANGES: &str = "## Recent Changes";
const MAX_RECENT_CHANGES: usize = 3;

/// Technical context fields read from `plan.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanData {
    pub language: Option<String>,
    pub framework: Option<String>,
    pub database: Option<String>,
    pub project_type: Option<String>,
}

impl PlanData {
    /// `language + framework`, whichever are present.
    pub fn tech_stack(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.language, &self.framework]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        (!parts.is_empty()).then(|| parts.join(" + "))
    }
}

pub fn parse_plan(content: &str) -> PlanData {
    PlanData {
        language: plan_field(content, "Language/Version"),
        framework: plan_field(content, "Primary Dependencies"),
        database: plan_field(content, "Storage"),
        project_type: plan_field(content, "Project Type"),
    }
}

/// First `**Label**: value` line; placeholders are treated as absent.
fn plan_field(content: &str, label: &str) -> Option<String> {
    let prefix = format!("**{label}**:");
    let value = content
        .lines()
        .find_map(|line| line.strip_prefix(&prefix))?
        .trim();
    if value.is_empty() || value == "N/A" || value.contains("NEEDS CLARIFICATION") {
        return None;
    }
    Some(value.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextUpdate {
    pub agent: Agent,
    pub path: PathBuf,
    pub created: bool,
}

/// Fold the current feature's plan into agent context files.
///
/// With `agent` set only that agent's file is touched. Otherwise every
/// context file already present is updated, and `fallback`'s is created
/// when none exist.
pub fn update_agent_context(
    root: &Path,
    fp: &FeaturePaths,
    agent: Option<Agent>,
    fallback: Agent,
) -> Result<Vec<ContextUpdate>> {
    update_agent_context_on(root, fp, agent, fallback, chrono::Local::now().date_naive())
}

pub fn update_agent_context_on(
    root: &Path,
    fp: &FeaturePaths,
    agent: Option<Agent>,
    fallback: Agent,
    today: NaiveDate,
) -> Result<Vec<ContextUpdate>> {
    if !fp.impl_plan.is_file() {
        return Err(SpecifyError::MissingDocument {
            doc: "plan.md".to_string(),
            dir: fp.feature_dir.display().to_string(),
            hint: "/plan".to_string(),
        });
    }
    let plan = parse_plan(&std::fs::read_to_string(&fp.impl_plan)?);
    if plan.tech_stack().is_none() && plan.database.is_none() {
        tracing::warn!(plan = %fp.impl_plan.display(), "plan has no technical context to record");
    }

    let targets = match agent {
        Some(agent) => vec![agent],
        None => existing_context_agents(root, fallback),
    };

    let mut updates = Vec::with_capacity(targets.len());
    for agent in targets {
        let path = root.join(agent.context_file());
        let created = !path.exists();
        let content = if created {
            let template = load_agent_template(root)?;
            render_new_context(&template, &project_name(root), &fp.current_branch, &plan, today)
        } else {
            let existing = std::fs::read_to_string(&path)?;
            update_existing_context(&existing, &fp.current_branch, &plan, today)
        };
        if let Some(parent) = path.parent() {
            io::ensure_dir(parent)?;
        }
        io::atomic_write(&path, content.as_bytes())?;
        tracing::debug!(%agent, path = %path.display(), created, "updated agent context");
        updates.push(ContextUpdate {
            agent,
            path,
            created,
        });
    }
    Ok(updates)
}

/// Agents whose context file exists, one per distinct file.
fn existing_context_agents(root: &Path, fallback: Agent) -> Vec<Agent> {
    let mut seen = Vec::new();
    let mut agents = Vec::new();
    for &agent in Agent::all() {
        let file = agent.context_file();
        if root.join(file).is_file() && !seen.contains(&file) {
            seen.push(file);
            agents.push(agent);
        }
    }
    if agents.is_empty() {
        agents.push(fallback);
    }
    agents
}

fn load_agent_template(root: &Path) -> Result<String> {
    let path = paths::template_path(root, paths::AGENT_FILE_TEMPLATE);
    if path.is_file() {
        return Ok(std::fs::read_to_string(path)?);
    }
    tracing::debug!(path = %path.display(), "agent template missing; using built-in copy");
    Ok(templates::AGENT_FILE_TEMPLATE.to_string())
}

fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Project".to_string())
}

// ---------------------------------------------------------------------------
// Rendering a new file
// ---------------------------------------------------------------------------

fn project_structure(project_type: Option<&str>) -> &'static str {
    match project_type {
        Some(t) if t.to_ascii_lowercase().contains("web") => "backend/\nfrontend/\ntests/",
        _ => "src/\ntests/",
    }
}

fn commands_for(language: Option<&str>) -> String {
    let Some(lang) = language else {
        return "# Add commands for your stack".to_string();
    };
    let lower = lang.to_ascii_lowercase();
    if lower.contains("python") {
        "cd src && pytest && ruff check .".to_string()
    } else if lower.contains("rust") {
        "cargo test && cargo clippy".to_string()
    } else if lower.contains("javascript") || lower.contains("typescript") {
        "npm test && npm run lint".to_string()
    } else {
        format!("# Add commands for {lang}")
    }
}

fn render_new_context(
    template: &str,
    project: &str,
    branch: &str,
    plan: &PlanData,
    today: NaiveDate,
) -> String {
    let date = today.format("%Y-%m-%d").to_string();

    let technologies = new_tech_entries(template, branch, plan).join("\n");
    let recent = recent_change_entry(branch, plan).unwrap_or_default();
    let style = match plan.language.as_deref() {
        Some(lang) => format!("{lang}: Follow standard conventions"),
        None => "Follow standard conventions".to_string(),
    };

    template
        .replace("[PROJECT NAME]", project)
        .replace("[DATE]", &date)
        .replace("[EXTRACTED FROM ALL PLAN.MD FILES]", &technologies)
        .replace(
            "[ACTUAL STRUCTURE FROM PLANS]",
            project_structure(plan.project_type.as_deref()),
        )
        .replace(
            "[ONLY COMMANDS FOR ACTIVE TECHNOLOGIES]",
            &commands_for(plan.language.as_deref()),
        )
        .replace("[LANGUAGE-SPECIFIC, ONLY FOR LANGUAGES IN USE]", &style)
        .replace("[LAST 3 FEATURES AND WHAT THEY ADDED]", &recent)
}

// ---------------------------------------------------------------------------
// Updating an existing file
// ---------------------------------------------------------------------------

/// Technology bullets not yet mentioned in `existing`.
fn new_tech_entries(existing: &str, branch: &str, plan: &PlanData) -> Vec<String> {
    let mut entries = Vec::new();
    if let Some(stack) = plan.tech_stack() {
        if !existing.contains(&stack) {
            entries.push(format!("- {stack} ({branch})"));
        }
    }
    if let Some(db) = &plan.database {
        if !existing.contains(db.as_str()) {
            entries.push(format!("- {db} ({branch})"));
        }
    }
    entries
}

fn recent_change_entry(branch: &str, plan: &PlanData) -> Option<String> {
    plan.tech_stack()
        .or_else(|| plan.database.clone())
        .map(|added| format!("- {branch}: Added {added}"))
}

static LAST_UPDATED_RE: OnceLock<Regex> = OnceLock::new();

fn last_updated_re() -> &'static Regex {
    LAST_UPDATED_RE
        .get_or_init(|| Regex::new(r"(Last updated(?:\*\*)?:\s*)\d{4}-\d{2}-\d{2}").unwrap())
}

fn update_existing_context(existing: &str, branch: &str, plan: &PlanData, today: NaiveDate) -> String {
    let tech = new_tech_entries(existing, branch, plan);
    let mut pending_change = recent_change_entry(branch, plan);

    let mut out: Vec<String> = Vec::new();
    let mut in_tech = false;
    let mut tech_added = tech.is_empty();
    let mut saw_tech = false;
    let mut in_changes = false;
    let mut saw_changes = false;
    let mut changes_kept = 0usize;

    for line in existing.lines() {
        let heading = line.starts_with("## ");

        // the change list ends at the first line that is neither a bullet nor blank
        if in_changes && !heading {
            if line.starts_with("- ") {
                if let Some(entry) = pending_change.take() {
                    out.push(entry);
                    changes_kept = 1;
                }
                if changes_kept < MAX_RECENT_CHANGES {
                    changes_kept += 1;
                    out.push(line.to_string());
                }
                continue;
            }
            if line.trim().is_empty() {
                out.push(line.to_string());
                continue;
            }
        }
        if in_changes {
            if let Some(entry) = pending_change.take() {
                insert_before_blank_tail(&mut out, &[entry]);
            }
            in_changes = false;
        }

        if heading {
            if in_tech && !tech_added {
                insert_before_blank_tail(&mut out, &tech);
                tech_added = true;
            }
            in_tech = line.trim_end() == ACTIVE_TECHNOLOGIES;
            in_changes = line.trim_end() == RECENT_CHANGES;
            saw_tech |= in_tech;
            saw_changes |= in_changes;
        }
        out.push(line.to_string());
    }

    if in_changes {
        if let Some(entry) = pending_change.take() {
            insert_before_blank_tail(&mut out, &[entry]);
        }
    }
    if in_tech && !tech_added {
        insert_before_blank_tail(&mut out, &tech);
        tech_added = true;
    }
    if !saw_tech && !tech_added {
        out.push(String::new());
        out.push(ACTIVE_TECHNOLOGIES.to_string());
        out.extend(tech);
    }
    if !saw_changes {
        if let Some(entry) = pending_change {
            out.push(String::new());
            out.push(RECENT_CHANGES.to_string());
            out.push(entry);
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    let date = today.format("%Y-%m-%d").to_string();
    last_updated_re()
        .replace_all(&text, format!("${{1}}{date}"))
        .into_owned()
}

/// Append `entries` to a section, ahead of the blank lines that end it.
fn insert_before_blank_tail(out: &mut Vec<String>, entries: &[String]) {
    let mut at = out.len();
    while at > 0 && out[at - 1].trim().is_empty() {
        at -= 1;
    }
    for (offset, entry) in entries.iter().enumerate() {
        out.insert(at + offset, entry.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
