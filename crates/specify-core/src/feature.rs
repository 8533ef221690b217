//! Numbered feature directories and their branches.
//!
//! A feature lives in `specs/NNN-short-name/` and, in git repositories, on a
//! branch of the same name. Operations that act on "the current feature"
//! resolve it through [`resolve_current_branch`] and
//! [`find_feature_dir_by_prefix`].

use crate::error::{Result, SpecifyError};
use crate::{git, io, paths};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable that pins the current feature, mainly for non-git
/// repositories where there is no branch to read.
pub const FEATURE_ENV: &str = "SPECIFY_FEATURE";

/// GitHub rejects branch names longer than this many bytes.
pub const MAX_BRANCH_BYTES: usize = 244;

const DEFAULT_BRANCH: &str = "main";

const STOP_WORDS: &[&str] = &[
    "i", "a", "an", "the", "to", "for", "of", "in", "on", "at", "by", "with", "from", "is", "are",
    "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "should", "could", "can", "may", "might", "must", "shall", "this", "that", "these",
    "those", "my", "your", "our", "their", "want", "need", "add", "get", "set",
];

// ---------------------------------------------------------------------------
// Branch name patterns
// ---------------------------------------------------------------------------

static FEATURE_BRANCH_RE: OnceLock<Regex> = OnceLock::new();
static NUMBER_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn feature_branch_re() -> &'static Regex {
    FEATURE_BRANCH_RE.get_or_init(|| Regex::new(r"^(\d{3})-").unwrap())
}

fn number_prefix_re() -> &'static Regex {
    NUMBER_PREFIX_RE.get_or_init(|| Regex::new(r"^(\d+)-").unwrap())
}

/// Feature branches start with a three-digit number and a dash: `001-login`.
pub fn is_feature_branch(name: &str) -> bool {
    feature_branch_re().is_match(name)
}

fn numeric_prefix(name: &str) -> Option<u32> {
    number_prefix_re()
        .captures(name)
        .and_then(|c| c[1].parse().ok())
}

// ---------------------------------------------------------------------------
// Current feature resolution
// ---------------------------------------------------------------------------

/// Names of the directories directly under `specs/`.
pub fn spec_dir_names(root: &Path) -> Result<Vec<String>> {
    let dir = paths::specs_dir(root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// The numbered spec directory with the highest number.
pub fn latest_feature_dir(root: &Path) -> Option<String> {
    spec_dir_names(root)
        .ok()?
        .into_iter()
        .filter_map(|name| numeric_prefix(&name).map(|n| (n, name)))
        .max()
        .map(|(_, name)| name)
}

/// Resolve the branch name operations should act on.
///
/// Order: explicit override (`SPECIFY_FEATURE`), the checked-out git branch,
/// the highest-numbered spec directory, then `main`.
pub fn resolve_current_branch(root: &Path, feature_override: Option<&str>, has_git: bool) -> String {
    if let Some(name) = feature_override.map(str::trim).filter(|s| !s.is_empty()) {
        return name.to_string();
    }
    if has_git {
        if let Some(branch) = git::current_branch(root) {
            return branch;
        }
    }
    if let Some(latest) = latest_feature_dir(root) {
        tracing::debug!(%latest, "no branch available; using latest spec directory");
        return latest;
    }
    DEFAULT_BRANCH.to_string()
}

/// Map a branch to its spec directory.
///
/// `NNN-anything` resolves to the single `specs/NNN-*` directory, so several
/// branches can share one spec. Without a match the directory is
/// `specs/<branch>`; more than one match is an error.
pub fn find_feature_dir_by_prefix(root: &Path, branch: &str) -> Result<PathBuf> {
    let Some(caps) = feature_branch_re().captures(branch) else {
        return Ok(paths::feature_dir(root, branch));
    };
    let prefix = &caps[1];
    let wanted = format!("{prefix}-");
    let matches: Vec<String> = spec_dir_names(root)?
        .into_iter()
        .filter(|name| name.starts_with(&wanted))
        .collect();

    match matches.as_slice() {
        [] => Ok(paths::feature_dir(root, branch)),
        [only] => Ok(paths::feature_dir(root, only)),
        many => Err(SpecifyError::AmbiguousFeaturePrefix {
            prefix: prefix.to_string(),
            matches: many.join(", "),
        }),
    }
}

/// Every path an SDD step may need for the current feature.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FeaturePaths {
    pub repo_root: PathBuf,
    pub current_branch: String,
    pub has_git: bool,
    pub feature_dir: PathBuf,
    pub feature_spec: PathBuf,
    pub impl_plan: PathBuf,
    pub tasks: PathBuf,
    pub research: PathBuf,
    pub data_model: PathBuf,
    pub quickstart: PathBuf,
    pub contracts_dir: PathBuf,
}

impl FeaturePaths {
    pub fn resolve(root: &Path, feature_override: Option<&str>) -> Result<Self> {
        let has_git = git::is_repo(root);
        let current_branch = resolve_current_branch(root, feature_override, has_git);
        let feature_dir = find_feature_dir_by_prefix(root, &current_branch)?;
        Ok(Self::for_dir(root, current_branch, has_git, feature_dir))
    }

    fn for_dir(root: &Path, current_branch: String, has_git: bool, feature_dir: PathBuf) -> Self {
        Self {
            repo_root: root.to_path_buf(),
            current_branch,
            has_git,
            feature_spec: feature_dir.join("spec.md"),
            impl_plan: feature_dir.join("plan.md"),
            tasks: feature_dir.join("tasks.md"),
            research: feature_dir.join("research.md"),
            data_model: feature_dir.join("data-model.md"),
            quickstart: feature_dir.join("quickstart.md"),
            contracts_dir: feature_dir.join("contracts"),
            feature_dir,
        }
    }

    /// Enforce the `NNN-` naming rule. Outside git it only warns, since the
    /// "branch" may be a hand-set `SPECIFY_FEATURE`.
    pub fn validate_branch(&self) -> Result<()> {
        if is_feature_branch(&self.current_branch) {
            return Ok(());
        }
        if self.has_git {
            return Err(SpecifyError::NotOnFeatureBranch(self.current_branch.clone()));
        }
        tracing::warn!(
            branch = %self.current_branch,
            "git repository not detected; skipped feature branch validation"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Branch naming
// ---------------------------------------------------------------------------

/// Lowercase, non-alphanumerics to `-`, dashes collapsed and trimmed.
pub fn clean_branch_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Derive a short branch suffix from a free-form feature description.
///
/// Stop words and words shorter than three letters are dropped, unless the
/// short word appears upper-case in the description (an acronym such as
/// "UI"). Three words are kept, four when exactly four remain.
pub fn generate_branch_suffix(description: &str) -> String {
    let original_tokens: Vec<&str> = description
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let meaningful: Vec<String> = original_tokens
        .iter()
        .map(|t| t.to_ascii_lowercase())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| {
            w.len() >= 3 || original_tokens.iter().any(|t| *t == w.to_ascii_uppercase())
        })
        .collect();

    if meaningful.is_empty() {
        return clean_branch_name(description)
            .split('-')
            .take(3)
            .collect::<Vec<_>>()
            .join("-");
    }

    let max_words = if meaningful.len() == 4 { 4 } else { 3 };
    meaningful
        .into_iter()
        .take(max_words)
        .collect::<Vec<_>>()
        .join("-")
}

/// Highest numeric prefix among spec directories and branches, plus one.
pub fn next_feature_number(spec_dirs: &[String], branches: &[String]) -> Result<u32> {
    let Some((highest, name)) = spec_dirs
        .iter()
        .chain(branches)
        .filter_map(|name| numeric_prefix(name).map(|n| (n, name)))
        .max_by_key(|(n, _)| *n)
    else {
        return Ok(1);
    };
    highest
        .checked_add(1)
        .ok_or_else(|| SpecifyError::FeatureNumbersExhausted(name.clone()))
}

/// `NNN-suffix`, truncated in the suffix to fit [`MAX_BRANCH_BYTES`].
pub fn format_branch_name(number: u32, suffix: &str) -> String {
    let prefix = format!("{number:03}-");
    let full = format!("{prefix}{suffix}");
    if full.len() <= MAX_BRANCH_BYTES {
        return full;
    }

    let budget = MAX_BRANCH_BYTES.saturating_sub(prefix.len());
    let mut cut = budget.min(suffix.len());
    while !suffix.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = suffix[..cut].trim_end_matches('-');
    let name = format!("{prefix}{truncated}");
    tracing::warn!(
        original = full.len(),
        truncated = name.len(),
        limit = MAX_BRANCH_BYTES,
        "branch name exceeded GitHub's limit and was truncated"
    );
    name
}

// ---------------------------------------------------------------------------
// create_feature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CreateOptions<'a> {
    pub description: &'a str,
    pub short_name: Option<&'a str>,
    pub number: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CreatedFeature {
    pub branch_name: String,
    pub spec_file: PathBuf,
    pub feature_num: String,
    pub has_git: bool,
}

/// Allocate the next feature number, create its branch (git only) and its
/// spec directory seeded from the spec template.
pub fn create_feature(root: &Path, opts: &CreateOptions<'_>) -> Result<CreatedFeature> {
    let description = opts.description.trim();
    if description.is_empty() {
        return Err(SpecifyError::EmptyDescription);
    }

    let has_git = git::is_repo(root);
    let suffix = opts
        .short_name
        .map(clean_branch_name)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| generate_branch_suffix(description));

    let spec_dirs = spec_dir_names(root)?;
    let number = match opts.number {
        Some(n) => {
            if spec_dirs.iter().any(|d| numeric_prefix(d) == Some(n)) {
                tracing::warn!(number = n, "a spec directory already uses this number");
            }
            n
        }
        None => {
            let branches = if has_git {
                git::all_branch_names(root)
            } else {
                Vec::new()
            };
            next_feature_number(&spec_dirs, &branches)?
        }
    };

    let branch_name = format_branch_name(number, &suffix);

    if has_git {
        git::create_branch(root, &branch_name)?;
    } else {
        tracing::warn!(
            branch = %branch_name,
            "git repository not detected; skipped branch creation"
        );
    }

    let feature_dir = paths::feature_dir(root, &branch_name);
    io::ensure_dir(&feature_dir)?;

    let spec_file = feature_dir.join("spec.md");
    let template = paths::template_path(root, paths::SPEC_TEMPLATE);
    let seed = if template.is_file() {
        std::fs::read(&template)?
    } else {
        tracing::debug!(template = %template.display(), "spec template missing; creating empty spec");
        Vec::new()
    };
    io::write_if_missing(&spec_file, &seed)?;

    Ok(CreatedFeature {
        branch_name,
        spec_file,
        feature_num: format!("{number:03}"),
        has_git,
    })
}

// ---------------------------------------------------------------------------
// setup_plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PlanSetup {
    pub feature_spec: PathBuf,
    pub impl_plan: PathBuf,
    pub specs_dir: PathBuf,
    pub branch: String,
    pub has_git: bool,
    #[serde(skip)]
    pub created: bool,
}

/// Prepare `plan.md` for the current feature from the plan template.
/// An existing plan is kept unless `force` is set.
pub fn setup_plan(root: &Path, feature_override: Option<&str>, force: bool) -> Result<PlanSetup> {
    let fp = FeaturePaths::resolve(root, feature_override)?;
    fp.validate_branch()?;
    io::ensure_dir(&fp.feature_dir)?;

    let created = if fp.impl_plan.exists() && !force {
        false
    } else {
        let template = paths::template_path(root, paths::PLAN_TEMPLATE);
        let body = if template.is_file() {
            std::fs::read(&template)?
        } else {
            tracing::warn!(template = %template.display(), "plan template not found");
            Vec::new()
        };
        io::atomic_write(&fp.impl_plan, &body)?;
        true
    };

    Ok(PlanSetup {
        feature_spec: fp.feature_spec,
        impl_plan: fp.impl_plan,
        specs_dir: fp.feature_dir,
        branch: fp.current_branch,
        has_git: fp.has_git,
        created,
    })
}

// ---------------------------------------------------------------------------
// check_prerequisites
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct PrereqOptions {
    pub require_tasks: bool,
    pub include_tasks: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Prerequisites {
    pub feature_dir: PathBuf,
    pub available_docs: Vec<String>,
}

/// Validate that the current feature is ready for a tasks/implement step and
/// list the optional design documents that exist.
pub fn check_prerequisites(fp: &FeaturePaths, opts: PrereqOptions) -> Result<Prerequisites> {
    fp.validate_branch()?;

    if !fp.feature_dir.is_dir() {
        return Err(SpecifyError::FeatureDirMissing(
            fp.feature_dir.display().to_string(),
        ));
    }
    if !fp.impl_plan.is_file() {
        return Err(missing_doc(fp, "plan.md", "/plan"));
    }
    if opts.require_tasks && !fp.tasks.is_file() {
        return Err(missing_doc(fp, "tasks.md", "/tasks"));
    }

    let mut docs = Vec::new();
    if fp.research.is_file() {
        docs.push("research.md".to_string());
    }
    if fp.data_model.is_file() {
        docs.push("data-model.md".to_string());
    }
    if io::dir_has_entries(&fp.contracts_dir) {
        docs.push("contracts/".to_string());
    }
    if fp.quickstart.is_file() {
        docs.push("quickstart.md".to_string());
    }
    if opts.include_tasks && fp.tasks.is_file() {
        docs.push("tasks.md".to_string());
    }

    Ok(Prerequisites {
        feature_dir: fp.feature_dir.clone(),
        available_docs: docs,
    })
}

fn missing_doc(fp: &FeaturePaths, doc: &str, hint: &str) -> SpecifyError {
    SpecifyError::MissingDocument {
        doc: doc.to_string(),
        dir: fp.feature_dir.display().to_string(),
        hint: hint.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
