use crate::agent::Agent;
use crate::error::{Result, SpecifyError};
use crate::paths;
use crate::script::ScriptType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// TemplateSource
// ---------------------------------------------------------------------------

/// Where the project's templates came from at `init` time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateSource {
    Release { tag: String },
    Archive { path: PathBuf },
    Embedded,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Release { tag } => write!(f, "release {tag}"),
            TemplateSource::Archive { path } => write!(f, "archive {}", path.display()),
            TemplateSource::Embedded => f.write_str("embedded"),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    pub ai: Agent,
    pub script: ScriptType,
    pub template: TemplateSource,
    /// Version of the CLI that ran `init`.
    pub cli_version: String,
    pub initialized_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(
        project_name: impl Into<String>,
        ai: Agent,
        script: ScriptType,
        template: TemplateSource,
    ) -> Self {
        Self {
            version: default_version(),
            project: ProjectConfig {
                name: project_name.into(),
            },
            ai,
            script,
            template,
            cli_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized_at: Utc::now(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SpecifyError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file is `None`. Projects set up
    /// by hand or by older tooling have no config.
    pub fn load_optional(root: &Path) -> Result<Option<Self>> {
        match Self::load(root) {
            Ok(cfg) => Ok(Some(cfg)),
            Err(SpecifyError::NotInitialized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
