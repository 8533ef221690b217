use crate::error::{Result, SpecifyError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SPECIFY_DIR: &str = ".specify";
pub const SCRIPTS_DIR: &str = ".specify/scripts";
pub const TEMPLATES_DIR: &str = ".specify/templates";
pub const SPECS_DIR: &str = "specs";

pub const CONFIG_FILE: &str = ".specify/config.yaml";
pub const CONSTITUTION_FILE: &str = ".specify/memory/constitution.md";

pub const SPEC_TEMPLATE: &str = "spec-template.md";
pub const PLAN_TEMPLATE: &str = "plan-template.md";
pub const TASKS_TEMPLATE: &str = "tasks-template.md";
pub const CHECKLIST_TEMPLATE: &str = "checklist-template.md";
pub const AGENT_FILE_TEMPLATE: &str = "agent-file-template.md";

pub const VSCODE_SETTINGS: &str = ".vscode/settings.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn scripts_dir(root: &Path) -> PathBuf {
    root.join(SCRIPTS_DIR)
}

pub fn template_path(root: &Path, name: &str) -> PathBuf {
    root.join(TEMPLATES_DIR).join(name)
}

pub fn specs_dir(root: &Path) -> PathBuf {
    root.join(SPECS_DIR)
}

pub fn feature_dir(root: &Path, name: &str) -> PathBuf {
    specs_dir(root).join(name)
}

/// Path of the `claude` binary after `claude migrate-installer`, which moves
/// it out of PATH into the user's home.
pub fn claude_local_bin() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(SpecifyError::HomeNotFound)?;
    Ok(home.join(".claude").join("local").join("claude"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.specify/config.yaml")
        );
        assert_eq!(
            template_path(root, PLAN_TEMPLATE),
            PathBuf::from("/tmp/proj/.specify/templates/plan-template.md")
        );
        assert_eq!(
            feature_dir(root, "001-auth"),
            PathBuf::from("/tmp/proj/specs/001-auth")
        );
    }
}
