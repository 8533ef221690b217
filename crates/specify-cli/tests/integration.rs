#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn specify(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("specify").unwrap();
    cmd.current_dir(dir)
        .env("SPECIFY_ROOT", dir)
        .env_remove("SPECIFY_FEATURE")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn json_of(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

/// Scaffold the built-in bundle into `dir` without git or network.
fn init_offline(dir: &Path) {
    specify(dir)
        .args(["init", "--here", "--offline", "--no-git", "--ignore-agent-tools"])
        .args(["--ai", "claude", "--script", "sh"])
        .assert()
        .success();
}

fn git_available() -> bool {
    which::which("git").is_ok()
}

fn with_git_identity(cmd: &mut Command) -> &mut Command {
    cmd.env("GIT_AUTHOR_NAME", "Spec Tester")
        .env("GIT_AUTHOR_EMAIL", "tester@example.com")
        .env("GIT_COMMITTER_NAME", "Spec Tester")
        .env("GIT_COMMITTER_EMAIL", "tester@example.com")
}

const PLAN: &str = "# Implementation Plan\n\n\
    **Language/Version**: Python 3.12\n\
    **Primary Dependencies**: FastAPI\n\
    **Storage**: SQLite\n\
    **Project Type**: single\n";

// ---------------------------------------------------------------------------
// specify init
// ---------------------------------------------------------------------------

#[test]
fn init_offline_creates_project_directory() {
    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .args(["init", "photos", "--offline", "--no-git", "--ignore-agent-tools"])
        .args(["--ai", "claude", "--script", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initializing photos"))
        .stdout(predicate::str::contains("/constitution"))
        .stdout(predicate::str::contains(".claude/"));

    let project = dir.path().join("photos");
    assert!(project.join(".specify/memory/constitution.md").is_file());
    assert!(project.join(".specify/templates/spec-template.md").is_file());
    assert!(project.join(".claude/commands/specify.md").is_file());
    assert!(!project.join(".git").exists());

    let config = std::fs::read_to_string(project.join(".specify/config.yaml")).unwrap();
    let config: serde_yaml::Value = serde_yaml::from_str(&config).unwrap();
    assert_eq!(config["project"]["name"], "photos");
    assert_eq!(config["ai"], "claude");
    assert_eq!(config["script"], "sh");
    assert_eq!(config["template"]["type"], "embedded");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let script = project.join(".specify/scripts/bash/create-new-feature.sh");
        let mode = std::fs::metadata(script).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }
}

#[test]
fn init_refuses_existing_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("taken")).unwrap();
    specify(dir.path())
        .args(["init", "taken", "--offline", "--no-git", "--ignore-agent-tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_needs_a_target() {
    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .args(["init", "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--here"));
}

#[test]
fn init_here_on_non_empty_directory_requires_force() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("README.md"), "# existing\n").unwrap();

    specify(dir.path())
        .args(["init", "--here", "--offline", "--no-git", "--ignore-agent-tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert!(!dir.path().join(".specify").exists());

    specify(dir.path())
        .args(["init", ".", "--force", "--offline", "--no-git", "--ignore-agent-tools"])
        .assert()
        .success();
    assert!(dir.path().join(".specify/config.yaml").is_file());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("README.md")).unwrap(),
        "# existing\n"
    );
}

#[test]
fn init_rejects_unknown_agent() {
    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .args(["init", "x", "--ai", "clippy", "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown agent 'clippy'"));
    assert!(!dir.path().join("x").exists());
}

#[test]
fn init_json_summary() {
    let dir = TempDir::new().unwrap();
    let out = specify(dir.path())
        .args(["init", "--here", "--offline", "--no-git", "--json"])
        .args(["--ai", "copilot", "--script", "ps"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary = json_of(&out);
    assert_eq!(summary["ai"], "copilot");
    assert_eq!(summary["script"], "ps");
    assert_eq!(summary["git"], "skipped");
    assert_eq!(summary["template"]["type"], "embedded");
    assert!(summary["files"].as_u64().unwrap() > 10);
    assert!(dir.path().join(".github/prompts/plan.prompt.md").is_file());
    assert!(dir.path().join(".vscode/settings.json").is_file());
    assert!(dir.path().join(".specify/scripts/powershell/setup-plan.ps1").is_file());
}

#[test]
fn init_from_packaged_archive_merges_vscode_settings() {
    let build = TempDir::new().unwrap();
    specify(build.path())
        .args(["package", "--agents", "copilot", "--scripts", "sh", "--version", "v9.9.9"])
        .assert()
        .success();
    let archive = build
        .path()
        .join("dist/spec-kit-template-copilot-sh-v9.9.9.zip");
    assert!(archive.is_file());

    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".vscode")).unwrap();
    std::fs::write(
        dir.path().join(".vscode/settings.json"),
        r#"{"editor.fontSize": 14}"#,
    )
    .unwrap();

    specify(dir.path())
        .args(["init", "--here", "--force", "--no-git", "--ignore-agent-tools"])
        .args(["--ai", "copilot"])
        .arg("--template-archive")
        .arg(&archive)
        .assert()
        .success();

    let settings: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(".vscode/settings.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(settings["editor.fontSize"], 14);
    assert_eq!(settings["chat.promptFilesRecommendations"]["specify"], true);

    let config = std::fs::read_to_string(dir.path().join(".specify/config.yaml")).unwrap();
    assert!(config.contains("type: archive"));
}

#[test]
fn init_downloads_latest_release() {
    let build = TempDir::new().unwrap();
    specify(build.path())
        .args(["package", "--agents", "gemini", "--scripts", "sh", "--version", "v0.0.90"])
        .assert()
        .success();
    let zip = std::fs::read(
        build
            .path()
            .join("dist/spec-kit-template-gemini-sh-v0.0.90.zip"),
    )
    .unwrap();

    let mut server = mockito::Server::new();
    let release = serde_json::json!({
        "tag_name": "v0.0.90",
        "assets": [
            {
                "name": "spec-kit-template-claude-sh-v0.0.90.zip",
                "browser_download_url": format!("{}/dl/claude.zip", server.url()),
                "size": 1
            },
            {
                "name": "spec-kit-template-gemini-sh-v0.0.90.zip",
                "browser_download_url": format!("{}/dl/gemini.zip", server.url()),
                "size": zip.len()
            }
        ]
    });
    let latest = server
        .mock("GET", "/repos/github/spec-kit/releases/latest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(release.to_string())
        .create();
    let download = server
        .mock("GET", "/dl/gemini.zip")
        .with_status(200)
        .with_body(zip)
        .create();

    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .env("SPECIFY_GITHUB_API", server.url())
        .args(["init", "app", "--ai", "gemini", "--script", "sh"])
        .args(["--no-git", "--ignore-agent-tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spec-kit-template-gemini-sh-v0.0.90.zip"));

    latest.assert();
    download.assert();
    let project = dir.path().join("app");
    assert!(project.join(".gemini/commands/plan.toml").is_file());
    let config = std::fs::read_to_string(project.join(".specify/config.yaml")).unwrap();
    assert!(config.contains("tag: v0.0.90"));
}

#[test]
fn init_failed_download_removes_new_directory() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/repos/github/spec-kit/releases/latest")
        .with_status(403)
        .with_header("x-ratelimit-remaining", "0")
        .create();

    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .env("SPECIFY_GITHUB_API", server.url())
        .args(["init", "app", "--no-git", "--ignore-agent-tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 403"))
        .stderr(predicate::str::contains("GH_TOKEN"));
    assert!(!dir.path().join("app").exists());
}

// ---------------------------------------------------------------------------
// specify check / version / package
// ---------------------------------------------------------------------------

#[test]
fn check_json_lists_tools() {
    let dir = TempDir::new().unwrap();
    let out = specify(dir.path())
        .args(["check", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let checks = json_of(&out);
    let tools: Vec<&str> = checks
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["tool"].as_str().unwrap())
        .collect();
    assert_eq!(tools[0], "git");
    assert!(tools.contains(&"claude"));
    assert!(tools.contains(&"code-insiders"));
}

#[test]
fn check_prints_table() {
    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOOL"))
        .stdout(predicate::str::contains("ready to use"));
}

#[test]
fn version_reports_project_template() {
    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("No project found"));

    init_offline(dir.path());
    let out = specify(dir.path())
        .args(["version", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v = json_of(&out);
    assert_eq!(v["cli_version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(v["project"]["ai"], "claude");
    assert_eq!(v["project"]["template"]["type"], "embedded");
}

#[test]
fn package_builds_every_combination_by_default() {
    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .args(["package", "--out", "out", "--version", "v1.2.3"])
        .assert()
        .success();
    let zips = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "zip"))
        .count();
    assert_eq!(zips, 12 * 2);
    assert!(dir
        .path()
        .join("out/spec-kit-template-cursor-agent-ps-v1.2.3.zip")
        .is_file());
}

// ---------------------------------------------------------------------------
// specify feature / plan / context (no git)
// ---------------------------------------------------------------------------

#[test]
fn feature_create_without_git() {
    let dir = TempDir::new().unwrap();
    init_offline(dir.path());

    let out = specify(dir.path())
        .args(["feature", "create", "--json", "Build a photo album organizer"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let created = json_of(&out);
    assert_eq!(created["BRANCH_NAME"], "001-build-photo-album-organizer");
    assert_eq!(created["FEATURE_NUM"], "001");
    assert_eq!(created["HAS_GIT"], false);

    let spec = dir.path().join("specs/001-build-photo-album-organizer/spec.md");
    assert!(spec.is_file());
    assert!(std::fs::read_to_string(spec)
        .unwrap()
        .starts_with("# Feature Specification"));

    specify(dir.path())
        .args(["feature", "create", "--short-name", "Tag Search", "add", "tag", "search"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCH_NAME: 002-tag-search"))
        .stdout(predicate::str::contains("export SPECIFY_FEATURE=002-tag-search"));
}

#[test]
fn feature_create_rejects_empty_description() {
    let dir = TempDir::new().unwrap();
    specify(dir.path())
        .args(["feature", "create", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("description is empty"));
}

#[test]
fn feature_paths_follow_override() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("specs/001-first")).unwrap();
    std::fs::create_dir_all(dir.path().join("specs/002-second")).unwrap();

    let out = specify(dir.path())
        .args(["feature", "paths", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(json_of(&out)["CURRENT_BRANCH"], "002-second");

    let out = specify(dir.path())
        .env("SPECIFY_FEATURE", "001-first")
        .args(["feature", "paths", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let paths = json_of(&out);
    assert_eq!(paths["CURRENT_BRANCH"], "001-first");
    assert!(paths["FEATURE_DIR"]
        .as_str()
        .unwrap()
        .ends_with("specs/001-first"));

    specify(dir.path())
        .args(["--feature", "001-first-fixup", "feature", "paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CURRENT_BRANCH: 001-first-fixup"))
        .stdout(predicate::str::contains("specs/001-first\n"));
}

#[test]
fn ambiguous_prefix_is_an_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("specs/004-a")).unwrap();
    std::fs::create_dir_all(dir.path().join("specs/004-b")).unwrap();
    specify(dir.path())
        .args(["--feature", "004-a", "feature", "paths"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("004-a, 004-b"));
}

#[test]
fn plan_setup_and_prerequisites() {
    let dir = TempDir::new().unwrap();
    init_offline(dir.path());
    specify(dir.path())
        .args(["feature", "create", "Offline sync engine"])
        .assert()
        .success();

    specify(dir.path())
        .args(["feature", "check", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("plan.md not found"));

    let out = specify(dir.path())
        .args(["plan", "setup", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan = json_of(&out);
    assert_eq!(plan["BRANCH"], "001-offline-sync-engine");
    let plan_path = plan["IMPL_PLAN"].as_str().unwrap().to_string();
    assert!(std::fs::read_to_string(&plan_path)
        .unwrap()
        .starts_with("# Implementation Plan"));

    std::fs::write(&plan_path, PLAN).unwrap();
    specify(dir.path())
        .args(["plan", "setup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
    assert_eq!(std::fs::read_to_string(&plan_path).unwrap(), PLAN);

    specify(dir.path())
        .args(["feature", "check", "--require-tasks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tasks.md not found"));

    let feature_dir = dir.path().join("specs/001-offline-sync-engine");
    std::fs::write(feature_dir.join("research.md"), "# Research").unwrap();
    std::fs::write(feature_dir.join("tasks.md"), "- [ ] T001").unwrap();
    let out = specify(dir.path())
        .args(["feature", "check", "--json", "--require-tasks", "--include-tasks"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let prereqs = json_of(&out);
    assert_eq!(
        prereqs["AVAILABLE_DOCS"],
        serde_json::json!(["research.md", "tasks.md"])
    );

    specify(dir.path())
        .args(["feature", "check", "--paths-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TASKS: "));
}

#[test]
fn context_update_writes_agent_file() {
    let dir = TempDir::new().unwrap();
    init_offline(dir.path());
    specify(dir.path())
        .args(["feature", "create", "Inventory tracking api"])
        .assert()
        .success();
    specify(dir.path())
        .args(["plan", "setup"])
        .assert()
        .success();
    std::fs::write(
        dir.path().join("specs/001-inventory-tracking-api/plan.md"),
        PLAN,
    )
    .unwrap();

    specify(dir.path())
        .args(["context", "update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    let claude = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
    assert!(claude.contains("- Python 3.12 + FastAPI (001-inventory-tracking-api)"));
    assert!(claude.contains("- SQLite (001-inventory-tracking-api)"));
    assert!(claude.contains("cd src && pytest && ruff check ."));

    let out = specify(dir.path())
        .args(["context", "update", "--agent", "gemini", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let updates = json_of(&out);
    assert_eq!(updates[0]["agent"], "gemini");
    assert_eq!(updates[0]["created"], true);
}

// ---------------------------------------------------------------------------
// Generated bash scripts
// ---------------------------------------------------------------------------

/// Run a scaffolded bash script the way an agent does: from the project
/// directory, with `SPECIFY_ROOT` left to `common.sh`.
fn bash_script(dir: &Path, name: &str) -> Command {
    let mut cmd = Command::new(dir.join(".specify/scripts/bash").join(name));
    cmd.current_dir(dir)
        .env("SPECIFY_BIN", assert_cmd::cargo::cargo_bin("specify"))
        .env_remove("SPECIFY_ROOT")
        .env_remove("SPECIFY_FEATURE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn bash_scripts_drive_the_feature_workflow() {
    if which::which("bash").is_err() {
        eprintln!("bash not available; skipping");
        return;
    }
    let dir = TempDir::new().unwrap();
    init_offline(dir.path());

    let out = bash_script(dir.path(), "create-new-feature.sh")
        .args(["--json", "Receipt scanning service"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let created = json_of(&out);
    assert_eq!(created["BRANCH_NAME"], "001-receipt-scanning-service");
    assert_eq!(created["FEATURE_NUM"], "001");
    assert!(created["SPEC_FILE"]
        .as_str()
        .unwrap()
        .ends_with("specs/001-receipt-scanning-service/spec.md"));
    assert!(dir
        .path()
        .join("specs/001-receipt-scanning-service/spec.md")
        .is_file());

    let out = bash_script(dir.path(), "setup-plan.sh")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan = json_of(&out);
    assert_eq!(plan["BRANCH"], "001-receipt-scanning-service");
    assert_eq!(plan["HAS_GIT"], false);
    for key in ["FEATURE_SPEC", "IMPL_PLAN", "SPECS_DIR"] {
        assert!(plan[key].is_string(), "missing {key}");
    }
    let plan_path = plan["IMPL_PLAN"].as_str().unwrap().to_string();
    assert!(Path::new(&plan_path).is_file());

    let out = bash_script(dir.path(), "check-prerequisites.sh")
        .args(["--json", "--paths-only"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let paths = json_of(&out);
    assert_eq!(paths["CURRENT_BRANCH"], "001-receipt-scanning-service");
    assert_eq!(paths["IMPL_PLAN"], plan_path.as_str());
    for key in ["REPO_ROOT", "FEATURE_DIR", "TASKS", "RESEARCH", "CONTRACTS_DIR"] {
        assert!(paths[key].is_string(), "missing {key}");
    }

    bash_script(dir.path(), "check-prerequisites.sh")
        .args(["--json", "--require-tasks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tasks.md not found"));

    std::fs::write(&plan_path, PLAN).unwrap();
    bash_script(dir.path(), "update-agent-context.sh")
        .arg("claude")
        .assert()
        .success();
    let claude = std::fs::read_to_string(dir.path().join("CLAUDE.md")).unwrap();
    assert!(claude.contains("- Python 3.12 + FastAPI (001-receipt-scanning-service)"));
}

// ---------------------------------------------------------------------------
// With git
// ---------------------------------------------------------------------------

#[test]
fn git_project_numbers_features_from_branches() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let mut init = specify(dir.path());
    with_git_identity(&mut init)
        .args(["init", "--here", "--offline", "--ignore-agent-tools", "--script", "sh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created: git repository"));
    assert!(dir.path().join(".git").exists());

    let mut create = specify(dir.path());
    let out = with_git_identity(&mut create)
        .args(["feature", "create", "--json", "User authentication flow"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let created = json_of(&out);
    assert_eq!(created["HAS_GIT"], true);
    assert_eq!(created["BRANCH_NAME"], "001-user-authentication-flow");

    // the spec dir is gone but the branch still holds the number
    std::fs::remove_dir_all(dir.path().join("specs")).unwrap();
    let mut second = specify(dir.path());
    with_git_identity(&mut second)
        .args(["feature", "create", "--short-name", "billing", "Monthly billing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BRANCH_NAME: 002-billing"));

    specify(dir.path())
        .args(["feature", "paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CURRENT_BRANCH: 002-billing"));
}

#[test]
fn git_non_feature_branch_fails_checks() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let mut init = specify(dir.path());
    with_git_identity(&mut init)
        .args(["init", "--here", "--offline", "--ignore-agent-tools"])
        .assert()
        .success();

    specify(dir.path())
        .args(["plan", "setup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not on a feature branch"));
}
