//! Script variants written into `.specify/scripts/`.
//!
//! The scripts are thin wrappers: they translate the flag style of their
//! shell into `specify` subcommands so that slash commands can call a file
//! path instead of depending on how the binary was installed. Set
//! `SPECIFY_BIN` to point them at a binary outside PATH.

use crate::error::SpecifyError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    Sh,
    Ps,
}

/// One script file inside a variant directory.
#[derive(Debug, Clone, Copy)]
pub struct ScriptFile {
    /// Base name without extension, e.g. `create-new-feature`.
    pub name: &'static str,
    pub content: &'static str,
}

impl ScriptType {
    pub fn all() -> &'static [ScriptType] {
        &[ScriptType::Sh, ScriptType::Ps]
    }

    /// PowerShell on Windows, POSIX shell everywhere else.
    pub fn platform_default() -> ScriptType {
        if cfg!(windows) {
            ScriptType::Ps
        } else {
            ScriptType::Sh
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptType::Sh => "sh",
            ScriptType::Ps => "ps",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ScriptType::Sh => "POSIX Shell (bash/zsh)",
            ScriptType::Ps => "PowerShell",
        }
    }

    /// Directory under `.specify/scripts/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            ScriptType::Sh => "bash",
            ScriptType::Ps => "powershell",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ScriptType::Sh => "sh",
            ScriptType::Ps => "ps1",
        }
    }

    /// Project-relative path of a script, e.g. `.specify/scripts/bash/setup-plan.sh`.
    pub fn script_path(self, name: &str) -> String {
        format!(
            ".specify/scripts/{}/{}.{}",
            self.dir_name(),
            name,
            self.extension()
        )
    }

    /// Flag spelling for the variant (`--json` vs `-Json`).
    pub fn flag(self, name: &str) -> String {
        match self {
            ScriptType::Sh => format!("--{name}"),
            ScriptType::Ps => {
                let pascal: String = name
                    .split('-')
                    .map(|part| {
                        let mut chars = part.chars();
                        match chars.next() {
                            Some(c) => c.to_ascii_uppercase().to_string() + chars.as_str(),
                            None => String::new(),
                        }
                    })
                    .collect();
                format!("-{pascal}")
            }
        }
    }

    pub fn files(self) -> &'static [ScriptFile] {
        match self {
            ScriptType::Sh => BASH_SCRIPTS,
            ScriptType::Ps => POWERSHELL_SCRIPTS,
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScriptType {
    type Err = SpecifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sh" | "bash" => Ok(ScriptType::Sh),
            "ps" | "ps1" | "powershell" => Ok(ScriptType::Ps),
            _ => Err(SpecifyError::UnknownScriptType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Bash scripts
// ---------------------------------------------------------------------------

const BASH_SCRIPTS: &[ScriptFile] = &[
    ScriptFile {
        name: "common",
        content: BASH_COMMON,
    },
    ScriptFile {
        name: "create-new-feature",
        content: BASH_CREATE_NEW_FEATURE,
    },
    ScriptFile {
        name: "setup-plan",
        content: BASH_SETUP_PLAN,
    },
    ScriptFile {
        name: "check-prerequisites",
        content: BASH_CHECK_PREREQUISITES,
    },
    ScriptFile {
        name: "update-agent-context",
        content: BASH_UPDATE_AGENT_CONTEXT,
    },
];

const BASH_COMMON: &str = r#"#!/usr/bin/env bash
# Shared helpers for the Spec-Driven Development scripts.

SCRIPT_DIR="$(CDPATH="" cd "$(dirname "${BASH_SOURCE[0]}")" && pwd)"
REPO_ROOT="$(CDPATH="" cd "$SCRIPT_DIR/../../.." && pwd)"

specify_run() {
    local bin="${SPECIFY_BIN:-specify}"
    if ! command -v "$bin" >/dev/null 2>&1; then
        echo "ERROR: '$bin' not found. Install the specify CLI or set SPECIFY_BIN." >&2
        exit 127
    fi
    SPECIFY_ROOT="${SPECIFY_ROOT:-$REPO_ROOT}" "$bin" "$@"
}
"#;

const BASH_CREATE_NEW_FEATURE: &str = r#"#!/usr/bin/env bash
# Usage: create-new-feature.sh [--json] [--short-name <name>] [--number N] <feature description>
set -e
source "$(dirname "${BASH_SOURCE[0]}")/common.sh"
specify_run feature create "$@"
"#;

const BASH_SETUP_PLAN: &str = r#"#!/usr/bin/env bash
# Usage: setup-plan.sh [--json] [--force]
set -e
source "$(dirname "${BASH_SOURCE[0]}")/common.sh"
specify_run plan setup "$@"
"#;

const BASH_CHECK_PREREQUISITES: &str = r#"#!/usr/bin/env bash
# Usage: check-prerequisites.sh [--json] [--require-tasks] [--include-tasks] [--paths-only]
set -e
source "$(dirname "${BASH_SOURCE[0]}")/common.sh"
specify_run feature check "$@"
"#;

const BASH_UPDATE_AGENT_CONTEXT: &str = r#"#!/usr/bin/env bash
# Usage: update-agent-context.sh [agent]
# Without an agent, every existing agent context file is refreshed.
set -e
source "$(dirname "${BASH_SOURCE[0]}")/common.sh"
if [ -n "${1:-}" ]; then
    specify_run context update --agent "$1"
else
    specify_run context update
fi
"#;

// ---------------------------------------------------------------------------
// PowerShell scripts
// ---------------------------------------------------------------------------

const POWERSHELL_SCRIPTS: &[ScriptFile] = &[
    ScriptFile {
        name: "common",
        content: PS_COMMON,
    },
    ScriptFile {
        name: "create-new-feature",
        content: PS_CREATE_NEW_FEATURE,
    },
    ScriptFile {
        name: "setup-plan",
        content: PS_SETUP_PLAN,
    },
    ScriptFile {
        name: "check-prerequisites",
        content: PS_CHECK_PREREQUISITES,
    },
    ScriptFile {
        name: "update-agent-context",
        content: PS_UPDATE_AGENT_CONTEXT,
    },
];

const PS_COMMON: &str = r#"#!/usr/bin/env pwsh
# Shared helpers for the Spec-Driven Development scripts.

$RepoRoot = (Resolve-Path (Join-Path $PSScriptRoot '../../..')).Path

function Invoke-Specify {
    param([string[]]$Arguments)
    $bin = if ($env:SPECIFY_BIN) { $env:SPECIFY_BIN } else { 'specify' }
    if (-not (Get-Command $bin -ErrorAction SilentlyContinue)) {
        Write-Error "'$bin' not found. Install the specify CLI or set SPECIFY_BIN."
        exit 127
    }
    if (-not $env:SPECIFY_ROOT) { $env:SPECIFY_ROOT = $RepoRoot }
    & $bin @Arguments
    exit $LASTEXITCODE
}
"#;

const PS_CREATE_NEW_FEATURE: &str = r#"#!/usr/bin/env pwsh
# Usage: create-new-feature.ps1 [-Json] [-ShortName <name>] [-Number N] <feature description>
[CmdletBinding()]
param(
    [switch]$Json,
    [string]$ShortName,
    [int]$Number = 0,
    [Parameter(ValueFromRemainingArguments = $true)]
    [string[]]$FeatureDescription
)
$ErrorActionPreference = 'Stop'
. (Join-Path $PSScriptRoot 'common.ps1')

$argv = @('feature', 'create')
if ($Json) { $argv += '--json' }
if ($ShortName) { $argv += @('--short-name', $ShortName) }
if ($Number -gt 0) { $argv += @('--number', "$Number") }
$argv += ($FeatureDescription -join ' ')
Invoke-Specify $argv
"#;

const PS_SETUP_PLAN: &str = r#"#!/usr/bin/env pwsh
# Usage: setup-plan.ps1 [-Json] [-Force]
[CmdletBinding()]
param(
    [switch]$Json,
    [switch]$Force
)
$ErrorActionPreference = 'Stop'
. (Join-Path $PSScriptRoot 'common.ps1')

$argv = @('plan', 'setup')
if ($Json) { $argv += '--json' }
if ($Force) { $argv += '--force' }
Invoke-Specify $argv
"#;

const PS_CHECK_PREREQUISITES: &str = r#"#!/usr/bin/env pwsh
# Usage: check-prerequisites.ps1 [-Json] [-RequireTasks] [-IncludeTasks] [-PathsOnly]
[CmdletBinding()]
param(
    [switch]$Json,
    [switch]$RequireTasks,
    [switch]$IncludeTasks,
    [switch]$PathsOnly
)
$ErrorActionPreference = 'Stop'
. (Join-Path $PSScriptRoot 'common.ps1')

$argv = @('feature', 'check')
if ($Json) { $argv += '--json' }
if ($RequireTasks) { $argv += '--require-tasks' }
if ($IncludeTasks) { $argv += '--include-tasks' }
if ($PathsOnly) { $argv += '--paths-only' }
Invoke-Specify $argv
"#;

const PS_UPDATE_AGENT_CONTEXT: &str = r#"#!/usr/bin/env pwsh
# Usage: update-agent-context.ps1 [-AgentType <agent>]
# Without an agent, every existing agent context file is refreshed.
[CmdletBinding()]
param(
    [string]$AgentType
)
$ErrorActionPreference = 'Stop'
. (Join-Path $PSScriptRoot 'common.ps1')

$argv = @('context', 'update')
if ($AgentType) { $argv += @('--agent', $AgentType) }
Invoke-Specify $argv
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
