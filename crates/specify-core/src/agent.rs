use crate::error::SpecifyError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CommandFormat
// ---------------------------------------------------------------------------

/// On-disk format of an agent's slash-command files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFormat {
    /// Markdown with YAML front matter; arguments arrive as `$ARGUMENTS`.
    Markdown,
    /// TOML with `description` and `prompt`; arguments arrive as `{{args}}`.
    Toml,
}

impl CommandFormat {
    pub fn args_placeholder(self) -> &'static str {
        match self {
            CommandFormat::Markdown => "$ARGUMENTS",
            CommandFormat::Toml => "{{args}}",
        }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Agent {
    Claude,
    Gemini,
    Copilot,
    CursorAgent,
    Qwen,
    Opencode,
    Codex,
    Windsurf,
    Kilocode,
    Auggie,
    Roo,
    Q,
}

impl Agent {
    pub fn all() -> &'static [Agent] {
        &[
            Agent::Claude,
            Agent::Gemini,
            Agent::Copilot,
            Agent::CursorAgent,
            Agent::Qwen,
            Agent::Opencode,
            Agent::Codex,
            Agent::Windsurf,
            Agent::Kilocode,
            Agent::Auggie,
            Agent::Roo,
            Agent::Q,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Agent::Claude => "claude",
            Agent::Gemini => "gemini",
            Agent::Copilot => "copilot",
            Agent::CursorAgent => "cursor-agent",
            Agent::Qwen => "qwen",
            Agent::Opencode => "opencode",
            Agent::Codex => "codex",
            Agent::Windsurf => "windsurf",
            Agent::Kilocode => "kilocode",
            Agent::Auggie => "auggie",
            Agent::Roo => "roo",
            Agent::Q => "q",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Agent::Claude => "Claude Code",
            Agent::Gemini => "Gemini CLI",
            Agent::Copilot => "GitHub Copilot",
            Agent::CursorAgent => "Cursor",
            Agent::Qwen => "Qwen Code",
            Agent::Opencode => "opencode",
            Agent::Codex => "Codex CLI",
            Agent::Windsurf => "Windsurf",
            Agent::Kilocode => "Kilo Code",
            Agent::Auggie => "Auggie CLI",
            Agent::Roo => "Roo Code",
            Agent::Q => "Amazon Q Developer CLI",
        }
    }

    /// Top-level folder the agent keeps its project files in.
    pub fn folder(self) -> &'static str {
        match self {
            Agent::Claude => ".claude/",
            Agent::Gemini => ".gemini/",
            Agent::Copilot => ".github/",
            Agent::CursorAgent => ".cursor/",
            Agent::Qwen => ".qwen/",
            Agent::Opencode => ".opencode/",
            Agent::Codex => ".codex/",
            Agent::Windsurf => ".windsurf/",
            Agent::Kilocode => ".kilocode/",
            Agent::Auggie => ".augment/",
            Agent::Roo => ".roo/",
            Agent::Q => ".amazonq/",
        }
    }

    /// Directory (relative to the project root) that holds slash commands.
    pub fn commands_dir(self) -> &'static str {
        match self {
            Agent::Claude => ".claude/commands",
            Agent::Gemini => ".gemini/commands",
            Agent::Copilot => ".github/prompts",
            Agent::CursorAgent => ".cursor/commands",
            Agent::Qwen => ".qwen/commands",
            Agent::Opencode => ".opencode/command",
            Agent::Codex => ".codex/prompts",
            Agent::Windsurf => ".windsurf/workflows",
            Agent::Kilocode => ".kilocode/workflows",
            Agent::Auggie => ".augment/commands",
            Agent::Roo => ".roo/commands",
            Agent::Q => ".amazonq/prompts",
        }
    }

    pub fn command_format(self) -> CommandFormat {
        match self {
            Agent::Gemini | Agent::Qwen => CommandFormat::Toml,
            _ => CommandFormat::Markdown,
        }
    }

    pub fn command_extension(self) -> &'static str {
        match self {
            Agent::Gemini | Agent::Qwen => "toml",
            Agent::Copilot => "prompt.md",
            _ => "md",
        }
    }

    /// CLI executable the agent needs, or `None` for IDE-based agents.
    pub fn cli_tool(self) -> Option<&'static str> {
        match self {
            Agent::Claude => Some("claude"),
            Agent::Gemini => Some("gemini"),
            Agent::CursorAgent => Some("cursor-agent"),
            Agent::Qwen => Some("qwen"),
            Agent::Opencode => Some("opencode"),
            Agent::Codex => Some("codex"),
            Agent::Auggie => Some("auggie"),
            Agent::Q => Some("q"),
            Agent::Copilot | Agent::Windsurf | Agent::Kilocode | Agent::Roo => None,
        }
    }

    pub fn install_url(self) -> Option<&'static str> {
        match self {
            Agent::Claude => Some("https://docs.anthropic.com/en/docs/claude-code/setup"),
            Agent::Gemini => Some("https://github.com/google-gemini/gemini-cli"),
            Agent::CursorAgent => Some("https://docs.cursor.com/en/cli/overview"),
            Agent::Qwen => Some("https://github.com/QwenLM/qwen-code"),
            Agent::Opencode => Some("https://opencode.ai"),
            Agent::Codex => Some("https://github.com/openai/codex"),
            Agent::Auggie => Some("https://docs.augmentcode.com/cli/setup-auggie/install-auggie-cli"),
            Agent::Q => Some("https://aws.amazon.com/developer/learning/q-developer-cli/"),
            Agent::Copilot | Agent::Windsurf | Agent::Kilocode | Agent::Roo => None,
        }
    }

    /// File the agent reads standing project guidance from.
    pub fn context_file(self) -> &'static str {
        match self {
            Agent::Claude => "CLAUDE.md",
            Agent::Gemini => "GEMINI.md",
            Agent::Copilot => ".github/copilot-instructions.md",
            Agent::CursorAgent => ".cursor/rules/specify-rules.mdc",
            Agent::Qwen => "QWEN.md",
            Agent::Opencode | Agent::Codex | Agent::Q => "AGENTS.md",
            Agent::Windsurf => ".windsurf/rules/specify-rules.md",
            Agent::Kilocode => ".kilocode/rules/specify-rules.md",
            Agent::Auggie => ".augment/rules/specify-rules.md",
            Agent::Roo => ".roo/rules/specify-rules.md",
        }
    }

    /// Comma-separated list of every agent key, for error messages and help.
    pub fn choices() -> String {
        Agent::all()
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Agent {
    type Err = SpecifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        // "cursor" was the key before the CLI agent was renamed.
        let key = if key == "cursor" { "cursor-agent".to_string() } else { key };
        Agent::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == key)
            .ok_or_else(|| SpecifyError::UnknownAgent(s.to_string(), Agent::choices()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
