//! Embedded template content shipped in every bundle.
//!
//! Command bodies use four placeholders, replaced per agent and script type
//! when a bundle is rendered:
//! - `{SCRIPT}`: invocation of the command's helper script
//! - `{AGENT_SCRIPT}`: invocation of the agent-context script
//! - `{ARGS}`: the agent's argument placeholder (`$ARGUMENTS` / `{{args}}`)
//! - `__AGENT__`: the agent key
//!
//! Bare `memory/`, `scripts/` and `templates/` references are rewritten to
//! their `.specify/` locations.

use crate::paths;
use crate::script::ScriptType;

// ---------------------------------------------------------------------------
// Script invocations
// ---------------------------------------------------------------------------

/// Trailing positional value of a script call.
#[derive(Debug, Clone, Copy)]
pub struct Positional {
    /// PowerShell parameter name for the value; bash passes it positionally.
    pub ps_flag: Option<&'static str>,
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ScriptCall {
    pub name: &'static str,
    /// Kebab-case flag names, spelled per variant at render time.
    pub flags: &'static [&'static str],
    pub positional: Option<Positional>,
}

impl ScriptCall {
    pub fn render(&self, script: ScriptType) -> String {
        let mut parts = vec![script.script_path(self.name)];
        parts.extend(self.flags.iter().map(|f| script.flag(f)));
        if let Some(pos) = self.positional {
            if let (ScriptType::Ps, Some(flag)) = (script, pos.ps_flag) {
                parts.push(script.flag(flag));
            }
            parts.push(pos.value.to_string());
        }
        parts.join(" ")
    }
}

const AGENT_CONTEXT_CALL: ScriptCall = ScriptCall {
    name: "update-agent-context",
    flags: &[],
    positional: Some(Positional {
        ps_flag: Some("agent-type"),
        value: "__AGENT__",
    }),
};

// ---------------------------------------------------------------------------
// Command templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct CommandTemplate {
    /// Slash command name, also the file stem.
    pub name: &'static str,
    pub description: &'static str,
    pub script: Option<ScriptCall>,
    pub agent_script: Option<ScriptCall>,
    pub body: &'static str,
}

pub fn commands() -> &'static [CommandTemplate] {
    COMMANDS
}

const COMMANDS: &[CommandTemplate] = &[
    CommandTemplate {
        name: "constitution",
        description: "Create or update the project constitution from interactive or provided principle inputs.",
        script: None,
        agent_script: None,
        body: CONSTITUTION_COMMAND,
    },
    CommandTemplate {
        name: "specify",
        description: "Create or update the feature specification from a natural language feature description.",
        script: Some(ScriptCall {
            name: "create-new-feature",
            flags: &["json"],
            positional: Some(Positional {
                ps_flag: None,
                value: "\"{ARGS}\"",
            }),
        }),
        agent_script: None,
        body: SPECIFY_COMMAND,
    },
    CommandTemplate {
        name: "clarify",
        description: "Identify underspecified areas in the current feature spec and encode the answers back into it.",
        script: Some(ScriptCall {
            name: "check-prerequisites",
            flags: &["json", "paths-only"],
            positional: None,
        }),
        agent_script: None,
        body: CLARIFY_COMMAND,
    },
    CommandTemplate {
        name: "plan",
        description: "Execute the implementation planning workflow using the plan template to generate design artifacts.",
        script: Some(ScriptCall {
            name: "setup-plan",
            flags: &["json"],
            positional: None,
        }),
        agent_script: Some(AGENT_CONTEXT_CALL),
        body: PLAN_COMMAND,
    },
    CommandTemplate {
        name: "tasks",
        description: "Generate an actionable, dependency-ordered tasks.md for the feature based on available design artifacts.",
        script: Some(ScriptCall {
            name: "check-prerequisites",
            flags: &["json"],
            positional: None,
        }),
        agent_script: None,
        body: TASKS_COMMAND,
    },
    CommandTemplate {
        name: "analyze",
        description: "Perform a non-destructive cross-artifact consistency analysis across spec.md, plan.md, and tasks.md.",
        script: Some(ScriptCall {
            name: "check-prerequisites",
            flags: &["json", "require-tasks", "include-tasks"],
            positional: None,
        }),
        agent_script: None,
        body: ANALYZE_COMMAND,
    },
    CommandTemplate {
        name: "checklist",
        description: "Generate a custom requirements-quality checklist for the current feature.",
        script: Some(ScriptCall {
            name: "check-prerequisites",
            flags: &["json"],
            positional: None,
        }),
        agent_script: None,
        body: CHECKLIST_COMMAND,
    },
    CommandTemplate {
        name: "implement",
        description: "Execute the implementation plan by processing and executing all tasks defined in tasks.md.",
        script: Some(ScriptCall {
            name: "check-prerequisites",
            flags: &["json", "require-tasks", "include-tasks"],
            positional: None,
        }),
        agent_script: None,
        body: IMPLEMENT_COMMAND,
    },
];

// ---------------------------------------------------------------------------
// Document templates written to .specify/
// ---------------------------------------------------------------------------

/// Files written under `.specify/templates/`, by file name.
pub fn document_templates() -> &'static [(&'static str, &'static str)] {
    &[
        (paths::SPEC_TEMPLATE, SPEC_TEMPLATE),
        (paths::PLAN_TEMPLATE, PLAN_TEMPLATE),
        (paths::TASKS_TEMPLATE, TASKS_TEMPLATE),
        (paths::CHECKLIST_TEMPLATE, CHECKLIST_TEMPLATE),
        (paths::AGENT_FILE_TEMPLATE, AGENT_FILE_TEMPLATE),
    ]
}

pub const CONSTITUTION_TEMPLATE: &str = r#"# [PROJECT_NAME] Constitution

## Core Principles

### [PRINCIPLE_1_NAME]
[PRINCIPLE_1_DESCRIPTION]

### [PRINCIPLE_2_NAME]
[PRINCIPLE_2_DESCRIPTION]

### [PRINCIPLE_3_NAME]
[PRINCIPLE_3_DESCRIPTION]

### [PRINCIPLE_4_NAME]
[PRINCIPLE_4_DESCRIPTION]

### [PRINCIPLE_5_NAME]
[PRINCIPLE_5_DESCRIPTION]

## [SECTION_2_NAME]

[SECTION_2_CONTENT]

## [SECTION_3_NAME]

[SECTION_3_CONTENT]

## Governance

[GOVERNANCE_RULES]

**Version**: [CONSTITUTION_VERSION] | **Ratified**: [RATIFICATION_DATE] | **Last Amended**: [LAST_AMENDED_DATE]
"#;

pub const SPEC_TEMPLATE: &str = r#"# Feature Specification: [FEATURE NAME]

**Feature Branch**: `[###-feature-name]`
**Created**: [DATE]
**Status**: Draft
**Input**: User description: "$ARGUMENTS"

## User Scenarios & Testing *(mandatory)*

### User Story 1 - [Brief Title] (Priority: P1)

[Describe this user journey in plain language]

**Why this priority**: [Explain the value]

**Independent Test**: [How this story can be tested on its own]

**Acceptance Scenarios**:

1. **Given** [initial state], **When** [action], **Then** [expected outcome]

### Edge Cases

- What happens when [boundary condition]?
- How does the system handle [error scenario]?

## Requirements *(mandatory)*

### Functional Requirements

- **FR-001**: System MUST [specific capability]
- **FR-002**: System MUST [specific capability]
- **FR-003**: System MUST [NEEDS CLARIFICATION: unspecified detail]

### Key Entities *(include if feature involves data)*

- **[Entity 1]**: [What it represents, key attributes without implementation]

## Success Criteria *(mandatory)*

### Measurable Outcomes

- **SC-001**: [Measurable metric]
- **SC-002**: [Measurable metric]
"#;

pub const PLAN_TEMPLATE: &str = r#"# Implementation Plan: [FEATURE]

**Branch**: `[###-feature-name]` | **Date**: [DATE] | **Spec**: [link]
**Input**: Feature specification from `/specs/[###-feature-name]/spec.md`

## Summary

[Extract from feature spec: primary requirement + technical approach from research]

## Technical Context

**Language/Version**: [e.g., Python 3.11, Swift 5.9, Rust 1.75 or NEEDS CLARIFICATION]
**Primary Dependencies**: [e.g., FastAPI, UIKit, LLVM or NEEDS CLARIFICATION]
**Storage**: [if applicable, e.g., PostgreSQL, CoreData, files or N/A]
**Testing**: [e.g., pytest, XCTest, cargo test or NEEDS CLARIFICATION]
**Target Platform**: [e.g., Linux server, iOS 15+, WASM or NEEDS CLARIFICATION]
**Project Type**: [single/web/mobile - determines source structure]
**Performance Goals**: [domain-specific or NEEDS CLARIFICATION]
**Constraints**: [domain-specific or NEEDS CLARIFICATION]
**Scale/Scope**: [domain-specific or NEEDS CLARIFICATION]

## Constitution Check

*GATE: Must pass before Phase 0 research. Re-check after Phase 1 design.*

[Gates determined based on constitution file]

## Project Structure

### Documentation (this feature)

```text
specs/[###-feature]/
├── plan.md              # This file (/plan command output)
├── research.md          # Phase 0 output (/plan command)
├── data-model.md        # Phase 1 output (/plan command)
├── quickstart.md        # Phase 1 output (/plan command)
├── contracts/           # Phase 1 output (/plan command)
└── tasks.md             # Phase 2 output (/tasks command - NOT created by /plan)
```

### Source Code (repository root)

```text
src/
tests/
```

**Structure Decision**: [Document the selected structure]

## Complexity Tracking

| Violation | Why Needed | Simpler Alternative Rejected Because |
|-----------|------------|-------------------------------------|
"#;

pub const TASKS_TEMPLATE: &str = r#"# Tasks: [FEATURE NAME]

**Input**: Design documents from `/specs/[###-feature-name]/`
**Prerequisites**: plan.md (required), spec.md (required for user stories), research.md, data-model.md, contracts/

## Format: `[ID] [P?] [Story] Description`

- **[P]**: Can run in parallel (different files, no dependencies)
- **[Story]**: Which user story this task belongs to (e.g., US1, US2)
- Include exact file paths in descriptions

## Phase 1: Setup

- [ ] T001 Create project structure per implementation plan
- [ ] T002 Initialize project with dependencies
- [ ] T003 [P] Configure linting and formatting tools

## Phase 2: Foundational

- [ ] T004 [Blocking prerequisites shared by all user stories]

## Phase 3: User Story 1 (Priority: P1)

**Goal**: [What this story delivers]

**Independent Test**: [How to verify this story on its own]

- [ ] T005 [P] [US1] [Test or model task with file path]
- [ ] T006 [US1] [Implementation task with file path]

## Phase N: Polish & Cross-Cutting Concerns

- [ ] TXXX [P] Documentation updates
- [ ] TXXX Run quickstart.md validation

## Dependencies & Execution Order

- Setup → Foundational → User stories in priority order → Polish
"#;

pub const CHECKLIST_TEMPLATE: &str = r#"# [CHECKLIST TYPE] Checklist: [FEATURE NAME]

**Purpose**: [Brief description of what this checklist covers]
**Created**: [DATE]
**Feature**: [Link to spec.md]

## [Category 1]

- [ ] CHK001 [Requirement-quality question]
- [ ] CHK002 [Requirement-quality question]

## [Category 2]

- [ ] CHK003 [Requirement-quality question]

## Notes

- Check items off as completed: `[x]`
- Add findings inline
"#;

pub const AGENT_FILE_TEMPLATE: &str = r#"# [PROJECT NAME] Development Guidelines

Auto-generated from all feature plans. Last updated: [DATE]

## Active Technologies

[EXTRACTED FROM ALL PLAN.MD FILES]

## Project Structure

```text
[ACTUAL STRUCTURE FROM PLANS]
```

## Commands

[ONLY COMMANDS FOR ACTIVE TECHNOLOGIES]

## Code Style

[LANGUAGE-SPECIFIC, ONLY FOR LANGUAGES IN USE]

## Recent Changes

[LAST 3 FEATURES AND WHAT THEY ADDED]

<!-- MANUAL ADDITIONS START -->
<!-- MANUAL ADDITIONS END -->
"#;

/// Recommended-prompt settings shipped with Copilot bundles.
pub const VSCODE_SETTINGS: &str = r#"{
    "chat.promptFilesRecommendations": {
        "constitution": true,
        "specify": true,
        "clarify": true,
        "plan": true,
        "tasks": true,
        "analyze": true,
        "checklist": true,
        "implement": true
    },
    "chat.tools.terminal.autoApprove": {
        ".specify/scripts/bash/": true,
        ".specify/scripts/powershell/": true
    }
}
"#;

// ---------------------------------------------------------------------------
// Command bodies
// ---------------------------------------------------------------------------

const CONSTITUTION_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

You are updating the project constitution at `memory/constitution.md`. This file is a TEMPLATE containing placeholder tokens in square brackets (e.g. `[PROJECT_NAME]`, `[PRINCIPLE_1_NAME]`).

1. Load the existing constitution at `memory/constitution.md` and identify every placeholder token.
2. Collect values for the placeholders from the user input, or infer them from repository context (README, docs, prior constitution versions).
3. Bump `CONSTITUTION_VERSION` using semantic versioning:
   - MAJOR: principle removals or redefinitions.
   - MINOR: a new principle or section.
   - PATCH: clarifications and wording fixes.
4. Replace every placeholder with concrete text. Keep principles declarative and testable.
5. Check that `templates/plan-template.md`, `templates/spec-template.md` and `templates/tasks-template.md` still agree with the updated principles, and update them if not.
6. Write the completed constitution back to `memory/constitution.md`.
7. Report the new version, the bump rationale and any files flagged for manual follow-up.
"#;

const SPECIFY_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

The text after `/specify` **is** the feature description.

1. Generate a concise short name (2-4 words) for the feature, e.g. "user-auth" or "analytics-dashboard".
2. Run `{SCRIPT}` from the repository root **exactly once**, adding `--short-name "<short-name>"` (bash) or `-ShortName "<short-name>"` (PowerShell). Parse its JSON output for `BRANCH_NAME`, `SPEC_FILE` and `FEATURE_NUM`. All file paths must be absolute.
3. Load `templates/spec-template.md` to understand the required sections.
4. Write the specification to `SPEC_FILE`:
   - Focus on **WHAT** users need and **WHY**; avoid HOW (no tech stack, APIs or code structure).
   - Mark at most 3 genuinely ambiguous points with `[NEEDS CLARIFICATION: question]`.
   - Every functional requirement must be testable; success criteria must be measurable and technology-agnostic.
5. Report the branch name, spec file path and readiness for `/clarify` or `/plan`.
"#;

const CLARIFY_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

Goal: detect and reduce ambiguity in the active feature specification and record the clarifications directly in the spec file.

1. Run `{SCRIPT}` from the repository root **once**. Parse `FEATURE_DIR` and `FEATURE_SPEC` from the JSON output. If parsing fails, instruct the user to re-run `/specify`.
2. Load the spec and scan it for ambiguity: functional scope, data model, interaction flows, non-functional qualities, edge cases, terminology.
3. Ask at most 5 targeted questions, one at a time. Each must be answerable with a short choice or a few words.
4. After each accepted answer, add a bullet under `## Clarifications` / `### Session YYYY-MM-DD` and update the affected section so the spec carries no contradictions.
5. Save the spec after each integration.
6. Report the number of questions asked, the sections touched and the suggested next command (`/plan`).
"#;

const PLAN_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

1. **Setup**: Run `{SCRIPT}` from the repository root and parse the JSON for `FEATURE_SPEC`, `IMPL_PLAN`, `SPECS_DIR` and `BRANCH`.
2. **Load context**: Read `FEATURE_SPEC` and `memory/constitution.md`. Load the `IMPL_PLAN` template (already copied).
3. **Execute the plan workflow** following the structure in `IMPL_PLAN`:
   - Fill Technical Context (mark unknowns as "NEEDS CLARIFICATION").
   - Fill the Constitution Check section from the constitution; ERROR if violations are unjustified.
   - Phase 0: generate `research.md`, resolving every NEEDS CLARIFICATION.
   - Phase 1: generate `data-model.md`, `contracts/` and `quickstart.md`.
   - Phase 1: update the agent context by running `{AGENT_SCRIPT}`.
   - Re-evaluate the Constitution Check after design.
4. **Stop and report**: the command ends after Phase 1. Report the branch, `IMPL_PLAN` path and generated artifacts.
"#;

const TASKS_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

1. **Setup**: Run `{SCRIPT}` from the repository root and parse `FEATURE_DIR` and the `AVAILABLE_DOCS` list. All paths must be absolute.
2. **Load design documents** from `FEATURE_DIR`:
   - Required: `plan.md` (tech stack, structure), `spec.md` (user stories with priorities).
   - Optional: `data-model.md`, `contracts/`, `research.md`, `quickstart.md`.
3. **Generate tasks** using `templates/tasks-template.md` as the structure:
   - Phase 1 setup, Phase 2 foundational, then one phase per user story in priority order, then polish.
   - Every task uses the format `- [ ] T001 [P] [US1] Description with file path`.
   - Mark `[P]` only for tasks touching different files with no dependency on incomplete tasks.
4. Write the result to `FEATURE_DIR/tasks.md`.
5. Report the total task count, tasks per story, parallel opportunities and the suggested MVP scope.
"#;

const ANALYZE_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

Goal: identify inconsistencies, duplications, ambiguities and underspecified items across `spec.md`, `plan.md` and `tasks.md` before implementation. This command is **read-only**: do not modify any files.

1. Run `{SCRIPT}` once from the repository root and parse `FEATURE_DIR` and `AVAILABLE_DOCS`. Abort with an instructive message if a required file is missing.
2. Load the three artifacts and `memory/constitution.md`.
3. Build an inventory of requirements, user stories and tasks, then detect:
   - duplicated or conflicting requirements,
   - vague adjectives without measurable criteria,
   - requirements with zero tasks and tasks mapped to no requirement,
   - constitution violations (always CRITICAL).
4. Output a compact Markdown table of findings with severity (CRITICAL/HIGH/MEDIUM/LOW), a coverage summary and next actions.
"#;

const CHECKLIST_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

Checklists are unit tests for requirements writing: they validate the quality, clarity and completeness of the requirements, not the implementation.

1. Run `{SCRIPT}` from the repository root and parse `FEATURE_DIR` and `AVAILABLE_DOCS`.
2. Derive the checklist focus from the user input (e.g. "ux", "api", "security").
3. Load `spec.md`, plus `plan.md` and `tasks.md` when present.
4. Create `FEATURE_DIR/checklists/<domain>.md` following `templates/checklist-template.md`, numbering items `CHK001` onward. Each item asks whether a requirement is complete, clear, consistent, measurable or covers a scenario.
5. Report the checklist path, item count and focus areas.
"#;

const IMPLEMENT_COMMAND: &str = r#"## User Input

```text
{ARGS}
```

You **MUST** consider the user input before proceeding (if not empty).

## Outline

1. Run `{SCRIPT}` from the repository root and parse `FEATURE_DIR` and `AVAILABLE_DOCS`.
2. If `FEATURE_DIR/checklists/` exists, count incomplete items per checklist. If any are incomplete, show the table and ask whether to proceed.
3. Load `tasks.md` and `plan.md` (required), plus `data-model.md`, `contracts/`, `research.md` and `quickstart.md` when present.
4. Execute tasks phase by phase:
   - Respect dependencies; run `[P]` tasks together only when they touch different files.
   - Write tests before the code they cover when the plan calls for tests.
   - Mark each finished task as `[X]` in `tasks.md`.
5. Halt on a failed non-parallel task and report the error with context.
6. Finish by verifying that implemented features match the specification and report the final status.
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_are_unique() {
        let mut names: Vec<_> = commands().iter().map(|c| c.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), commands().len());
    }

    #[test]
    fn commands_with_scripts_reference_them() {
        for cmd in commands() {
            assert_eq!(
                cmd.script.is_some(),
                cmd.body.contains("{SCRIPT}"),
                "{}: script/body mismatch",
                cmd.name
            );
            assert_eq!(
                cmd.agent_script.is_some(),
                cmd.body.contains("{AGENT_SCRIPT}"),
                "{}: agent script/body mismatch",
                cmd.name
            );
        }
    }

    #[test]
    fn script_call_renders_per_variant() {
        let call = commands()
            .iter()
            .find(|c| c.name == "analyze")
            .and_then(|c| c.script)
            .unwrap();
        assert_eq!(
            call.render(ScriptType::Sh),
            ".specify/scripts/bash/check-prerequisites.sh --json --require-tasks --include-tasks"
        );
        assert_eq!(
            call.render(ScriptType::Ps),
            ".specify/scripts/powershell/check-prerequisites.ps1 -Json -RequireTasks -IncludeTasks"
        );
    }

    #[test]
    fn agent_context_call_uses_named_parameter_in_powershell() {
        assert_eq!(
            AGENT_CONTEXT_CALL.render(ScriptType::Sh),
            ".specify/scripts/bash/update-agent-context.sh __AGENT__"
        );
        assert_eq!(
            AGENT_CONTEXT_CALL.render(ScriptType::Ps),
            ".specify/scripts/powershell/update-agent-context.ps1 -AgentType __AGENT__"
        );
    }
}
