use crate::output::{print_fields, print_json};
use anyhow::Context;
use clap::Subcommand;
use specify_core::feature::{
    check_prerequisites, create_feature, CreateOptions, FeaturePaths, PrereqOptions, FEATURE_ENV,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum FeatureSubcommand {
    /// Allocate the next feature number, create its branch and spec directory
    Create {
        /// What the feature should do, in plain words
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Branch suffix to use instead of one derived from the description
        #[arg(long)]
        short_name: Option<String>,
        /// Feature number to use instead of the next free one
        #[arg(long)]
        number: Option<u32>,
    },
    /// Print the resolved paths for the current feature
    Paths,
    /// Check that the current feature has the documents a step needs
    Check {
        /// Fail unless tasks.md exists
        #[arg(long)]
        require_tasks: bool,
        /// List tasks.md among the available documents
        #[arg(long)]
        include_tasks: bool,
        /// Only print paths, skip validation
        #[arg(long)]
        paths_only: bool,
    },
}

pub fn run(
    root: &Path,
    subcmd: FeatureSubcommand,
    feature: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        FeatureSubcommand::Create {
            description,
            short_name,
            number,
        } => create(root, &description.join(" "), short_name.as_deref(), number, json),
        FeatureSubcommand::Paths => paths(root, feature, json),
        FeatureSubcommand::Check {
            require_tasks,
            include_tasks,
            paths_only,
        } => check(
            root,
            feature,
            PrereqOptions {
                require_tasks,
                include_tasks,
            },
            paths_only,
            json,
        ),
    }
}

fn create(
    root: &Path,
    description: &str,
    short_name: Option<&str>,
    number: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let created = create_feature(
        root,
        &CreateOptions {
            description,
            short_name,
            number,
        },
    )
    .context("failed to create feature")?;

    if json {
        return print_json(&created);
    }
    print_fields(&created)?;
    if !created.has_git {
        println!(
            "\nNo git repository: run `export {FEATURE_ENV}={}` so later steps find this feature.",
            created.branch_name
        );
    }
    Ok(())
}

fn resolve(root: &Path, feature: Option<&str>) -> anyhow::Result<FeaturePaths> {
    FeaturePaths::resolve(root, feature).context("failed to resolve current feature")
}

fn paths(root: &Path, feature: Option<&str>, json: bool) -> anyhow::Result<()> {
    let fp = resolve(root, feature)?;
    if json {
        print_json(&fp)
    } else {
        print_fields(&fp)
    }
}

fn check(
    root: &Path,
    feature: Option<&str>,
    opts: PrereqOptions,
    paths_only: bool,
    json: bool,
) -> anyhow::Result<()> {
    let fp = resolve(root, feature)?;

    if paths_only {
        return if json { print_json(&fp) } else { print_fields(&fp) };
    }

    let prereqs = check_prerequisites(&fp, opts)?;
    if json {
        return print_json(&prereqs);
    }

    println!("FEATURE_DIR: {}", prereqs.feature_dir.display());
    println!("AVAILABLE_DOCS:");
    let mut candidates = vec!["research.md", "data-model.md", "contracts/", "quickstart.md"];
    if opts.include_tasks {
        candidates.push("tasks.md");
    }
    for doc in candidates {
        if prereqs.available_docs.iter().any(|d| d == doc) {
            println!("  found:   {doc}");
        } else {
            println!("  missing: {doc}");
        }
    }
    Ok(())
}
