mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    context::ContextSubcommand, feature::FeatureSubcommand, init::InitArgs,
    package::PackageArgs, plan::PlanSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "specify",
    about = "Bootstrap Spec-Driven Development projects for AI coding agents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .specify/ or .git/)
    #[arg(long, global = true, env = "SPECIFY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Feature to act on instead of the current branch (e.g. 001-photo-albums)
    #[arg(long = "feature", global = true, env = "SPECIFY_FEATURE")]
    feature_override: Option<String>,

    /// Verbose diagnostic logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project from the latest template bundle
    Init(InitArgs),

    /// Check that required tools are installed
    Check,

    /// Create and inspect feature directories
    Feature {
        #[command(subcommand)]
        subcommand: FeatureSubcommand,
    },

    /// Prepare the implementation plan for the current feature
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },

    /// Maintain agent context files (CLAUDE.md, GEMINI.md, ...)
    Context {
        #[command(subcommand)]
        subcommand: ContextSubcommand,
    },

    /// Build the per-agent template bundles as zip archives
    #[command(disable_version_flag = true)]
    Package(PackageArgs),

    /// Show CLI and template version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let feature = cli.feature_override.as_deref();

    let result = match cli.command {
        Commands::Init(args) => cmd::init::run(args, cli.json),
        Commands::Check => cmd::check::run(cli.json),
        Commands::Feature { subcommand } => cmd::feature::run(&root, subcommand, feature, cli.json),
        Commands::Plan { subcommand } => cmd::plan::run(&root, subcommand, feature, cli.json),
        Commands::Context { subcommand } => cmd::context::run(&root, subcommand, feature, cli.json),
        Commands::Package(args) => cmd::package::run(&root, args, cli.json),
        Commands::Version => cmd::version::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
