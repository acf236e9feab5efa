//! Binary entry point for recue.
//!
//! This binary provides the CLI interface for the recue guideline server.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use recue::config::RecueConfig;
use recue::mcp::McpServer;
use recue::services::ContextService;
use recue::{loader, observability};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Recue - token-budgeted guideline repetition for AI coding assistants.
#[derive(Parser)]
#[command(name = "recue")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server over stdio.
    Serve {
        /// Path to the git repository to watch (default: from config).
        #[arg(short, long)]
        repo: Option<PathBuf>,

        /// Directory holding guideline markdown files (default: from config).
        #[arg(short, long)]
        guidelines_dir: Option<PathBuf>,
    },

    /// Show the current repository snapshot.
    Status,

    /// List the guidelines that would be loaded at startup.
    Guidelines,

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    observability::init(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: RecueConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve {
            repo,
            guidelines_dir,
        } => cmd_serve(config, repo, guidelines_dir),
        Commands::Status => cmd_status(&config),
        Commands::Guidelines => cmd_guidelines(&config),
        Commands::Config { show } => cmd_config(&config, show),
    }
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> Result<RecueConfig, Box<dyn std::error::Error>> {
    if let Some(config_path) = path {
        return RecueConfig::load_from_file(std::path::Path::new(config_path))
            .map_err(std::convert::Into::into);
    }

    if let Ok(config_path) = std::env::var("RECUE_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return RecueConfig::load_from_file(std::path::Path::new(&config_path))
                .map_err(std::convert::Into::into);
        }
    }

    Ok(RecueConfig::load_default())
}

/// Starts the MCP server over stdio.
fn cmd_serve(
    mut config: RecueConfig,
    repo: Option<PathBuf>,
    guidelines_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(repo) = repo {
        config.repo_path = repo;
    }
    if let Some(dir) = guidelines_dir {
        config.guidelines_dir = dir;
    }

    let service = Arc::new(ContextService::new(&config)?);
    tracing::info!(
        repo = %config.repo_path.display(),
        guidelines = %config.guidelines_dir.display(),
        "Starting MCP server"
    );

    let mut server = McpServer::new(service);
    server.start()?;
    Ok(())
}

/// Prints the current repository snapshot and guideline count.
fn cmd_status(config: &RecueConfig) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = recue::git::poll_repository(&config.repo_path);
    println!("{}", snapshot.summary_markdown());

    let guidelines = loader::load_guidelines(&config.guidelines_dir)?;
    println!(
        "\n{} guidelines in {}",
        guidelines.len(),
        config.guidelines_dir.display()
    );
    Ok(())
}

/// Prints the guidelines that would be loaded at startup.
fn cmd_guidelines(config: &RecueConfig) -> Result<(), Box<dyn std::error::Error>> {
    let guidelines = loader::load_guidelines(&config.guidelines_dir)?;

    if guidelines.is_empty() {
        println!(
            "No guidelines found in {}",
            config.guidelines_dir.display()
        );
        return Ok(());
    }

    for guideline in guidelines {
        let interval = guideline.effective_interval(&config.intervals).map_or_else(
            || "always visible".to_string(),
            |tokens| format!("every {tokens} tokens"),
        );
        println!(
            "{} (tier {}, {interval})",
            guideline.id, guideline.priority_tier
        );
    }
    Ok(())
}

/// Shows configuration.
fn cmd_config(config: &RecueConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("repo_path = {:?}", config.repo_path);
        println!("guidelines_dir = {:?}", config.guidelines_dir);
        println!();
        println!("[intervals]");
        println!("high = {}", config.intervals.high);
        println!("normal = {}", config.intervals.normal);
        println!("low = {}", config.intervals.low);
        println!();
        println!("[git]");
        println!("ttl_secs = {}", config.git.ttl.as_secs());
        println!("cadence_secs = {}", config.git.cadence.as_secs());
        println!(
            "refresh_timeout_secs = {}",
            config.git.refresh_timeout.as_secs()
        );
    } else {
        println!("Use --show to display the current configuration.");
    }
    Ok(())
}
