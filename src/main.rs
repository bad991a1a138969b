// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! kb-sorter: AI Knowledge Base Sorter
//!
//! Command-line front end: categorize a file against project and tag lists.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use kb_sorter::categorize::{AllowLists, CategorizationResult, Categorizer};
use kb_sorter::config::AppConfig;
use kb_sorter::gemini::GeminiClient;
use kb_sorter::upload::UploadedFile;
use kb_sorter::{Result, SorterError};

/// kb-sorter CLI - AI Knowledge Base Sorter
#[derive(Parser, Debug)]
#[command(name = "kb-sorter")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Suggest a project and tags for a file with Gemini", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Suggest a project and tags for one image or text file
    Categorize {
        /// File to categorize
        path: PathBuf,

        /// Allowed project (repeatable, replaces the configured list)
        #[arg(short, long = "project")]
        projects: Vec<String>,

        /// Allowed tag (repeatable, replaces the configured list)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show credential and model status
    Status,

    /// Write a default configuration file
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Categorize { path, projects, tags } => {
            run_categorize(config, path, projects, tags, &cli.format).await
        }
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Status => run_status(config),
        Commands::Init { dir, force } => run_init(dir, force),
    }
}

/// Flag values replace the configured list when given
fn resolve_lists(config: &AppConfig, projects: Vec<String>, tags: Vec<String>) -> AllowLists {
    let mut lists = AllowLists::default();
    let projects = if projects.is_empty() { config.lists.projects.clone() } else { projects };
    let tags = if tags.is_empty() { config.lists.tags.clone() } else { tags };

    for project in &projects {
        lists.add_project(project);
    }
    for tag in &tags {
        lists.add_tag(tag);
    }
    lists
}

/// Categorize a single file
async fn run_categorize(
    config: AppConfig,
    path: PathBuf,
    projects: Vec<String>,
    tags: Vec<String>,
    format: &str,
) -> Result<()> {
    let lists = resolve_lists(&config, projects, tags);
    lists.ensure_ready()?;

    let file = UploadedFile::from_path(&path, None)?;
    info!("Loaded {} ({}, {:.2} KB)", file.name, file.media_type, file.size_kb());

    let client = GeminiClient::from_config(&config.gemini)?;
    let categorizer = Categorizer::new(Arc::new(client));

    let result = match categorizer.categorize(&file, &lists).await {
        Ok(result) => result,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    print_result(&path, &result, format)?;
    Ok(())
}

fn print_result(path: &Path, result: &CategorizationResult, format: &str) -> Result<()> {
    match format {
        "json" => {
            let output = serde_json::json!({
                "path": path.to_string_lossy(),
                "project": result.project,
                "tags": result.tags,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("{}", path.display());
            println!("  Project: {}", result.project);
            if result.tags.is_empty() {
                println!("  Tags:    (none)");
            } else {
                println!("  Tags:    {}", result.tags.join(", "));
            }
        }
    }
    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            let lists = resolve_lists(&config, Vec::new(), Vec::new());
            println!("Configuration at {:?} is valid", config_path);
            println!("  Model: {}", config.gemini.model);
            println!("  Projects: {}", lists.projects.join(", "));
            println!("  Tags: {}", lists.tags.join(", "));
            if let Err(e) = lists.ensure_ready() {
                println!("  Warning: {}", e);
            }
        }
    }

    Ok(())
}

/// Run status check
fn run_status(config: AppConfig) -> Result<()> {
    println!("kb-sorter v1.0.0 Status");
    println!("=======================");

    match config.gemini.api_key() {
        Some(_) => println!("API key: set (${})", config.gemini.api_key_env),
        None => println!("API key: missing - export {}", config.gemini.api_key_env),
    }

    println!("\nConfiguration:");
    println!("  Endpoint: {}", config.gemini.base_url);
    println!("  Model: {}", config.gemini.model);
    println!("  Timeout: {}s", config.gemini.timeout_secs);
    println!("  Projects: {}", config.lists.projects.len());
    println!("  Tags: {}", config.lists.tags.len());
    println!("  Web UI: http://{}:{}", config.web.host, config.web.port);

    Ok(())
}

/// Write a default config.json
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(SorterError::Config(
            "config.json already exists. Use --force to overwrite".to_string()
        ));
    }

    std::fs::create_dir_all(&target)?;
    AppConfig::default().save(&config_path)?;

    println!("kb-sorter initialized in {:?}", target);
    println!("\nNext steps:");
    println!("  1. export API_KEY=<your Gemini API key>");
    println!("  2. kb-sorter categorize notes.txt");
    println!("  3. kb-sorter-web --open");

    Ok(())
}
