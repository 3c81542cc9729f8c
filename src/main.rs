//! Systemize - a guided conversation that documents how a small business runs.
//!
//! The `run` command opens the interactive session; the other commands
//! inspect and export saved projects.

#![allow(clippy::single_match_else)]

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use systemize::core::{export, Config, ExportFormat, ProjectStore, SystemClock};
use systemize::document::{Phase, PhaseReadiness};
use systemize::workflow::PhaseMachine;
use systemize::{tui, App};

/// Turn what you know about your business into documented systems
#[derive(Parser)]
#[command(name = "systemize")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory projects are saved in (overrides the config)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive session (default)
    Run {
        /// Resume a saved project by id
        #[arg(long, value_name = "ID")]
        resume: Option<String>,
    },

    /// List saved projects, most recent first
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show a project's phase and readiness
    Status {
        /// Project id
        id: String,
    },

    /// Export a project
    Export {
        /// Project id
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let data_dir = cli.data_dir;

    match cli.command {
        None => cmd_run(data_dir, None)?,
        Some(Commands::Run { resume }) => cmd_run(data_dir, resume.as_deref())?,
        Some(Commands::List { format }) => cmd_list(data_dir, &format)?,
        Some(Commands::Status { id }) => cmd_status(data_dir, &id)?,
        Some(Commands::Export { id, format }) => cmd_export(data_dir, &id, format)?,
        Some(Commands::Config { path }) => cmd_config(path)?,
        Some(Commands::Completions { shell }) => cmd_completions(shell),
    }

    Ok(())
}

/// Load the config, applying the command-line data directory.
fn load_config(data_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if data_dir.is_some() {
        config.general.data_dir = data_dir;
    }
    Ok(config)
}

fn open_store(config: &Config) -> Result<ProjectStore> {
    let dir = config
        .data_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory; pass --data-dir"))?;
    Ok(ProjectStore::new(dir))
}

/// Run the interactive session.
fn cmd_run(data_dir: Option<PathBuf>, resume: Option<&str>) -> Result<()> {
    let config = load_config(data_dir)?;
    let store = match open_store(&config) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "Running without a project store");
            None
        }
    };

    let mut app = App::new(config, store, SystemClock::new());
    if let Some(id) = resume {
        app.resume(id).with_context(|| format!("Failed to resume project {id}"))?;
    }
    tui::run_tui(app)
}

/// List saved projects.
fn cmd_list(data_dir: Option<PathBuf>, format: &str) -> Result<()> {
    let config = load_config(data_dir)?;
    let store = open_store(&config)?;
    let projects = store.recent(usize::MAX)?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&projects)?;
            println!("{json}");
        }
        _ => {
            if projects.is_empty() {
                println!("No saved projects");
                return Ok(());
            }
            for project in &projects {
                println!(
                    "{}  {:<10} {}  ({})",
                    project.id,
                    project.phase.as_str(),
                    project.title,
                    project.activity_timestamp.format("%Y-%m-%d %H:%M")
                );
            }
            println!("\nTotal: {} projects", projects.len());
        }
    }

    Ok(())
}

/// Show phase and readiness badges for a project.
fn cmd_status(data_dir: Option<PathBuf>, id: &str) -> Result<()> {
    let config = load_config(data_dir)?;
    let store = open_store(&config)?;
    let project = store.load(id)?;
    let readiness = PhaseReadiness::evaluate(&project);

    println!("{} ({})", project.title(), project.id);
    println!("Track: {}", project.track());
    for phase in Phase::ALL {
        let badge = if readiness.get(phase) { "ready" } else { "-" };
        let current = if phase == project.phase { "▸" } else { " " };
        let section = PhaseMachine::section(&project, phase);
        let section = format!("{section:?}").to_lowercase();
        println!("{current} {:<10} {badge:<6} {section}", phase.as_str());
    }
    if let Some(stage) = PhaseMachine::for_project(&project).extract_stage() {
        println!("Extract stage: {}", format!("{stage:?}").to_lowercase());
    }

    Ok(())
}

/// Export a project to stdout.
fn cmd_export(data_dir: Option<PathBuf>, id: &str, format: ExportFormat) -> Result<()> {
    let config = load_config(data_dir)?;
    let store = open_store(&config)?;
    let project = store.load(id)?;
    println!("{}", export(&project, format)?);
    Ok(())
}

/// Show configuration.
fn cmd_config(show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_dir() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "systemize", &mut io::stdout());
}
