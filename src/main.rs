//! supergit - LLM-backed code tools.
//!
//! Four one-shot tools share one pipeline: read input, build a prompt, call the
//! configured model, extract the answer, write an artifact, journal each step.

mod artifact;
mod config;
mod error;
mod extract;
mod journal;
mod llm;
mod pipeline;
mod prompt;
mod scan;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use artifact::Workspace;
use config::Config;
use journal::Journal;
use llm::{create_backend, Backend, TextGenerator};
use pipeline::Session;

#[derive(Parser)]
#[command(name = "supergit")]
#[command(author, version, about = "Generate, optimize, review and document code with an LLM")]
struct Cli {
    /// Override the configured model id
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    model: Option<String>,

    /// Use an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase diagnostic output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code from a task description
    Generate {
        /// Task describing the code to generate
        #[arg(short = 'p', long)]
        prompt: String,
        /// Desired file name (without extension)
        #[arg(short = 'f', long)]
        filename: Option<String>,
    },
    /// Add error handling and input validation to a source file
    Optimize {
        /// Path to the code file to optimize
        #[arg(short = 'f', long)]
        file: PathBuf,
    },
    /// Write a review report for a source file
    Review {
        /// Path to the code file to review
        #[arg(short = 'f', long)]
        file: PathBuf,
    },
    /// Generate Markdown documentation for a directory
    Document {
        /// Directory to document
        #[arg(long, default_value = ".")]
        path: PathBuf,
        /// Output file
        #[arg(short = 'o', long, default_value = "DOCUMENTATION.md")]
        output: PathBuf,
    },
    /// Check that the configured backend is usable
    Check,
    /// Create the default config file if needed and print it
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let model = cli.model.as_deref();

    match cli.command {
        Commands::Config => handle_config(&config_path),
        Commands::Check => handle_check(&load_config(&config_path)?, model).await,
        Commands::Generate { prompt, filename } => {
            let env = ToolEnv::load(&config_path, model)?;
            let mut session = env.session(pipeline::GENERATE_LOG)?;
            pipeline::run_generate(&mut session, &prompt, filename.as_deref()).await;
            Ok(())
        }
        Commands::Optimize { file } => {
            let env = ToolEnv::load(&config_path, model)?;
            let mut session = env.session(pipeline::OPTIMIZE_LOG)?;
            pipeline::run_optimize(&mut session, &file).await;
            Ok(())
        }
        Commands::Review { file } => {
            let env = ToolEnv::load(&config_path, model)?;
            let mut session = env.session(pipeline::REVIEW_LOG)?;
            pipeline::run_review(&mut session, &file).await;
            Ok(())
        }
        Commands::Document { path, output } => {
            let env = ToolEnv::load(&config_path, model)?;
            let max_file_chars = env.config.documentation.max_file_chars;
            let mut session = env.session(pipeline::DOCUMENT_LOG)?;
            pipeline::run_document(&mut session, &path, &output, max_file_chars).await;
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_from(path).context("Failed to load configuration")?;
    info!(
        "Using backend: {} (default model: {})",
        config.backend_type(),
        config.model_name()
    );
    Ok(config)
}

/// Configuration, backend and folders for one tool run.
struct ToolEnv {
    config: Config,
    backend: Backend,
    workspace: Workspace,
}

impl ToolEnv {
    fn load(config_path: &Path, model: Option<&str>) -> Result<Self> {
        let config = load_config(config_path)?;
        let backend = create_backend(&config.backend, model)?;
        let workspace = Workspace::from_config(&config.paths);
        debug!(workspace = ?workspace, "Tool environment ready");
        Ok(Self {
            config,
            backend,
            workspace,
        })
    }

    /// Open the tool's journal. Failures inside the run are journaled, not returned.
    fn session(&self, log_file: &str) -> Result<Session<'_>> {
        let journal = Journal::open(self.workspace.logs_dir(), log_file)?;
        Ok(Session::new(&self.backend, &self.workspace, journal))
    }
}

/// Diagnostics go to stderr; stdout carries the journal echo.
fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn")
            .add_directive(format!("supergit={}", level).parse()?)
            .add_directive("reqwest=warn".parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Verify the backend is reachable (local) or has credentials (hosted).
async fn handle_check(config: &Config, model: Option<&str>) -> Result<()> {
    let backend = create_backend(&config.backend, model)?;
    backend.health_check().await.with_context(|| {
        format!(
            "Backend health check failed for {} ({})",
            backend.name(),
            backend.model()
        )
    })?;
    println!("Backend ready: {} ({})", backend.name(), backend.model());
    Ok(())
}

/// Handle the config command.
fn handle_config(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        Config::default().save_to(config_path)?;
        println!("Created default config at {}", config_path.display());
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    println!("# {}\n{}", config_path.display(), contents);
    Ok(())
}
