//! Stager CLI - command line interface for the stager analysis agent
//!
//! Fetches application repositories and runs the analyzer for hub tasks.

mod commands;

use clap::{Parser, Subcommand};
use stager_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{FetchArgs, RunArgs};

/// Stager: repository staging and analysis for hub tasks
#[derive(Parser, Debug)]
#[command(name = "stager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hub base URL (overrides config and env)
    #[arg(long, global = true, env = "STAGER_HUB_URL")]
    hub_url: Option<String>,

    /// Task id (overrides config and env)
    #[arg(long, global = true, env = "STAGER_TASK")]
    task: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the analysis task
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Fetch a single repository
    #[command(visible_alias = "f")]
    Fetch(FetchArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = Config::load_with_overrides(cli.hub_url.clone(), cli.task)?;

    if cli.verbose {
        tracing::debug!(
            hub = %config.hub.url,
            task = config.hub.task,
            home = %config.layout.home.display(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("stager {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Fetch(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            println!("Stager Configuration");
            println!("====================");
            println!();
            println!("Hub:");
            println!("  url: {}", config.hub.url);
            println!("  task: {}", config.hub.task);
            println!();
            println!("Layout:");
            println!("  home: {}", config.layout.home.display());
            println!("  root: {}", config.layout.root.display());
            println!();
            println!("Tools:");
            println!("  svn: {}", config.tools.svn);
            println!("  git: {}", config.tools.git);
            println!("  curl: {}", config.tools.curl);
            println!("  analyzer: {}", config.tools.analyzer);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Stager - repository staging and analysis agent");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
