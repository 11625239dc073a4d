//! Params CLI
//!
//! Dumps, loads and checks documents against the demonstration schema.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use familiar_params::{demo, LoadMode, ParamsConfig, Registry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "params")]
#[command(about = "Load and save typed parameter trees as JSON")]
struct Cli {
    /// Path to a params.toml config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default document
    Dump,

    /// Load a document and print the resulting tree
    Load {
        /// JSON document to load
        file: PathBuf,
        /// Fail on missing entries
        #[arg(long)]
        strict: bool,
    },

    /// Strictly validate a document against the schema
    Check {
        /// JSON document to check
        file: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write the configuration to this path
        #[arg(long)]
        save: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ParamsConfig::load_from(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Dump => {
            let registry = demo::registry()?;
            print_registry(&registry, &config)?;
            Ok(())
        }

        Commands::Load { file, strict } => {
            let mode = if strict { LoadMode::Strict } else { config.load.mode() };
            let registry = load_file(&file, mode)?;
            print_registry(&registry, &config)?;
            Ok(())
        }

        Commands::Check { file } => {
            load_file(&file, LoadMode::Strict)?;
            println!("✅ {} - matches the schema", file.display());
            Ok(())
        }

        Commands::Config { save } => {
            if let Some(path) = save {
                config.save(&path).with_context(|| format!("Failed to write {}", path))?;
                println!("✅ Config written to {}", path);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}

fn load_file(path: &Path, mode: LoadMode) -> anyhow::Result<Registry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut registry = demo::registry()?;
    registry
        .load_str(&text, mode)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(registry)
}

fn print_registry(registry: &Registry, config: &ParamsConfig) -> anyhow::Result<()> {
    println!("{}", registry.to_json_string(config.output.format)?);
    if config.output.render {
        println!();
        println!("{}", registry);
    }
    Ok(())
}
