//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lha_core::config::ServiceConfig;

pub mod calc;
pub mod serve;
pub mod settings;

/// LHA Rates Calculator - Local Housing Allowance lookups
#[derive(Parser)]
#[command(name = "lha")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Service configuration file (TOML)
    #[arg(short, long, global = true, env = "LHA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the calculator web server
    Serve(serve::ServeArgs),

    /// Show or change the administrator settings
    #[command(subcommand)]
    Settings(settings::SettingsCommands),

    /// Run the calculator form in the terminal against a running server
    Calc(calc::CalcArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => {
                let config = load_config(self.config)?;
                serve::execute(args, config).await
            }
            Commands::Settings(cmd) => settings::execute(cmd).await,
            Commands::Calc(args) => calc::execute(args).await,
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ServiceConfig> {
    ServiceConfig::load(path.as_deref()).context("Failed to load service configuration")
}
