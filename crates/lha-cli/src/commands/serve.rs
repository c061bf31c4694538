//! Web server command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use lha_core::config::ServiceConfig;
use lha_core::settings::{MemorySettingsStore, RedisSettingsStore, SettingsStore};
use lha_web::state::AppState;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3030", env = "LHA_PORT")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1", env = "LHA_HOST")]
    pub host: String,

    /// Public origin used in rendered URLs, e.g. https://calc.example.org
    #[arg(long, default_value = "", env = "LHA_PUBLIC_URL")]
    pub public_url: String,

    /// Also write logs to a daily rolling file
    #[arg(long)]
    pub log: bool,

    /// Directory for --log files
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Keep settings in memory instead of Redis
    #[arg(long)]
    pub ephemeral: bool,
}

pub async fn execute(args: ServeArgs, config: ServiceConfig) -> Result<()> {
    let store: Arc<dyn SettingsStore> = if args.ephemeral {
        Arc::new(MemorySettingsStore::default())
    } else {
        let pool = lha_redis::init_pool_from_env()
            .await
            .context("Failed to connect to Redis (set REDIS_URL or use --ephemeral)")?;
        Arc::new(RedisSettingsStore::new(pool))
    };

    let state = AppState::from_config(&config, store, &args.public_url);
    tracing::info!(
        ephemeral = args.ephemeral,
        admin = config.admin.password.is_some(),
        rate_api = %config.rate_api_url,
        "Starting calculator server"
    );

    println!();
    println!("  {} {}", "LHA Rates".cyan().bold(), "Calculator".bold());
    println!();
    println!("  {}  http://{}:{}", "Calculator".green(), args.host, args.port);
    println!("  {}       http://{}:{}/embed", "Embed".green(), args.host, args.port);
    if config.admin.password.is_some() {
        println!("  {}    http://{}:{}/admin/settings", "Settings".green(), args.host, args.port);
    }
    if args.ephemeral {
        println!();
        println!("  {}", "Settings are kept in memory and lost on exit".yellow());
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    lha_web::run_server(state, &args.host, args.port).await?;

    Ok(())
}
