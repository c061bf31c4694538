//! Administrator settings commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use lha_core::settings::{RedisSettingsStore, SettingsStore};

use crate::output;

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,

    /// Change one or both settings
    Set {
        /// Rate API key
        #[arg(long)]
        api_key: Option<String>,

        /// Address notified of every calculation (empty turns it off)
        #[arg(long)]
        notification_email: Option<String>,
    },
}

pub async fn execute(cmd: SettingsCommands) -> Result<()> {
    let pool = lha_redis::init_pool_from_env()
        .await
        .context("Failed to connect to Redis")?;
    let store = RedisSettingsStore::new(pool);

    match cmd {
        SettingsCommands::Show => {
            let settings = store.load().await?;
            output::print_settings(&settings);
        }
        SettingsCommands::Set {
            api_key,
            notification_email,
        } => {
            if api_key.is_none() && notification_email.is_none() {
                anyhow::bail!("Nothing to change. Pass --api-key and/or --notification-email.");
            }

            let mut settings = store.load().await?;
            settings.update(api_key.as_deref(), notification_email.as_deref());
            store.save(&settings).await?;

            if notification_email.is_some_and(|e| !e.trim().is_empty()) && !settings.notifications_enabled() {
                println!(
                    "{} Notification email was not a valid address; notifications are off",
                    "!".yellow().bold()
                );
            }
            println!("{} Settings saved", "✓".green().bold());
            output::print_settings(&settings);
        }
    }

    Ok(())
}
