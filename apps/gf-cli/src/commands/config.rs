// config.rs — Stored configuration values (e.g., translation.max_retries).

use clap::Subcommand;
use gf_goal::GoalStore;

use crate::context::AppContext;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Read a configuration value.
    Get {
        /// Dotted key (e.g., "translation.max_retries").
        key: String,
    },
    /// Write a configuration value.
    Set {
        /// Dotted key.
        key: String,
        /// Value to store.
        value: String,
    },
}

pub fn execute(cmd: &ConfigCommands, app: &AppContext) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Get { key } => match app.store.get_config(key)? {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("no value stored for {}", key),
        },
        ConfigCommands::Set { key, value } => {
            app.store.set_config(key, value)?;
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}
