//! Config command for managing the CLI config file

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Backend, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one config value
    Get {
        /// Config key: data_dir or backend
        key: String,
    },
    /// Change one config value and save the file
    Set {
        /// Config key: data_dir or backend
        key: String,
        /// New value
        value: String,
    },
    /// Print every config value
    List,
    /// Print the config file location
    Path,
    /// Write a config file with default values
    Init {
        /// Backend to record in the new file
        #[arg(long, default_value = "redb")]
        backend: Backend,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => {
            let config = Config::load();
            let value = config.get(key).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown config key: {} (available: {})",
                    key,
                    Config::keys().join(", ")
                )
            })?;
            println!("{}", value);
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load();
            config.set(key, value)?;
            config.save()?;
            tracing::info!("Config {} set to {}", key, value);
            println!("Set {} = {}", key, value);
        }
        ConfigCommands::List => {
            let config = Config::load();
            for key in Config::keys() {
                println!("{} = {}", key, config.get(key).unwrap_or_default());
            }
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
        ConfigCommands::Init { backend, force } => {
            let path = config_file_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            let config = Config {
                backend: *backend,
                ..Config::default()
            };
            config.save()?;
            println!("Created config file at {}", path.display());
        }
    }
    Ok(())
}
