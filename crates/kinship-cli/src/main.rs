//! Kinship CLI - Command line interface for the social graph

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{comment, completions, friend, post, user};
use config::{Backend, Config};
use kinship_engine::GraphEngine;
use kinship_storage::{RedbStorage, StorageBackend};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kinship")]
#[command(author, version, about = "Users, friendships, posts, comments and likes in a graph")]
pub struct Cli {
    /// Data directory (overrides the config file)
    #[arg(short, long, global = true, env = "KINSHIP_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the data directory path
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_dir.clone())
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage users
    User(user::UserArgs),
    /// Manage friendships
    Friend(friend::FriendArgs),
    /// Manage posts and their likes
    Post(post::PostArgs),
    /// Manage comments and their likes
    Comment(comment::CommentArgs),
    /// Manage CLI configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the graph engine
pub struct AppContext {
    pub engine: GraphEngine,
    pub format: OutputFormat,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: &Config) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir(config);
        std::fs::create_dir_all(&data_dir)?;

        let storage = open_storage(config.backend, &data_dir)?;
        storage.initialize().await?;

        Ok(Self {
            engine: GraphEngine::new(storage),
            format: cli.output_format(),
        })
    }
}

fn open_storage(
    backend: Backend,
    data_dir: &std::path::Path,
) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match backend {
        Backend::Redb => {
            let db_path = data_dir.join("kinship.redb");
            tracing::debug!("Using redb database at: {:?}", db_path);
            let storage: Arc<dyn StorageBackend> = Arc::new(RedbStorage::open(&db_path)?);
            Ok(storage)
        }
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            let db_path = data_dir.join("kinship.db");
            tracing::debug!("Using SQLite database at: {:?}", db_path);
            let storage: Arc<dyn StorageBackend> =
                Arc::new(kinship_storage::SqliteStorage::open(&db_path)?);
            Ok(storage)
        }
        #[cfg(not(feature = "sqlite"))]
        Backend::Sqlite => {
            anyhow::bail!("This build has no SQLite support; rebuild with --features sqlite")
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting kinship CLI");

    // Commands that do not touch the graph
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load();
    let ctx = AppContext::new(&cli, &config).await?;

    match &cli.command {
        Commands::User(args) => user::run(args, &ctx).await?,
        Commands::Friend(args) => friend::run(args, &ctx).await?,
        Commands::Post(args) => post::run(args, &ctx).await?,
        Commands::Comment(args) => comment::run(args, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}
