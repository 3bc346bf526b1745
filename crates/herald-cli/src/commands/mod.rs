//! CLI command definitions and dispatch.

pub mod inbox;
pub mod migrate;
pub mod send;
pub mod stats;
pub mod sweep;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use herald_core::clock::{Clock, SystemClock};
use herald_core::config::AppConfig;
use herald_core::error::AppError;
use herald_database::Stores;
use herald_realtime::{BusClient, DistributionPublisher};
use herald_service::NotificationService;

/// Herald: notification distribution and recipient-state engine
#[derive(Debug, Parser)]
#[command(name = "herald", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Create and publish a notification
    Send(send::SendArgs),
    /// Read and update one recipient's notifications
    Inbox(inbox::InboxArgs),
    /// Run one scheduler sweep
    Sweep,
    /// Show store and ledger counters
    Stats,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Send(args) => send::execute(args, &self.config, self.format).await,
            Commands::Inbox(args) => inbox::execute(args, &self.config, self.format).await,
            Commands::Sweep => sweep::execute(&self.config, self.format).await,
            Commands::Stats => stats::execute(&self.config, self.format).await,
        }
    }
}

/// Everything a command needs to talk to the engine.
#[derive(Debug)]
pub struct Engine {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Store handles.
    pub stores: Stores,
    /// Live-push publisher.
    pub publisher: DistributionPublisher,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

impl Engine {
    /// Load configuration and connect the store and bus.
    pub async fn connect(config_path: &str) -> Result<Self, AppError> {
        let config = load_config(config_path)?;
        let stores = Stores::from_config(&config.store, &config.database).await?;
        let bus = BusClient::from_config(&config.bus).await?;
        Ok(Self {
            config,
            stores,
            publisher: DistributionPublisher::new(bus),
            clock: Arc::new(SystemClock),
        })
    }

    /// A notification service over this engine's stores.
    pub fn service(&self) -> NotificationService {
        NotificationService::new(
            self.stores.clone(),
            self.publisher.clone(),
            self.clock.clone(),
            self.config.notifications.clone(),
        )
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(config_path)
}
