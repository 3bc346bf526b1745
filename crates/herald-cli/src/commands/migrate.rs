//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use herald_core::error::AppError;
use herald_database::{DatabasePool, migration};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show applied migrations
    Status,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;
    db.health_check().await?;
    let pool = db.pool();

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            migration::run_migrations(pool).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let applied = migration::applied_migrations(pool).await?;
            if applied.is_empty() {
                output::print_warning("No migrations applied.");
            } else {
                println!("Migration status:");
                for entry in &applied {
                    let status = if entry.success { "applied" } else { "failed" };
                    println!("  {} - {} ({})", entry.version, entry.description, status);
                }
            }
        }
    }

    db.close().await;
    Ok(())
}
