//! CLI module for the push service
//!
//! Starts the HTTP server or runs maintenance tasks without it.

use clap::{Parser, Subcommand};

use crate::{
    configuration::{get_configuration, set_configuration, Config},
    error::Error,
    migration,
    provider::DatabasePool,
};

/// Gnar Dawgs push notification service
#[derive(Parser)]
#[command(name = "gnar-push")]
#[command(about = "Web Push subscriptions and delivery for Gnar Dawgs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default if no command specified)
    Serve,

    /// Run database migrations and exit
    Migrate,
}

/// Initialize configuration and return Config
pub fn init_config() -> Result<Config, Error> {
    set_configuration()?;
    get_configuration()
}

pub async fn run_migrate() -> Result<(), Error> {
    let config = init_config()?;
    let database = DatabasePool::new(&config).await?;

    migration::run_migrations(database.get_pool()).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
