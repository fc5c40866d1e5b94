use clap::Parser;
use tracing::{error, Level};

use gnar_push::{
    cli::{self, Cli, Commands},
    configuration::{AppState, Config, State},
    error::Error,
    migration,
    provider::{DatabasePool, HTTP},
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level({
            #[cfg(debug_assertions)]
            {
                Level::DEBUG
            }

            #[cfg(not(debug_assertions))]
            {
                Level::INFO
            }
        })
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Migrate => cli::run_migrate().await,
    }
}

async fn run_server() -> Result<(), Error> {
    let (config, database) = match init().await {
        Ok((config, database)) => (config, database),
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    let http = HTTP::new(&config)?;

    let state = State::new(config, database, http);
    let app_state = AppState::new(state);

    server::server_task(&app_state).await
}

async fn init() -> Result<(Config, DatabasePool), Error> {
    let config = cli::init_config()?;
    let database = DatabasePool::new(&config).await?;

    migration::run_migrations(database.get_pool()).await?;

    Ok((config, database))
}
