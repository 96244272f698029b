use std::sync::Arc;

use clap::Parser;
use engine::{Engine, MemoryStore};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

/// Wallet ledger HTTP service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Settings file; defaults to an optional `settings.*` in the working directory.
    #[arg(long, short, env = "EWALLET_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ewallet={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let engine_settings = settings.ledger.engine_settings()?;
    let builder = Engine::builder().settings(engine_settings);
    let builder = match &settings.server.database {
        Database::Memory => {
            tracing::warn!("using the in-memory ledger, nothing will be persisted");
            builder.store(Arc::new(MemoryStore::new()))
        }
        Database::Sqlite(path) => builder.database(open_database(path).await?),
    };
    let engine = builder.build().await?;

    server::run(engine, &settings.server.address()).await?;

    Ok(())
}

async fn open_database(
    path: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = format!("sqlite:{path}?mode=rwc");
    tracing::info!("opening ledger database {url}");

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
