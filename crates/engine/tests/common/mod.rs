#![allow(dead_code)]

use std::sync::Arc;

use engine::{Engine, EngineSettings, MemoryStore, Money};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh migrated in-memory SQLite database.
///
/// Every pooled connection would open its own empty database, hence the
/// single connection.
pub async fn database() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn sql_engine(settings: EngineSettings) -> Engine {
    Engine::builder()
        .database(database().await)
        .settings(settings)
        .build()
        .await
        .unwrap()
}

pub async fn memory_engine(settings: EngineSettings) -> Engine {
    Engine::builder()
        .store(Arc::new(MemoryStore::new()))
        .settings(settings)
        .build()
        .await
        .unwrap()
}

/// One engine per store implementation, labelled for assertion messages.
pub async fn engines(settings: EngineSettings) -> Vec<(&'static str, Engine)> {
    vec![
        ("sql", sql_engine(settings.clone()).await),
        ("memory", memory_engine(settings).await),
    ]
}

pub fn units(value: i64) -> Money {
    Money::from_units(value).unwrap()
}
