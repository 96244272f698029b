//! Handles settings for the service. Configuration is read from a `settings`
//! file (TOML by default) and overridden by `EWALLET__<SECTION>__<KEY>`
//! environment variables.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 8080
//! database = { sqlite = "ewallet.db" }
//!
//! [ledger]
//! initial_balance = "100"
//! operation_timeout_ms = 5000
//! history_order = "oldest_first"
//! ```

use std::time::Duration;

use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use engine::{EngineSettings, HistoryOrder, Money, ResultEngine};
use serde::Deserialize;

const DEFAULT_FILE: &str = "settings";

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// Process-local ledger, lost on exit.
    Memory,
    /// Path of the SQLite database file, created if missing.
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("ewallet.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            database: Database::default(),
        }
    }
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize)]
pub struct Ledger {
    /// Opening balance of new wallets, in currency units (`"100"`, `"12.50"`).
    #[serde(default = "default_initial_balance")]
    pub initial_balance: String,
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    #[serde(default)]
    pub history_order: HistoryOrder,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            operation_timeout_ms: default_operation_timeout_ms(),
            history_order: HistoryOrder::default(),
        }
    }
}

impl Ledger {
    pub fn engine_settings(&self) -> ResultEngine<EngineSettings> {
        Ok(EngineSettings {
            initial_balance: self.initial_balance.parse::<Money>()?,
            operation_timeout: Duration::from_millis(self.operation_timeout_ms),
            history_order: self.history_order,
        })
    }
}

fn default_initial_balance() -> String {
    "100".to_string()
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    /// Load settings from `path`, or from an optional `settings.*` file in
    /// the working directory when no path is given.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        Self::build(
            Config::builder().add_source(file).add_source(
                Environment::with_prefix("EWALLET")
                    .separator("__")
                    .try_parsing(true),
            ),
        )
    }

    fn build(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.address(), "127.0.0.1:8080");
        assert_eq!(
            settings.server.database,
            Database::Sqlite("ewallet.db".to_string())
        );

        let engine = settings.ledger.engine_settings().unwrap();
        assert_eq!(engine, EngineSettings::default());
    }

    #[test]
    fn reads_every_section() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 9000
            database = "memory"

            [ledger]
            initial_balance = "12.50"
            operation_timeout_ms = 250
            history_order = "newest_first"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.address(), "0.0.0.0:9000");
        assert_eq!(settings.server.database, Database::Memory);

        let engine = settings.ledger.engine_settings().unwrap();
        assert_eq!(engine.initial_balance, Money::new(1_250));
        assert_eq!(engine.operation_timeout, Duration::from_millis(250));
        assert_eq!(engine.history_order, HistoryOrder::NewestFirst);
    }

    #[test]
    fn sqlite_database_takes_a_path() {
        let settings = parse(
            r#"
            [server]
            database = { sqlite = "/var/lib/ewallet/ledger.db" }
            "#,
        );
        assert_eq!(
            settings.server.database,
            Database::Sqlite("/var/lib/ewallet/ledger.db".to_string())
        );
    }

    #[test]
    fn malformed_opening_balance_is_refused() {
        let settings = parse(
            r#"
            [ledger]
            initial_balance = "ten"
            "#,
        );
        assert!(settings.ledger.engine_settings().is_err());
    }
}
