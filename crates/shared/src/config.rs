//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Transaction line handling.
    #[serde(default)]
    pub lines: LinesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Whether SQL statements are logged by the driver.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// How a replacement writes the new line set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertMode {
    /// One insert per line, in input order.
    #[default]
    Sequential,
    /// A single all-or-nothing bulk insert, falling back to per-line
    /// inserts on failure so the failing line can be reported.
    Bulk,
}

/// Transaction line handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LinesConfig {
    /// Largest accepted gap between total debits and total credits (exclusive).
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Insert strategy used when replacing a line set.
    #[serde(default)]
    pub insert_mode: InsertMode,
    /// Serialize writes per transaction inside this process.
    #[serde(default = "default_serialize_replacements")]
    pub serialize_replacements: bool,
}

/// Currency rounding slack: 0.01.
fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_serialize_replacements() -> bool {
    true
}

impl Default for LinesConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            insert_mode: InsertMode::default(),
            serialize_replacements: default_serialize_replacements(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "ledgerline=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `LEDGERLINE__*` environment variables (a `.env` file is read first).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        tracing::debug!(run_mode = %run_mode, "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGERLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
