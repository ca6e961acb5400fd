//! Database layer with `SeaORM` entities and the transaction line store.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for `transaction_lines` and `transaction_line_items`
//! - [`SeaOrmLineStore`], implementing the core collaborator traits
//! - Pooled connection setup from [`DatabaseConfig`]

pub mod entities;
pub mod repositories;

pub use repositories::SeaOrmLineStore;

use std::time::Duration;

use ledgerline_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Builds connection options from configuration.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(config.sqlx_logging);
    options
}

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(connect_options(config)).await?;
    tracing::info!(
        max_connections = config.max_connections,
        "Connected to database"
    );
    Ok(db)
}
