//! Shared types and configuration for Ledgerline.
//!
//! This crate provides common pieces used across all other crates:
//! - Typed identifiers for type-safe entity references
//! - Configuration management
//! - Tracing subscriber setup

pub mod config;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, InsertMode, LinesConfig, LoggingConfig};
pub use telemetry::init_tracing;
