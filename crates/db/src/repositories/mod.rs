//! Repository implementations for database operations.

pub mod transaction_line;

pub use transaction_line::{SeaOrmLineStore, store_error};
