//! Double-entry transaction lines.
//!
//! This module implements balanced line replacement:
//! - Domain types for proposed and persisted lines
//! - Business rule validation (single-sided, non-negative, balanced)
//! - Collaborator traits for the line store and cost-breakdown source
//! - An in-memory store implementing both traits
//! - Per-transaction write serialization
//! - The line service tying it together

pub mod error;
pub mod lock;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use error::LineError;
pub use lock::{ReplacementGuard, ReplacementLocks};
pub use memory::InMemoryLineStore;
pub use service::TransactionLineService;
pub use store::{
    CostBreakdownSource, LineStore, ReplaceFailure, StoreError, StoreOperation,
    insert_sequentially,
};
pub use types::{
    EntrySide, LineDimensions, LineItemAmount, LineTotals, LineWithCost, LinesWithCosts,
    TransactionLine, TransactionLineInput,
};
pub use validation::{BALANCE_TOLERANCE, MIN_LINES, validate_line, validate_line_set};
