//! Core business logic for Ledgerline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached through the collaborator traits in [`ledger::store`],
//! which callers inject into [`ledger::TransactionLineService`].
//!
//! # Modules
//!
//! - `ledger` - Balanced double-entry transaction line replacement

pub mod ledger;
