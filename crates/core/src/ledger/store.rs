//! Collaborator traits for the line store and the cost-breakdown source.
//!
//! The service never reaches a global client: both collaborators are passed
//! in, so tests can substitute [`super::memory::InMemoryLineStore`].

use std::fmt;

use async_trait::async_trait;
use ledgerline_shared::InsertMode;
use ledgerline_shared::types::{TransactionId, TransactionLineId};
use tracing::warn;

use super::types::{LineItemAmount, TransactionLine};

/// Error object returned by a collaborator.
///
/// Mirrors the provider error shape: a message plus optional `code`, `hint`
/// and `details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// Full provider message.
    pub message: String,
    /// Provider error code (e.g. a SQLSTATE).
    pub code: Option<String>,
    /// Provider hint.
    pub hint: Option<String>,
    /// Provider details.
    pub details: Option<String>,
}

impl StoreError {
    /// Creates an error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            hint: None,
            details: None,
        }
    }

    /// Sets the provider code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the provider hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Sets the provider details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the text shown to users: the first present of `code`, `hint`,
    /// `details`, falling back to `message`.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        self.code
            .as_deref()
            .or(self.hint.as_deref())
            .or(self.details.as_deref())
            .unwrap_or(&self.message)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diagnostic())
    }
}

impl std::error::Error for StoreError {}

/// The collaborator call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    /// Reading lines.
    Select,
    /// Deleting a transaction's lines.
    Delete,
    /// Inserting a line.
    Insert,
    /// Opening or committing a database transaction.
    Transaction,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "select",
            Self::Delete => "delete",
            Self::Insert => "insert",
            Self::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

/// Where a replacement stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceFailure {
    /// Deleting the previous lines failed; nothing was inserted.
    Delete(StoreError),
    /// Inserting `line_no` failed.
    Insert {
        /// The line that failed.
        line_no: i32,
        /// The collaborator's error.
        source: StoreError,
    },
    /// Opening or committing the surrounding database transaction failed.
    Transaction(StoreError),
}

/// Relational store holding `transaction_lines`.
#[async_trait]
pub trait LineStore: Send + Sync {
    /// Returns a transaction's lines ordered by `line_no`.
    async fn select_lines(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<TransactionLine>, StoreError>;

    /// Deletes all lines of a transaction, returning how many were removed.
    async fn delete_lines(&self, transaction_id: &TransactionId) -> Result<u64, StoreError>;

    /// Inserts one line.
    async fn insert_line(&self, line: &TransactionLine) -> Result<(), StoreError>;

    /// Inserts all lines in one call.
    ///
    /// Implementations must be all-or-nothing: on error, none of `lines` is
    /// persisted. The default reports that bulk insert is unsupported.
    async fn insert_lines(&self, lines: &[TransactionLine]) -> Result<(), StoreError> {
        let _ = lines;
        Err(StoreError::new("bulk insert is not supported by this store").with_code("UNSUPPORTED"))
    }

    /// Replaces a transaction's persisted lines with `lines`.
    ///
    /// The default deletes, then inserts, as separate calls. It is not
    /// atomic: an insert failure leaves the previous lines deleted and the
    /// lines before the failing one inserted. Stores that can run the whole
    /// replacement in one transaction should override this.
    async fn replace_lines(
        &self,
        transaction_id: &TransactionId,
        lines: &[TransactionLine],
        mode: InsertMode,
    ) -> Result<(), ReplaceFailure> {
        self.delete_lines(transaction_id)
            .await
            .map_err(ReplaceFailure::Delete)?;

        if mode == InsertMode::Bulk {
            match self.insert_lines(lines).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(
                        transaction_id = %transaction_id,
                        error = %e,
                        "Bulk insert failed, retrying line by line"
                    );
                }
            }
        }

        insert_sequentially(self, lines).await
    }
}

/// Inserts lines one at a time in order, stopping at the first failure.
///
/// # Errors
///
/// Returns [`ReplaceFailure::Insert`] naming the line that failed.
pub async fn insert_sequentially<S>(store: &S, lines: &[TransactionLine]) -> Result<(), ReplaceFailure>
where
    S: LineStore + ?Sized,
{
    for line in lines {
        store
            .insert_line(line)
            .await
            .map_err(|source| ReplaceFailure::Insert {
                line_no: line.line_no,
                source,
            })?;
    }
    Ok(())
}

/// Read-only source of cost-breakdown rows.
#[async_trait]
pub trait CostBreakdownSource: Send + Sync {
    /// Returns the breakdown rows attached to any of `line_ids`.
    async fn line_item_amounts(
        &self,
        line_ids: &[TransactionLineId],
    ) -> Result<Vec<LineItemAmount>, StoreError>;
}
