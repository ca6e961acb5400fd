//! Transaction line service.
//!
//! Validates double-entry invariants and replaces a transaction's persisted
//! line set as a unit. The service holds no ledger state: every call reads
//! what it needs from the injected store.

use std::sync::Arc;

use ledgerline_shared::LinesConfig;
use ledgerline_shared::types::{TransactionId, TransactionLineId};
use tracing::{error, info, warn};

use super::error::LineError;
use super::lock::{ReplacementGuard, ReplacementLocks};
use super::store::{CostBreakdownSource, LineStore, StoreOperation};
use super::types::{LineTotals, LineWithCost, LinesWithCosts, TransactionLine, TransactionLineInput};
use super::validation::{validate_line, validate_line_set, validate_transaction_id};

/// Service for reading and writing a transaction's ledger lines.
pub struct TransactionLineService {
    store: Arc<dyn LineStore>,
    costs: Arc<dyn CostBreakdownSource>,
    config: LinesConfig,
    locks: ReplacementLocks,
}

impl TransactionLineService {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn LineStore>,
        costs: Arc<dyn CostBreakdownSource>,
        config: LinesConfig,
    ) -> Self {
        Self {
            store,
            costs,
            config,
            locks: ReplacementLocks::new(),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &LinesConfig {
        &self.config
    }

    /// Replaces all lines of a transaction.
    ///
    /// Validation runs over the whole candidate set before anything is
    /// written. On success the previous lines are deleted and `lines` are
    /// inserted in input order, each tagged with `transaction_id`.
    ///
    /// Whether delete and inserts are atomic is up to the store. With the
    /// default [`LineStore::replace_lines`], a persistence failure can leave
    /// the transaction partially replaced; calling this again with the same
    /// lines repairs it.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank id, fewer than 2 lines, bad line numbers,
    ///   or column totals that overflow
    /// - `NegativeAmount`, `AmbiguousSide`, `Unbalanced` for invariant violations
    /// - `PersistenceFailure` if the store rejects the delete or an insert
    pub async fn replace_lines(
        &self,
        transaction_id: &TransactionId,
        lines: Vec<TransactionLineInput>,
    ) -> Result<LineTotals, LineError> {
        let totals = validate_transaction_id(transaction_id)
            .and_then(|()| validate_line_set(&lines, self.config.balance_tolerance))
            .inspect_err(|e| {
                warn!(
                    transaction_id = %transaction_id,
                    code = e.error_code(),
                    error = %e,
                    "Rejected transaction line replacement"
                );
            })?;

        let line_count = lines.len();
        let rows: Vec<TransactionLine> = lines
            .into_iter()
            .map(|line| TransactionLine::from_input(transaction_id.clone(), line))
            .collect();

        let guard = self.lock(transaction_id).await;
        let result = self
            .store
            .replace_lines(transaction_id, &rows, self.config.insert_mode)
            .await;
        drop(guard);

        result.map_err(|failure| {
            let err = LineError::from(failure);
            error!(transaction_id = %transaction_id, error = %err, "Failed to replace transaction lines");
            err
        })?;

        info!(
            transaction_id = %transaction_id,
            line_count,
            total_debits = %totals.total_debits,
            total_credits = %totals.total_credits,
            "Replaced transaction lines"
        );

        Ok(totals)
    }

    /// Adds one line to a transaction.
    ///
    /// The line must be valid on its own; the transaction is not required to
    /// balance afterwards.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`, `NegativeAmount`, `AmbiguousSide` for an invalid line
    /// - `PersistenceFailure` if the store rejects the insert
    pub async fn add_line(
        &self,
        transaction_id: &TransactionId,
        line: TransactionLineInput,
    ) -> Result<TransactionLine, LineError> {
        validate_transaction_id(transaction_id)
            .and_then(|()| validate_line(&line))
            .inspect_err(|e| {
                warn!(
                    transaction_id = %transaction_id,
                    code = e.error_code(),
                    error = %e,
                    "Rejected transaction line"
                );
            })?;

        let row = TransactionLine::from_input(transaction_id.clone(), line);

        let guard = self.lock(transaction_id).await;
        let result = self.store.insert_line(&row).await;
        drop(guard);

        result.map_err(|source| {
            let err = LineError::PersistenceFailure {
                operation: StoreOperation::Insert,
                line_no: Some(row.line_no),
                source,
            };
            error!(transaction_id = %transaction_id, error = %err, "Failed to add transaction line");
            err
        })?;

        info!(transaction_id = %transaction_id, line_no = row.line_no, "Added transaction line");
        Ok(row)
    }

    /// Returns a transaction's lines ordered by `line_no`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank id
    /// - `PersistenceFailure` if the store read fails
    pub async fn get_lines(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<TransactionLine>, LineError> {
        validate_transaction_id(transaction_id)?;

        self.store
            .select_lines(transaction_id)
            .await
            .map_err(|source| LineError::persistence(StoreOperation::Select, source))
    }

    /// Returns a transaction's lines merged with their cost-breakdown totals.
    ///
    /// If the breakdown source fails, the lines are still returned, as
    /// [`LinesWithCosts::WithoutCostBreakdown`].
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank id
    /// - `PersistenceFailure` if reading the lines themselves fails
    pub async fn get_lines_with_costs(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<LinesWithCosts, LineError> {
        let lines = self.get_lines(transaction_id).await?;
        if lines.is_empty() {
            return Ok(LinesWithCosts::Full { lines: Vec::new() });
        }

        let line_ids: Vec<TransactionLineId> = lines.iter().map(|l| l.id.clone()).collect();

        match self.costs.line_item_amounts(&line_ids).await {
            Ok(items) => Ok(LinesWithCosts::Full {
                lines: LineWithCost::merge(lines, &items),
            }),
            Err(e) => {
                warn!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "Cost breakdown unavailable, returning lines without costs"
                );
                Ok(LinesWithCosts::WithoutCostBreakdown {
                    lines,
                    reason: e.diagnostic().to_string(),
                })
            }
        }
    }

    async fn lock(&self, transaction_id: &TransactionId) -> Option<ReplacementGuard<'_>> {
        if self.config.serialize_replacements {
            Some(self.locks.acquire(transaction_id).await)
        } else {
            None
        }
    }
}
