//! Transaction line repository.
//!
//! Implements [`LineStore`] and [`CostBreakdownSource`] over `SeaORM`.
//! Replacements run inside one database transaction, so a failure at any
//! step leaves the previous line set in place.

use async_trait::async_trait;
use chrono::Utc;
use ledgerline_core::ledger::{
    CostBreakdownSource, LineDimensions, LineItemAmount, LineStore, ReplaceFailure, StoreError,
    TransactionLine,
};
use ledgerline_shared::InsertMode;
use ledgerline_shared::types::{TransactionId, TransactionLineId};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait,
};
use tracing::{debug, warn};

use crate::entities::{transaction_line_items, transaction_lines};

/// SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Converts a `SeaORM` error into the collaborator error shape.
///
/// Constraint violations carry their SQLSTATE as `code`; the violated
/// constraint text goes to `details`.
#[must_use]
pub fn store_error(err: &DbErr) -> StoreError {
    let base = StoreError::new(err.to_string());
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            base.with_code(UNIQUE_VIOLATION).with_details(detail)
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            base.with_code(FOREIGN_KEY_VIOLATION).with_details(detail)
        }
        _ => base,
    }
}

/// `SeaORM`-backed line store and cost-breakdown source.
#[derive(Debug, Clone)]
pub struct SeaOrmLineStore {
    db: DatabaseConnection,
}

impl SeaOrmLineStore {
    /// Creates a new line store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Deletes and bulk-inserts in one transaction.
    async fn replace_bulk(
        &self,
        transaction_id: &TransactionId,
        lines: &[TransactionLine],
    ) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;
        delete_for(&txn, transaction_id).await?;
        insert_many(&txn, lines).await?;
        txn.commit().await
    }

    /// Deletes and inserts row by row in one transaction, naming the failing line.
    async fn replace_sequential(
        &self,
        transaction_id: &TransactionId,
        lines: &[TransactionLine],
    ) -> Result<(), ReplaceFailure> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ReplaceFailure::Transaction(store_error(&e)))?;

        delete_for(&txn, transaction_id)
            .await
            .map_err(|e| ReplaceFailure::Delete(store_error(&e)))?;

        for line in lines {
            insert_one(&txn, line)
                .await
                .map_err(|e| ReplaceFailure::Insert {
                    line_no: line.line_no,
                    source: store_error(&e),
                })?;
        }

        txn.commit()
            .await
            .map_err(|e| ReplaceFailure::Transaction(store_error(&e)))
    }
}

async fn delete_for<C>(conn: &C, transaction_id: &TransactionId) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = transaction_lines::Entity::delete_many()
        .filter(transaction_lines::Column::TransactionId.eq(transaction_id.as_str()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

async fn insert_one<C>(conn: &C, line: &TransactionLine) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    transaction_lines::Entity::insert(to_active_model(line, Utc::now().into()))
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn insert_many<C>(conn: &C, lines: &[TransactionLine]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if lines.is_empty() {
        return Ok(());
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    transaction_lines::Entity::insert_many(lines.iter().map(|line| to_active_model(line, now)))
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

fn to_active_model(line: &TransactionLine, now: DateTimeWithTimeZone) -> transaction_lines::ActiveModel {
    let dims = &line.dimensions;
    transaction_lines::ActiveModel {
        id: Set(line.id.as_str().to_string()),
        transaction_id: Set(line.transaction_id.as_str().to_string()),
        line_no: Set(line.line_no),
        account_id: Set(line.account_id.as_str().to_string()),
        debit_amount: Set(line.debit_amount),
        credit_amount: Set(line.credit_amount),
        description: Set(line.description.clone()),
        org_id: Set(dims.org_id.as_ref().map(ToString::to_string)),
        project_id: Set(dims.project_id.as_ref().map(ToString::to_string)),
        cost_center_id: Set(dims.cost_center_id.as_ref().map(ToString::to_string)),
        work_item_id: Set(dims.work_item_id.as_ref().map(ToString::to_string)),
        analysis_work_item_id: Set(dims.analysis_work_item_id.as_ref().map(ToString::to_string)),
        classification_id: Set(dims.classification_id.as_ref().map(ToString::to_string)),
        sub_tree_id: Set(dims.sub_tree_id.as_ref().map(ToString::to_string)),
        created_at: Set(now),
    }
}

fn from_model(model: transaction_lines::Model) -> TransactionLine {
    TransactionLine {
        id: model.id.into(),
        transaction_id: model.transaction_id.into(),
        line_no: model.line_no,
        account_id: model.account_id.into(),
        debit_amount: model.debit_amount,
        credit_amount: model.credit_amount,
        description: model.description,
        dimensions: LineDimensions {
            org_id: model.org_id.map(Into::into),
            project_id: model.project_id.map(Into::into),
            cost_center_id: model.cost_center_id.map(Into::into),
            work_item_id: model.work_item_id.map(Into::into),
            analysis_work_item_id: model.analysis_work_item_id.map(Into::into),
            classification_id: model.classification_id.map(Into::into),
            sub_tree_id: model.sub_tree_id.map(Into::into),
        },
    }
}

#[async_trait]
impl LineStore for SeaOrmLineStore {
    async fn select_lines(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<TransactionLine>, StoreError> {
        let models = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.eq(transaction_id.as_str()))
            .order_by_asc(transaction_lines::Column::LineNo)
            .all(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(models.into_iter().map(from_model).collect())
    }

    async fn delete_lines(&self, transaction_id: &TransactionId) -> Result<u64, StoreError> {
        delete_for(&self.db, transaction_id)
            .await
            .map_err(|e| store_error(&e))
    }

    async fn insert_line(&self, line: &TransactionLine) -> Result<(), StoreError> {
        insert_one(&self.db, line).await.map_err(|e| store_error(&e))
    }

    async fn insert_lines(&self, lines: &[TransactionLine]) -> Result<(), StoreError> {
        insert_many(&self.db, lines)
            .await
            .map_err(|e| store_error(&e))
    }

    async fn replace_lines(
        &self,
        transaction_id: &TransactionId,
        lines: &[TransactionLine],
        mode: InsertMode,
    ) -> Result<(), ReplaceFailure> {
        if mode == InsertMode::Bulk {
            match self.replace_bulk(transaction_id, lines).await {
                Ok(()) => {
                    debug!(transaction_id = %transaction_id, "Bulk replacement committed");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        transaction_id = %transaction_id,
                        error = %e,
                        "Bulk replacement rolled back, retrying line by line"
                    );
                }
            }
        }

        self.replace_sequential(transaction_id, lines).await
    }
}

#[async_trait]
impl CostBreakdownSource for SeaOrmLineStore {
    async fn line_item_amounts(
        &self,
        line_ids: &[TransactionLineId],
    ) -> Result<Vec<LineItemAmount>, StoreError> {
        if line_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = transaction_line_items::Entity::find()
            .filter(
                transaction_line_items::Column::TransactionLineId
                    .is_in(line_ids.iter().map(TransactionLineId::as_str)),
            )
            .all(&self.db)
            .await
            .map_err(|e| store_error(&e))?;

        Ok(rows
            .into_iter()
            .map(|row| LineItemAmount {
                transaction_line_id: row.transaction_line_id.into(),
                total_amount: row.total_amount,
            })
            .collect())
    }
}
