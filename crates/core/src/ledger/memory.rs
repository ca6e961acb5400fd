//! In-memory line store.
//!
//! Implements both collaborator traits over `DashMap`s. Used as the test
//! double for the service and for embedding without a database. Faults can
//! be injected to exercise the persistence-failure paths.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use ledgerline_shared::types::{TransactionId, TransactionLineId};
use rust_decimal::Decimal;

use super::store::{CostBreakdownSource, LineStore, StoreError};
use super::types::{LineItemAmount, TransactionLine};

/// Sentinel for "no insert fault"; line numbers are always positive.
const NO_FAULT: i32 = 0;

/// `DashMap`-backed store for lines and cost-breakdown rows.
///
/// Uses the default, non-atomic [`LineStore::replace_lines`].
#[derive(Debug, Default)]
pub struct InMemoryLineStore {
    lines: DashMap<TransactionId, Vec<TransactionLine>>,
    line_items: DashMap<TransactionLineId, Vec<Decimal>>,
    fail_delete: AtomicBool,
    fail_insert_line_no: AtomicI32,
    cost_source_down: AtomicBool,
    bulk_inserts: AtomicUsize,
}

impl InMemoryLineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delete fail while `fail` is set.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Makes inserts of `line_no` fail (single and bulk); `None` clears the fault.
    pub fn fail_insert_at(&self, line_no: Option<i32>) {
        self.fail_insert_line_no
            .store(line_no.unwrap_or(NO_FAULT), Ordering::SeqCst);
    }

    /// Makes the cost-breakdown source unavailable while `down` is set.
    pub fn fail_cost_breakdown(&self, down: bool) {
        self.cost_source_down.store(down, Ordering::SeqCst);
    }

    /// Attaches a cost-breakdown row to a line.
    pub fn add_line_item(&self, line_id: &TransactionLineId, total_amount: Decimal) {
        self.line_items
            .entry(line_id.clone())
            .or_default()
            .push(total_amount);
    }

    /// Number of successful bulk inserts.
    #[must_use]
    pub fn bulk_insert_count(&self) -> usize {
        self.bulk_inserts.load(Ordering::SeqCst)
    }

    /// Persisted lines of a transaction, in insertion order.
    #[must_use]
    pub fn snapshot(&self, transaction_id: &TransactionId) -> Vec<TransactionLine> {
        self.lines
            .get(transaction_id)
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    fn insert_fault(&self, line_no: i32) -> Option<StoreError> {
        let failing = self.fail_insert_line_no.load(Ordering::SeqCst);
        (failing != NO_FAULT && failing == line_no).then(|| {
            StoreError::new(format!("insert rejected for line {line_no}"))
                .with_code("23514")
                .with_details("injected insert fault")
        })
    }
}

#[async_trait]
impl LineStore for InMemoryLineStore {
    async fn select_lines(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<TransactionLine>, StoreError> {
        let mut lines = self.snapshot(transaction_id);
        lines.sort_by_key(|line| line.line_no);
        Ok(lines)
    }

    async fn delete_lines(&self, transaction_id: &TransactionId) -> Result<u64, StoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::new("delete rejected").with_hint("injected delete fault"));
        }
        let removed = self
            .lines
            .remove(transaction_id)
            .map_or(0, |(_, lines)| lines.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn insert_line(&self, line: &TransactionLine) -> Result<(), StoreError> {
        if let Some(err) = self.insert_fault(line.line_no) {
            return Err(err);
        }
        self.lines
            .entry(line.transaction_id.clone())
            .or_default()
            .push(line.clone());
        Ok(())
    }

    async fn insert_lines(&self, lines: &[TransactionLine]) -> Result<(), StoreError> {
        if let Some(err) = lines.iter().find_map(|line| self.insert_fault(line.line_no)) {
            return Err(err);
        }
        for line in lines {
            self.lines
                .entry(line.transaction_id.clone())
                .or_default()
                .push(line.clone());
        }
        self.bulk_inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl CostBreakdownSource for InMemoryLineStore {
    async fn line_item_amounts(
        &self,
        line_ids: &[TransactionLineId],
    ) -> Result<Vec<LineItemAmount>, StoreError> {
        if self.cost_source_down.load(Ordering::SeqCst) {
            return Err(StoreError::new("line items unavailable").with_code("PGRST116"));
        }
        let mut rows = Vec::new();
        for id in line_ids {
            if let Some(amounts) = self.line_items.get(id) {
                rows.extend(amounts.iter().map(|amount| LineItemAmount {
                    transaction_line_id: id.clone(),
                    total_amount: *amount,
                }));
            }
        }
        Ok(rows)
    }
}
