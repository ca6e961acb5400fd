//! Per-transaction write serialization.
//!
//! Two replacements of the same transaction interleave badly (one call's
//! delete lands between the other's inserts). `ReplacementLocks` hands out
//! one async mutex per transaction id so writes to the same transaction run
//! one after another inside this process. Writes to different transactions
//! are not blocked.

use std::sync::Arc;

use dashmap::DashMap;
use ledgerline_shared::types::TransactionId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutex over transaction ids.
#[derive(Debug, Default)]
pub struct ReplacementLocks {
    locks: DashMap<TransactionId, Arc<Mutex<()>>>,
}

/// Exclusive access to one transaction.
///
/// Dropping the guard unlocks the transaction and removes its registry entry
/// when nobody else holds or waits on it. This also runs when the owning
/// future is cancelled.
#[derive(Debug)]
pub struct ReplacementGuard<'a> {
    locks: &'a ReplacementLocks,
    transaction_id: TransactionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ReplacementGuard<'_> {
    fn drop(&mut self) {
        // The mutex must be unlocked before the entry's refcount is checked.
        drop(self.guard.take());
        self.locks.release(&self.transaction_id);
    }
}

impl ReplacementLocks {
    /// Creates an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `transaction_id`.
    pub async fn acquire(&self, transaction_id: &TransactionId) -> ReplacementGuard<'_> {
        let lock = Arc::clone(
            self.locks
                .entry(transaction_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let guard = lock.lock_owned().await;
        ReplacementGuard {
            locks: self,
            transaction_id: transaction_id.clone(),
            guard: Some(guard),
        }
    }

    /// Drops the entry for `transaction_id` if nobody holds or waits on it.
    fn release(&self, transaction_id: &TransactionId) {
        self.locks
            .remove_if(transaction_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of transactions with a live lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no lock entry is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_transaction_is_exclusive() {
        let locks = ReplacementLocks::new();
        let id = TransactionId::new("tx-1");

        let guard = locks.acquire(&id).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&id)).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(guard);
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&id)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_different_transactions_do_not_block() {
        let locks = ReplacementLocks::new();
        let _a = locks.acquire(&TransactionId::new("tx-a")).await;
        let b = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire(&TransactionId::new("tx-b")),
        )
        .await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_drop_removes_idle_entry() {
        let locks = ReplacementLocks::new();
        let id = TransactionId::new("tx-1");

        let guard = locks.acquire(&id).await;
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_kept_while_another_caller_waits() {
        let locks = ReplacementLocks::new();
        let id = TransactionId::new("tx-1");

        let first = locks.acquire(&id).await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), async {
            let _second = locks.acquire(&id).await;
        });
        // The waiter times out and is dropped, leaving only the holder.
        assert!(waiting.await.is_err());
        assert_eq!(locks.len(), 1);

        drop(first);
        assert!(locks.is_empty());
    }
}
