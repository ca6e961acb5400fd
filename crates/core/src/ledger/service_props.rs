//! Property-based tests for `TransactionLineService`.
//!
//! - Property 1: Replace followed by read returns exactly the submitted lines
//! - Property 2: Replacing twice with the same lines is idempotent
//! - Property 3: Rejected replacements leave the persisted set untouched

use std::sync::Arc;

use ledgerline_shared::LinesConfig;
use ledgerline_shared::types::TransactionId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::memory::InMemoryLineStore;
use super::service::TransactionLineService;
use super::types::{TransactionLine, TransactionLineInput};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a balanced line set: split credits against one debit.
fn balanced_lines() -> impl Strategy<Value = Vec<TransactionLineInput>> {
    prop::collection::vec(positive_amount(), 1..8).prop_map(|credits| {
        let total: Decimal = credits.iter().copied().sum();
        let mut lines = vec![TransactionLineInput::debit(1, "receivable", total)];
        lines.extend(
            credits
                .into_iter()
                .zip(2..)
                .map(|(amount, line_no)| {
                    TransactionLineInput::credit(line_no, format!("revenue-{line_no}"), amount)
                        .with_description(format!("Item {line_no}"))
                }),
        );
        lines
    })
}

fn make_service() -> (Arc<InMemoryLineStore>, TransactionLineService) {
    let store = Arc::new(InMemoryLineStore::new());
    let service = TransactionLineService::new(store.clone(), store.clone(), LinesConfig::default());
    (store, service)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn contents(lines: &[TransactionLine]) -> Vec<TransactionLineInput> {
    lines.iter().map(TransactionLine::to_input).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property 1: reading after a successful replacement yields the
    /// submitted lines, ordered by `line_no`, all tagged with the transaction.
    #[test]
    fn prop_replace_then_read(lines in balanced_lines()) {
        let (_, service) = make_service();
        let id = TransactionId::new("tx-prop");

        let read = runtime().block_on(async {
            service.replace_lines(&id, lines.clone()).await.unwrap();
            service.get_lines(&id).await.unwrap()
        });

        prop_assert_eq!(contents(&read), lines);
        prop_assert!(read.iter().all(|l| l.transaction_id == id));
    }

    /// Property 2: a second identical replacement leaves the same content,
    /// with fresh row ids.
    #[test]
    fn prop_replace_idempotent(lines in balanced_lines()) {
        let (_, service) = make_service();
        let id = TransactionId::new("tx-prop");

        let (first, second) = runtime().block_on(async {
            service.replace_lines(&id, lines.clone()).await.unwrap();
            let first = service.get_lines(&id).await.unwrap();
            service.replace_lines(&id, lines.clone()).await.unwrap();
            let second = service.get_lines(&id).await.unwrap();
            (first, second)
        });

        prop_assert_eq!(contents(&first), contents(&second));
        prop_assert!(first.iter().zip(&second).all(|(a, b)| a.id != b.id));
    }

    /// Property 3: an unbalanced replacement is rejected and the previous
    /// set stays in place.
    #[test]
    fn prop_rejected_replace_keeps_previous(
        lines in balanced_lines(),
        gap in positive_amount(),
    ) {
        let (store, service) = make_service();
        let id = TransactionId::new("tx-prop");

        let mut unbalanced = lines.clone();
        unbalanced[0].debit_amount += gap;

        let (result, after) = runtime().block_on(async {
            service.replace_lines(&id, lines.clone()).await.unwrap();
            let result = service.replace_lines(&id, unbalanced).await;
            (result, store.snapshot(&id))
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(contents(&after), lines);
    }
}
