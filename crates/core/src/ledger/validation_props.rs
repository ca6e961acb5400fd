//! Property-based tests for line set validation.
//!
//! - Property 1: Balanced sets are accepted with exact totals
//! - Property 2: Any negative amount is reported as `NegativeAmount`
//! - Property 3: Lines with both or neither side set are rejected
//! - Property 4: Sets smaller than two lines are rejected

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LineError;
use super::types::TransactionLineInput;
use super::validation::{BALANCE_TOLERANCE, validate_line_set};

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a negative amount.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Builds a balanced set: one debit per amount, then one credit for the sum.
fn balanced_set(debits: &[Decimal]) -> Vec<TransactionLineInput> {
    let total: Decimal = debits.iter().copied().sum();
    let mut lines: Vec<TransactionLineInput> = debits
        .iter()
        .zip(1..)
        .map(|(amount, line_no)| TransactionLineInput::debit(line_no, "expense", *amount))
        .collect();
    let credit_no = i32::try_from(lines.len()).unwrap() + 1;
    lines.push(TransactionLineInput::credit(credit_no, "cash", total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: a set whose sides sum equal validates, and the totals
    /// returned are exactly those sums.
    #[test]
    fn prop_balanced_set_accepted(debits in prop::collection::vec(positive_amount(), 1..10)) {
        let lines = balanced_set(&debits);
        let expected: Decimal = debits.iter().copied().sum();

        let totals = validate_line_set(&lines, BALANCE_TOLERANCE);
        prop_assert!(totals.is_ok(), "balanced set rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.total_debits, expected);
        prop_assert_eq!(totals.total_credits, expected);
    }

    /// Property 1.1: reordering a valid set does not change the outcome.
    #[test]
    fn prop_line_order_irrelevant(debits in prop::collection::vec(positive_amount(), 1..10)) {
        let mut lines = balanced_set(&debits);
        lines.reverse();
        prop_assert!(validate_line_set(&lines, BALANCE_TOLERANCE).is_ok());
    }

    /// Property 2: a negative amount on any line wins over every other rule
    /// except the line-count and line-number checks.
    #[test]
    fn prop_negative_amount_reported(
        debits in prop::collection::vec(positive_amount(), 1..10),
        negative in negative_amount(),
        on_credit_side in any::<bool>(),
        position in any::<prop::sample::Index>(),
    ) {
        let mut lines = balanced_set(&debits);
        let target = position.index(lines.len());
        if on_credit_side {
            lines[target].credit_amount = negative;
        } else {
            lines[target].debit_amount = negative;
        }
        let line_no = lines[target].line_no;

        let result = validate_line_set(&lines, BALANCE_TOLERANCE);
        prop_assert!(
            matches!(result, Err(LineError::NegativeAmount { line_no: n }) if n == line_no),
            "expected NegativeAmount for line {}, got: {:?}",
            line_no,
            result
        );
    }

    /// Property 3: setting both sides on any line is rejected.
    #[test]
    fn prop_double_sided_rejected(
        debits in prop::collection::vec(positive_amount(), 1..10),
        extra in positive_amount(),
        position in any::<prop::sample::Index>(),
    ) {
        let mut lines = balanced_set(&debits);
        let target = position.index(lines.len());
        if lines[target].debit_amount.is_zero() {
            lines[target].debit_amount = extra;
        } else {
            lines[target].credit_amount = extra;
        }

        let result = validate_line_set(&lines, BALANCE_TOLERANCE);
        prop_assert!(
            matches!(result, Err(LineError::AmbiguousSide { .. })),
            "expected AmbiguousSide, got: {:?}",
            result
        );
    }

    /// Property 3.1: a line with neither side set is rejected.
    #[test]
    fn prop_zero_line_rejected(
        debits in prop::collection::vec(positive_amount(), 1..10),
        position in any::<prop::sample::Index>(),
    ) {
        let mut lines = balanced_set(&debits);
        let target = position.index(lines.len());
        lines[target].debit_amount = Decimal::ZERO;
        lines[target].credit_amount = Decimal::ZERO;

        let result = validate_line_set(&lines, BALANCE_TOLERANCE);
        prop_assert!(
            matches!(result, Err(LineError::AmbiguousSide { .. })),
            "expected AmbiguousSide, got: {:?}",
            result
        );
    }

    /// Property 4: a single line never validates, however it is built.
    #[test]
    fn prop_single_line_rejected(amount in positive_amount(), is_debit in any::<bool>()) {
        let line = if is_debit {
            TransactionLineInput::debit(1, "cash", amount)
        } else {
            TransactionLineInput::credit(1, "cash", amount)
        };

        let result = validate_line_set(&[line], BALANCE_TOLERANCE);
        prop_assert!(matches!(result, Err(LineError::InvalidArgument(_))));
    }

    /// Property 5: a gap of at least one cent is always rejected.
    #[test]
    fn prop_gap_rejected(
        debits in prop::collection::vec(positive_amount(), 1..10),
        gap in positive_amount(),
    ) {
        let mut lines = balanced_set(&debits);
        let last = lines.len() - 1;
        lines[last].credit_amount += gap;

        let result = validate_line_set(&lines, BALANCE_TOLERANCE);
        prop_assert!(
            matches!(result, Err(LineError::Unbalanced { .. })),
            "expected Unbalanced, got: {:?}",
            result
        );
    }
}
