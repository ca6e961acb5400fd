//! Business rule validation for transaction line sets.
//!
//! Every check here runs before any write, so a validation error never
//! leaves a partial change behind.

use std::collections::HashSet;

use ledgerline_shared::types::TransactionId;
use rust_decimal::Decimal;

use super::error::LineError;
use super::types::{EntrySide, LineTotals, TransactionLineInput};

/// Currency rounding slack accepted between total debits and credits: 0.01.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Minimum number of lines in a transaction.
pub const MIN_LINES: usize = 2;

/// Rejects a missing (blank) transaction id.
pub fn validate_transaction_id(transaction_id: &TransactionId) -> Result<(), LineError> {
    if transaction_id.is_blank() {
        return Err(LineError::InvalidArgument(
            "transaction id is required".to_string(),
        ));
    }
    Ok(())
}

/// Rejects a line with a negative debit or credit.
pub fn check_non_negative(line: &TransactionLineInput) -> Result<(), LineError> {
    if line.debit_amount < Decimal::ZERO || line.credit_amount < Decimal::ZERO {
        return Err(LineError::NegativeAmount {
            line_no: line.line_no,
        });
    }
    Ok(())
}

/// Returns the side of a single-sided line.
///
/// Assumes both amounts are non-negative.
pub fn check_single_sided(line: &TransactionLineInput) -> Result<EntrySide, LineError> {
    let has_debit = line.debit_amount > Decimal::ZERO;
    let has_credit = line.credit_amount > Decimal::ZERO;

    match (has_debit, has_credit) {
        (true, false) => Ok(EntrySide::Debit),
        (false, true) => Ok(EntrySide::Credit),
        _ => Err(LineError::AmbiguousSide {
            line_no: line.line_no,
            debit: line.debit_amount,
            credit: line.credit_amount,
        }),
    }
}

/// Rejects a line number below 1.
pub fn check_line_no(line: &TransactionLineInput) -> Result<(), LineError> {
    if line.line_no < 1 {
        return Err(LineError::InvalidArgument(format!(
            "line number must be positive, got {}",
            line.line_no
        )));
    }
    Ok(())
}

/// Validates one line on its own: line number, non-negative, then single-sided.
pub fn validate_line(line: &TransactionLineInput) -> Result<EntrySide, LineError> {
    check_line_no(line)?;
    check_non_negative(line)?;
    check_single_sided(line)
}

/// Validates a complete replacement set and returns its totals.
///
/// Checks, in order:
/// 1. At least [`MIN_LINES`] lines
/// 2. Line numbers positive and unique
/// 3. No negative amount on any line
/// 4. Every line single-sided
/// 5. Column totals fit in a `Decimal`
/// 6. `|debits - credits| < tolerance`
pub fn validate_line_set(
    lines: &[TransactionLineInput],
    tolerance: Decimal,
) -> Result<LineTotals, LineError> {
    if lines.len() < MIN_LINES {
        return Err(LineError::InvalidArgument(format!(
            "a transaction needs at least {MIN_LINES} lines, got {}",
            lines.len()
        )));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        check_line_no(line)?;
        if !seen.insert(line.line_no) {
            return Err(LineError::InvalidArgument(format!(
                "duplicate line number {}",
                line.line_no
            )));
        }
    }

    // Negative amounts take precedence over ambiguity on any other line.
    for line in lines {
        check_non_negative(line)?;
    }
    for line in lines {
        check_single_sided(line)?;
    }

    let totals = LineTotals::from_inputs(lines)
        .ok_or_else(|| LineError::InvalidArgument("line totals overflow".to_string()))?;
    if !totals.is_balanced_within(tolerance) {
        return Err(LineError::Unbalanced {
            total_debits: totals.total_debits,
            total_credits: totals.total_credits,
        });
    }

    Ok(totals)
}
