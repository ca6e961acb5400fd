//! Ledger line error types.
//!
//! Validation errors are raised before any write is attempted. Persistence
//! errors wrap the collaborator's [`StoreError`] and, for inserts, name the
//! line that failed.

use rust_decimal::Decimal;
use thiserror::Error;

use super::store::{ReplaceFailure, StoreError, StoreOperation};

/// Errors that can occur during transaction line operations.
#[derive(Debug, Error)]
pub enum LineError {
    // ========== Validation Errors ==========
    /// Missing transaction id, too few lines, or a malformed line number.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A line carries a negative debit or credit amount.
    #[error("Line {line_no} has a negative amount")]
    NegativeAmount {
        /// The offending line.
        line_no: i32,
    },

    /// A line is zero on both sides or positive on both sides.
    #[error("Line {line_no} must have exactly one of debit or credit (debit: {debit}, credit: {credit})")]
    AmbiguousSide {
        /// The offending line.
        line_no: i32,
        /// Debit amount as submitted.
        debit: Decimal,
        /// Credit amount as submitted.
        credit: Decimal,
    },

    /// Total debits and total credits differ by at least the tolerance.
    #[error("Transaction is not balanced. Debits: {total_debits}, Credits: {total_credits}")]
    Unbalanced {
        /// Sum of debit amounts.
        total_debits: Decimal,
        /// Sum of credit amounts.
        total_credits: Decimal,
    },

    // ========== Persistence Errors ==========
    /// The line store rejected a call.
    #[error("{operation} failed{}: {}", line_suffix(.line_no), .source.diagnostic())]
    PersistenceFailure {
        /// The collaborator call that failed.
        operation: StoreOperation,
        /// For inserts, the line that failed.
        line_no: Option<i32>,
        /// The collaborator's error.
        source: StoreError,
    },
}

fn line_suffix(line_no: &Option<i32>) -> String {
    line_no.map_or_else(String::new, |n| format!(" for line {n}"))
}

impl LineError {
    /// Wraps a store error raised by `operation`.
    #[must_use]
    pub fn persistence(operation: StoreOperation, source: StoreError) -> Self {
        Self::PersistenceFailure {
            operation,
            line_no: None,
            source,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmbiguousSide { .. } => "AMBIGUOUS_SIDE",
            Self::Unbalanced { .. } => "UNBALANCED_TRANSACTION",
            Self::PersistenceFailure { .. } => "PERSISTENCE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidArgument(_)
            | Self::NegativeAmount { .. }
            | Self::AmbiguousSide { .. }
            | Self::Unbalanced { .. } => 400,

            // 500 Internal Server Error
            Self::PersistenceFailure { .. } => 500,
        }
    }

    /// Returns true if the caller must correct its input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::PersistenceFailure { .. })
    }

    /// Returns true if repeating the whole call may succeed.
    ///
    /// Nothing is retried automatically. A replacement redoes its delete and
    /// inserts from scratch, so repeating it also repairs a partial write.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PersistenceFailure { .. })
    }
}

impl From<ReplaceFailure> for LineError {
    fn from(failure: ReplaceFailure) -> Self {
        match failure {
            ReplaceFailure::Delete(source) => Self::persistence(StoreOperation::Delete, source),
            ReplaceFailure::Insert { line_no, source } => Self::PersistenceFailure {
                operation: StoreOperation::Insert,
                line_no: Some(line_no),
                source,
            },
            ReplaceFailure::Transaction(source) => {
                Self::persistence(StoreOperation::Transaction, source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LineError::InvalidArgument("x".into()).error_code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            LineError::NegativeAmount { line_no: 1 }.error_code(),
            "NEGATIVE_AMOUNT"
        );
        assert_eq!(
            LineError::Unbalanced {
                total_debits: dec!(100),
                total_credits: dec!(99),
            }
            .error_code(),
            "UNBALANCED_TRANSACTION"
        );
        assert_eq!(
            LineError::persistence(StoreOperation::Select, StoreError::new("down")).error_code(),
            "PERSISTENCE_FAILURE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LineError::NegativeAmount { line_no: 2 }.http_status_code(), 400);
        assert_eq!(
            LineError::AmbiguousSide {
                line_no: 1,
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            LineError::persistence(StoreOperation::Delete, StoreError::new("down"))
                .http_status_code(),
            500
        );
    }

    #[test]
    fn test_only_persistence_is_retryable() {
        assert!(LineError::persistence(StoreOperation::Insert, StoreError::new("x")).is_retryable());
        assert!(!LineError::InvalidArgument("x".into()).is_retryable());
        assert!(LineError::InvalidArgument("x".into()).is_validation());
        assert!(!LineError::persistence(StoreOperation::Insert, StoreError::new("x")).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = LineError::Unbalanced {
            total_debits: dec!(100),
            total_credits: dec!(99),
        };
        assert_eq!(
            err.to_string(),
            "Transaction is not balanced. Debits: 100, Credits: 99"
        );

        let err = LineError::from(ReplaceFailure::Insert {
            line_no: 2,
            source: StoreError::new("insert rejected").with_code("23505"),
        });
        assert_eq!(err.to_string(), "insert failed for line 2: 23505");

        let err = LineError::from(ReplaceFailure::Delete(
            StoreError::new("connection reset").with_details("peer closed"),
        ));
        assert_eq!(err.to_string(), "delete failed: peer closed");
    }
}
