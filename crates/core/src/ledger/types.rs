//! Transaction line types.
//!
//! A transaction's ledger lines are always written as a complete set. The
//! input side ([`TransactionLineInput`]) carries what the caller proposes; the
//! persisted side ([`TransactionLine`]) adds the row identity and the owning
//! transaction.

use std::collections::HashMap;

use ledgerline_shared::types::{
    AccountId, AnalysisWorkItemId, ClassificationId, CostCenterId, OrganizationId, ProjectId,
    SubTreeId, TransactionId, TransactionLineId, WorkItemId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a ledger line.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

/// Optional dimensional tags on a line.
///
/// These are opaque references; no cross-validation is performed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDimensions {
    /// Organization.
    pub org_id: Option<OrganizationId>,
    /// Project.
    pub project_id: Option<ProjectId>,
    /// Cost center.
    pub cost_center_id: Option<CostCenterId>,
    /// Work item.
    pub work_item_id: Option<WorkItemId>,
    /// Analysis work item.
    pub analysis_work_item_id: Option<AnalysisWorkItemId>,
    /// Classification.
    pub classification_id: Option<ClassificationId>,
    /// Expense sub-tree node.
    pub sub_tree_id: Option<SubTreeId>,
}

/// A proposed ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLineInput {
    /// Position within the transaction (positive, unique).
    pub line_no: i32,
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (0 for a credit line).
    pub debit_amount: Decimal,
    /// Credit amount (0 for a debit line).
    pub credit_amount: Decimal,
    /// Optional free text.
    pub description: Option<String>,
    /// Dimensional tags.
    #[serde(flatten)]
    pub dimensions: LineDimensions,
}

impl TransactionLineInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(line_no: i32, account_id: impl Into<AccountId>, amount: Decimal) -> Self {
        Self {
            line_no,
            account_id: account_id.into(),
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: None,
            dimensions: LineDimensions::default(),
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(line_no: i32, account_id: impl Into<AccountId>, amount: Decimal) -> Self {
        Self {
            line_no,
            account_id: account_id.into(),
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            description: None,
            dimensions: LineDimensions::default(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the dimensional tags.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: LineDimensions) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// A persisted ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    /// Row identifier, fresh on every insert.
    pub id: TransactionLineId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Position within the transaction.
    pub line_no: i32,
    /// The account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit_amount: Decimal,
    /// Credit amount.
    pub credit_amount: Decimal,
    /// Optional free text.
    pub description: Option<String>,
    /// Dimensional tags.
    #[serde(flatten)]
    pub dimensions: LineDimensions,
}

impl TransactionLine {
    /// Builds the row to persist for an input line, tagged with its transaction.
    #[must_use]
    pub fn from_input(transaction_id: TransactionId, input: TransactionLineInput) -> Self {
        Self {
            id: TransactionLineId::generate(),
            transaction_id,
            line_no: input.line_no,
            account_id: input.account_id,
            debit_amount: input.debit_amount,
            credit_amount: input.credit_amount,
            description: input.description,
            dimensions: input.dimensions,
        }
    }

    /// Returns the side carrying the amount.
    #[must_use]
    pub fn side(&self) -> EntrySide {
        if self.debit_amount > Decimal::ZERO {
            EntrySide::Debit
        } else {
            EntrySide::Credit
        }
    }

    /// Returns the non-zero amount of the line.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self.side() {
            EntrySide::Debit => self.debit_amount,
            EntrySide::Credit => self.credit_amount,
        }
    }

    /// Returns the line content without its row identity.
    #[must_use]
    pub fn to_input(&self) -> TransactionLineInput {
        TransactionLineInput {
            line_no: self.line_no,
            account_id: self.account_id.clone(),
            debit_amount: self.debit_amount,
            credit_amount: self.credit_amount,
            description: self.description.clone(),
            dimensions: self.dimensions.clone(),
        }
    }
}

/// Validated totals of a line set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    /// Sum of all debit amounts.
    pub total_debits: Decimal,
    /// Sum of all credit amounts.
    pub total_credits: Decimal,
}

impl LineTotals {
    /// Sums the debit and credit columns of a line set.
    ///
    /// Returns `None` if either column overflows `Decimal`.
    #[must_use]
    pub fn from_inputs(lines: &[TransactionLineInput]) -> Option<Self> {
        lines.iter().try_fold(
            Self {
                total_debits: Decimal::ZERO,
                total_credits: Decimal::ZERO,
            },
            |totals, line| {
                Some(Self {
                    total_debits: totals.total_debits.checked_add(line.debit_amount)?,
                    total_credits: totals.total_credits.checked_add(line.credit_amount)?,
                })
            },
        )
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debits - self.total_credits
    }

    /// Returns true if the gap between the sides is below `tolerance`.
    #[must_use]
    pub fn is_balanced_within(&self, tolerance: Decimal) -> bool {
        self.difference().abs() < tolerance
    }
}

/// One cost-breakdown row: an amount attributed to a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemAmount {
    /// The line the amount belongs to.
    pub transaction_line_id: TransactionLineId,
    /// Amount of the breakdown row.
    pub total_amount: Decimal,
}

/// A line merged with the sum of its cost-breakdown rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWithCost {
    /// The persisted line.
    #[serde(flatten)]
    pub line: TransactionLine,
    /// Sum of `total_amount` over the line's breakdown rows.
    pub line_items_total: Decimal,
    /// Same value as `line_items_total`, under the name cost views read.
    pub total_cost: Decimal,
}

impl LineWithCost {
    /// Merges lines with breakdown rows, summing amounts per line.
    ///
    /// Lines without breakdown rows get a zero total. Rows for unknown lines
    /// are ignored.
    #[must_use]
    pub fn merge(lines: Vec<TransactionLine>, items: &[LineItemAmount]) -> Vec<Self> {
        let mut sums: HashMap<&TransactionLineId, Decimal> = HashMap::new();
        for item in items {
            let sum = sums.entry(&item.transaction_line_id).or_insert(Decimal::ZERO);
            *sum = sum.saturating_add(item.total_amount);
        }

        lines
            .into_iter()
            .map(|line| {
                let total = sums.get(&line.id).copied().unwrap_or(Decimal::ZERO);
                Self {
                    line,
                    line_items_total: total,
                    total_cost: total,
                }
            })
            .collect()
    }
}

/// Result of a read merged with cost breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinesWithCosts {
    /// Lines with their cost totals.
    Full {
        /// Merged lines, ordered by `line_no`.
        lines: Vec<LineWithCost>,
    },
    /// The breakdown source failed; lines are returned without cost totals.
    WithoutCostBreakdown {
        /// Lines, ordered by `line_no`.
        lines: Vec<TransactionLine>,
        /// Why the breakdown is missing.
        reason: String,
    },
}

impl LinesWithCosts {
    /// Returns true if cost totals are missing.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::WithoutCostBreakdown { .. })
    }

    /// Returns the lines regardless of variant.
    #[must_use]
    pub fn lines(&self) -> Vec<&TransactionLine> {
        match self {
            Self::Full { lines } => lines.iter().map(|l| &l.line).collect(),
            Self::WithoutCostBreakdown { lines, .. } => lines.iter().collect(),
        }
    }
}
