use crate::error::Result;
use crate::period::ReportingPeriod;
use crate::period_manager::PeriodChange;
use crate::tree::FinancialStatementTree;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single change submitted by the form layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StatementEdit {
    /// Write or clear one figure.
    SetValue {
        #[schemars(
            description = "Statement name followed by category and line item names, e.g. ['balance_sheet', 'assets', 'current_assets', 'inventories']."
        )]
        path: Vec<String>,
        period: ReportingPeriod,
        #[schemars(description = "The new value, or null to clear the entry.")]
        value: Option<f64>,
    },

    AddPeriod { period: ReportingPeriod },

    RemovePeriod { period: ReportingPeriod },
}

/// What an applied edit did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    ValueSet,
    Period(PeriodChange),
}

impl EditOutcome {
    pub fn changed_tree(&self) -> bool {
        match self {
            Self::ValueSet => true,
            Self::Period(change) => change.is_applied(),
        }
    }
}

impl StatementEdit {
    pub fn set_value(
        path: &[&str],
        period: impl Into<ReportingPeriod>,
        value: Option<f64>,
    ) -> Self {
        Self::SetValue {
            path: path.iter().map(|s| s.to_string()).collect(),
            period: period.into(),
            value,
        }
    }
}

/// Applies one edit. A malformed value edit is rejected without touching the tree.
pub fn apply_edit(tree: &mut FinancialStatementTree, edit: &StatementEdit) -> Result<EditOutcome> {
    match edit {
        StatementEdit::SetValue {
            path,
            period,
            value,
        } => {
            let path: Vec<&str> = path.iter().map(String::as_str).collect();
            tree.set_value(&path, period, *value)?;
            Ok(EditOutcome::ValueSet)
        }
        StatementEdit::AddPeriod { period } => {
            Ok(EditOutcome::Period(tree.add_period(period.clone())))
        }
        StatementEdit::RemovePeriod { period } => {
            Ok(EditOutcome::Period(tree.remove_period(period)))
        }
    }
}

/// Applies edits in order, stopping at the first malformed one.
/// Edits before it stay applied.
pub fn apply_edits(
    tree: &mut FinancialStatementTree,
    edits: &[StatementEdit],
) -> Result<Vec<EditOutcome>> {
    edits.iter().map(|edit| apply_edit(tree, edit)).collect()
}
