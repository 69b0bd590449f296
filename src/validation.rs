use crate::balancer::BalanceSheetBalancer;
use crate::schema::REVENUE_FROM_OPERATIONS;
use crate::tree::FinancialStatementTree;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const MISSING_STATEMENTS: &str =
    "Both the balance sheet and the profit and loss statement are required";
pub const NO_POSITIVE_REVENUE: &str =
    "Revenue from operations must be greater than zero for at least one period";

/// Optional checks layered on top of the minimal validation.
///
/// `Default` runs only the minimal checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Report periods where assets and owners' funds plus liabilities differ
    /// by more than this amount.
    #[serde(default)]
    pub balance_tolerance: Option<f64>,

    /// Report line items whose periods differ from the tracked periods.
    #[serde(default)]
    pub check_period_keys: bool,
}

impl ValidationOptions {
    pub fn strict(balance_tolerance: f64) -> Self {
        Self {
            balance_tolerance: Some(balance_tolerance),
            check_period_keys: true,
        }
    }
}

pub fn validate(tree: &FinancialStatementTree) -> Vec<String> {
    validate_with(tree, &ValidationOptions::default())
}

pub fn validate_with(tree: &FinancialStatementTree, options: &ValidationOptions) -> Vec<String> {
    let mut messages = Vec::new();

    if tree.balance_sheet.is_none() || tree.profit_and_loss.is_none() {
        messages.push(MISSING_STATEMENTS.to_string());
        return messages;
    }

    let has_revenue = tree
        .tracked_periods()
        .iter()
        .any(|p| tree.value(REVENUE_FROM_OPERATIONS, p).is_some_and(|v| v > 0.0));
    if !has_revenue {
        messages.push(NO_POSITIVE_REVENUE.to_string());
    }

    if let Some(tolerance) = options.balance_tolerance {
        match BalanceSheetBalancer::new(tree).mismatches(tolerance) {
            Ok(mismatches) => {
                for m in mismatches {
                    messages.push(format!(
                        "Balance sheet for {} does not balance: assets {:.2} vs owners' funds and liabilities {:.2}",
                        m.period, m.assets, m.owners_funds_and_liabilities
                    ));
                }
            }
            Err(e) => {
                warn!("Skipping balance check: {}", e);
                messages.push(format!("Balance sheet could not be totalled: {}", e));
            }
        }
    }

    if options.check_period_keys {
        for path in tree.mismatched_line_items() {
            messages.push(format!("Line item {} is out of sync with the tracked periods", path));
        }
    }

    debug!("Validation produced {} messages", messages.len());
    messages
}
