use crate::error::Result;
use crate::period::ReportingPeriod;
use crate::schema::BALANCE_SHEET;
use crate::tree::FinancialStatementTree;
use serde::{Deserialize, Serialize};

const ASSETS: &[&str] = &[BALANCE_SHEET, "assets"];
const OWNERS_FUNDS_AND_LIABILITIES: &[&str] = &[BALANCE_SHEET, "owners_funds_and_liabilities"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetTotals {
    pub period: ReportingPeriod,
    pub assets: f64,
    pub owners_funds_and_liabilities: f64,
}

impl BalanceSheetTotals {
    pub fn difference(&self) -> f64 {
        self.assets - self.owners_funds_and_liabilities
    }
}

/// Checks that both sides of the balance sheet agree, period by period.
pub struct BalanceSheetBalancer<'a> {
    tree: &'a FinancialStatementTree,
}

impl<'a> BalanceSheetBalancer<'a> {
    pub fn new(tree: &'a FinancialStatementTree) -> Self {
        Self { tree }
    }

    /// Totals for every tracked period with at least one balance sheet value entered.
    pub fn totals(&self) -> Result<Vec<BalanceSheetTotals>> {
        let balance_sheet = self.tree.category(&[BALANCE_SHEET])?;
        let mut totals = Vec::new();

        for period in self.tree.tracked_periods() {
            let mut has_entries = false;
            balance_sheet.for_each_line_item(&mut Vec::new(), &mut |_, item| {
                has_entries |= item.value(period).is_some();
            });
            if !has_entries {
                continue;
            }

            totals.push(BalanceSheetTotals {
                period: period.clone(),
                assets: self.tree.category_total(ASSETS, period)?,
                owners_funds_and_liabilities: self
                    .tree
                    .category_total(OWNERS_FUNDS_AND_LIABILITIES, period)?,
            });
        }

        Ok(totals)
    }

    /// Periods where the two sides differ by more than `tolerance`.
    pub fn mismatches(&self, tolerance: f64) -> Result<Vec<BalanceSheetTotals>> {
        Ok(self
            .totals()?
            .into_iter()
            .filter(|t| t.difference().abs() > tolerance)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SchemaBuilder;
    use crate::schema::{EntityType, CASH_AND_BANK_BALANCES, SHARE_CAPITAL, TRADE_PAYABLES};

    fn tree() -> FinancialStatementTree {
        SchemaBuilder::build(
            EntityType::Corporate,
            vec![ReportingPeriod::from("2023-24"), ReportingPeriod::from("2022-23")],
        )
        .unwrap()
    }

    #[test]
    fn test_balanced_sheet_has_no_mismatches() {
        let mut tree = tree();
        let period = ReportingPeriod::from("2023-24");
        tree.set_value(CASH_AND_BANK_BALANCES, &period, Some(10_000.0)).unwrap();
        tree.set_value(SHARE_CAPITAL, &period, Some(7_000.0)).unwrap();
        tree.set_value(TRADE_PAYABLES, &period, Some(3_000.0)).unwrap();

        let balancer = BalanceSheetBalancer::new(&tree);
        let totals = balancer.totals().unwrap();

        // The prior year has no entries and is skipped
        assert_eq!(totals.len(), 1);
        assert!((totals[0].assets - 10_000.0).abs() < 1e-9);
        assert!(balancer.mismatches(0.01).unwrap().is_empty());
    }

    #[test]
    fn test_unbalanced_sheet_is_reported() {
        let mut tree = tree();
        let period = ReportingPeriod::from("2022-23");
        tree.set_value(CASH_AND_BANK_BALANCES, &period, Some(10_000.0)).unwrap();
        tree.set_value(TRADE_PAYABLES, &period, Some(3_000.0)).unwrap();

        let mismatches = BalanceSheetBalancer::new(&tree).mismatches(0.01).unwrap();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].period, period);
        assert!((mismatches[0].difference() - 7_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_balance_sheet_is_an_error() {
        let mut tree = tree();
        tree.balance_sheet = None;
        assert!(BalanceSheetBalancer::new(&tree).totals().is_err());
    }
}
