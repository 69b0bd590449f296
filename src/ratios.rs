use crate::period::ReportingPeriod;
use crate::schema::*;
use crate::tree::FinancialStatementTree;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One value per tracked period. `None` marks a ratio that could not be
/// computed (zero denominator).
pub type RatioSeries = BTreeMap<ReportingPeriod, Option<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatioGroup {
    Liquidity,
    Profitability,
    Leverage,
    Efficiency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatioScale {
    /// Reported as a percentage (multiplied by 100).
    Percentage,
    /// Reported as a plain multiple.
    Multiple,
}

impl RatioScale {
    fn factor(&self) -> f64 {
        match self {
            Self::Percentage => 100.0,
            Self::Multiple => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatioName {
    CurrentRatio,
    QuickRatio,
    CashRatio,
    NetProfitMargin,
    GrossProfitMargin,
    ReturnOnAssets,
    DebtEquity,
    DebtRatio,
    InterestCoverage,
    AssetTurnover,
    InventoryTurnover,
    ReceivablesTurnover,
    PayablesTurnover,
}

impl RatioName {
    pub const ALL: [RatioName; 13] = [
        Self::CurrentRatio,
        Self::QuickRatio,
        Self::CashRatio,
        Self::NetProfitMargin,
        Self::GrossProfitMargin,
        Self::ReturnOnAssets,
        Self::DebtEquity,
        Self::DebtRatio,
        Self::InterestCoverage,
        Self::AssetTurnover,
        Self::InventoryTurnover,
        Self::ReceivablesTurnover,
        Self::PayablesTurnover,
    ];

    pub fn group(&self) -> RatioGroup {
        match self {
            Self::CurrentRatio | Self::QuickRatio | Self::CashRatio => RatioGroup::Liquidity,
            Self::NetProfitMargin | Self::GrossProfitMargin | Self::ReturnOnAssets => {
                RatioGroup::Profitability
            }
            Self::DebtEquity | Self::DebtRatio | Self::InterestCoverage => RatioGroup::Leverage,
            Self::AssetTurnover
            | Self::InventoryTurnover
            | Self::ReceivablesTurnover
            | Self::PayablesTurnover => RatioGroup::Efficiency,
        }
    }

    pub fn scale(&self) -> RatioScale {
        match self {
            Self::NetProfitMargin | Self::GrossProfitMargin | Self::ReturnOnAssets => {
                RatioScale::Percentage
            }
            _ => RatioScale::Multiple,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LiquidityRatios {
    pub current_ratio: RatioSeries,
    pub quick_ratio: RatioSeries,
    pub cash_ratio: RatioSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfitabilityRatios {
    pub net_profit_margin: RatioSeries,
    pub gross_profit_margin: RatioSeries,
    pub return_on_assets: RatioSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LeverageRatios {
    pub debt_equity: RatioSeries,
    pub debt_ratio: RatioSeries,
    pub interest_coverage: RatioSeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EfficiencyRatios {
    pub asset_turnover: RatioSeries,
    pub inventory_turnover: RatioSeries,
    pub receivables_turnover: RatioSeries,
    pub payables_turnover: RatioSeries,
}

/// Ratios derived from a statement tree. Always rebuilt, never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatioSet {
    pub liquidity: LiquidityRatios,
    pub profitability: ProfitabilityRatios,
    pub leverage: LeverageRatios,
    pub efficiency: EfficiencyRatios,
}

impl RatioSet {
    pub fn series(&self, name: RatioName) -> &RatioSeries {
        match name {
            RatioName::CurrentRatio => &self.liquidity.current_ratio,
            RatioName::QuickRatio => &self.liquidity.quick_ratio,
            RatioName::CashRatio => &self.liquidity.cash_ratio,
            RatioName::NetProfitMargin => &self.profitability.net_profit_margin,
            RatioName::GrossProfitMargin => &self.profitability.gross_profit_margin,
            RatioName::ReturnOnAssets => &self.profitability.return_on_assets,
            RatioName::DebtEquity => &self.leverage.debt_equity,
            RatioName::DebtRatio => &self.leverage.debt_ratio,
            RatioName::InterestCoverage => &self.leverage.interest_coverage,
            RatioName::AssetTurnover => &self.efficiency.asset_turnover,
            RatioName::InventoryTurnover => &self.efficiency.inventory_turnover,
            RatioName::ReceivablesTurnover => &self.efficiency.receivables_turnover,
            RatioName::PayablesTurnover => &self.efficiency.payables_turnover,
        }
    }

    fn series_mut(&mut self, name: RatioName) -> &mut RatioSeries {
        match name {
            RatioName::CurrentRatio => &mut self.liquidity.current_ratio,
            RatioName::QuickRatio => &mut self.liquidity.quick_ratio,
            RatioName::CashRatio => &mut self.liquidity.cash_ratio,
            RatioName::NetProfitMargin => &mut self.profitability.net_profit_margin,
            RatioName::GrossProfitMargin => &mut self.profitability.gross_profit_margin,
            RatioName::ReturnOnAssets => &mut self.profitability.return_on_assets,
            RatioName::DebtEquity => &mut self.leverage.debt_equity,
            RatioName::DebtRatio => &mut self.leverage.debt_ratio,
            RatioName::InterestCoverage => &mut self.leverage.interest_coverage,
            RatioName::AssetTurnover => &mut self.efficiency.asset_turnover,
            RatioName::InventoryTurnover => &mut self.efficiency.inventory_turnover,
            RatioName::ReceivablesTurnover => &mut self.efficiency.receivables_turnover,
            RatioName::PayablesTurnover => &mut self.efficiency.payables_turnover,
        }
    }

    /// The computed value, or `None` if it is undefined for `period`.
    pub fn get(&self, name: RatioName, period: &ReportingPeriod) -> Option<f64> {
        self.series(name).get(period).copied().flatten()
    }
}

/// Aggregates read from the tree for a single period. Absent values count as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PeriodFigures {
    current_assets: f64,
    current_liabilities: f64,
    inventories: f64,
    cash_and_bank: f64,
    trade_receivables: f64,
    trade_payables: f64,
    total_assets: f64,
    total_debt: f64,
    owners_funds: f64,
    revenue: f64,
    cost_of_materials: f64,
    finance_costs: f64,
    profit_before_tax: f64,
    net_profit: f64,
}

impl PeriodFigures {
    fn read(tree: &FinancialStatementTree, period: &ReportingPeriod) -> Self {
        let value = |path: &[&str]| tree.value(path, period).unwrap_or(0.0);
        let current_assets = tree.sum(&CURRENT_ASSET_ITEMS, period);

        Self {
            current_assets,
            current_liabilities: tree.sum(&CURRENT_LIABILITY_ITEMS, period),
            inventories: value(INVENTORIES),
            cash_and_bank: value(CASH_AND_BANK_BALANCES),
            trade_receivables: value(TRADE_RECEIVABLES),
            trade_payables: value(TRADE_PAYABLES),
            total_assets: current_assets + tree.sum(&NON_CURRENT_ASSET_ITEMS, period),
            total_debt: tree.sum(&[LONG_TERM_BORROWINGS, SHORT_TERM_BORROWINGS], period),
            owners_funds: tree.sum(&[SHARE_CAPITAL, RESERVES_AND_SURPLUS], period),
            revenue: value(REVENUE_FROM_OPERATIONS),
            cost_of_materials: value(COST_OF_MATERIALS_CONSUMED),
            finance_costs: value(FINANCE_COSTS),
            profit_before_tax: value(PROFIT_BEFORE_TAX),
            net_profit: value(PROFIT_FOR_THE_PERIOD),
        }
    }

    fn ratio(&self, name: RatioName) -> Option<f64> {
        let (numerator, denominator) = match name {
            RatioName::CurrentRatio => (self.current_assets, self.current_liabilities),
            RatioName::QuickRatio => (
                self.current_assets - self.inventories,
                self.current_liabilities,
            ),
            RatioName::CashRatio => (self.cash_and_bank, self.current_liabilities),
            RatioName::NetProfitMargin => (self.net_profit, self.revenue),
            RatioName::GrossProfitMargin => (self.revenue - self.cost_of_materials, self.revenue),
            RatioName::ReturnOnAssets => (self.net_profit, self.total_assets),
            RatioName::DebtEquity => (self.total_debt, self.owners_funds),
            RatioName::DebtRatio => (self.total_debt, self.total_assets),
            // EBIT over interest
            RatioName::InterestCoverage => (
                self.profit_before_tax + self.finance_costs,
                self.finance_costs,
            ),
            RatioName::AssetTurnover => (self.revenue, self.total_assets),
            RatioName::InventoryTurnover => (self.cost_of_materials, self.inventories),
            RatioName::ReceivablesTurnover => (self.revenue, self.trade_receivables),
            RatioName::PayablesTurnover => (self.cost_of_materials, self.trade_payables),
        };
        guarded_ratio(numerator, denominator, name.scale())
    }
}

fn guarded_ratio(numerator: f64, denominator: f64, scale: RatioScale) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator * scale.factor();
    value.is_finite().then_some(value)
}

/// Output of a full recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recomputation {
    pub ratios: RatioSet,
    /// Percentage (0-100) of line items with at least one entered value.
    pub completeness: f64,
}

pub struct RatioEngine;

impl RatioEngine {
    /// Rebuilds every ratio and the completeness metric from scratch.
    /// The tree is only read.
    pub fn recompute(tree: &FinancialStatementTree) -> Recomputation {
        let ratios = Self::ratios(tree);
        let completeness = Self::completeness(tree);
        debug!(
            "Recomputed ratios over {} periods, completeness {:.1}%",
            tree.tracked_periods().len(),
            completeness
        );
        Recomputation {
            ratios,
            completeness,
        }
    }

    pub fn ratios(tree: &FinancialStatementTree) -> RatioSet {
        let mut ratios = RatioSet::default();
        for period in tree.tracked_periods() {
            let figures = PeriodFigures::read(tree, period);
            for name in RatioName::ALL {
                ratios
                    .series_mut(name)
                    .insert(period.clone(), figures.ratio(name));
            }
        }
        ratios
    }

    pub fn completeness(tree: &FinancialStatementTree) -> f64 {
        let mut total = 0usize;
        let mut filled = 0usize;
        tree.for_each_line_item(|_, item| {
            total += 1;
            if item.is_filled() {
                filled += 1;
            }
        });

        if total == 0 {
            return 0.0;
        }
        filled as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SchemaBuilder;

    fn period() -> ReportingPeriod {
        ReportingPeriod::from("2023-24")
    }

    fn tree() -> FinancialStatementTree {
        SchemaBuilder::build(
            EntityType::Corporate,
            vec![ReportingPeriod::from("2023-24"), ReportingPeriod::from("2022-23")],
        )
        .unwrap()
    }

    fn set(tree: &mut FinancialStatementTree, path: &[&str], value: f64) {
        tree.set_value(path, &period(), Some(value)).unwrap();
    }

    #[test]
    fn test_scales_are_fixed_per_ratio() {
        assert_eq!(RatioName::NetProfitMargin.scale(), RatioScale::Percentage);
        assert_eq!(RatioName::ReturnOnAssets.scale(), RatioScale::Percentage);
        assert_eq!(RatioName::CurrentRatio.scale(), RatioScale::Multiple);
        assert_eq!(RatioName::AssetTurnover.scale(), RatioScale::Multiple);
        assert_eq!(RatioName::AssetTurnover.group(), RatioGroup::Efficiency);
        assert_eq!(RatioName::ReturnOnAssets.group(), RatioGroup::Profitability);
    }

    #[test]
    fn test_every_series_covers_every_period() {
        let ratios = RatioEngine::ratios(&tree());
        for name in RatioName::ALL {
            let series = ratios.series(name);
            assert_eq!(series.len(), 2, "{:?}", name);
            assert!(series.values().all(Option::is_none), "{:?}", name);
        }
    }

    #[test]
    fn test_profitability_ratios() {
        let mut tree = tree();
        set(&mut tree, REVENUE_FROM_OPERATIONS, 1_000_000.0);
        set(&mut tree, COST_OF_MATERIALS_CONSUMED, 600_000.0);
        set(&mut tree, PROFIT_FOR_THE_PERIOD, 100_000.0);
        set(&mut tree, PROPERTY_PLANT_AND_EQUIPMENT, 1_500_000.0);
        set(&mut tree, CASH_AND_BANK_BALANCES, 500_000.0);

        let ratios = RatioEngine::ratios(&tree);
        let p = period();

        let npm = ratios.get(RatioName::NetProfitMargin, &p).unwrap();
        assert!((npm - 10.0).abs() < 1e-9);
        let gpm = ratios.get(RatioName::GrossProfitMargin, &p).unwrap();
        assert!((gpm - 40.0).abs() < 1e-9);
        let roa = ratios.get(RatioName::ReturnOnAssets, &p).unwrap();
        assert!((roa - 5.0).abs() < 1e-9);
        let turnover = ratios.get(RatioName::AssetTurnover, &p).unwrap();
        assert!((turnover - 0.5).abs() < 1e-9);

        // Nothing entered for the prior year
        let prior = ReportingPeriod::from("2022-23");
        assert_eq!(ratios.get(RatioName::NetProfitMargin, &prior), None);
        assert_eq!(ratios.get(RatioName::ReturnOnAssets, &prior), None);
    }

    #[test]
    fn test_leverage_ratios() {
        let mut tree = tree();
        set(&mut tree, SHARE_CAPITAL, 400_000.0);
        set(&mut tree, RESERVES_AND_SURPLUS, 100_000.0);
        set(&mut tree, LONG_TERM_BORROWINGS, 200_000.0);
        set(&mut tree, SHORT_TERM_BORROWINGS, 50_000.0);
        set(&mut tree, PROPERTY_PLANT_AND_EQUIPMENT, 750_000.0);
        set(&mut tree, FINANCE_COSTS, 20_000.0);
        set(&mut tree, PROFIT_BEFORE_TAX, 80_000.0);

        let ratios = RatioEngine::ratios(&tree);
        let p = period();

        let de = ratios.get(RatioName::DebtEquity, &p).unwrap();
        assert!((de - 0.5).abs() < 1e-9);
        let debt_ratio = ratios.get(RatioName::DebtRatio, &p).unwrap();
        assert!((debt_ratio - 250_000.0 / 750_000.0).abs() < 1e-9);
        let coverage = ratios.get(RatioName::InterestCoverage, &p).unwrap();
        assert!((coverage - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_turnovers() {
        let mut tree = tree();
        set(&mut tree, REVENUE_FROM_OPERATIONS, 1_200_000.0);
        set(&mut tree, COST_OF_MATERIALS_CONSUMED, 800_000.0);
        set(&mut tree, INVENTORIES, 200_000.0);
        set(&mut tree, TRADE_RECEIVABLES, 300_000.0);
        set(&mut tree, TRADE_PAYABLES, 100_000.0);

        let ratios = RatioEngine::ratios(&tree);
        let p = period();

        assert!((ratios.get(RatioName::InventoryTurnover, &p).unwrap() - 4.0).abs() < 1e-9);
        assert!((ratios.get(RatioName::ReceivablesTurnover, &p).unwrap() - 4.0).abs() < 1e-9);
        assert!((ratios.get(RatioName::PayablesTurnover, &p).unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominators_are_undefined() {
        let mut tree = tree();
        set(&mut tree, CASH_AND_BANK_BALANCES, 100.0);
        set(&mut tree, TRADE_PAYABLES, 0.0);
        set(&mut tree, PROFIT_FOR_THE_PERIOD, 50.0);

        let ratios = RatioEngine::ratios(&tree);
        let p = period();

        for name in [
            RatioName::CurrentRatio,
            RatioName::QuickRatio,
            RatioName::CashRatio,
            RatioName::NetProfitMargin,
            RatioName::GrossProfitMargin,
            RatioName::DebtEquity,
            RatioName::InterestCoverage,
            RatioName::InventoryTurnover,
        ] {
            assert_eq!(ratios.get(name, &p), None, "{:?}", name);
        }
        // Total assets is non-zero
        assert!(ratios.get(RatioName::ReturnOnAssets, &p).is_some());
    }

    #[test]
    fn test_guarded_ratio_never_yields_nan() {
        assert_eq!(guarded_ratio(1.0, 0.0, RatioScale::Multiple), None);
        assert_eq!(guarded_ratio(0.0, 0.0, RatioScale::Percentage), None);
        assert_eq!(guarded_ratio(f64::MAX, 1e-300, RatioScale::Percentage), None);
        assert_eq!(guarded_ratio(1.0, 4.0, RatioScale::Percentage), Some(25.0));
    }

    #[test]
    fn test_tree_without_line_items() {
        let mut tree = tree();
        tree.balance_sheet = None;
        tree.profit_and_loss = None;
        assert_eq!(tree.line_item_count(), 0);

        let recomputed = RatioEngine::recompute(&tree);
        assert_eq!(recomputed.completeness, 0.0);
        for name in RatioName::ALL {
            let series = recomputed.ratios.series(name);
            assert_eq!(series.len(), tree.tracked_periods().len(), "{:?}", name);
            assert!(series.values().all(Option::is_none), "{:?}", name);
        }
    }

    #[test]
    fn test_completeness() {
        let mut tree = tree();
        assert_eq!(RatioEngine::completeness(&tree), 0.0);

        set(&mut tree, INVENTORIES, 10.0);
        let expected = 100.0 / tree.line_item_count() as f64;
        assert!((RatioEngine::completeness(&tree) - expected).abs() < 1e-9);

        // A value in any single period counts the whole line item
        let prior = ReportingPeriod::from("2022-23");
        for path in tree.line_item_paths() {
            let path: Vec<&str> = path.iter().map(String::as_str).collect();
            tree.set_value(&path, &prior, Some(1.0)).unwrap();
        }
        assert!((RatioEngine::completeness(&tree) - 100.0).abs() < 1e-9);
    }
}
