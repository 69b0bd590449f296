//! # Financial Statement Builder
//!
//! A multi-year financial statement model for manual data entry, with a pure
//! engine that derives standard financial ratios from it.
//!
//! ## Core Concepts
//!
//! - **Statement Tree**: A balance sheet and a profit and loss statement made of
//!   categories and line items, shaped by the entity type
//! - **Reporting Periods**: Fiscal year labels (e.g. `"2023-24"`) forming the column
//!   axis; every line item holds exactly one slot per tracked period
//! - **Absent Values**: A slot with nothing entered is `None`, which is distinct from zero
//! - **Ratio Set**: Liquidity, profitability, leverage and efficiency ratios per period,
//!   rebuilt from scratch after every edit
//! - **Completeness**: Percentage of line items with at least one value entered
//!
//! ## Example
//!
//! ```rust
//! use financial_statement_builder::*;
//!
//! let mut session = StatementSession::new(
//!     EntityType::Corporate,
//!     vec![ReportingPeriod::from("2023-24"), ReportingPeriod::from("2022-23")],
//! )
//! .unwrap();
//!
//! let period = ReportingPeriod::from("2023-24");
//! session.set_value(TRADE_RECEIVABLES, &period, Some(500_000.0)).unwrap();
//! session.set_value(CASH_AND_BANK_BALANCES, &period, Some(200_000.0)).unwrap();
//! session.set_value(TRADE_PAYABLES, &period, Some(300_000.0)).unwrap();
//!
//! let current = session.ratios().get(RatioName::CurrentRatio, &period).unwrap();
//! assert!((current - 2.33).abs() < 0.01);
//! ```

pub mod balancer;
pub mod builder;
pub mod edits;
pub mod error;
pub mod period;
pub mod period_manager;
pub mod ratios;
pub mod schema;
pub mod tree;
pub mod utils;
pub mod validation;

pub use balancer::{BalanceSheetBalancer, BalanceSheetTotals};
pub use builder::SchemaBuilder;
pub use edits::{apply_edit, apply_edits, EditOutcome, StatementEdit};
pub use error::{Result, StatementError};
pub use period::{trailing_periods, ReportingPeriod};
pub use period_manager::PeriodChange;
pub use ratios::*;
pub use schema::*;
pub use tree::{Category, FinancialStatementTree, LineItem, StatementNode};
pub use validation::{validate, validate_with, ValidationOptions};

use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything handed back to the onboarding workflow on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Submission {
    pub tree: FinancialStatementTree,
    pub ratios: RatioSet,
    /// Percentage (0-100) of line items with at least one entered value.
    pub completeness: f64,
    pub validation: Vec<String>,
}

impl Submission {
    pub fn is_valid(&self) -> bool {
        self.validation.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Submission)
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = Self::generate_json_schema();
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

/// One editing session over one statement tree.
///
/// Every edit is followed by a full recompute before the call returns, so the
/// ratios and completeness always match the tree.
#[derive(Debug, Clone)]
pub struct StatementSession {
    tree: FinancialStatementTree,
    derived: Recomputation,
}

impl StatementSession {
    pub fn new(
        entity_type: EntityType,
        initial_periods: impl IntoIterator<Item = ReportingPeriod>,
    ) -> Result<Self> {
        let tree = SchemaBuilder::build(entity_type, initial_periods)?;
        Self::from_tree(tree)
    }

    /// Resumes a session over an existing tree. The tree must pass
    /// [`FinancialStatementTree::into_checked`].
    pub fn from_tree(tree: FinancialStatementTree) -> Result<Self> {
        let tree = tree.into_checked()?;
        let derived = RatioEngine::recompute(&tree);
        Ok(Self { tree, derived })
    }

    pub fn tree(&self) -> &FinancialStatementTree {
        &self.tree
    }

    pub fn ratios(&self) -> &RatioSet {
        &self.derived.ratios
    }

    pub fn completeness(&self) -> f64 {
        self.derived.completeness
    }

    fn refresh(&mut self) {
        self.derived = RatioEngine::recompute(&self.tree);
    }

    pub fn set_value(
        &mut self,
        path: &[&str],
        period: &ReportingPeriod,
        value: Option<f64>,
    ) -> Result<()> {
        self.tree.set_value(path, period, value)?;
        self.refresh();
        Ok(())
    }

    pub fn add_period(&mut self, period: ReportingPeriod) -> PeriodChange {
        let change = self.tree.add_period(period);
        if change.is_applied() {
            self.refresh();
        }
        change
    }

    pub fn remove_period(&mut self, period: &ReportingPeriod) -> PeriodChange {
        let change = self.tree.remove_period(period);
        if change.is_applied() {
            self.refresh();
        }
        change
    }

    pub fn apply(&mut self, edit: &StatementEdit) -> Result<EditOutcome> {
        let outcome = apply_edit(&mut self.tree, edit)?;
        if outcome.changed_tree() {
            self.refresh();
        }
        Ok(outcome)
    }

    /// Applies edits in order. On the first malformed edit the earlier ones
    /// stay applied and the derived figures reflect them.
    pub fn apply_all(&mut self, edits: &[StatementEdit]) -> Result<Vec<EditOutcome>> {
        let result = apply_edits(&mut self.tree, edits);
        self.refresh();
        debug!("Applied batch of {} edits", edits.len());
        result
    }

    pub fn validate(&self) -> Vec<String> {
        validate(&self.tree)
    }

    pub fn submission(&self) -> Submission {
        self.submission_with(&ValidationOptions::default())
    }

    pub fn submission_with(&self, options: &ValidationOptions) -> Submission {
        let validation = validate_with(&self.tree, options);
        info!(
            "Prepared {} submission: {:.1}% complete, {} validation messages",
            self.tree.entity_type,
            self.derived.completeness,
            validation.len()
        );
        Submission {
            tree: self.tree.clone(),
            ratios: self.derived.ratios.clone(),
            completeness: self.derived.completeness,
            validation,
        }
    }
}
