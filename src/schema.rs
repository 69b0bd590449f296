use crate::error::StatementError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    #[schemars(description = "Generic incorporated company")]
    Corporate,

    #[schemars(description = "Private limited company")]
    PrivateLimited,

    #[schemars(description = "Public limited company")]
    PublicLimited,

    #[schemars(description = "Company with a single member")]
    OnePersonCompany,

    #[schemars(description = "General partnership firm (partners' remuneration is reported)")]
    Partnership,

    #[schemars(
        description = "Limited liability partnership (partners' remuneration is reported)"
    )]
    LimitedLiabilityPartnership,

    #[schemars(description = "Sole proprietorship")]
    Proprietorship,

    #[schemars(description = "Registered trust")]
    Trust,

    #[schemars(description = "Registered society")]
    Society,
}

impl EntityType {
    pub const ALL: [EntityType; 9] = [
        Self::Corporate,
        Self::PrivateLimited,
        Self::PublicLimited,
        Self::OnePersonCompany,
        Self::Partnership,
        Self::LimitedLiabilityPartnership,
        Self::Proprietorship,
        Self::Trust,
        Self::Society,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corporate => "corporate",
            Self::PrivateLimited => "private_limited",
            Self::PublicLimited => "public_limited",
            Self::OnePersonCompany => "one_person_company",
            Self::Partnership => "partnership",
            Self::LimitedLiabilityPartnership => "limited_liability_partnership",
            Self::Proprietorship => "proprietorship",
            Self::Trust => "trust",
            Self::Society => "society",
        }
    }

    /// Partnership-like entities report partners' remuneration as a separate expense.
    pub fn is_partnership_like(&self) -> bool {
        matches!(self, Self::Partnership | Self::LimitedLiabilityPartnership)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|entity| entity.as_str() == tag)
            .or(match tag.as_str() {
                "llp" => Some(Self::LimitedLiabilityPartnership),
                "opc" => Some(Self::OnePersonCompany),
                _ => None,
            })
            .ok_or_else(|| StatementError::UnknownEntityType(s.to_string()))
    }
}

pub const BALANCE_SHEET: &str = "balance_sheet";
pub const PROFIT_AND_LOSS: &str = "profit_and_loss";

// Designated line items read by the ratio engine and validation.
pub const SHARE_CAPITAL: &[&str] = &[
    BALANCE_SHEET,
    "owners_funds_and_liabilities",
    "shareholders_funds",
    "share_capital",
];
pub const RESERVES_AND_SURPLUS: &[&str] = &[
    BALANCE_SHEET,
    "owners_funds_and_liabilities",
    "shareholders_funds",
    "reserves_and_surplus",
];
pub const LONG_TERM_BORROWINGS: &[&str] = &[
    BALANCE_SHEET,
    "owners_funds_and_liabilities",
    "non_current_liabilities",
    "long_term_borrowings",
];
pub const SHORT_TERM_BORROWINGS: &[&str] = &[
    BALANCE_SHEET,
    "owners_funds_and_liabilities",
    "current_liabilities",
    "short_term_borrowings",
];
pub const TRADE_PAYABLES: &[&str] = &[
    BALANCE_SHEET,
    "owners_funds_and_liabilities",
    "current_liabilities",
    "trade_payables",
];
pub const OTHER_CURRENT_LIABILITIES: &[&str] = &[
    BALANCE_SHEET,
    "owners_funds_and_liabilities",
    "current_liabilities",
    "other_current_liabilities",
];
pub const SHORT_TERM_PROVISIONS: &[&str] = &[
    BALANCE_SHEET,
    "owners_funds_and_liabilities",
    "current_liabilities",
    "short_term_provisions",
];

pub const PROPERTY_PLANT_AND_EQUIPMENT: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "non_current_assets",
    "property_plant_and_equipment",
];
pub const INTANGIBLE_ASSETS: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "non_current_assets",
    "intangible_assets",
];
pub const CAPITAL_WORK_IN_PROGRESS: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "non_current_assets",
    "capital_work_in_progress",
];
pub const NON_CURRENT_INVESTMENTS: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "non_current_assets",
    "non_current_investments",
];
pub const LONG_TERM_LOANS_AND_ADVANCES: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "non_current_assets",
    "long_term_loans_and_advances",
];

pub const CURRENT_INVESTMENTS: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "current_assets",
    "current_investments",
];
pub const INVENTORIES: &[&str] = &[BALANCE_SHEET, "assets", "current_assets", "inventories"];
pub const TRADE_RECEIVABLES: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "current_assets",
    "trade_receivables",
];
pub const CASH_AND_BANK_BALANCES: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "current_assets",
    "cash_and_bank_balances",
];
pub const SHORT_TERM_LOANS_AND_ADVANCES: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "current_assets",
    "short_term_loans_and_advances",
];
pub const OTHER_CURRENT_ASSETS: &[&str] = &[
    BALANCE_SHEET,
    "assets",
    "current_assets",
    "other_current_assets",
];

pub const REVENUE_FROM_OPERATIONS: &[&str] = &[
    PROFIT_AND_LOSS,
    "income",
    "revenue_from_operations",
];
pub const COST_OF_MATERIALS_CONSUMED: &[&str] = &[
    PROFIT_AND_LOSS,
    "expenses",
    "cost_of_materials_consumed",
];
pub const FINANCE_COSTS: &[&str] = &[PROFIT_AND_LOSS, "expenses", "finance_costs"];
pub const PARTNERS_REMUNERATION: &[&str] = &[PROFIT_AND_LOSS, "expenses", "partners_remuneration"];
pub const PROFIT_BEFORE_TAX: &[&str] = &[
    PROFIT_AND_LOSS,
    "profit_computations",
    "profit_before_tax",
];
pub const PROFIT_FOR_THE_PERIOD: &[&str] = &[PROFIT_AND_LOSS, "profit_for_the_period"];

pub const CURRENT_ASSET_ITEMS: [&[&str]; 6] = [
    CURRENT_INVESTMENTS,
    INVENTORIES,
    TRADE_RECEIVABLES,
    CASH_AND_BANK_BALANCES,
    SHORT_TERM_LOANS_AND_ADVANCES,
    OTHER_CURRENT_ASSETS,
];

pub const CURRENT_LIABILITY_ITEMS: [&[&str]; 4] = [
    SHORT_TERM_BORROWINGS,
    TRADE_PAYABLES,
    OTHER_CURRENT_LIABILITIES,
    SHORT_TERM_PROVISIONS,
];

pub const NON_CURRENT_ASSET_ITEMS: [&[&str]; 5] = [
    PROPERTY_PLANT_AND_EQUIPMENT,
    INTANGIBLE_ASSETS,
    CAPITAL_WORK_IN_PROGRESS,
    NON_CURRENT_INVESTMENTS,
    LONG_TERM_LOANS_AND_ADVANCES,
];

/// One node of the statement layout, before any period is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeNode {
    Category {
        name: &'static str,
        children: Vec<ShapeNode>,
    },
    LineItem {
        name: &'static str,
    },
}

impl ShapeNode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Category { name, .. } | Self::LineItem { name } => *name,
        }
    }

    fn line_item_count(&self) -> usize {
        match self {
            Self::Category { children, .. } => {
                children.iter().map(ShapeNode::line_item_count).sum()
            }
            Self::LineItem { .. } => 1,
        }
    }
}

fn category(name: &'static str, children: Vec<ShapeNode>) -> ShapeNode {
    ShapeNode::Category { name, children }
}

fn items(names: &[&'static str]) -> Vec<ShapeNode> {
    names
        .iter()
        .map(|&name| ShapeNode::LineItem { name })
        .collect()
}

/// Children of the two statement roots for a given entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeShape {
    pub balance_sheet: Vec<ShapeNode>,
    pub profit_and_loss: Vec<ShapeNode>,
}

impl TreeShape {
    pub fn line_item_count(&self) -> usize {
        self.balance_sheet
            .iter()
            .chain(self.profit_and_loss.iter())
            .map(ShapeNode::line_item_count)
            .sum()
    }
}

/// The statement layout for `entity_type`.
///
/// Every entity gets the same balance sheet. The profit and loss statement
/// carries `partners_remuneration` only for partnership-like entities.
pub fn schema_for(entity_type: EntityType) -> TreeShape {
    let balance_sheet = vec![
        category(
            "owners_funds_and_liabilities",
            vec![
                category(
                    "shareholders_funds",
                    items(&["share_capital", "reserves_and_surplus"]),
                ),
                category(
                    "non_current_liabilities",
                    items(&[
                        "long_term_borrowings",
                        "deferred_tax_liabilities",
                        "other_long_term_liabilities",
                        "long_term_provisions",
                    ]),
                ),
                category(
                    "current_liabilities",
                    items(&[
                        "short_term_borrowings",
                        "trade_payables",
                        "other_current_liabilities",
                        "short_term_provisions",
                    ]),
                ),
            ],
        ),
        category(
            "assets",
            vec![
                category(
                    "non_current_assets",
                    items(&[
                        "property_plant_and_equipment",
                        "intangible_assets",
                        "capital_work_in_progress",
                        "non_current_investments",
                        "long_term_loans_and_advances",
                    ]),
                ),
                category(
                    "current_assets",
                    items(&[
                        "current_investments",
                        "inventories",
                        "trade_receivables",
                        "cash_and_bank_balances",
                        "short_term_loans_and_advances",
                        "other_current_assets",
                    ]),
                ),
            ],
        ),
    ];

    let mut expenses = items(&[
        "cost_of_materials_consumed",
        "purchases_of_stock_in_trade",
        "changes_in_inventories",
        "employee_benefits_expense",
        "finance_costs",
        "depreciation_and_amortisation",
        "other_expenses",
    ]);
    if entity_type.is_partnership_like() {
        expenses.push(ShapeNode::LineItem {
            name: "partners_remuneration",
        });
    }

    let profit_and_loss = vec![
        category(
            "income",
            items(&["revenue_from_operations", "other_income"]),
        ),
        category("expenses", expenses),
        category(
            "profit_computations",
            items(&[
                "profit_before_exceptional_items",
                "exceptional_items",
                "profit_before_tax",
            ]),
        ),
        category("tax", items(&["current_tax", "deferred_tax"])),
        ShapeNode::LineItem {
            name: "profit_for_the_period",
        },
    ];

    TreeShape {
        balance_sheet,
        profit_and_loss,
    }
}
