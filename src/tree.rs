use crate::error::{Result, StatementError};
use crate::period::{normalize_periods, ReportingPeriod};
use crate::schema::{EntityType, BALANCE_SHEET, PROFIT_AND_LOSS};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A leaf figure: one value slot per tracked period. `None` means not yet entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    pub values: BTreeMap<ReportingPeriod, Option<f64>>,
}

impl LineItem {
    pub fn with_periods<'a>(periods: impl IntoIterator<Item = &'a ReportingPeriod>) -> Self {
        Self {
            values: periods.into_iter().map(|p| (p.clone(), None)).collect(),
        }
    }

    pub fn value(&self, period: &ReportingPeriod) -> Option<f64> {
        self.values.get(period).copied().flatten()
    }

    /// True when any period holds an entered value.
    pub fn is_filled(&self) -> bool {
        self.values.values().any(Option::is_some)
    }

    pub fn has_period_keys(&self, periods: &[ReportingPeriod]) -> bool {
        self.values.len() == periods.len() && periods.iter().all(|p| self.values.contains_key(p))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    pub children: BTreeMap<String, StatementNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementNode {
    Category(Category),
    LineItem(LineItem),
}

impl Category {
    pub fn node(&self, path: &[&str]) -> Option<&StatementNode> {
        let (head, rest) = path.split_first()?;
        let child = self.children.get(*head)?;
        if rest.is_empty() {
            return Some(child);
        }
        match child {
            StatementNode::Category(category) => category.node(rest),
            StatementNode::LineItem(_) => None,
        }
    }

    pub fn node_mut(&mut self, path: &[&str]) -> Option<&mut StatementNode> {
        let (head, rest) = path.split_first()?;
        let child = self.children.get_mut(*head)?;
        if rest.is_empty() {
            return Some(child);
        }
        match child {
            StatementNode::Category(category) => category.node_mut(rest),
            StatementNode::LineItem(_) => None,
        }
    }

    /// Depth-first walk over every line item beneath this category.
    pub fn for_each_line_item<'a>(
        &'a self,
        prefix: &mut Vec<&'a str>,
        f: &mut impl FnMut(&[&'a str], &'a LineItem),
    ) {
        for (name, child) in &self.children {
            prefix.push(name.as_str());
            match child {
                StatementNode::Category(category) => category.for_each_line_item(prefix, f),
                StatementNode::LineItem(item) => f(prefix.as_slice(), item),
            }
            prefix.pop();
        }
    }

    pub fn for_each_line_item_mut(&mut self, f: &mut impl FnMut(&mut LineItem)) {
        for child in self.children.values_mut() {
            match child {
                StatementNode::Category(category) => category.for_each_line_item_mut(f),
                StatementNode::LineItem(item) => f(item),
            }
        }
    }
}

/// The balance sheet and profit and loss statement for one entity over a set
/// of reporting periods.
///
/// Every line item holds exactly one slot per tracked period. Periods are kept
/// deduplicated and most recent first. Deserialization runs
/// [`FinancialStatementTree::into_checked`].
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FinancialStatementTree {
    pub entity_type: EntityType,
    pub(crate) periods: Vec<ReportingPeriod>,
    pub balance_sheet: Option<Category>,
    pub profit_and_loss: Option<Category>,
}

#[derive(Deserialize)]
struct TreeParts {
    entity_type: EntityType,
    periods: Vec<ReportingPeriod>,
    balance_sheet: Option<Category>,
    profit_and_loss: Option<Category>,
}

impl<'de> Deserialize<'de> for FinancialStatementTree {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parts = TreeParts::deserialize(deserializer)?;
        let tree = Self {
            entity_type: parts.entity_type,
            periods: parts.periods,
            balance_sheet: parts.balance_sheet,
            profit_and_loss: parts.profit_and_loss,
        };
        tree.into_checked().map_err(serde::de::Error::custom)
    }
}

impl FinancialStatementTree {
    /// Normalizes the tracked periods and checks that every line item is keyed
    /// by exactly those periods.
    pub fn into_checked(mut self) -> Result<Self> {
        normalize_periods(&mut self.periods);
        if self.periods.is_empty() {
            warn!("Rejected {} statement tree with no tracked periods", self.entity_type);
            return Err(StatementError::EmptyPeriods);
        }

        let mismatched = self.mismatched_line_items();
        if let Some(path) = mismatched.first() {
            warn!(
                "Rejected {} statement tree: {} line items out of sync with tracked periods",
                self.entity_type,
                mismatched.len()
            );
            return Err(StatementError::PeriodKeyMismatch(path.clone()));
        }
        Ok(self)
    }

    pub fn tracked_periods(&self) -> &[ReportingPeriod] {
        &self.periods
    }

    pub fn is_tracked(&self, period: &ReportingPeriod) -> bool {
        self.periods.contains(period)
    }

    fn root(&self, name: &str) -> Option<&Category> {
        match name {
            BALANCE_SHEET => self.balance_sheet.as_ref(),
            PROFIT_AND_LOSS => self.profit_and_loss.as_ref(),
            _ => None,
        }
    }

    fn root_mut(&mut self, name: &str) -> Option<&mut Category> {
        match name {
            BALANCE_SHEET => self.balance_sheet.as_mut(),
            PROFIT_AND_LOSS => self.profit_and_loss.as_mut(),
            _ => None,
        }
    }

    /// Node at `path`, where the first segment names the statement
    /// (`"balance_sheet"` or `"profit_and_loss"`).
    pub fn node(&self, path: &[&str]) -> Option<&StatementNode> {
        let (root, rest) = path.split_first()?;
        self.root(root)?.node(rest)
    }

    pub fn category(&self, path: &[&str]) -> Result<&Category> {
        if let [root] = path {
            return self
                .root(root)
                .ok_or_else(|| StatementError::UnknownPath(join_path(path)));
        }
        match self.node(path) {
            Some(StatementNode::Category(category)) => Ok(category),
            Some(StatementNode::LineItem(_)) => Err(StatementError::NotACategory(join_path(path))),
            None => Err(StatementError::UnknownPath(join_path(path))),
        }
    }

    pub fn line_item(&self, path: &[&str]) -> Result<&LineItem> {
        match self.node(path) {
            Some(StatementNode::LineItem(item)) => Ok(item),
            Some(StatementNode::Category(_)) => Err(StatementError::NotALineItem(join_path(path))),
            None => Err(StatementError::UnknownPath(join_path(path))),
        }
    }

    pub fn contains_line_item(&self, path: &[&str]) -> bool {
        matches!(self.node(path), Some(StatementNode::LineItem(_)))
    }

    /// Entered value at `path` for `period`; `None` when absent or the item does not exist.
    pub fn value(&self, path: &[&str], period: &ReportingPeriod) -> Option<f64> {
        self.line_item(path).ok()?.value(period)
    }

    /// Writes or clears a single figure.
    pub fn set_value(
        &mut self,
        path: &[&str],
        period: &ReportingPeriod,
        value: Option<f64>,
    ) -> Result<()> {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(StatementError::InvalidValue {
                    path: join_path(path),
                    value: v,
                });
            }
        }
        if !self.is_tracked(period) {
            return Err(StatementError::UntrackedPeriod(period.to_string()));
        }

        let node = match path.split_first() {
            Some((root, rest)) => self.root_mut(root).and_then(|r| r.node_mut(rest)),
            None => None,
        };
        match node {
            Some(StatementNode::LineItem(item)) => {
                item.values.insert(period.clone(), value);
                Ok(())
            }
            Some(StatementNode::Category(_)) => Err(StatementError::NotALineItem(join_path(path))),
            None => Err(StatementError::UnknownPath(join_path(path))),
        }
    }

    pub fn for_each_line_item<'a>(&'a self, mut f: impl FnMut(&[&'a str], &'a LineItem)) {
        for (name, root) in self.roots() {
            let mut prefix = vec![name];
            root.for_each_line_item(&mut prefix, &mut f);
        }
    }

    pub(crate) fn for_each_line_item_mut(&mut self, mut f: impl FnMut(&mut LineItem)) {
        for root in [self.balance_sheet.as_mut(), self.profit_and_loss.as_mut()]
            .into_iter()
            .flatten()
        {
            root.for_each_line_item_mut(&mut f);
        }
    }

    fn roots(&self) -> impl Iterator<Item = (&'static str, &Category)> {
        [
            (BALANCE_SHEET, self.balance_sheet.as_ref()),
            (PROFIT_AND_LOSS, self.profit_and_loss.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, root)| Some((name, root?)))
    }

    /// Full path of every line item, in walk order.
    pub fn line_item_paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        self.for_each_line_item(|path, _| {
            paths.push(path.iter().map(|s| s.to_string()).collect());
        });
        paths
    }

    pub fn line_item_count(&self) -> usize {
        let mut count = 0;
        self.for_each_line_item(|_, _| count += 1);
        count
    }

    /// Sum of the entered values at `paths` for `period`, treating absent as zero.
    pub fn sum(&self, paths: &[&[&str]], period: &ReportingPeriod) -> f64 {
        paths
            .iter()
            .map(|path| self.value(path, period).unwrap_or(0.0))
            .sum()
    }

    /// Sum of every line item beneath the category at `path` for `period`.
    pub fn category_total(&self, path: &[&str], period: &ReportingPeriod) -> Result<f64> {
        let category = self.category(path)?;
        let mut total = 0.0;
        category.for_each_line_item(&mut Vec::new(), &mut |_, item| {
            total += item.value(period).unwrap_or(0.0);
        });
        Ok(total)
    }

    /// Paths of line items whose period keys differ from the tracked set.
    pub fn mismatched_line_items(&self) -> Vec<String> {
        let tracked: BTreeSet<&ReportingPeriod> = self.periods.iter().collect();
        let mut mismatched = Vec::new();
        self.for_each_line_item(|path, item| {
            let keys: BTreeSet<&ReportingPeriod> = item.values.keys().collect();
            if keys != tracked {
                mismatched.push(path.join("."));
            }
        });
        mismatched
    }
}

pub(crate) fn join_path(path: &[&str]) -> String {
    path.join(".")
}
