use crate::period::{normalize_periods, ReportingPeriod};
use crate::tree::FinancialStatementTree;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of a period operation. Rejections leave the tree untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodChange {
    Added,
    Removed,
    AlreadyTracked,
    NotTracked,
    LastPeriod,
}

impl PeriodChange {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Added | Self::Removed)
    }
}

impl FinancialStatementTree {
    /// Starts tracking `period` and gives every line item an empty slot for it.
    pub fn add_period(&mut self, period: ReportingPeriod) -> PeriodChange {
        if self.is_tracked(&period) {
            debug!("Period {} is already tracked; ignoring add", period);
            return PeriodChange::AlreadyTracked;
        }

        self.for_each_line_item_mut(|item| {
            item.values.insert(period.clone(), None);
        });

        debug!("Added period {}", period);
        self.periods.push(period);
        normalize_periods(&mut self.periods);
        PeriodChange::Added
    }

    /// Stops tracking `period` and drops its slot from every line item.
    ///
    /// At least one period always remains tracked.
    pub fn remove_period(&mut self, period: &ReportingPeriod) -> PeriodChange {
        if !self.is_tracked(period) {
            debug!("Period {} is not tracked; ignoring remove", period);
            return PeriodChange::NotTracked;
        }
        let distinct: BTreeSet<&ReportingPeriod> = self.periods.iter().collect();
        if distinct.len() == 1 {
            debug!("Refusing to remove {}, the last tracked period", period);
            return PeriodChange::LastPeriod;
        }

        self.for_each_line_item_mut(|item| {
            item.values.remove(period);
        });

        self.periods.retain(|p| p != period);
        debug!("Removed period {}", period);
        PeriodChange::Removed
    }
}
