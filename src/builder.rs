use crate::error::{Result, StatementError};
use crate::period::{normalize_periods, ReportingPeriod};
use crate::schema::{schema_for, EntityType, ShapeNode};
use crate::tree::{Category, FinancialStatementTree, LineItem, StatementNode};
use log::{debug, info};

pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Builds an empty, fully shaped statement tree.
    ///
    /// Every line item of the entity's layout is present and keyed by every
    /// initial period with no value entered. Duplicate periods are dropped.
    pub fn build(
        entity_type: EntityType,
        initial_periods: impl IntoIterator<Item = ReportingPeriod>,
    ) -> Result<FinancialStatementTree> {
        let mut periods: Vec<ReportingPeriod> = initial_periods.into_iter().collect();
        normalize_periods(&mut periods);

        if periods.is_empty() {
            return Err(StatementError::EmptyPeriods);
        }

        let shape = schema_for(entity_type);
        info!(
            "Building {} statement tree with {} line items over {} periods",
            entity_type,
            shape.line_item_count(),
            periods.len()
        );

        let balance_sheet = instantiate(&shape.balance_sheet, &periods);
        let profit_and_loss = instantiate(&shape.profit_and_loss, &periods);

        debug!(
            "Tracked periods: {}",
            periods
                .iter()
                .map(ReportingPeriod::label)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(FinancialStatementTree {
            entity_type,
            periods,
            balance_sheet: Some(balance_sheet),
            profit_and_loss: Some(profit_and_loss),
        })
    }
}

fn instantiate(nodes: &[ShapeNode], periods: &[ReportingPeriod]) -> Category {
    let children = nodes
        .iter()
        .map(|node| {
            let built = match node {
                ShapeNode::Category { children, .. } => {
                    StatementNode::Category(instantiate(children, periods))
                }
                ShapeNode::LineItem { .. } => {
                    StatementNode::LineItem(LineItem::with_periods(periods))
                }
            };
            (node.name().to_string(), built)
        })
        .collect();

    Category { children }
}
