use chrono::NaiveDate;
use financial_statement_builder::{
    trailing_periods, EntityType, PeriodChange, RatioName, ReportingPeriod, StatementEdit,
    StatementSession, CASH_AND_BANK_BALANCES, COST_OF_MATERIALS_CONSUMED, INVENTORIES,
    PARTNERS_REMUNERATION, PROFIT_FOR_THE_PERIOD, REVENUE_FROM_OPERATIONS, TRADE_PAYABLES,
    TRADE_RECEIVABLES,
};

fn main() {
    let as_of = NaiveDate::from_ymd_opt(2024, 10, 18).unwrap();
    let periods = trailing_periods(as_of, 3, 2).expect("valid fiscal calendar");

    let mut session = StatementSession::new(EntityType::Partnership, periods)
        .expect("at least one period");

    let latest = ReportingPeriod::from("2023-24");
    let edits = vec![
        StatementEdit::set_value(TRADE_RECEIVABLES, latest.clone(), Some(500_000.0)),
        StatementEdit::set_value(CASH_AND_BANK_BALANCES, latest.clone(), Some(200_000.0)),
        StatementEdit::set_value(INVENTORIES, latest.clone(), Some(150_000.0)),
        StatementEdit::set_value(TRADE_PAYABLES, latest.clone(), Some(300_000.0)),
        StatementEdit::set_value(REVENUE_FROM_OPERATIONS, latest.clone(), Some(2_400_000.0)),
        StatementEdit::set_value(COST_OF_MATERIALS_CONSUMED, latest.clone(), Some(1_500_000.0)),
        StatementEdit::set_value(PARTNERS_REMUNERATION, latest.clone(), Some(240_000.0)),
        StatementEdit::set_value(PROFIT_FOR_THE_PERIOD, latest.clone(), Some(180_000.0)),
    ];
    session.apply_all(&edits).expect("edits target known line items");

    let next = ReportingPeriod::from("2024-25");
    if session.add_period(next.clone()) == PeriodChange::Added {
        println!("Now tracking {} periods", session.tree().tracked_periods().len());
    }

    println!("Completeness: {:.1}%", session.completeness());
    for name in RatioName::ALL {
        let values: Vec<String> = session
            .ratios()
            .series(name)
            .iter()
            .rev()
            .map(|(period, value)| match value {
                Some(v) => format!("{}={:.2}", period, v),
                None => format!("{}=n/a", period),
            })
            .collect();
        println!("{:?} ({:?}): {}", name, name.scale(), values.join(", "));
    }

    let submission = session.submission();
    for message in &submission.validation {
        println!("Validation: {}", message);
    }

    let json = submission.to_json().expect("submission serializes");
    println!("Submission payload is {} bytes", json.len());
}
