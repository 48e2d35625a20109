mod common;

use common::{book, date, sample_book};
use finance_core::domain::OperationKind;
use finance_core::LedgerError;
use rust_decimal_macros::dec;

#[test]
fn january_delta_nets_income_against_expense() {
    let sample = sample_book();
    let delta = sample
        .services
        .analytics
        .period_delta(date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();
    assert_eq!(delta, dec!(800));
}

#[test]
fn period_bounds_are_inclusive() {
    let sample = sample_book();
    let analytics = &sample.services.analytics;
    assert_eq!(
        analytics.period_delta(date(2024, 1, 10), date(2024, 1, 10)).unwrap(),
        dec!(1000)
    );
    assert_eq!(
        analytics.period_delta(date(2024, 1, 11), date(2024, 1, 14)).unwrap(),
        dec!(0)
    );
}

#[test]
fn reversed_period_is_rejected() {
    let sample = sample_book();
    let err = sample
        .services
        .analytics
        .period_delta(date(2024, 2, 1), date(2024, 1, 1))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn category_summary_only_lists_active_categories() {
    let sample = sample_book();
    let summary = sample
        .services
        .analytics
        .category_summary(date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary[&sample.salary].total, dec!(1000));
    assert_eq!(summary[&sample.groceries].total, dec!(200));
    assert_eq!(summary[&sample.groceries].kind, OperationKind::Expense);

    let february = sample
        .services
        .analytics
        .category_summary(date(2024, 2, 1), date(2024, 2, 29))
        .unwrap();
    assert!(!february.contains_key(&sample.groceries));
}

#[test]
fn totals_by_kind_rank_largest_first() {
    let sample = sample_book();
    let services = &sample.services;
    let bonus = common::category(services, "Bonus", OperationKind::Income);
    book(services, sample.savings, bonus, dec!(5000), date(2024, 1, 20));

    let income = services
        .analytics
        .category_totals_by_kind(date(2024, 1, 1), date(2024, 12, 31), OperationKind::Income)
        .unwrap();
    let names: Vec<_> = income.iter().map(|total| total.name.as_str()).collect();
    assert_eq!(names, vec!["Bonus", "C1"]);
    assert_eq!(income[1].total, dec!(1500));
    assert_eq!(income[1].operations, 2);
    assert!(income.iter().all(|total| total.kind == OperationKind::Income));
}

#[test]
fn statistics_split_income_and_expense() {
    let sample = sample_book();
    let stats = sample
        .services
        .analytics
        .statistics(date(2024, 1, 1), date(2024, 2, 29))
        .unwrap();
    assert_eq!(stats.income_total, dec!(1500));
    assert_eq!(stats.expense_total, dec!(200));
    assert_eq!(stats.delta, dec!(1300));
    assert_eq!(stats.income_by_category.len(), 1);
    assert_eq!(stats.expense_by_category.len(), 1);
}

#[test]
fn monthly_dynamics_fill_every_month() {
    let sample = sample_book();
    let months = sample.services.analytics.monthly_dynamics(2024).unwrap();

    assert_eq!(months.len(), 12);
    assert_eq!((months[0].income, months[0].expense), (dec!(1000), dec!(200)));
    assert_eq!((months[1].income, months[1].expense), (dec!(500), dec!(0)));
    assert!(months[2..]
        .iter()
        .all(|row| row.income.is_zero() && row.expense.is_zero()));
    assert_eq!(months[0].net(), dec!(800));
}

#[test]
fn monthly_dynamics_reject_years_out_of_range() {
    let sample = sample_book();
    let analytics = &sample.services.analytics;
    // Clock is frozen in 2025, so 2026 is the last accepted year.
    assert!(analytics.monthly_dynamics(2026).is_ok());
    assert!(matches!(
        analytics.monthly_dynamics(2027),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        analytics.monthly_dynamics(1999),
        Err(LedgerError::Validation(_))
    ));
}
