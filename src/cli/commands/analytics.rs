use chrono::NaiveDate;

use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::CategoryTotal;
use crate::domain::OperationKind;

use super::{arg, parse_day, split_subcommand};

const USAGE: &str = "analytics delta <start> <end>
analytics categories <start> <end>
analytics income <start> <end>
analytics expenses <start> <end>
analytics stats <start> <end>
analytics monthly <year>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "analytics",
        "Period totals, category breakdowns and monthly dynamics",
        USAGE,
        cmd_analytics,
    )
    .with_subcommands(&["delta", "categories", "income", "expenses", "stats", "monthly"])]
}

fn cmd_analytics(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = split_subcommand(args) else {
        return Err(CommandError::usage(USAGE));
    };
    match sub.as_str() {
        "delta" => delta(context, rest),
        "categories" => categories(context, rest),
        "income" => by_kind(context, rest, OperationKind::Income),
        "expenses" | "expense" => by_kind(context, rest, OperationKind::Expense),
        "stats" => stats(context, rest),
        "monthly" => monthly(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown analytics report `{other}`"
        ))),
    }
}

fn period(args: &[&str], usage: &str) -> Result<(NaiveDate, NaiveDate), CommandError> {
    let start = parse_day(arg(args, 0, usage)?)?;
    let end = parse_day(arg(args, 1, usage)?)?;
    Ok((start, end))
}

fn delta(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (start, end) = period(args, "analytics delta <start> <end>")?;
    let delta = context.services.analytics.period_delta(start, end)?;
    output::info(format!("Net change {start} .. {end}: {delta}"));
    Ok(())
}

fn categories(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (start, end) = period(args, "analytics categories <start> <end>")?;
    let summary = context.services.analytics.category_summary(start, end)?;
    if summary.is_empty() {
        output::info("No operations in this period.");
        return Ok(());
    }
    let totals: Vec<CategoryTotal> = summary.into_values().collect();
    output::section(format!("Categories {start} .. {end}"));
    print_totals(&totals);
    Ok(())
}

fn by_kind(context: &mut ShellContext, args: &[&str], kind: OperationKind) -> CommandResult {
    let (start, end) = period(args, "analytics income|expenses <start> <end>")?;
    let totals = context
        .services
        .analytics
        .category_totals_by_kind(start, end, kind)?;
    if totals.is_empty() {
        output::info(format!("No {} operations in this period.", kind.as_code().to_lowercase()));
        return Ok(());
    }
    output::section(format!("{kind} by category {start} .. {end}"));
    print_totals(&totals);
    Ok(())
}

fn print_totals(totals: &[CategoryTotal]) {
    let rows: Vec<Vec<String>> = totals
        .iter()
        .map(|total| {
            vec![
                total.category_id.to_string(),
                total.name.clone(),
                total.kind.as_code().to_string(),
                total.total.to_string(),
                total.operations.to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "Category", "Type", "Total", "Ops"], &rows);
}

fn stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (start, end) = period(args, "analytics stats <start> <end>")?;
    let stats = context.services.analytics.statistics(start, end)?;
    output::section(format!("Statistics {} .. {}", stats.start, stats.end));
    output::line(format!("  Income  : {}", stats.income_total));
    output::line(format!("  Expenses: {}", stats.expense_total));
    output::line(format!("  Delta   : {}", stats.delta));
    if !stats.income_by_category.is_empty() {
        output::section("Income by category");
        print_totals(&stats.income_by_category);
    }
    if !stats.expense_by_category.is_empty() {
        output::section("Expenses by category");
        print_totals(&stats.expense_by_category);
    }
    Ok(())
}

fn monthly(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = arg(args, 0, "analytics monthly <year>")?;
    let year: i32 = raw
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a year")))?;
    let months = context.services.analytics.monthly_dynamics(year)?;
    let rows: Vec<Vec<String>> = months
        .iter()
        .map(|row| {
            vec![
                format!("{year}-{:02}", row.month),
                row.income.to_string(),
                row.expense.to_string(),
                row.net().to_string(),
            ]
        })
        .collect();
    output::section(format!("Monthly dynamics {year}"));
    output::table(&["Month", "Income", "Expense", "Net"], &rows);
    Ok(())
}
