use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::OperationDraft;
use crate::domain::Operation;

use super::{arg, join_words, parse_amount, parse_day, parse_id, parse_kind, split_subcommand};

const USAGE: &str = "operation add <account> <category> <amount> <date> [description] [--type=<income|expense>]
operation show <id>
operation list [--account <id> | --category <id> | <start> <end>]
operation edit <id> <field>=<value>... (account, category, amount, date, description, type)
operation remove <id>";

const ADD_USAGE: &str = "operation add <account> <category> <amount> <date> [description]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "operation",
        "Book, edit and list income and expense operations",
        USAGE,
        cmd_operation,
    )
    .with_subcommands(&["add", "show", "list", "edit", "remove"])]
}

fn cmd_operation(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = split_subcommand(args) else {
        return list(context, &[]);
    };
    match sub.as_str() {
        "add" => add(context, rest),
        "show" => show(context, rest),
        "list" => list(context, rest),
        "edit" => edit(context, rest),
        "remove" | "delete" => remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown operation action `{other}`"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (flags, positional): (Vec<&str>, Vec<&str>) =
        args.iter().copied().partition(|value| value.starts_with("--"));

    let account_id = parse_id(arg(&positional, 0, ADD_USAGE)?)?;
    let category_id = parse_id(arg(&positional, 1, ADD_USAGE)?)?;
    let amount = parse_amount(arg(&positional, 2, ADD_USAGE)?)?;
    let date = parse_day(arg(&positional, 3, ADD_USAGE)?)?;
    let mut draft = OperationDraft::new(account_id, category_id, amount, date)
        .with_description(join_words(&positional[4..]));

    for flag in flags {
        match flag.strip_prefix("--type=") {
            Some(kind) => draft = draft.with_kind(parse_kind(kind)?),
            None => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{flag}`"
                )))
            }
        }
    }

    let operation = context.services.operations.create(draft)?;
    let account = context.services.accounts.get(operation.account_id)?;
    output::success(format!(
        "Operation #{} booked. Account #{} balance: {}",
        operation.id, account.id, account.balance
    ));
    Ok(())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(arg(args, 0, "operation show <id>")?)?;
    let operation = context.services.operations.get(id)?;
    output::section(format!("Operation #{}", operation.id));
    output::line(format!("  Type       : {}", operation.kind));
    output::line(format!("  Amount     : {}", operation.amount));
    output::line(format!("  Date       : {}", operation.date));
    output::line(format!("  Account    : #{}", operation.account_id));
    output::line(format!("  Category   : #{}", operation.category_id));
    if !operation.description.is_empty() {
        output::line(format!("  Description: {}", operation.description));
    }
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "operation list [--account <id> | --category <id> | <start> <end>]";
    let operations = match args {
        [] => context.services.operations.list(),
        ["--account", id] => context.services.operations.list_by_account(parse_id(id)?)?,
        ["--category", id] => context.services.operations.list_by_category(parse_id(id)?)?,
        [start, end] => context
            .services
            .operations
            .list_by_period(parse_day(start)?, parse_day(end)?)?,
        _ => return Err(CommandError::usage(usage)),
    };

    if operations.is_empty() {
        output::info("No operations found.");
        return Ok(());
    }
    output::section("Operations");
    output::table(
        &["ID", "Date", "Type", "Amount", "Account", "Category", "Description"],
        &rows(&operations),
    );
    Ok(())
}

fn rows(operations: &[Operation]) -> Vec<Vec<String>> {
    operations
        .iter()
        .map(|operation| {
            vec![
                operation.id.to_string(),
                operation.date.to_string(),
                operation.kind.as_code().to_string(),
                operation.amount.to_string(),
                operation.account_id.to_string(),
                operation.category_id.to_string(),
                operation.description.clone(),
            ]
        })
        .collect()
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "operation edit <id> <field>=<value>...";
    let id = parse_id(arg(args, 0, usage)?)?;
    let changes = &args[1..];
    if changes.is_empty() {
        return Err(CommandError::usage(usage));
    }

    let existing = context.services.operations.get(id)?;
    let mut draft = OperationDraft::from_operation(&existing);
    for change in changes {
        let Some((field, value)) = change.split_once('=') else {
            return Err(CommandError::usage(usage));
        };
        match field.to_ascii_lowercase().as_str() {
            "account" => draft.account_id = parse_id(value)?,
            "category" => draft.category_id = parse_id(value)?,
            "amount" => draft.amount = parse_amount(value)?,
            "date" => draft.date = parse_day(value)?,
            "description" => draft.description = value.trim().to_string(),
            "type" => draft.kind = Some(parse_kind(value)?),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown operation field `{other}`"
                )))
            }
        }
    }

    let updated = context.services.operations.update(id, draft)?;
    output::success(format!(
        "Operation #{} updated: {} {} on {}.",
        updated.id, updated.kind, updated.amount, updated.date
    ));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(arg(args, 0, "operation remove <id>")?)?;
    if !context.confirm(&format!("Remove operation #{id}?"))? {
        output::info("Removal cancelled.");
        return Ok(());
    }
    let removed = context.services.operations.delete(id)?;
    output::success(format!(
        "Operation #{} removed. Account #{} adjusted by {}.",
        removed.id,
        removed.account_id,
        removed.kind.reversed(removed.amount)
    ));
    Ok(())
}
