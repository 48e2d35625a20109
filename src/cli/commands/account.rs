use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::BalanceCheck;
use crate::domain::Account;

use super::{arg, join_words, parse_id, split_subcommand};

const USAGE: &str = "account add <name>
account show <id>
account list
account rename <id> <name>
account remove <id>
account recalc <id>
account check [id]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "account",
        "Manage bank accounts and their balances",
        USAGE,
        cmd_account,
    )
    .with_subcommands(&["add", "show", "list", "rename", "remove", "recalc", "check"])]
}

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = split_subcommand(args) else {
        return list(context);
    };
    match sub.as_str() {
        "add" => add(context, rest),
        "show" => show(context, rest),
        "list" => list(context),
        "rename" => rename(context, rest),
        "remove" | "delete" => remove(context, rest),
        "recalc" => recalc(context, rest),
        "check" => check(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown account action `{other}`"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = join_words(args);
    if name.is_empty() {
        return Err(CommandError::usage("account add <name>"));
    }
    let account = context.services.accounts.create(&name)?;
    output::success(format!("Account #{} `{}` created.", account.id, account.name));
    Ok(())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(arg(args, 0, "account show <id>")?)?;
    let account = context.services.accounts.get(id)?;
    let operations = context.services.operations.list_by_account(id)?;
    output::section(format!("Account #{}", account.id));
    output::line(format!("  Name      : {}", account.name));
    output::line(format!("  Balance   : {}", account.balance));
    output::line(format!("  Operations: {}", operations.len()));
    output::line(format!("  Updated   : {}", account.updated_at.format("%Y-%m-%d %H:%M")));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let accounts = context.services.accounts.list();
    if accounts.is_empty() {
        output::info("No accounts yet. Use `account add <name>`.");
        return Ok(());
    }
    output::section("Accounts");
    output::table(&["ID", "Name", "Balance"], &rows(&accounts));
    Ok(())
}

fn rows(accounts: &[Account]) -> Vec<Vec<String>> {
    accounts
        .iter()
        .map(|account| {
            vec![
                account.id.to_string(),
                account.name.clone(),
                account.balance.to_string(),
            ]
        })
        .collect()
}

fn rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "account rename <id> <name>";
    let id = parse_id(arg(args, 0, usage)?)?;
    let name = join_words(&args[1..]);
    if name.is_empty() {
        return Err(CommandError::usage(usage));
    }
    let account = context.services.accounts.rename(id, &name)?;
    output::success(format!("Account #{} renamed to `{}`.", account.id, account.name));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(arg(args, 0, "account remove <id>")?)?;
    let account = context.services.accounts.get(id)?;
    if !context.confirm(&format!("Remove account `{}`?", account.name))? {
        output::info("Removal cancelled.");
        return Ok(());
    }
    context.services.accounts.delete(id)?;
    output::success(format!("Account #{id} removed."));
    Ok(())
}

fn recalc(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(arg(args, 0, "account recalc <id>")?)?;
    let account = context.services.accounts.recalculate_balance(id)?;
    output::success(format!(
        "Account #{} balance recalculated: {}",
        account.id, account.balance
    ));
    Ok(())
}

fn check(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ids = match args.first() {
        Some(raw) => vec![parse_id(raw)?],
        None => context
            .services
            .accounts
            .list()
            .into_iter()
            .map(|account| account.id)
            .collect(),
    };

    let mut drifted = 0usize;
    for id in ids {
        let check = context.services.accounts.verify_balance(id)?;
        report_check(&check);
        if !check.is_consistent() {
            drifted += 1;
        }
    }
    if drifted == 0 {
        output::success("All checked balances match their operations.");
    } else {
        output::hint("Run `account recalc <id>` to repair drifted balances.");
    }
    Ok(())
}

fn report_check(check: &BalanceCheck) {
    if check.is_consistent() {
        output::info(format!("Account #{}: {} (consistent)", check.account_id, check.stored));
    } else {
        output::warning(format!(
            "Account #{}: stored {} but operations give {} (drift {})",
            check.account_id,
            check.stored,
            check.recomputed,
            check.drift()
        ));
    }
}
