use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::{arg, join_words, parse_id, parse_kind, split_subcommand};

const USAGE: &str = "category add <income|expense> <name>
category show <id>
category list [income|expense]
category edit <id> <income|expense> <name>
category remove <id>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "Manage income and expense categories",
        USAGE,
        cmd_category,
    )
    .with_subcommands(&["add", "show", "list", "edit", "remove"])]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
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
            "unknown category action `{other}`"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "category add <income|expense> <name>";
    let kind = parse_kind(arg(args, 0, usage)?)?;
    let name = join_words(&args[1..]);
    if name.is_empty() {
        return Err(CommandError::usage(usage));
    }
    let category = context.services.categories.create(&name, kind)?;
    output::success(format!(
        "{} category #{} `{}` created.",
        category.kind, category.id, category.name
    ));
    Ok(())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(arg(args, 0, "category show <id>")?)?;
    let category = context.services.categories.get(id)?;
    let operations = context.services.operations.list_by_category(id)?;
    output::section(format!("Category #{}", category.id));
    output::line(format!("  Name      : {}", category.name));
    output::line(format!("  Type      : {}", category.kind));
    output::line(format!("  Operations: {}", operations.len()));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let categories = match args.first() {
        Some(raw) => context.services.categories.list_by_kind(parse_kind(raw)?),
        None => context.services.categories.list(),
    };
    if categories.is_empty() {
        output::info("No categories found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|category| {
            vec![
                category.id.to_string(),
                category.kind.as_code().to_string(),
                category.name.clone(),
            ]
        })
        .collect();
    output::section("Categories");
    output::table(&["ID", "Type", "Name"], &rows);
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "category edit <id> <income|expense> <name>";
    let id = parse_id(arg(args, 0, usage)?)?;
    let kind = parse_kind(arg(args, 1, usage)?)?;
    let name = join_words(&args[2..]);
    if name.is_empty() {
        return Err(CommandError::usage(usage));
    }
    let category = context.services.categories.update(id, &name, kind)?;
    output::success(format!(
        "Category #{} is now {} `{}`.",
        category.id, category.kind, category.name
    ));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(arg(args, 0, "category remove <id>")?)?;
    let category = context.services.categories.get(id)?;
    if !context.confirm(&format!("Remove category `{}`?", category.name))? {
        output::info("Removal cancelled.");
        return Ok(());
    }
    context.services.categories.delete(id)?;
    output::success(format!("Category #{id} removed."));
    Ok(())
}
