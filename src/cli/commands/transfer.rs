use std::path::PathBuf;

use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::transfer::FileFormat;

const FORMATS: &[&str] = &["csv", "json", "yaml"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write accounts, categories and operations to a directory",
            "export [directory] [csv|json|yaml]",
            cmd_export,
        )
        .with_subcommands(FORMATS),
        CommandEntry::new(
            "import",
            "Load accounts, categories and operations from a directory",
            "import [directory] [csv|json|yaml]",
            cmd_import,
        )
        .with_subcommands(FORMATS),
    ]
}

/// Directory and format from the arguments, in either order, falling back to the config.
fn target(context: &ShellContext, args: &[&str], usage: &str) -> Result<(PathBuf, FileFormat), CommandError> {
    if args.len() > 2 {
        return Err(CommandError::usage(usage));
    }
    let mut dir = None;
    let mut format = None;
    for &value in args {
        match value.parse::<FileFormat>() {
            Ok(parsed) if format.is_none() => format = Some(parsed),
            _ if dir.is_none() => dir = Some(PathBuf::from(value)),
            _ => return Err(CommandError::usage(usage)),
        }
    }
    Ok((
        dir.unwrap_or_else(|| context.data_dir()),
        format.unwrap_or(context.config.default_format),
    ))
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (dir, format) = target(context, args, "export [directory] [csv|json|yaml]")?;
    let report = context.services.transfer.export_all(&dir, format)?;
    output::success(format!(
        "Exported {} accounts, {} categories and {} operations as {} to {}.",
        report.accounts,
        report.categories,
        report.operations,
        report.format,
        dir.display()
    ));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (dir, format) = target(context, args, "import [directory] [csv|json|yaml]")?;
    if !context.confirm(&format!(
        "Import {format} files from {}? Matching ids will be replaced.",
        dir.display()
    ))? {
        output::info("Import cancelled.");
        return Ok(());
    }
    let report = context.services.transfer.import_all(&dir, format)?;
    for warning in &report.warnings {
        output::warning(format!(
            "Account #{} `{}`: file balance {} replaced by {} from its operations.",
            warning.account_id, warning.name, warning.recorded, warning.recomputed
        ));
    }
    output::success(format!(
        "Imported {} accounts, {} categories and {} operations from {}.",
        report.accounts,
        report.categories,
        report.operations,
        dir.display()
    ));
    Ok(())
}
