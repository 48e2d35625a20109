use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::help;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Finance Core {}", meta.version));
    output::line(format!("  CLI version : {}", build_info::CLI_VERSION));
    output::line(format!("  Build hash  : {} ({})", meta.git_hash, meta.git_status));
    output::line(format!("  Built at    : {}", meta.timestamp));
    output::line(format!("  Target      : {}", meta.target));
    output::line(format!("  Profile     : {}", meta.profile));
    output::line(format!("  Rustc       : {}", meta.rustc));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
