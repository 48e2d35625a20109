use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::config::Config;

const USAGE: &str = "config [show]
config set <key> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change persisted preferences",
        USAGE,
        cmd_config,
    )
    .with_subcommands(&["show", "set"])]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        show(context);
        return Ok(());
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            let key = args[1];
            let value = args[2..].join(" ");
            context.config.set(key, &value)?;
            context.persist_config()?;
            output::success(format!("`{key}` updated."));
            if key == "log_filter" {
                output::hint("The new log filter applies from the next start.");
            }
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}`"
        ))),
    }
}

fn show(context: &ShellContext) {
    output::section("Configuration");
    for (key, value) in context.config.entries() {
        output::line(format!("  {key:<26} {value}"));
    }
    output::line(format!(
        "  {:<26} {}",
        "config file",
        context.config_manager.config_path().display()
    ));
}
