use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Available commands");
    for entry in registry.list() {
        output::line(format!("  {:<10} {}", entry.name, entry.description));
    }
    output::line("Use `help <command>` for details. Dates are YYYY-MM-DD.");
}

pub fn print_command(entry: &CommandEntry) {
    output::section(format!("Help: {}", entry.name));
    output::line(format!("  Description: {}", entry.description));
    output::line("  Usage:");
    for usage in entry.usage.lines() {
        output::line(format!("    {}", usage.trim()));
    }
}
