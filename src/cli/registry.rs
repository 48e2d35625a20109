use std::collections::HashMap;

use crate::cli::context::ShellContext;
use crate::cli::errors::CommandResult;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    /// Sub-commands offered by completion after the command name.
    pub subcommands: &'static [&'static str],
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            subcommands: &[],
            handler,
        }
    }

    pub const fn with_subcommands(mut self, subcommands: &'static [&'static str]) -> Self {
        self.subcommands = subcommands;
        self
    }
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: CommandEntry) {
        let name = entry.name;
        if self.commands.insert(name, entry).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub fn list(&self) -> Vec<&CommandEntry> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }

    /// Closest registered name within an edit distance of three.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        let input = input.to_ascii_lowercase();
        self.names()
            .map(|name| (strsim::levenshtein(name, &input), name))
            .filter(|(distance, _)| *distance <= 3)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}
