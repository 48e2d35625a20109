use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, ConfigManager};
use crate::core::services::LedgerServices;
use crate::core::time::{Clock, SystemClock};
use crate::core::timing::{format_elapsed, timed};
use crate::storage::EntityStore;

use super::commands;
use super::errors::{CliError, CommandError};
use super::io as cli_io;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub services: LedgerServices,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub last_command: Option<String>,
    pub running: bool,
    store: Arc<EntityStore>,
    clock: Arc<dyn Clock>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        Ok(Self::with_parts(
            mode,
            config_manager,
            config,
            Arc::new(EntityStore::new()),
            Arc::new(SystemClock),
        ))
    }

    pub fn with_parts(
        mode: CliMode,
        config_manager: ConfigManager,
        config: Config,
        store: Arc<EntityStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        let services = LedgerServices::new(Arc::clone(&store), Arc::clone(&clock), config.year_bounds());
        Self {
            mode,
            registry,
            services,
            config_manager,
            config,
            last_command: None,
            running: true,
            store,
            clock,
        }
    }

    /// `(command, subcommands)` pairs for completion.
    pub fn completion_table(&self) -> Vec<(&'static str, &'static [&'static str])> {
        self.registry
            .list()
            .into_iter()
            .map(|entry| (entry.name, entry.subcommands))
            .collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn prompt(&self) -> String {
        "finance> ".to_string()
    }

    /// Directory used by `export`/`import` when none is given.
    pub fn data_dir(&self) -> PathBuf {
        self.config.resolve_data_dir(self.config_manager.base_dir())
    }

    /// Saves the config and rewires services whose behaviour depends on it.
    pub fn persist_config(&mut self) -> Result<(), CommandError> {
        self.config_manager.save(&self.config)?;
        self.services = LedgerServices::new(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.config.year_bounds(),
        );
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };

        let (result, elapsed) = timed(command, || handler(self, args)).into_parts();
        if self.config.timing_enabled {
            output::hint(format!("{command} took {}", format_elapsed(elapsed)));
        }
        match result {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.suggest(input) {
            output::hint(format!("Did you mean `{best}`?"));
        }
    }

    /// Asks before destructive actions. Script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        match self.mode {
            CliMode::Script => Ok(true),
            CliMode::Interactive => cli_io::confirm_action(prompt, false),
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        match self.mode {
            CliMode::Script => Ok(true),
            CliMode::Interactive => Ok(cli_io::confirm_action("Exit shell?", true)?),
        }
    }

    /// Prints a command failure. Fatal failures are handed back to stop the shell.
    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            err if err.is_fatal() => Err(err.into()),
            other => {
                output::error(other.to_string());
                Ok(())
            }
        }
    }
}
