use std::io;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::errors::{LedgerError, TransferError};

pub type CommandResult = Result<(), CommandError>;

/// Failure of a single shell command. Reported and the shell keeps going.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("Usage: {usage}"))
    }

    /// Storage corruption ends the session; everything else is recoverable.
    pub fn is_fatal(&self) -> bool {
        match self {
            CommandError::Ledger(err) => err.is_fatal(),
            CommandError::Transfer(TransferError::Ledger(err)) => err.is_fatal(),
            _ => false,
        }
    }
}

/// Errors that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}
