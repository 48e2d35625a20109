use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::cli::errors::CommandError;

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(prompt: &str, default: bool) -> Result<bool, CommandError> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}
