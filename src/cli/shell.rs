use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::context::{CliMode, LoopControl, ShellContext};
use crate::cli::errors::{CliError, CommandError};
use crate::cli::output;

/// Setting this variable switches the shell to reading commands from stdin.
pub const SCRIPT_ENV: &str = "FINANCE_CORE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    run_with_context(&mut context)
}

pub fn run_with_context(context: &mut ShellContext) -> Result<(), CliError> {
    match context.mode {
        CliMode::Interactive => run_interactive(context),
        CliMode::Script => {
            colored::control::set_override(false);
            run_script(context)
        }
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.completion_table())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output::info("Finance Core shell. Type `help` to list commands.");

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match handle_line(context, trimmed) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(err);
            return Ok(LoopControl::Continue);
        }
    };

    let Some(raw) = tokens.first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    context.last_command = Some(line.trim().to_string());

    match context.dispatch(&command, raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

struct CommandHelper {
    commands: Vec<(String, Vec<String>)>,
}

impl CommandHelper {
    fn new(table: Vec<(&'static str, &'static [&'static str])>) -> Self {
        let mut commands: Vec<(String, Vec<String>)> = table
            .into_iter()
            .map(|(name, subcommands)| {
                (
                    name.to_ascii_lowercase(),
                    subcommands.iter().map(|sub| sub.to_string()).collect(),
                )
            })
            .collect();
        commands.sort();
        commands.dedup_by(|a, b| a.0 == b.0);
        Self { commands }
    }

    fn candidates(&self, prefix: &str) -> Vec<String> {
        let words: Vec<&str> = prefix.split_whitespace().collect();
        let completing_new_word = prefix.ends_with(char::is_whitespace) || prefix.is_empty();
        let position = if completing_new_word { words.len() } else { words.len() - 1 };
        let needle = if completing_new_word {
            String::new()
        } else {
            words.last().map(|word| word.to_ascii_lowercase()).unwrap_or_default()
        };

        let pool: Vec<&String> = match position {
            0 => self.commands.iter().map(|(name, _)| name).collect(),
            1 => {
                let command = words[0].to_ascii_lowercase();
                self.commands
                    .iter()
                    .find(|(name, _)| *name == command)
                    .map(|(_, subs)| subs.iter().collect())
                    .unwrap_or_default()
            }
            _ => Vec::new(),
        };
        pool.into_iter()
            .filter(|candidate| candidate.starts_with(&needle))
            .cloned()
            .collect()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let candidates = self
            .candidates(prefix)
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
