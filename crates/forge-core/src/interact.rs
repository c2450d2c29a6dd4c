//! Terminal implementations of the interaction traits
//!
//! Resolution and tree execution talk to the user through the `Prompter`
//! and `Gate` traits; these are the cliclack-backed implementations the
//! binaries use.

use crate::args::resolve::{ArgsError, Prompter};
use crate::runner::exec::{Gate, RunError};
use std::io::ErrorKind;

/// Reads argument values with cliclack inline prompts.
pub struct CliclackPrompter;

impl Prompter for CliclackPrompter {
    fn input(&mut self, prompt: &str) -> Result<String, ArgsError> {
        let value: String = cliclack::input(prompt).interact().map_err(|e| {
            if e.kind() == ErrorKind::Interrupted {
                ArgsError::Cancelled
            } else {
                ArgsError::Io(e)
            }
        })?;
        Ok(value)
    }

    fn reject(&mut self, message: &str) -> Result<(), ArgsError> {
        cliclack::log::error(message)?;
        Ok(())
    }
}

/// Asks yes/no questions with cliclack confirm prompts.
pub struct TerminalGate;

impl Gate for TerminalGate {
    fn confirm(&mut self, message: &str) -> Result<bool, RunError> {
        let answer = cliclack::confirm(message).initial_value(true).interact()?;
        Ok(answer)
    }
}
