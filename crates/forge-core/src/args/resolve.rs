//! Sequential argument resolution
//!
//! Resolution walks the declared specs in order. Each argument is filled
//! from a supplied flag when one exists, otherwise from an interactive
//! prompt. Resolution never touches any external system; the only side
//! effects are the prompts and error messages themselves.

use super::spec::{ArgSpec, Outcome, ResolvedArgs};
use std::collections::BTreeMap;
use thiserror::Error;

/// Flag values supplied on the command line, keyed by argument name.
pub type Flags = BTreeMap<String, String>;

/// Errors from argument resolution.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// A value failed validation, or a required argument was missing in
    /// non-interactive mode. Carries the rendered, user-facing message.
    #[error("{0}")]
    Invalid(String),

    /// The user cancelled an interactive prompt.
    #[error("input cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Source of interactive input during resolution.
///
/// The resolver owns the re-prompt loop; implementations only read one
/// line of input or surface one rejection message.
pub trait Prompter {
    /// Block for one line of input.
    fn input(&mut self, prompt: &str) -> Result<String, ArgsError>;

    /// Surface a validation error before the argument is re-prompted.
    fn reject(&mut self, message: &str) -> Result<(), ArgsError>;
}

/// Resolve every applicable argument from flags alone.
///
/// The first missing or invalid argument terminates the whole resolution;
/// subsequent specs are not evaluated.
pub fn resolve_from_flags(specs: &[ArgSpec], flags: &Flags) -> Result<ResolvedArgs, ArgsError> {
    let mut resolved = ResolvedArgs::default();

    for spec in specs {
        if !spec.applies(&resolved) {
            continue;
        }

        let raw = match flags.get(spec.name()) {
            Some(value) => value,
            None if spec.is_hidden() => continue,
            None => {
                return Err(ArgsError::Invalid(format!(
                    "Missing required argument: {}",
                    spec.name()
                )));
            }
        };

        match spec.evaluate(raw) {
            Outcome::Accepted(value) => resolved.insert(spec.name(), value),
            Outcome::Rejected(message) => return Err(ArgsError::Invalid(message)),
        }
    }

    Ok(resolved)
}

/// Resolve every applicable argument, prompting for whatever the flags do
/// not cover. Invalid input re-prompts the same argument until it is valid
/// or the prompt is cancelled.
pub fn resolve(
    specs: &[ArgSpec],
    flags: &Flags,
    prompter: &mut dyn Prompter,
) -> Result<ResolvedArgs, ArgsError> {
    let mut resolved = ResolvedArgs::default();

    for spec in specs {
        if !spec.applies(&resolved) {
            continue;
        }

        if let Some(raw) = flags.get(spec.name()) {
            match spec.evaluate(raw) {
                Outcome::Accepted(value) => {
                    resolved.insert(spec.name(), value);
                    continue;
                }
                Outcome::Rejected(message) => {
                    // A private argument has no prompt to fall back to.
                    if spec.is_hidden() {
                        return Err(ArgsError::Invalid(message));
                    }
                    prompter.reject(&message)?;
                }
            }
        } else if spec.is_hidden() {
            continue;
        }

        let prompt = spec.prompt_text().unwrap_or(spec.name());
        loop {
            let raw = prompter.input(prompt)?;
            match spec.evaluate(&raw) {
                Outcome::Accepted(value) => {
                    resolved.insert(spec.name(), value);
                    break;
                }
                Outcome::Rejected(message) => prompter.reject(&message)?,
            }
        }
    }

    Ok(resolved)
}
