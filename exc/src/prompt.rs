//! Yes/no confirmation for destructive operations.

use crate::error::{ExcError, Result};
use std::io;

pub trait Confirm {
    /// Ask `prompt`; `Ok(false)` means the user declined.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Interactive terminal prompt. Defaults to "no".
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        interpret(cliclack::confirm(prompt).initial_value(false).interact())
    }
}

/// Esc and Ctrl-C at the prompt count as "no".
fn interpret(answer: io::Result<bool>) -> Result<bool> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(err) if err.kind() == io::ErrorKind::Interrupted => {
            tracing::debug!("confirmation cancelled");
            Ok(false)
        }
        Err(err) => Err(ExcError::Prompt(err.to_string())),
    }
}

/// Fixed answer, for non-interactive callers and tests.
#[derive(Debug, Clone, Copy)]
pub struct Scripted(pub bool);

impl Confirm for Scripted {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        tracing::debug!(prompt, answer = self.0, "scripted confirmation");
        Ok(self.0)
    }
}
