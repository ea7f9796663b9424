// src/core/prompt.rs

//! Yes/no questions asked while a command runs.
//!
//! The engine only sees [`ConfirmPrompt`], so `--yes`/`--no` and tests can
//! answer without a terminal.

use dialoguer::{Input, theme::ColorfulTheme};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Could not read the answer from the terminal")]
    Terminal(#[from] dialoguer::Error),
}

pub trait ConfirmPrompt {
    /// Asks `question`; anything but an explicit yes counts as no.
    fn confirm(&self, question: &str) -> Result<bool, PromptError>;
}

/// Interprets a typed answer. Empty or unrecognized input is a "no".
pub fn parse_answer(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks on the terminal, unless an answer was fixed up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt {
    assume: Option<bool>,
}

impl TerminalPrompt {
    pub fn new(assume: Option<bool>) -> Self {
        Self { assume }
    }
}

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        if let Some(answer) = self.assume {
            log::debug!("Assuming '{}' for: {}", answer, question);
            return Ok(answer);
        }

        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} [y/N]", question))
            .allow_empty(true)
            .interact_text()?;
        Ok(parse_answer(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert!(parse_answer("y"));
        assert!(parse_answer(" YES \n"));
        assert!(!parse_answer(""));
        assert!(!parse_answer("n"));
        assert!(!parse_answer("sure"));
    }

    #[test]
    fn test_assumed_answers_skip_the_terminal() {
        assert!(TerminalPrompt::new(Some(true)).confirm("Save?").unwrap());
        assert!(!TerminalPrompt::new(Some(false)).confirm("Save?").unwrap());
    }
}
