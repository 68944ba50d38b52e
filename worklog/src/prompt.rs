//! Interactive questions to the operator. The engine only depends on the [`Prompt`] trait,
//! [`TerminalPrompt`] is the implementation talking to the terminal.
use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::debug;

use crate::error::WorklogError;

pub trait Prompt: Send + Sync {
    /// Asks for a line of text, an empty answer yields `default` when there is one
    ///
    /// # Errors
    /// If the terminal could not be read from
    fn ask_text(&self, question: &str, default: Option<&str>) -> Result<String, WorklogError>;

    /// Asks for a secret without echoing it
    ///
    /// # Errors
    /// If the terminal could not be read from or the operator aborted
    fn ask_masked(&self, question: &str) -> Result<String, WorklogError>;

    /// Asks for a number in `[min, max]`, asking again until one is given
    ///
    /// # Errors
    /// If the terminal could not be read from
    fn ask_number(&self, question: &str, min: usize, max: usize) -> Result<usize, WorklogError>;
}

fn prompt_error(err: &io::Error) -> WorklogError {
    WorklogError::Prompt(err.to_string())
}

/// Questions go to stderr, so they never mix with the report on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_masked() -> Result<String, WorklogError> {
        let mut secret = String::new();
        loop {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) = event::read().map_err(|e| prompt_error(&e))?
            {
                match code {
                    KeyCode::Enter => return Ok(secret),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Err(WorklogError::Prompt("aborted by the operator".into()));
                    }
                    KeyCode::Esc => {
                        return Err(WorklogError::Prompt("aborted by the operator".into()));
                    }
                    KeyCode::Char(c) => secret.push(c),
                    KeyCode::Backspace => {
                        secret.pop();
                    }
                    _ => {}
                }
            }
        }
    }
}

impl Prompt for TerminalPrompt {
    fn ask_text(&self, question: &str, default: Option<&str>) -> Result<String, WorklogError> {
        let mut stderr = io::stderr();
        let written = match default {
            Some(default) => write!(stderr, "{question} [{default}]: "),
            None => write!(stderr, "{question}: "),
        };
        written
            .and_then(|()| stderr.flush())
            .map_err(|e| prompt_error(&e))?;

        let mut answer = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| prompt_error(&e))?;
        if read == 0 {
            return Err(WorklogError::Prompt("end of input".into()));
        }

        let answer = answer.trim();
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer.to_string()),
        }
    }

    fn ask_masked(&self, question: &str) -> Result<String, WorklogError> {
        let mut stderr = io::stderr();
        write!(stderr, "{question}: ")
            .and_then(|()| stderr.flush())
            .map_err(|e| prompt_error(&e))?;

        terminal::enable_raw_mode().map_err(|e| prompt_error(&e))?;
        let secret = Self::read_masked();
        if let Err(e) = terminal::disable_raw_mode() {
            debug!("Unable to leave raw mode: {e}");
        }
        eprintln!();
        secret
    }

    fn ask_number(&self, question: &str, min: usize, max: usize) -> Result<usize, WorklogError> {
        loop {
            let answer = self.ask_text(&format!("{question} [{min}-{max}]"), None)?;
            match answer.parse::<usize>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(n),
                _ => eprintln!("Please enter a number between {min} and {max}"),
            }
        }
    }
}

impl<P: Prompt + ?Sized> Prompt for &P {
    fn ask_text(&self, question: &str, default: Option<&str>) -> Result<String, WorklogError> {
        (**self).ask_text(question, default)
    }

    fn ask_masked(&self, question: &str) -> Result<String, WorklogError> {
        (**self).ask_masked(question)
    }

    fn ask_number(&self, question: &str, min: usize, max: usize) -> Result<usize, WorklogError> {
        (**self).ask_number(question, min, max)
    }
}
