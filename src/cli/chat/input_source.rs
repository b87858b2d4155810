use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tracing::debug;

/// Lines the user typed while no prompt was shown.
pub trait TypeAhead {
    /// Remove and return every complete line typed so far.
    fn take_lines(&mut self) -> Vec<String>;
}

/// Reads whatever is already buffered on the terminal without blocking.
pub struct TerminalTypeAhead;

impl TypeAhead for TerminalTypeAhead {
    fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    debug!("Could not poll the terminal: {}", e);
                    break;
                }
            }

            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Enter => lines.push(std::mem::take(&mut current)),
                    KeyCode::Char(c) => current.push(c),
                    KeyCode::Backspace => {
                        current.pop();
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => {
                    debug!("Could not read the terminal: {}", e);
                    break;
                }
            }
        }

        // An unfinished line is dropped along with the rest.
        if !current.is_empty() {
            debug!("Dropping partial line {:?}", current);
        }

        lines
    }
}

/// Type-ahead from a fixed script, one batch per call.
#[cfg(test)]
pub struct ScriptedTypeAhead {
    batches: std::collections::VecDeque<Vec<String>>,
}

#[cfg(test)]
impl ScriptedTypeAhead {
    pub fn new(batches: &[&[&str]]) -> Self {
        Self {
            batches: batches
                .iter()
                .map(|batch| batch.iter().map(|line| line.to_string()).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
impl TypeAhead for ScriptedTypeAhead {
    fn take_lines(&mut self) -> Vec<String> {
        self.batches.pop_front().unwrap_or_default()
    }
}
