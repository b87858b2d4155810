use rustyline::{Config, Editor, Result};

use super::questions::QUESTION_COUNT;

/// Prompt showing which question is being answered, e.g. `tú (1/2) > `.
pub fn generate_prompt(step: usize) -> String {
    if step < QUESTION_COUNT {
        format!("tú ({}/{}) > ", step + 1, QUESTION_COUNT)
    } else {
        "tú > ".to_string()
    }
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .build();
    Editor::with_config(config)
}
