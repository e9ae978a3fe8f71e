//! Terminal input for form fields.

use anyhow::Result;
use learnflow_forms::Field;
use std::io::{self, BufRead, Write};

/// What the user typed at a field prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Answer {
    Value(String),
    /// `s` at the email prompt.
    Toggle,
    /// `q` at the email prompt, or end of input.
    Quit,
}

/// Source of answers for the form prompts.
pub trait Prompt {
    fn ask(&mut self, field: Field, allow_commands: bool) -> Result<Answer>;
}

/// Reads answers from the terminal.
pub struct Terminal;

impl Prompt for Terminal {
    fn ask(&mut self, field: Field, allow_commands: bool) -> Result<Answer> {
        ask(field, allow_commands)
    }
}

/// Read one field. Secrets are read without echo.
fn ask(field: Field, allow_commands: bool) -> Result<Answer> {
    if field.is_secret() {
        let value = rpassword::prompt_password(format!("{}: ", field.label()))?;
        return Ok(Answer::Value(value));
    }

    print!("{} ({}): ", field.label(), field.placeholder());
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    Ok(interpret(read, &line, allow_commands))
}

fn interpret(bytes_read: usize, line: &str, allow_commands: bool) -> Answer {
    if bytes_read == 0 {
        return Answer::Quit;
    }
    let trimmed = line.trim();
    if allow_commands {
        match trimmed {
            "s" | "S" => return Answer::Toggle,
            "q" | "Q" => return Answer::Quit,
            _ => {}
        }
    }
    Answer::Value(trimmed.to_string())
}
