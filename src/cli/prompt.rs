//! Interactive identifier prompt.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags and environment fallbacks
//! - the prompt covers the "run `no2pdf` and type your roll number" UX

use std::io::{self, BufRead, Write};

use crate::data::parse_identifier;
use crate::error::AppError;

pub const PROMPT: &str = "Enter your University Roll Number: ";

/// Ask for the identifier on stdin.
pub fn prompt_identifier() -> Result<i64, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    read_identifier(&mut stdin.lock(), &mut stdout.lock())
}

/// Write the prompt to `output` and parse one line from `input`.
pub fn read_identifier<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<i64, AppError> {
    write!(output, "{PROMPT}")
        .and_then(|_| output.flush())
        .map_err(|e| AppError::io("Failed to write prompt", e))?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|e| AppError::io("Failed to read input", e))?;
    if bytes == 0 {
        return Err(AppError::InvalidIdentifier(
            "no input received (pass one with `--roll <ID>`)".to_string(),
        ));
    }

    parse_identifier(&line)
}
