use std::io::{BufRead, Write};

use crate::console::Console;
use crate::error::InputError;

/// Parse a total sample count: digits only, fits in `u64`, multiple of `unit`.
///
/// Zero passes; callers treat it as a request to exit.
pub fn parse_total(input: &str, unit: u64) -> Result<u64, InputError> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotAnInteger);
    }

    let value: u64 = input.parse().map_err(|_| InputError::OutOfRange)?;
    if value % unit != 0 {
        return Err(InputError::NotAMultiple { unit });
    }
    Ok(value)
}

/// Prompt until a valid total is entered.
///
/// Each rejected entry prints the error, pauses, and clears the screen before
/// prompting again.
pub fn collect_total<R, W>(console: &mut Console<R, W>, unit: u64) -> Result<u64, InputError>
where
    R: BufRead,
    W: Write,
{
    loop {
        console.write(&format!("Enter a multiple of {}: ", unit))?;
        let line = console.read_line()?.ok_or(InputError::Closed)?;

        match parse_total(&line, unit) {
            Ok(total) => return Ok(total),
            Err(e) => {
                tracing::debug!(input = %line, error = %e, "Rejected sample count");
                console.write_error(&e.to_string())?;
                console.pause(None)?;
                console.clear_screen()?;
            }
        }
    }
}
