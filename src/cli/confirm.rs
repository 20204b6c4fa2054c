//! Yes/no confirmation for destructive commands.

use std::io::{self, BufRead, Write};

/// Asks `prompt` and reads one answer line.
///
/// Only `y` or `yes` (any case) confirm. Anything else, including end of
/// input, declines.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails.
pub fn confirm<R: BufRead, W: Write>(prompt: &str, reader: &mut R, writer: &mut W) -> io::Result<bool> {
    write!(writer, "{prompt} [y/N] ")?;
    writer.flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Asks on stdin/stdout.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written.
pub fn confirm_stdin(prompt: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    confirm(prompt, &mut stdin.lock(), &mut stdout)
}
