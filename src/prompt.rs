//! Confirmation before destructive actions.

use std::io::{self, BufRead, IsTerminal, Write};

/// Outcome of asking for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// User answered yes.
    Accepted,
    /// User answered anything else.
    Declined,
    /// Stdin is not a terminal, nobody can answer.
    NonInteractive,
}

/// Ask `question` on stderr and read the answer from stdin.
///
/// Returns [`Confirmation::NonInteractive`] without prompting when stdin is
/// not a terminal.
///
/// # Errors
///
/// Returns an error if reading stdin or writing stderr fails.
pub fn confirm(question: &str) -> io::Result<Confirmation> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(Confirmation::NonInteractive);
    }
    confirm_with(&mut stdin.lock(), &mut io::stderr(), question)
}

/// Prompt on `writer` and read a `[y/N]` answer from `reader`.
///
/// Only `y` and `yes` (any case) accept; an empty line or EOF declines.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn confirm_with<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
) -> io::Result<Confirmation> {
    write!(writer, "{question} [y/N] ")?;
    writer.flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;

    let accepted = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
    Ok(if accepted {
        Confirmation::Accepted
    } else {
        Confirmation::Declined
    })
}
