//! Interactive confirmation
//!
//! A prompt is written to stdout and a single line is read back. Only the
//! exact token `y` (after trimming) proceeds; anything else, an empty line or
//! end of input included, declines.

use std::io::{self, BufRead, Write};

use crate::error::JadeResult;

/// The only answer that confirms
pub const AFFIRMATIVE: &str = "y";

/// Asks the user a yes/no question
pub trait Confirm {
    /// Show `message` and report whether the user agreed
    fn confirm(&mut self, message: &str) -> JadeResult<bool>;
}

/// [`Confirm`] over a line reader and a writer
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, message: &str) -> JadeResult<bool> {
        writeln!(self.writer, "{}", message)?;
        write!(self.writer, "(y/n) ")?;
        self.writer.flush()?;

        let mut answer = String::new();
        if self.reader.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        Ok(answer.trim() == AFFIRMATIVE)
    }
}

/// [`Confirm`] that always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> JadeResult<bool> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(input: &str) -> (bool, String) {
        let mut output = Vec::new();
        let confirmed = LinePrompt::new(input.as_bytes(), &mut output)
            .confirm("Restore /a?")
            .unwrap();
        (confirmed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_yes_confirms() {
        let (confirmed, output) = answer("y\n");
        assert!(confirmed);
        assert_eq!(output, "Restore /a?\n(y/n) ");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert!(answer("  y \n").0);
    }

    #[test]
    fn test_anything_else_declines() {
        assert!(!answer("n\n").0);
        assert!(!answer("yes\n").0);
        assert!(!answer("Y\n").0);
        assert!(!answer("\n").0);
        assert!(!answer("").0);
    }
}
