//! Stdin/stdout console.

use clipforge_av::{Console, Result};
use std::io::{BufRead, Write};

/// Console reading answers from stdin.
///
/// End of input counts as "no", so a closed or piped stdin never runs
/// anything by accident.
pub struct StdConsole<R = std::io::StdinLock<'static>> {
    input: R,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            input: std::io::stdin().lock(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead> StdConsole<R> {
    pub fn with_input(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Console for StdConsole<R> {
    fn show(&mut self, message: &str) {
        println!("{}", message);
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{} [y/N] ", question);
        std::io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            println!();
            return Ok(false);
        }
        Ok(is_yes(&line))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
