//! Operator confirmation
//!
//! Destructive or surprising operations ask before acting. The store only
//! sees the [`Decisions`] trait; the terminal implementation reads answers
//! line by line and re-asks on anything it does not understand.
//!
//! End of input counts as the safe answer ("no" / abort), so a closed or
//! interrupted terminal can never confirm a change.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::error::Result;

/// Answer for a single delete candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionChoice {
    /// Leave this entry alone, keep going
    Keep,
    /// Mark this entry for deletion
    Delete,
    /// Cancel the whole delete, nothing is written
    Abort,
}

/// One delete candidate as shown to the operator
#[derive(Debug, Clone)]
pub struct DeletionPreview {
    /// 1-based position among the candidates
    pub number: usize,
    pub total: usize,
    /// Masked, pretty-printed record
    pub body: String,
}

/// Source of operator decisions
pub trait Decisions {
    /// Yes/no question. Anything but an explicit yes is no.
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Show a candidate and ask whether to delete it
    fn confirm_deletion(&mut self, preview: &DeletionPreview) -> Result<DeletionChoice>;

    /// Informational output that needs no answer
    fn show(&mut self, message: &str) -> Result<()>;
}

/// Interactive decisions over a reader/writer pair (stdin/stdout in the CLI)
pub struct TerminalDecisions<R, W> {
    input: R,
    output: W,
}

impl TerminalDecisions<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalDecisions<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed, lower-cased answer.
    /// `None` on end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

impl<R: BufRead, W: Write> Decisions for TerminalDecisions<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} (y/N): ", question))?;
        Ok(matches!(answer.as_deref(), Some("y" | "yes")))
    }

    fn confirm_deletion(&mut self, preview: &DeletionPreview) -> Result<DeletionChoice> {
        writeln!(self.output, "\nEntry {} of {}:", preview.number, preview.total)?;
        writeln!(self.output, "{}", preview.body)?;
        writeln!(self.output, "{}", "-".repeat(40))?;

        loop {
            match self.ask("Delete this entry? (y/n/q to quit): ")?.as_deref() {
                Some("y" | "yes") => {
                    writeln!(self.output, "✓ Marked for deletion")?;
                    return Ok(DeletionChoice::Delete);
                }
                Some("n" | "no") => {
                    writeln!(self.output, "✗ Skipped")?;
                    return Ok(DeletionChoice::Keep);
                }
                Some("q" | "quit") | None => return Ok(DeletionChoice::Abort),
                Some(_) => {
                    writeln!(self.output, "Please enter 'y' (yes), 'n' (no), or 'q' (quit)")?;
                }
            }
        }
    }

    fn show(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}
