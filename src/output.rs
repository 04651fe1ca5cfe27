//! Verdict Output
//!
//! Formats the one-line verdict printed for a validated document.

use std::io::{self, Write};
use std::path::Path;

use crate::validator::Verdict;

/// Formatter for the human-readable verdict line
#[derive(Debug, Default)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// The verdict line without its trailing newline.
    ///
    /// The document name is the path exactly as it was given.
    pub fn format_verdict(&self, document: &Path, verdict: &Verdict) -> String {
        match verdict {
            Verdict::Valid => format!("{} is valid.", document.display()),
            Verdict::Invalid { .. } => format!("{} is INVALID!.", document.display()),
        }
    }

    pub fn write_verdict<W: Write>(
        &self,
        out: &mut W,
        document: &Path,
        verdict: &Verdict,
    ) -> io::Result<()> {
        writeln!(out, "{}", self.format_verdict(document, verdict))?;
        out.flush()
    }
}
