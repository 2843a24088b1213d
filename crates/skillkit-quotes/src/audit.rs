//! Quote-style audit for a single document
//!
//! Prose must use typographic quotes; code (fenced or inline) must use
//! straight ones.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::scan::MarkdownScanner;

/// ASCII double quote
pub const STRAIGHT_DOUBLE: char = '"';
/// ASCII apostrophe
pub const STRAIGHT_APOSTROPHE: char = '\'';
/// Left double quotation mark
pub const FANCY_OPEN_DOUBLE: char = '\u{201c}';
/// Right double quotation mark
pub const FANCY_CLOSE_DOUBLE: char = '\u{201d}';
/// Right single quotation mark, used as the apostrophe
pub const FANCY_APOSTROPHE: char = '\u{2019}';

/// A misplaced quote character, 1-based line and char column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteHit {
    /// 1-based line
    pub line: usize,
    /// 1-based char column
    pub column: usize,
    /// Offending character
    pub ch: char,
}

impl fmt::Display for QuoteHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, col {}", quoted(self.ch), self.line, self.column)
    }
}

/// Render a quote char so that it stays readable next to other quotes
fn quoted(ch: char) -> String {
    if ch == STRAIGHT_APOSTROPHE {
        format!("\"{ch}\"")
    } else {
        format!("'{ch}'")
    }
}

/// Audit result for one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteReport {
    /// Straight quotes outside code
    pub straight_in_prose: Vec<QuoteHit>,
    /// Typographic quotes inside fenced or inline code
    pub fancy_in_code: Vec<QuoteHit>,
}

impl QuoteReport {
    /// True when nothing was found
    pub fn is_ok(&self) -> bool {
        self.straight_in_prose.is_empty() && self.fancy_in_code.is_empty()
    }
}

fn is_straight(c: char) -> bool {
    c == STRAIGHT_DOUBLE || c == STRAIGHT_APOSTROPHE
}

fn is_fancy(c: char) -> bool {
    matches!(c, FANCY_OPEN_DOUBLE | FANCY_CLOSE_DOUBLE | FANCY_APOSTROPHE)
}

/// Audit markdown content
pub fn audit_str(content: &str) -> QuoteReport {
    let mut report = QuoteReport::default();

    for line in MarkdownScanner::new(content) {
        for (col, c, kind) in line.chars() {
            let hit = QuoteHit {
                line: line.number,
                column: col + 1,
                ch: c,
            };
            if kind.is_code() {
                if is_fancy(c) {
                    report.fancy_in_code.push(hit);
                }
            } else if is_straight(c) {
                report.straight_in_prose.push(hit);
            }
        }
    }

    report
}

/// Read and audit a markdown file
pub fn audit_file(path: &Path) -> Result<QuoteReport> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(audit_str(&content))
}
