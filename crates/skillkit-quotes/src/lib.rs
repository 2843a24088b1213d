//! `SkillKit` quote-style tooling
//!
//! Markdown prose in skill documents uses typographic quotes (“ ” ’) while
//! code, fenced or inline, keeps straight ones (" '). This crate provides the
//! fence-aware scanner both checks share, a per-document audit, an in-place
//! fixer, and a workspace walker that applies them to every `*.md` file.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod audit;
pub mod fix;
pub mod scan;
pub mod workspace;

pub use audit::{audit_file, audit_str, QuoteHit, QuoteReport};
pub use fix::fix_prose_quotes;
pub use scan::{LineKind, MarkdownScanner, ScannedLine};
pub use workspace::{AuditSummary, FixSummary, QuoteAuditOptions, QuoteAuditor};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{QuoteAuditOptions, QuoteAuditor, QuoteReport};
}
