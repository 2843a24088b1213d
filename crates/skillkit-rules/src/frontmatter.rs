//! YAML frontmatter splitting

use anyhow::{anyhow, Result};
use regex::Regex;

/// Document split into its frontmatter YAML and the markdown after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// YAML between the delimiters, without them
    pub yaml: &'a str,
    /// Markdown after the closing delimiter
    pub body: &'a str,
    /// 1-based line of the first body line
    pub body_line: usize,
}

/// Split `---` delimited frontmatter from the start of `content`
///
/// Returns `Ok(None)` when the document has no frontmatter.
pub fn split_frontmatter(content: &str) -> Result<Option<Frontmatter<'_>>> {
    let frontmatter_re =
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n(.*))?\z")
            .map_err(|e| anyhow!("Failed to compile regex: {}", e))?;

    let Some(captures) = frontmatter_re.captures(content) else {
        return Ok(None);
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let (body, body_line) = match captures.get(2) {
        Some(m) => (m.as_str(), content[..m.start()].matches('\n').count() + 1),
        None => ("", content.matches('\n').count() + 1),
    };

    Ok(Some(Frontmatter {
        yaml,
        body,
        body_line,
    }))
}
