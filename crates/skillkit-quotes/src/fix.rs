//! Rewrite straight quotes in prose to typographic ones

use anyhow::{anyhow, Result};
use regex::Regex;

use crate::audit::{
    FANCY_APOSTROPHE, FANCY_CLOSE_DOUBLE, FANCY_OPEN_DOUBLE, STRAIGHT_APOSTROPHE, STRAIGHT_DOUBLE,
};
use crate::scan::{CharKind, MarkdownScanner};

/// Replace straight quotes in prose only
///
/// Double quotes alternate open/close across the whole document, starting
/// with an opening quote. Apostrophes always become `’`. With
/// `keep_avoid_examples`, lines that present an "Avoid:" example are left
/// untouched and do not advance the open/close alternation.
pub fn fix_prose_quotes(content: &str, keep_avoid_examples: bool) -> Result<String> {
    let avoid_re = Regex::new(r"^[\s\-]*\*{0,2}Avoid\*{0,2}:")
        .map_err(|e| anyhow!("Failed to compile regex: {}", e))?;

    let mut doubles = 0usize;
    let mut lines = Vec::new();

    for line in MarkdownScanner::new(content) {
        if keep_avoid_examples && is_avoid_example(&avoid_re, line.text) {
            lines.push(line.text.to_string());
            continue;
        }

        let chars = line.chars();
        if chars.is_empty() {
            lines.push(line.text.to_string());
            continue;
        }

        let mut fixed = String::with_capacity(line.text.len());
        for (_, c, kind) in chars {
            if kind != CharKind::Prose {
                fixed.push(c);
            } else if c == STRAIGHT_DOUBLE {
                doubles += 1;
                fixed.push(if doubles % 2 == 0 {
                    FANCY_CLOSE_DOUBLE
                } else {
                    FANCY_OPEN_DOUBLE
                });
            } else if c == STRAIGHT_APOSTROPHE {
                fixed.push(FANCY_APOSTROPHE);
            } else {
                fixed.push(c);
            }
        }
        lines.push(fixed);
    }

    Ok(lines.join("\n"))
}

fn is_avoid_example(avoid_re: &Regex, line: &str) -> bool {
    if avoid_re.is_match(line) {
        return true;
    }
    let head: String = line.chars().take(20).collect();
    head.contains("- Avoid:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternates_double_quotes_across_lines() {
        let fixed = fix_prose_quotes("Say \"a\" and \"b\nc\"", false).unwrap();
        assert_eq!(fixed, "Say \u{201c}a\u{201d} and \u{201c}b\nc\u{201d}");
    }

    #[test]
    fn test_apostrophes_become_fancy() {
        let fixed = fix_prose_quotes("It's Bob's", false).unwrap();
        assert_eq!(fixed, "It\u{2019}s Bob\u{2019}s");
    }

    #[test]
    fn test_code_is_untouched() {
        let doc = "Use `\"x\"` or:\n\n```js\nconst a = 'b';\n```\nDone.";
        assert_eq!(fix_prose_quotes(doc, false).unwrap(), doc);
    }

    #[test]
    fn test_avoid_examples_are_kept() {
        let doc = "- Avoid: \"straight\"\n**Avoid**: don't\nPrefer \"this\"";
        let fixed = fix_prose_quotes(doc, true).unwrap();
        assert_eq!(
            fixed,
            "- Avoid: \"straight\"\n**Avoid**: don't\nPrefer \u{201c}this\u{201d}"
        );

        let fixed = fix_prose_quotes(doc, false).unwrap();
        assert!(fixed.starts_with("- Avoid: \u{201c}straight\u{201d}"));
    }

    #[test]
    fn test_fixed_document_passes_audit() {
        let doc = "He said \"don't\".\n\n```\nprint(\"hi\")\n```\n";
        let fixed = fix_prose_quotes(doc, false).unwrap();
        assert!(crate::audit::audit_str(&fixed).is_ok());
        assert!(fixed.ends_with("```\n"));
    }

    #[test]
    fn test_frontmatter_is_untouched() {
        let doc = "---\nversion: \"1.0.0\"\n---\n\nIt's here.";
        assert_eq!(
            fix_prose_quotes(doc, false).unwrap(),
            "---\nversion: \"1.0.0\"\n---\n\nIt\u{2019}s here."
        );
    }

    #[test]
    fn test_unclosed_frontmatter_is_fixed_as_prose() {
        let doc = "---\n\nDon't use \"straight\" quotes.\n";
        assert_eq!(
            fix_prose_quotes(doc, false).unwrap(),
            "---\n\nDon\u{2019}t use \u{201c}straight\u{201d} quotes.\n"
        );
    }
}
