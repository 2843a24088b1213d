//! Content validation for a skill directory

use skillkit_quotes::{LineKind, MarkdownScanner};
use skillkit_types::Finding;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::compile::BuildOptions;
use crate::rule::{load_rules, FrontmatterState, RuleFile};
use crate::sections::{Sections, SectionsError, SECTIONS_FILE};
use crate::skill::{Skill, SKILL_FILE};

/// Lint a skill: manifest, sections index, every rule file
pub fn lint_skill(dir: &Path, options: &BuildOptions) -> Vec<Finding> {
    let mut findings = Vec::new();
    let manifest = dir.join(SKILL_FILE);

    match Skill::from_dir(dir) {
        Ok(skill) => {
            if skill.version().is_none() {
                findings.push(Finding::warning(
                    &manifest,
                    "SKILL_VERSION_MISSING",
                    "SKILL.md declares no metadata.version",
                ));
            }
            if let Some(content) = &skill.content {
                lint_fences(&manifest, content, 1, &mut findings);
            }
        }
        Err(e) => findings.push(Finding::error(
            &manifest,
            "SKILL_MANIFEST_INVALID",
            format!("{e:#}"),
        )),
    }

    let rules_dir = dir.join(&options.rules_dir);
    if !rules_dir.is_dir() {
        debug!("No rules directory in {}", dir.display());
        return findings;
    }

    let sections_path = rules_dir.join(SECTIONS_FILE);
    let sections = match Sections::load(&sections_path) {
        Ok(sections) => Some(sections),
        Err(e) => {
            let finding = Finding::error(&sections_path, "SECTIONS_INVALID", e.to_string());
            findings.push(match sections_error_line(&e) {
                Some(line) => finding.at_line(line),
                None => finding,
            });
            None
        }
    };

    let rules = match load_rules(&rules_dir) {
        Ok(rules) => rules,
        Err(e) => {
            findings.push(Finding::error(
                &rules_dir,
                "RULES_UNREADABLE",
                format!("{e:#}"),
            ));
            return findings;
        }
    };

    for rule in &rules {
        lint_rule(rule, sections.as_ref(), &mut findings);
    }

    if let Some(sections) = &sections {
        let used: HashSet<&str> = rules.iter().filter_map(|r| r.prefix.as_deref()).collect();
        for section in sections.iter() {
            if !used.contains(section.prefix.as_str()) {
                findings.push(
                    Finding::error(
                        &sections_path,
                        "SECTION_EMPTY",
                        format!(
                            "section '{}' ({}) has no rule files",
                            section.title, section.prefix
                        ),
                    )
                    .at_line(section.line),
                );
            }
        }
    }

    debug!(
        "Linted {} rules in {}: {} findings",
        rules.len(),
        dir.display(),
        findings.len()
    );
    findings
}

fn sections_error_line(error: &SectionsError) -> Option<usize> {
    match error {
        SectionsError::MissingPrefix { line, .. }
        | SectionsError::DuplicatePrefix { line, .. }
        | SectionsError::InvalidImpact { line, .. } => Some(*line),
        _ => None,
    }
}

/// Lint a single rule file against the declared sections
pub fn lint_rule(rule: &RuleFile, sections: Option<&Sections>, findings: &mut Vec<Finding>) {
    let path = rule.path.as_path();
    let fm = &rule.frontmatter;

    match &rule.frontmatter_state {
        FrontmatterState::Present => {
            if fm.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
                findings.push(Finding::error(path, "RULE_MISSING_TITLE", "frontmatter has no title"));
            }
            match rule.impact() {
                None => findings.push(Finding::error(
                    path,
                    "RULE_MISSING_IMPACT",
                    "frontmatter has no impact",
                )),
                Some(Err(e)) => {
                    findings.push(Finding::error(path, "RULE_IMPACT_INVALID", e.to_string()));
                }
                Some(Ok(impact)) => {
                    let section = rule.prefix.as_deref().and_then(|p| sections?.find(p));
                    if let Some(section) = section {
                        if section.impact != impact {
                            findings.push(Finding::warning(
                                path,
                                "RULE_IMPACT_MISMATCH",
                                format!(
                                    "impact {} differs from section '{}' impact {}",
                                    impact, section.title, section.impact
                                ),
                            ));
                        }
                    }
                }
            }
            if fm
                .impact_description
                .as_deref()
                .map_or(true, |d| d.trim().is_empty())
            {
                findings.push(Finding::warning(
                    path,
                    "RULE_MISSING_IMPACT_DESCRIPTION",
                    "frontmatter has no impactDescription",
                ));
            }
            if fm.tags.is_empty() {
                findings.push(Finding::warning(path, "RULE_MISSING_TAGS", "frontmatter has no tags"));
            }
        }
        FrontmatterState::Missing => findings.push(
            Finding::error(
                path,
                "RULE_FRONTMATTER_MISSING",
                "rule file has no YAML frontmatter",
            )
            .at_line(1),
        ),
        FrontmatterState::Invalid(message) => findings.push(
            Finding::error(
                path,
                "RULE_FRONTMATTER_INVALID",
                format!("frontmatter does not parse: {message}"),
            )
            .at_line(1),
        ),
    }

    if let Some(sections) = sections {
        let declared = rule.prefix.as_deref().and_then(|p| sections.find(p));
        if declared.is_none() {
            findings.push(Finding::error(
                path,
                "RULE_ORPHAN_PREFIX",
                format!(
                    "prefix '{}' matches no section in {}",
                    rule.prefix.as_deref().unwrap_or(&rule.id),
                    SECTIONS_FILE
                ),
            ));
        }
    }

    lint_fences(path, &rule.raw_body, rule.body_line, findings);
}

/// Report unterminated fences and fences without a language tag
///
/// `first_line` is the file line number `content` starts on.
pub fn lint_fences(path: &Path, content: &str, first_line: usize, findings: &mut Vec<Finding>) {
    let offset = first_line.saturating_sub(1);
    let mut scanner = MarkdownScanner::new(content);

    for line in scanner.by_ref() {
        if let LineKind::FenceOpen { info, .. } = line.kind {
            if info.is_empty() {
                findings.push(
                    Finding::warning(
                        path,
                        "FENCE_MISSING_LANGUAGE",
                        "code fence has no language tag",
                    )
                    .at_line(line.number + offset),
                );
            }
        }
    }

    if let Some((_, line)) = scanner.open_fence() {
        findings.push(
            Finding::error(path, "FENCE_UNTERMINATED", "code fence is never closed")
                .at_line(line + offset),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(findings: &[Finding]) -> Vec<&'static str> {
        findings.iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_complete_rule_is_clean() {
        let sections = Sections::parse("## Bundle (bundle)\n**Impact:** CRITICAL\n").unwrap();
        let rule = RuleFile::parse(
            Path::new("bundle-a.md"),
            "---\ntitle: A\nimpact: CRITICAL\nimpactDescription: faster\ntags: a\n---\n## A\n\n```ts\nx\n```\n",
        )
        .unwrap();
        let mut findings = Vec::new();
        lint_rule(&rule, Some(&sections), &mut findings);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn test_missing_keys_and_mismatch() {
        let sections = Sections::parse("## Bundle (bundle)\n**Impact:** CRITICAL\n").unwrap();
        let rule = RuleFile::parse(Path::new("bundle-a.md"), "---\nimpact: LOW\n---\nBody\n").unwrap();
        let mut findings = Vec::new();
        lint_rule(&rule, Some(&sections), &mut findings);
        assert_eq!(
            codes(&findings),
            vec![
                "RULE_MISSING_TITLE",
                "RULE_IMPACT_MISMATCH",
                "RULE_MISSING_IMPACT_DESCRIPTION",
                "RULE_MISSING_TAGS",
            ]
        );
    }

    #[test]
    fn test_orphan_and_missing_frontmatter() {
        let sections = Sections::parse("## Bundle (bundle)\n").unwrap();
        let rule = RuleFile::parse(Path::new("rendering-a.md"), "## A\n").unwrap();
        let mut findings = Vec::new();
        lint_rule(&rule, Some(&sections), &mut findings);
        assert_eq!(
            codes(&findings),
            vec!["RULE_FRONTMATTER_MISSING", "RULE_ORPHAN_PREFIX"]
        );
    }

    #[test]
    fn test_unclosed_frontmatter_still_gets_fence_checks() {
        let rule =
            RuleFile::parse(Path::new("bundle-a.md"), "---\ntitle: A\n\n```\nnever closed\n").unwrap();
        let mut findings = Vec::new();
        lint_rule(&rule, None, &mut findings);
        assert_eq!(
            codes(&findings),
            vec!["RULE_FRONTMATTER_MISSING", "FENCE_MISSING_LANGUAGE", "FENCE_UNTERMINATED"]
        );
        assert_eq!(findings[2].line, Some(4));
    }

    #[test]
    fn test_unknown_impact_tier() {
        let rule = RuleFile::parse(
            Path::new("bundle-a.md"),
            "---\ntitle: A\nimpact: URGENT\nimpactDescription: x\ntags: a\n---\n## A\n",
        )
        .unwrap();
        let mut findings = Vec::new();
        lint_rule(&rule, None, &mut findings);
        assert_eq!(codes(&findings), vec!["RULE_IMPACT_INVALID"]);
        assert!(findings[0].message.contains("URGENT"));
    }

    #[test]
    fn test_unparseable_frontmatter() {
        let rule = RuleFile::parse(Path::new("bundle-a.md"), "---\ntitle: [oops\n---\nBody\n").unwrap();
        let mut findings = Vec::new();
        lint_rule(&rule, None, &mut findings);
        assert_eq!(codes(&findings), vec!["RULE_FRONTMATTER_INVALID"]);
        assert_eq!(findings[0].line, Some(1));
    }

    #[test]
    fn test_fence_lines_are_file_relative() {
        let mut findings = Vec::new();
        lint_fences(Path::new("a.md"), "text\n```\ncode\n```\n```js\nopen", 7, &mut findings);
        assert_eq!(codes(&findings), vec!["FENCE_MISSING_LANGUAGE", "FENCE_UNTERMINATED"]);
        assert_eq!(findings[0].line, Some(8));
        assert_eq!(findings[1].line, Some(11));
    }
}
