//! Build, lint and discovery against skill directories on disk

use skillkit_rules::{build_skill, lint_skill, BuildOptions, BuildOutcome, SkillsRegistry};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const SKILL: &str = "---
name: frontend-react
description: React-specific performance and best-practices guide.
license: MIT
metadata:
  version: \"1.0.0\"
  title: React Best Practices
  organization: React
---

# Frontend React
";

const SECTIONS: &str = "# Sections

## 1. Bundle Size Optimization (bundle)

**Impact:** CRITICAL
**Description:** Smaller bundles load faster.

## 2. Re-render Optimization (rerender)

**Impact:** MEDIUM
";

fn skill_fixture(root: &Path) -> std::path::PathBuf {
    let dir = root.join("plugins/frontend-react/skills/frontend-react");
    write(&dir, "SKILL.md", SKILL);
    write(&dir, "rules/_sections.md", SECTIONS);
    write(&dir, "rules/_template.md", "---\ntitle: Template\n---\n## Template\n");
    write(
        &dir,
        "rules/bundle-lazy.md",
        "---\ntitle: Lazy Load Heavy Components\nimpact: CRITICAL\nimpactDescription: smaller initial bundle\ntags: bundle, lazy\n---\n\n## Lazy Load Heavy Components\n\nUse `React.lazy`.\n\n```tsx\nconst Editor = lazy(() => import('./editor'))\n```\n",
    );
    write(
        &dir,
        "rules/rerender-memo.md",
        "---\ntitle: Memoize Expensive Children\nimpact: MEDIUM\nimpactDescription: fewer renders\ntags:\n  - rerender\n---\n\n## Memoize Expensive Children\n\nWrap in `memo`.\n",
    );
    dir
}

#[test]
fn test_build_then_check() {
    let tmp = TempDir::new().unwrap();
    let dir = skill_fixture(tmp.path());
    let options = BuildOptions::default();

    assert_eq!(build_skill(&dir, &options, true).unwrap(), BuildOutcome::Stale);
    assert_eq!(build_skill(&dir, &options, false).unwrap(), BuildOutcome::Written);
    assert_eq!(build_skill(&dir, &options, true).unwrap(), BuildOutcome::Unchanged);

    let guide = fs::read_to_string(dir.join("AGENTS.md")).unwrap();
    assert!(guide.starts_with("# React Best Practices\n\n**Version 1.0.0**\nReact\n"));
    assert!(guide.contains(
        "1. [Bundle Size Optimization](#1-bundle-size-optimization) \u{2014} **CRITICAL**\n   - 1.1 Lazy Load Heavy Components\n"
    ));
    assert!(guide.contains("### 2.1 Memoize Expensive Children\n\nWrap in `memo`.\n"));
    assert!(!guide.contains("Template"));

    write(&dir, "rules/rerender-memo.md", "---\ntitle: Changed\nimpact: MEDIUM\n---\n## Changed\n");
    assert_eq!(build_skill(&dir, &options, true).unwrap(), BuildOutcome::Stale);
}

#[test]
fn test_lint_clean_skill() {
    let tmp = TempDir::new().unwrap();
    let dir = skill_fixture(tmp.path());
    let findings = lint_skill(&dir, &BuildOptions::default());
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn test_lint_reports_empty_section_and_bad_rules() {
    let tmp = TempDir::new().unwrap();
    let dir = skill_fixture(tmp.path());
    fs::remove_file(dir.join("rules/rerender-memo.md")).unwrap();
    write(&dir, "rules/client-swr.md", "## No frontmatter\n\n```ts\nopen\n");

    let findings = lint_skill(&dir, &BuildOptions::default());
    let codes: Vec<_> = findings.iter().map(|f| f.code).collect();

    assert!(codes.contains(&"SECTION_EMPTY"));
    assert!(codes.contains(&"RULE_FRONTMATTER_MISSING"));
    assert!(codes.contains(&"RULE_ORPHAN_PREFIX"));
    assert!(codes.contains(&"FENCE_UNTERMINATED"));

    let empty = findings.iter().find(|f| f.code == "SECTION_EMPTY").unwrap();
    assert_eq!(empty.line, Some(8));
    let fence = findings.iter().find(|f| f.code == "FENCE_UNTERMINATED").unwrap();
    assert_eq!(fence.line, Some(3));
}

#[test]
fn test_lint_invalid_manifest_and_sections() {
    let tmp = TempDir::new().unwrap();
    let dir = skill_fixture(tmp.path());
    write(&dir, "SKILL.md", "# No frontmatter\n");
    write(&dir, "rules/_sections.md", "## Bundle\n");

    let findings = lint_skill(&dir, &BuildOptions::default());
    let codes: Vec<_> = findings.iter().map(|f| f.code).collect();
    assert!(codes.contains(&"SKILL_MANIFEST_INVALID"));
    assert!(codes.contains(&"SECTIONS_INVALID"));
    assert!(!codes.contains(&"RULE_ORPHAN_PREFIX"));
}

#[test]
fn test_registry_discovers_nested_skills() {
    let tmp = TempDir::new().unwrap();
    skill_fixture(tmp.path());
    write(
        tmp.path(),
        "plugins/frontend-general/skills/frontend-general/SKILL.md",
        "---\nname: frontend-general\ndescription: Framework-agnostic rules.\n---\n",
    );
    write(
        tmp.path(),
        "plugins/broken/skills/broken/SKILL.md",
        "---\nname: Not Valid\ndescription: x\n---\n",
    );
    write(
        tmp.path(),
        "node_modules/dep/SKILL.md",
        "---\nname: hidden\ndescription: x\n---\n",
    );

    let mut registry = SkillsRegistry::new().add_directory(tmp.path().join("plugins"));
    registry.discover();

    let names: Vec<_> = registry.skills().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["frontend-general", "frontend-react"]);
    assert_eq!(
        registry.generate_skills_list(),
        "- frontend-general: Framework-agnostic rules.\n- frontend-react: React-specific performance and best-practices guide."
    );

    let loaded = registry.load_skill("frontend-react").unwrap();
    assert!(loaded.content.as_deref().unwrap().contains("# Frontend React"));
    assert!(registry.load_skill("missing").is_err());
}

#[test]
fn test_lint_reports_unreadable_rule() {
    let tmp = TempDir::new().unwrap();
    let dir = skill_fixture(tmp.path());
    fs::write(dir.join("rules/bundle-binary.md"), [0xff, 0xfe, 0x00]).unwrap();

    let findings = lint_skill(&dir, &BuildOptions::default());
    let unreadable: Vec<_> = findings
        .iter()
        .filter(|f| f.code == "RULES_UNREADABLE")
        .collect();
    assert_eq!(unreadable.len(), 1);
    assert!(unreadable[0].is_error());
    assert_eq!(unreadable[0].path, dir.join("rules"));
}

#[test]
fn test_registry_keeps_first_duplicate() {
    let tmp = TempDir::new().unwrap();
    skill_fixture(tmp.path());
    write(
        tmp.path(),
        "plugins/a-fork/skills/frontend-react/SKILL.md",
        "---\nname: frontend-react\ndescription: Forked copy.\n---\n",
    );

    let mut registry = SkillsRegistry::new().add_directory(tmp.path().join("plugins"));
    registry.discover();

    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("frontend-react").unwrap().description(),
        "Forked copy."
    );
}

#[test]
fn test_registry_respects_scan_depth() {
    let tmp = TempDir::new().unwrap();
    let plugins = tmp.path().join("plugins");
    write(
        &plugins,
        "a/b/c/shallow/SKILL.md",
        "---\nname: shallow\ndescription: Four levels down.\n---\n",
    );
    write(
        &plugins,
        "a/b/c/d/deep/SKILL.md",
        "---\nname: deep\ndescription: Five levels down.\n---\n",
    );

    let mut registry = SkillsRegistry::new().add_directory(&plugins);
    registry.discover();

    assert!(registry.get("shallow").is_some());
    assert!(registry.get("deep").is_none());
}
