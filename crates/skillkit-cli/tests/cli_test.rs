//! End-to-end runs of the `skillkit` binary against a scratch repository

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let skill = "plugins/frontend-react/skills/frontend-react";
    write(
        root,
        &format!("{skill}/SKILL.md"),
        "---\nname: frontend-react\ndescription: React rules.\nmetadata:\n  version: \"1.0.0\"\n---\n\nRead AGENTS.md.\n",
    );
    write(
        root,
        &format!("{skill}/rules/_sections.md"),
        "## 1. Bundle Size Optimization (bundle)\n\n**Impact:** CRITICAL\n",
    );
    write(
        root,
        &format!("{skill}/rules/bundle-lazy.md"),
        "---\ntitle: Lazy Load\nimpact: CRITICAL\nimpactDescription: smaller bundles\ntags: bundle\n---\n\n## Lazy Load\n\nUse `lazy`.\n",
    );
    write(
        root,
        ".claude-plugin/marketplace.json",
        "{\n  \"plugins\": [\n    {\"name\": \"frontend-react\", \"source\": \"./plugins/frontend-react\", \"version\": \"1.0.0\"}\n  ]\n}\n",
    );
    write(
        root,
        "plugins/frontend-react/.claude-plugin/plugin.json",
        "{\n  \"name\": \"frontend-react\",\n  \"version\": \"1.0.0\"\n}\n",
    );
    dir
}

fn skillkit(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skillkit"))
        .current_dir(root)
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_build_check_lint_cycle() {
    let dir = repo();
    let root = dir.path();

    let check = skillkit(root, &["build", "--check"]);
    assert!(!check.status.success());
    assert!(stdout(&check).contains("Out of date"));

    let build = skillkit(root, &["build"]);
    assert!(build.status.success(), "{}", stdout(&build));
    assert!(root
        .join("plugins/frontend-react/skills/frontend-react/AGENTS.md")
        .is_file());

    let check = skillkit(root, &["build", "--check"]);
    assert!(check.status.success());

    let lint = skillkit(root, &["lint"]);
    assert!(lint.status.success(), "{}", stdout(&lint));
    assert!(stdout(&lint).contains("No problems found."));
}

#[test]
fn test_audit_and_fix_quotes() {
    let dir = repo();
    let root = dir.path();
    write(root, "docs/guide.md", "Don't use \"straight\" quotes.\n");

    let audit = skillkit(root, &["audit-quotes"]);
    assert!(!audit.status.success());
    assert!(stdout(&audit).contains("docs/guide.md"));

    let fix = skillkit(root, &["audit-quotes", "--fix"]);
    assert!(fix.status.success());
    assert!(stdout(&fix).contains("Fixed: docs/guide.md"));

    let audit = skillkit(root, &["audit-quotes"]);
    assert!(audit.status.success(), "{}", stdout(&audit));
}

#[test]
fn test_bump_version_and_plugin_check() {
    let dir = repo();
    let root = dir.path();

    let bump = skillkit(root, &["bump-version", "frontend-react", "1.1.0"]);
    assert!(bump.status.success());
    assert!(stdout(&bump).contains("\"1.0.0\" -> \"1.1.0\""));

    let check = skillkit(root, &["plugins", "check"]);
    assert!(check.status.success(), "{}", stdout(&check));

    let bad = skillkit(root, &["bump-version", "frontend-react", "latest"]);
    assert!(!bad.status.success());
}
