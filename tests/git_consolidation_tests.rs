//! Go module consolidation in a real git checkout
//!
//! These tests drive the installed `git` and `go` binaries and return early
//! when either is missing from PATH.

#![expect(clippy::unwrap_used, reason = "This is a test module")]

use provider_ci::config::TemplateKind;
use provider_ci::migrations::{ConsolidateModules, Migration};
use provider_ci::system::{RealSystem, System};
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;
use tempfile::TempDir;

fn tool_available(program: &str, arg: &str) -> bool {
    StdCommand::new(program)
        .arg(arg)
        .output()
        .is_ok_and(|output| output.status.success())
}

fn git(repo_path: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?}: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write(repo_path: &Path, file: &str, contents: &[u8]) {
    let path = repo_path.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A bridged provider layout with a v6 provider module and an examples module
fn create_provider_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path();

    git(repo_path, &["init", "--quiet"]);

    write(
        repo_path,
        "provider/go.mod",
        b"module github.com/pulumi/pulumi-foo/provider/v6\n\ngo 1.18\n",
    );
    write(repo_path, "provider/go.sum", b"");
    write(
        repo_path,
        "provider/main.go",
        b"package main\n\nimport \"github.com/pulumi/pulumi-foo/provider/v6/pkg\"\n\nfunc main() { pkg.Hello() }\n",
    );
    write(
        repo_path,
        "provider/pkg/pkg.go",
        b"package pkg\n\nfunc Hello() {}\n",
    );
    write(
        repo_path,
        "examples/go.mod",
        b"module github.com/pulumi/pulumi-foo/examples/v6\n\ngo 1.18\n",
    );
    write(repo_path, "examples/examples.go", b"package examples\n");
    write(
        repo_path,
        "docs/notes.md",
        b"Caf\xe9 github.com/pulumi/pulumi-foo/provider/v6\n",
    );

    git(repo_path, &["add", "-A"]);
    temp_dir
}

#[test]
fn test_provider_module_moves_to_the_root() {
    if !tool_available("git", "--version") || !tool_available("go", "version") {
        return;
    }
    let temp_dir = create_provider_repo();
    let repo_path = temp_dir.path();
    let system = RealSystem::new();
    for (key, value) in [("GOTOOLCHAIN", "local"), ("GOPROXY", "off"), ("GOWORK", "off")] {
        system.set_env_var(key, value).unwrap();
    }

    ConsolidateModules
        .migrate(&system, TemplateKind::BridgedProvider, repo_path)
        .unwrap();

    let root_go_mod = fs::read_to_string(repo_path.join("go.mod")).unwrap();
    assert!(root_go_mod.starts_with("module github.com/pulumi/pulumi-foo/v6\n"));
    assert!(!repo_path.join("provider/go.mod").exists());
    assert!(!repo_path.join("examples/go.mod").exists());

    assert_eq!(
        fs::read_to_string(repo_path.join("provider/main.go")).unwrap(),
        "package main\n\nimport \"github.com/pulumi/pulumi-foo/v6/provider/pkg\"\n\nfunc main() { pkg.Hello() }\n"
    );
    assert_eq!(
        fs::read(repo_path.join("docs/notes.md")).unwrap(),
        b"Caf\xe9 github.com/pulumi/pulumi-foo/v6/provider\n"
    );

    let tracked = StdCommand::new("git")
        .args(["ls-files"])
        .current_dir(repo_path)
        .output()
        .unwrap();
    let tracked = String::from_utf8_lossy(&tracked.stdout);
    let tracked: Vec<&str> = tracked.lines().collect();
    assert!(tracked.contains(&"go.mod"));
    assert!(tracked.contains(&"go.sum"));
    assert!(!tracked.contains(&"provider/go.mod"));
    assert!(!tracked.contains(&"examples/go.mod"));

    // A second run finds nothing to consolidate
    ConsolidateModules
        .migrate(&system, TemplateKind::BridgedProvider, repo_path)
        .unwrap();
    assert_eq!(
        fs::read_to_string(repo_path.join("go.mod")).unwrap(),
        root_go_mod
    );
}

#[test]
fn test_unconventional_module_leaves_checkout_untouched() {
    if !tool_available("git", "--version") || !tool_available("go", "version") {
        return;
    }
    let temp_dir = create_provider_repo();
    let repo_path = temp_dir.path();
    write(repo_path, "provider/go.mod", b"module example.com/foo\n\ngo 1.18\n");
    git(repo_path, &["add", "-A"]);
    let system = RealSystem::new();
    system.set_env_var("GOTOOLCHAIN", "local").unwrap();

    let err = ConsolidateModules
        .migrate(&system, TemplateKind::BridgedProvider, repo_path)
        .unwrap_err();

    assert!(format!("{err:#}").contains("example.com/foo"));
    assert!(repo_path.join("provider/go.mod").exists());
    assert!(repo_path.join("examples/go.mod").exists());
    assert!(!repo_path.join("go.mod").exists());
}
