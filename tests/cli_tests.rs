//! CLI interface tests

#![expect(clippy::unwrap_used, reason = "This is a test module")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn provider_ci() -> Command {
    let mut cmd = Command::cargo_bin("provider-ci").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("PROVIDER_CI_TEMPLATE");
    cmd
}

#[test]
fn test_version_flag() {
    provider_ci()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("provider-ci"));
}

#[test]
fn test_help_flag() {
    provider_ci()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bring a generated provider repository"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("list-migrations"));
}

#[test]
fn test_list_migrations_for_generic_template() {
    let temp_dir = TempDir::new().unwrap();

    provider_ci()
        .args(["list-migrations", "--template", "generic", "--out"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("skip\tFixup Bridge Imports"))
        .stdout(predicate::str::contains("run\tConsolidate Go modules"))
        .stdout(predicate::str::contains("run\tMaintain golangci-lint config"));
}

#[test]
fn test_list_migrations_reads_template_from_config() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".ci-mgmt.yaml"),
        "template: external-bridged-provider\nprovider: foo\n",
    )
    .unwrap();

    provider_ci()
        .args(["list-migrations", "--out"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("run\tUpdate TargetFramework to net8"))
        .stdout(predicate::str::contains("skip\tAdd .make to .gitignore"));
}

#[test]
fn test_unknown_template_is_a_configuration_error() {
    let temp_dir = TempDir::new().unwrap();

    provider_ci()
        .args(["migrate", "--template", "parallel-universe", "--out"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Unknown template 'parallel-universe'"));
}

#[test]
fn test_missing_repository_is_not_found() {
    let temp_dir = TempDir::new().unwrap();

    provider_ci()
        .args(["migrate", "--out"])
        .arg(temp_dir.path().join("missing"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_malformed_config_is_a_configuration_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".ci-mgmt.yaml"), "template: [generic\n").unwrap();

    provider_ci()
        .args(["list-migrations", "--out"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Failed to parse YAML configuration"));
}

#[test]
fn test_migrate_adds_gitignore_entries() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".gitignore"), "bin/\n").unwrap();
    fs::write(
        temp_dir.path().join(".ci-mgmt.yaml"),
        "template: bridged-provider\nprovider: foo\n",
    )
    .unwrap();

    // Outside a git checkout the net8 unit fails after the first gitignore entry
    provider_ci()
        .args(["migrate", "--out"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .code(3)
        .stdout(predicate::str::contains(
            "error running migration \"Update TargetFramework to net8\"",
        ));

    let gitignore = fs::read_to_string(temp_dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.contains("\n.make\n"));
    assert!(!gitignore.contains("mise.local.toml"));
}
