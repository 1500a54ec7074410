//! The default migration list run end to end against a mocked repository

#![expect(clippy::unwrap_used, reason = "This is a test module")]

use provider_ci::config::TemplateKind;
use provider_ci::error::MigrateError;
use provider_ci::migrations::{GitignoreEntry, Migration, default_migrations, migrate};
use provider_ci::system::{CommandOutput, MockSystem, System};
use std::path::Path;

const TRACKED_FILES: &[&str] = &[
    "/repo/.ci-mgmt.yaml",
    "/repo/.gitignore",
    "/repo/go.mod",
    "/repo/mise.toml",
    "/repo/.config/mise.toml",
    "/repo/examples/cs/App.csproj",
];

fn bridged_repo() -> MockSystem {
    MockSystem::new()
        .with_file(
            "/repo/.ci-mgmt.yaml",
            b"provider: foo\nplugins:\n  - name: random\ntoolVersions:\n  nodejs: 20.x\n",
        )
        .unwrap()
        .with_file("/repo/.gitignore", b"bin/\n")
        .unwrap()
        .with_file("/repo/go.mod", b"module github.com/pulumi/pulumi-foo\n")
        .unwrap()
        .with_file("/repo/mise.toml", b"[tools]\ngo = \"1.23\"\n")
        .unwrap()
        .with_file(
            "/repo/examples/cs/App.csproj",
            b"<TargetFramework>net6.0</TargetFramework>\n",
        )
        .unwrap()
        .with_command_output(
            "git ls-files",
            CommandOutput::success("examples/cs/App.csproj\n"),
        )
        .unwrap()
        .with_command_output(
            "go mod edit -json",
            CommandOutput::success(
                r#"{"Module": {"Path": "github.com/pulumi/pulumi-foo"}, "Toolchain": "go1.23.4"}"#,
            ),
        )
        .unwrap()
        .with_command_output("mise env", CommandOutput::success(r#"{"GOTOOLCHAIN": "local"}"#))
        .unwrap()
}

fn snapshot(system: &MockSystem) -> Vec<Option<String>> {
    TRACKED_FILES
        .iter()
        .map(|path| system.read_to_string(Path::new(path)).ok())
        .collect()
}

#[test]
fn test_bridged_provider_repository_is_migrated() {
    let system = bridged_repo();

    let report = migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo")).unwrap();

    assert_eq!(report.ran.len(), default_migrations().len());
    assert!(report.skipped.is_empty());

    let gitignore = system.read_to_string(Path::new("/repo/.gitignore")).unwrap();
    assert!(gitignore.starts_with("bin/\n"));
    assert!(gitignore.contains("\n.make\n"));
    assert!(gitignore.contains("\nmise.local.toml\n"));
    assert!(gitignore.contains("\n!sdk/go/**/schema.go\n"));

    assert_eq!(
        system
            .read_to_string(Path::new("/repo/examples/cs/App.csproj"))
            .unwrap(),
        "<TargetFramework>net8.0</TargetFramework>\n"
    );

    let moved = system
        .read_to_string(Path::new("/repo/.config/mise.toml"))
        .unwrap();
    assert!(moved.starts_with("[tools]\ngo = \"1.23\"\n"));
    assert!(moved.contains("\"vfox-pulumi:pulumi/pulumi-random\" = \"latest\""));

    let overrides = system.read_to_string(Path::new("/repo/mise.toml")).unwrap();
    assert!(overrides.contains("nodejs = \"20\""));

    assert_eq!(
        system
            .read_to_string(Path::new("/repo/.ci-mgmt.yaml"))
            .unwrap(),
        "provider: foo\n"
    );

    let lines = system.command_lines().unwrap();
    assert!(lines.contains(&"go mod edit -toolchain=none".to_owned()));
    assert_eq!(system.env_var("GOTOOLCHAIN").unwrap(), "local");
}

#[test]
fn test_second_run_changes_nothing() {
    let system = bridged_repo();

    migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo")).unwrap();
    let first = snapshot(&system);

    migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo")).unwrap();

    assert_eq!(snapshot(&system), first);
}

#[test]
fn test_generic_template_skips_bridged_units() {
    let system = bridged_repo();

    let report = migrate(&system, TemplateKind::Generic, Path::new("/repo")).unwrap();

    assert_eq!(
        report.skipped,
        vec![
            "Fixup Bridge Imports",
            "Remove explicit SDK dependency",
            "Add .make to .gitignore",
            "Update TargetFramework to net8",
            "Add mise.local.toml to .gitignore",
            "Exclude sdk/go/**/schema.go from .gitignore",
            "Move mise.toml to .config directory",
        ]
    );
    assert_eq!(
        system.read_to_string(Path::new("/repo/.gitignore")).unwrap(),
        "bin/\n"
    );
}

#[test]
fn test_tool_failure_stops_the_run() {
    let system = MockSystem::new()
        .with_file(
            "/repo/.ci-mgmt.yaml",
            b"provider: foo\nplugins:\n  - name: random\n",
        )
        .unwrap()
        .with_command_output(
            "git ls-files",
            CommandOutput::failure(128, "not a git repository"),
        )
        .unwrap();

    let err = migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo")).unwrap_err();

    assert_eq!(
        err.to_string(),
        "error running migration \"Update TargetFramework to net8\""
    );
    assert!(format!("{err:#}").contains("not a git repository"));
    assert_eq!(
        err.downcast_ref::<MigrateError>()
            .map(MigrateError::exit_code),
        Some(3)
    );
    assert!(
        system
            .read_to_string(Path::new("/repo/.ci-mgmt.yaml"))
            .unwrap()
            .contains("plugins")
    );
}

#[test]
fn test_gitignore_entries_are_added_once() {
    let system = MockSystem::new()
        .with_file("/repo/.gitignore", b"# local\nmise.local.toml\n")
        .unwrap();

    for entry in [
        GitignoreEntry::ignore_make_dir(),
        GitignoreEntry::ignore_mise_local(),
        GitignoreEntry::ignore_make_dir(),
    ] {
        entry
            .migrate(&system, TemplateKind::BridgedProvider, Path::new("/repo"))
            .unwrap();
    }

    let gitignore = system.read_to_string(Path::new("/repo/.gitignore")).unwrap();
    assert_eq!(gitignore.matches("mise.local.toml").count(), 1);
    assert_eq!(gitignore.matches(".make").count(), 1);
}
