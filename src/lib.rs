//! `provider-ci` - post-generation migrations for provider repositories
//!
//! After the CI templates are rendered into a provider repository, an
//! ordered list of idempotent migrations moves older layouts forward:
//! `.ci-mgmt.yaml` settings become mise configuration, nested Go modules
//! are consolidated at the root, and toolchain files are refreshed through
//! `git`, `go` and `mise`.
//!
//! All filesystem, environment and process access goes through
//! [`system::System`], so every migration can be exercised against
//! [`system::MockSystem`].

pub mod cli;
pub mod config;
pub mod edit;
pub mod error;
pub mod migrations;
pub mod operations;
pub mod system;
pub mod utils;

use anyhow::Result;
use cli::{Args, Command};
use system::RealSystem;

/// Main entry point for the provider-ci library
///
/// # Errors
///
/// Returns the first failure of the selected command.
pub fn run(args: &Args) -> Result<()> {
    let system = RealSystem::new();

    match &args.command {
        Command::Migrate(repo) => {
            cli::execute_migrate(&system, repo)?;
        }
        Command::ListMigrations(repo) => {
            // Output to stdout (not using logging)
            for (name, runs) in cli::execute_list_migrations(&system, repo)? {
                println!("{}\t{name}", if runs { "run" } else { "skip" });
            }
        }
    }
    Ok(())
}
