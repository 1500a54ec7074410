//! External tool execution with captured output

use crate::error::MigrateError;
use crate::system::{CommandOutput, CommandSpec, System};
use anyhow::{Context as _, Result};
use tracing::{debug, warn};

/// Run a command and fail unless it exits successfully
///
/// The returned error carries the exit code, both captured streams and the
/// working directory.
///
/// # Errors
///
/// Returns `MigrateError::Command` when the process cannot be started or
/// exits unsuccessfully.
pub fn run_checked(system: &dyn System, command: &CommandSpec) -> Result<CommandOutput> {
    let output = system
        .run(command)
        .map_err(|err| MigrateError::command(format!("failed to start `{command}`: {err}")))
        .with_context(|| format!("Working directory: {}", command.cwd.display()))?;

    if !output.is_success() {
        return Err(MigrateError::command(failure_message(command, &output)).into());
    }

    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        debug!("`{}` output:\n{}", command, stdout);
    }
    Ok(output)
}

/// Run a command whose failure must not abort the caller
///
/// Failures are logged as warnings and reported as `None`.
pub fn run_soft(system: &dyn System, command: &CommandSpec) -> Option<CommandOutput> {
    match run_checked(system, command) {
        Ok(output) => Some(output),
        Err(err) => {
            warn!("{err:#}");
            None
        }
    }
}

/// Run a command, ignoring any failure
///
/// Used for cleanup steps whose targets may legitimately be absent.
pub fn run_ignoring_failure(system: &dyn System, command: &CommandSpec) {
    match system.run(command) {
        Ok(output) if output.is_success() => {}
        Ok(output) => debug!("{}", failure_message(command, &output)),
        Err(err) => debug!("failed to start `{}`: {}", command, err),
    }
}

fn failure_message(command: &CommandSpec, output: &CommandOutput) -> String {
    let code = output
        .code
        .map_or_else(|| "signal".to_owned(), |code| code.to_string());
    let mut message = format!("`{command}` failed with exit code {code}\n");

    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        message.push_str(&format!("Error output:\n{stderr}\n"));
    }

    let stdout = output.stdout.trim();
    if !stdout.is_empty() {
        message.push_str(&format!("Standard output:\n{stdout}\n"));
    }

    message.push_str(&format!("Working directory: {}", command.cwd.display()));
    message
}
