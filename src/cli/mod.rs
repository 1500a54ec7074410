//! Command-line interface module
//!
//! Handles argument parsing and the `migrate` / `list-migrations` commands

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
