//! Operations shared by migration units
//!
//! Running external tools and rewriting text across a repository tree

pub mod commands;
pub mod replace;

pub use commands::*;
pub use replace::*;
