//! Editors for the structured configuration files migrations touch
//!
//! Both editors keep the raw text of the file and change only the region a
//! mutation affects, so unrelated formatting and comments survive.

pub mod toml;
pub mod yaml;

pub use toml::{SectionEntry, TomlDocument};
pub use yaml::{YamlDocument, node_to_string_map};
