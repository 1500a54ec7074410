//! Comment-preserving editor for YAML configuration files
//!
//! The document is parsed with `serde_yaml` for reading, while edits are
//! applied to the raw text of the top-level mapping. Writing a document that
//! was not edited reproduces the original bytes, and deleting a key removes
//! only the lines that belong to it.

use crate::error::MigrateError;
use crate::system::System;
use anyhow::{Context as _, Result};
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// A YAML file loaded for targeted edits
#[derive(Debug, Clone)]
pub struct YamlDocument {
    path: PathBuf,
    content: String,
    root: Value,
}

impl YamlDocument {
    /// Load and parse the YAML file at `path`
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::NotFound` when the file does not exist and
    /// `MigrateError::Parse` when it is not valid YAML.
    pub fn load(system: &dyn System, path: &Path) -> Result<Self> {
        let content = system.read_to_string(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                anyhow::Error::new(MigrateError::not_found(path))
            } else {
                anyhow::Error::new(err).context(format!("error reading {}", path.display()))
            }
        })?;
        Self::parse(path, content)
    }

    /// Like [`YamlDocument::load`], but a missing file yields `None`
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_optional(system: &dyn System, path: &Path) -> Result<Option<Self>> {
        match Self::load(system, path) {
            Ok(doc) => Ok(Some(doc)),
            Err(err)
                if err
                    .downcast_ref::<MigrateError>()
                    .is_some_and(MigrateError::is_not_found) =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Parse YAML text that will later be written to `path`
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::Parse` when `content` is not valid YAML.
    pub fn parse<P: AsRef<Path>>(path: P, content: String) -> Result<Self> {
        let path = path.as_ref();
        let root: Value = serde_yaml::from_str(&content).map_err(|err| {
            MigrateError::parse(format!("error unmarshaling {}: {err}", path.display()))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
            root,
        })
    }

    /// The path this document is written back to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current raw text of the document
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Value of a top-level key, or `None` when the root is not a mapping or
    /// the key is absent
    #[must_use]
    pub fn get_field(&self, key: &str) -> Option<&Value> {
        self.root.as_mapping()?.get(key)
    }

    /// Flatten the mapping stored under a top-level key into strings
    ///
    /// Unlike [`node_to_string_map`], scalars keep the spelling used in the
    /// file, so `python: 3.10` yields `"3.10"` rather than `"3.1"`.
    #[must_use]
    pub fn field_to_string_map(&self, key: &str) -> Option<BTreeMap<String, String>> {
        let mut map = node_to_string_map(self.get_field(key))?;
        let raw = self.raw_child_scalars(key);
        if let Some(mapping) = self.get_field(key).and_then(Value::as_mapping) {
            for (child_key, child_value) in mapping {
                if matches!(child_value, Value::String(_)) {
                    continue;
                }
                if let Some(name) = scalar_to_string(child_key)
                    && let Some(spelling) = raw.get(&name)
                {
                    map.insert(name, spelling.clone());
                }
            }
        }
        Some(map)
    }

    /// Remove one top-level key together with its value
    ///
    /// Returns `false` when the key was not present. Every other line,
    /// including comments, is left exactly as it was.
    pub fn delete_field(&mut self, key: &str) -> bool {
        let Some(mapping) = self.root.as_mapping_mut() else {
            return false;
        };
        if mapping.remove(key).is_none() {
            return false;
        }

        let mut lines: Vec<&str> = self.content.split_inclusive('\n').collect();
        if let Some((start, end)) = key_span(&lines, key) {
            let mut end = end;
            let mut start = start;
            // A comment block directly above the key goes with it
            while start > 0 && lines[start - 1].starts_with('#') {
                start -= 1;
            }
            let blank_before = start > 0 && is_blank(lines[start - 1]);
            if end < lines.len() {
                // Keep a single separator between the neighbours
                if blank_before && is_blank(lines[end]) {
                    end += 1;
                }
            } else {
                while start > 0 && is_blank(lines[start - 1]) {
                    start -= 1;
                }
            }
            lines.drain(start..end);
            self.content = lines.concat();
        } else {
            // Flow-style roots have no per-key lines to cut out
            self.content = serialize_mapping(mapping);
        }
        true
    }

    /// Write the document back to the path it was loaded from
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, system: &dyn System) -> Result<()> {
        system
            .write(&self.path, self.content.as_bytes())
            .with_context(|| format!("error writing {}", self.path.display()))
    }

    /// Raw scalar text of the direct children of a top-level key
    fn raw_child_scalars(&self, key: &str) -> HashMap<String, String> {
        let lines: Vec<&str> = self.content.split_inclusive('\n').collect();
        let mut scalars = HashMap::new();
        let Some((start, end)) = key_span(&lines, key) else {
            return scalars;
        };

        let mut child_indent = None;
        for line in &lines[start + 1..end] {
            let trimmed = line.trim_start();
            if trimmed.trim().is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indent = line.len() - trimmed.len();
            let expected = *child_indent.get_or_insert(indent);
            if indent != expected {
                continue;
            }
            if let Some((name, rest)) = split_mapping_line(trimmed.trim_end()) {
                let value = unquote(strip_inline_comment(rest).trim());
                if !value.is_empty() {
                    scalars.insert(name, value.to_owned());
                }
            }
        }
        scalars
    }
}

/// Flatten a mapping's direct scalar children into strings
///
/// Returns `None` when the node is absent or not a mapping. Nested mappings
/// and sequences are skipped.
#[must_use]
pub fn node_to_string_map(node: Option<&Value>) -> Option<BTreeMap<String, String>> {
    let mapping = node?.as_mapping()?;
    let mut out = BTreeMap::new();
    for (key, value) in mapping {
        if let (Some(key), Some(value)) = (scalar_to_string(key), scalar_to_string(value)) {
            out.insert(key, value);
        }
    }
    Some(out)
}

/// String form of a scalar node, `None` for collections
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn serialize_mapping(mapping: &Mapping) -> String {
    if mapping.is_empty() {
        return String::new();
    }
    serde_yaml::to_string(mapping).unwrap_or_default()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Lines at column zero that end the value of the previous top-level key
fn is_top_level_boundary(line: &str) -> bool {
    let Some(first) = line.chars().next() else {
        return false;
    };
    if first.is_whitespace() || first == '#' {
        return false;
    }
    // Block sequences may be written at the same indentation as their key
    !(line.starts_with("- ") || line.trim_end() == "-")
}

/// Line range `[start, end)` holding a top-level key and its value
///
/// Trailing blank lines and column-zero comments before the next key are
/// left to the next key.
fn key_span(lines: &[&str], key: &str) -> Option<(usize, usize)> {
    let start = lines.iter().position(|line| {
        is_top_level_boundary(line)
            && split_mapping_line(line.trim_end()).is_some_and(|(name, _)| name == key)
    })?;

    let mut end = lines[start + 1..]
        .iter()
        .position(|line| is_top_level_boundary(line))
        .map_or(lines.len(), |offset| start + 1 + offset);

    while end > start + 1 && (is_blank(lines[end - 1]) || lines[end - 1].starts_with('#')) {
        end -= 1;
    }
    Some((start, end))
}

/// Split `key: rest` into the unquoted key and the text after the colon
fn split_mapping_line(line: &str) -> Option<(String, &str)> {
    let (key, after) = if let Some(quote @ ('"' | '\'')) = line.chars().next() {
        let close = line[1..].find(quote)? + 1;
        (line[1..close].to_owned(), line[close + 1..].trim_start())
    } else {
        let colon = line
            .match_indices(':')
            .find(|(idx, _)| {
                line[idx + 1..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
            })?
            .0;
        (line[..colon].trim_end().to_owned(), &line[colon..])
    };
    let rest = after.strip_prefix(':')?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((key, rest))
}

fn strip_inline_comment(value: &str) -> &str {
    let mut quote = None;
    let mut previous = ' ';
    for (idx, c) in value.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' && previous.is_whitespace() => return &value[..idx],
            None => {}
        }
        previous = c;
    }
    value
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
