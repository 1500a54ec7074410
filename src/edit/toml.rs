//! Line-oriented editor for the TOML files mise reads
//!
//! Only two operations are needed: reading the `key = "value"` pairs of a
//! section and adding missing pairs to a section. Everything else in the
//! file is kept as raw text.

use crate::system::System;
use crate::utils::fs::{read_optional, write_file};
use anyhow::{Context as _, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One `key = "value"` assignment inside a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    pub key: String,
    pub value: String,
}

impl SectionEntry {
    #[must_use]
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The assignment as it is written to the file
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{} = {}", format_key(&self.key), format_string(&self.value))
    }
}

/// A TOML file held as raw text together with the path it mirrors
#[derive(Debug, Clone)]
pub struct TomlDocument {
    path: PathBuf,
    content: String,
}

impl TomlDocument {
    /// Load the TOML file at `path`, or an empty document if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error for any read failure other than a missing file.
    pub fn load(system: &dyn System, path: &Path) -> Result<Self> {
        let content = read_optional(system, path)?.unwrap_or_default();
        Ok(Self::from_content(path, content))
    }

    #[must_use]
    pub fn from_content<P: AsRef<Path>>(path: P, content: String) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            content,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replace the whole text, used to seed new files
    pub fn set_content<S: Into<String>>(&mut self, content: S) {
        self.content = content.into();
    }

    /// Assignments of `[section]` in file order
    ///
    /// Returns an empty list when the section is absent.
    #[must_use]
    pub fn get_section(&self, section: &str) -> Vec<SectionEntry> {
        let header = format!("[{section}]");
        let mut lines = self.content.lines();
        if !lines.by_ref().any(|line| line.trim() == header) {
            return Vec::new();
        }

        let mut entries = Vec::new();
        for line in lines {
            let trimmed = line.trim();
            if is_header(trimmed) {
                break;
            }
            if let Some((key, value)) = split_assignment(trimmed) {
                entries.push(SectionEntry::new(key, unquote(strip_inline_comment(value).trim())));
            }
        }
        entries
    }

    /// Add every entry whose key is not yet present in `[section]`
    ///
    /// Existing values are never overwritten. A missing section is appended
    /// at the end of the document. Returns whether the text changed.
    ///
    /// # Errors
    ///
    /// Does not fail at present.
    pub fn ensure_section_entries(
        &mut self,
        section: &str,
        entries: &[SectionEntry],
    ) -> Result<bool> {
        let mut seen = HashSet::new();
        let entries: Vec<&SectionEntry> = entries
            .iter()
            .filter(|entry| !entry.key.is_empty() && seen.insert(entry.key.as_str()))
            .collect();
        if entries.is_empty() {
            return Ok(false);
        }

        let header = format!("[{section}]");
        let mut lines: Vec<String> = self.content.split('\n').map(str::to_owned).collect();
        let Some(section_idx) = lines.iter().position(|line| line.trim() == header) else {
            self.append_section(&header, &entries);
            return Ok(true);
        };

        let mut insertion_idx = lines.len();
        let mut existing = HashSet::new();
        for (idx, line) in lines.iter().enumerate().skip(section_idx + 1) {
            let trimmed = line.trim();
            if is_header(trimmed) {
                insertion_idx = idx;
                break;
            }
            if let Some((key, _)) = split_assignment(trimmed) {
                existing.insert(key);
            }
        }

        let additions: Vec<String> = entries
            .iter()
            .filter(|entry| !existing.contains(&entry.key))
            .map(|entry| entry.to_line())
            .collect();
        if additions.is_empty() {
            return Ok(false);
        }

        let tail = lines.split_off(insertion_idx);
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
        lines.extend(additions);
        if tail.first().is_some_and(|line| !line.trim().is_empty()) {
            lines.push(String::new());
        }
        if tail.is_empty() {
            // Keep the trailing newline when appending at the end of the file
            lines.push(String::new());
        }
        lines.extend(tail);
        self.content = lines.join("\n");
        Ok(true)
    }

    /// Write the raw text back to the document's path
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn write(&self, system: &dyn System) -> Result<()> {
        write_file(system, &self.path, self.content.as_bytes())
            .with_context(|| format!("error writing new file {}", self.path.display()))
    }

    fn append_section(&mut self, header: &str, entries: &[&SectionEntry]) {
        let mut content = String::new();
        if !self.content.trim().is_empty() {
            content.push_str(self.content.trim_end_matches('\n'));
            content.push_str("\n\n");
        }
        content.push_str(header);
        content.push('\n');
        for entry in entries {
            content.push_str(&entry.to_line());
            content.push('\n');
        }
        self.content = content;
    }
}

fn is_header(trimmed: &str) -> bool {
    trimmed.starts_with('[') && trimmed.ends_with(']')
}

/// Unquoted key and raw value of an assignment line
fn split_assignment(trimmed: &str) -> Option<(String, &str)> {
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = if trimmed.starts_with('"') || trimmed.starts_with('\'') {
        let quote = trimmed[..1].chars().next()?;
        let close = find_closing_quote(&trimmed[1..], quote)? + 1;
        let rest = trimmed[close + 1..].trim_start().strip_prefix('=')?;
        (unescape(&trimmed[1..close]), rest)
    } else {
        let (key, rest) = trimmed.split_once('=')?;
        (key.trim().to_owned(), rest)
    };
    Some((key, value))
}

fn find_closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        match c {
            '\\' if quote == '"' && !escaped => escaped = true,
            c if c == quote && !escaped => return Some(idx),
            _ => escaped = false,
        }
    }
    None
}

fn strip_inline_comment(value: &str) -> &str {
    let mut quote = None;
    let mut escaped = false;
    for (idx, c) in value.char_indices() {
        match quote {
            Some('"') if c == '\\' && !escaped => {
                escaped = true;
                continue;
            }
            Some(q) if c == q && !escaped => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return &value[..idx],
            None => {}
        }
        escaped = false;
    }
    value
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 {
        if value.starts_with('"') && value.ends_with('"') {
            return unescape(&value[1..value.len() - 1]);
        }
        if value.starts_with('\'') && value.ends_with('\'') {
            return value[1..value.len() - 1].to_owned();
        }
    }
    value.to_owned()
}

fn unescape(value: &str) -> String {
    value.replace("\\\"", "\"")
}

/// Bare keys are limited to ASCII letters, digits, `-` and `_`
fn format_key(key: &str) -> String {
    if key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        key.to_owned()
    } else {
        format_string(key)
    }
}

fn format_string(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}
