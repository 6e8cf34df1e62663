//! Word replacement applied to narration before synthesis.
//!
//! A dictionary file holds `original: replacement` lines. Each entry replaces
//! whole-word occurrences of `original`, then its naive plural (`originals`
//! becomes `replacements`). Entries apply in file order.

use regex::{NoExpand, Regex};
use std::path::Path;

use crate::error::{BuildError, Result};

#[derive(Debug)]
struct Entry {
    singular: Regex,
    plural: Regex,
    replacement: String,
    plural_replacement: String,
}

/// Ordered replacement rules.
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: Vec<Entry>,
}

impl Dictionary {
    /// Read a dictionary file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Self::parse(&content)
    }

    /// Parse dictionary text. Blank lines are skipped.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let malformed = |reason: &str| BuildError::MalformedDictionary {
                line: number + 1,
                reason: reason.to_string(),
            };

            let mut parts = line.split(':');
            let (Some(original), Some(replacement), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(malformed("expected exactly one ':'"));
            };
            let original = original.trim();
            if original.is_empty() {
                return Err(malformed("empty original text"));
            }
            let replacement = replacement.trim();

            let singular = Regex::new(&whole_word(original))
                .map_err(|e| malformed(&e.to_string()))?;
            let plural = Regex::new(&whole_word(&format!("{original}s")))
                .map_err(|e| malformed(&e.to_string()))?;

            entries.push(Entry {
                singular,
                plural,
                replacement: replacement.to_string(),
                plural_replacement: format!("{replacement}s"),
            });
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply every entry to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_string();
        for entry in &self.entries {
            text = entry
                .singular
                .replace_all(&text, NoExpand(&entry.replacement))
                .into_owned();
            text = entry
                .plural
                .replace_all(&text, NoExpand(&entry.plural_replacement))
                .into_owned();
        }
        text
    }
}

/// Literal pattern for `word`, anchored with `\b` on each edge that is a
/// word character. A `\b` next to `+` or `.` would need a word character on
/// the far side and never match before a space or the end of the text.
fn whole_word(word: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if word.starts_with(is_word) { r"\b" } else { "" };
    let trail = if word.ends_with(is_word) { r"\b" } else { "" };
    format!("{lead}{}{trail}", regex::escape(word))
}
