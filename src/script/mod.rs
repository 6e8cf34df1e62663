//! Narration script segmentation.
//!
//! A script is plain text split on the `NEWSLIDE` marker, one segment per
//! slide. A segment may end with a `===` block of `key: value` lines; the
//! only recognised key is `#delay`, the trailing silence in seconds.
//!
//! ```text
//! Welcome to the talk.
//! ===
//! #delay: 3
//! NEWSLIDE
//! Second slide narration.
//! ```

mod dictionary;

pub use dictionary::Dictionary;

use serde_json::Value;
use slidereel_common::OutputLayout;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};
use crate::project::{Extra, DELAY_KEY};

/// Token separating segments.
pub const SEGMENT_MARKER: &str = "NEWSLIDE";

/// Token separating segment text from its inline config.
pub const CONFIG_SEPARATOR: &str = "===";

const DELAY_DIRECTIVE: &str = "#delay";

/// One narration segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Text after dictionary substitution; this is what gets spoken.
    pub text: String,
    /// Text as written in the script.
    pub original_text: String,
    /// Trailing silence override in seconds.
    pub delay: Option<f64>,
}

impl Segment {
    /// Metadata carried on the segment's text item.
    pub fn extra(&self) -> Extra {
        let mut extra = Extra::new();
        if let Some(delay) = self.delay.and_then(serde_json::Number::from_f64) {
            extra.insert(DELAY_KEY.to_string(), Value::Number(delay));
        }
        extra
    }
}

/// Split script text into segments, skipping blank ones.
pub fn split_script(content: &str, dictionary: Option<&Dictionary>) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();

    for raw in content.split(SEGMENT_MARKER) {
        if raw.trim().is_empty() {
            continue;
        }
        let number = segments.len() + 1;
        let (original_text, delay) = parse_segment(number, raw)?;
        let text = match dictionary {
            Some(dict) => dict.apply(&original_text),
            None => original_text.clone(),
        };
        segments.push(Segment {
            text,
            original_text,
            delay,
        });
    }

    Ok(segments)
}

/// Separate a segment's text from its inline config block.
fn parse_segment(number: usize, raw: &str) -> Result<(String, Option<f64>)> {
    let malformed = |reason: String| BuildError::MalformedSegment {
        segment: number,
        reason,
    };

    let parts: Vec<&str> = raw.split(CONFIG_SEPARATOR).collect();
    let text = parts[0].trim().to_string();

    match parts.len() {
        1 => Ok((text, None)),
        2 => {
            let mut delay = None;
            for line in parts[1].lines().map(str::trim).filter(|l| !l.is_empty()) {
                let mut kv = line.split(':');
                let (Some(key), Some(value), None) = (kv.next(), kv.next(), kv.next()) else {
                    return Err(malformed(format!("expected 'key: value', got {line:?}")));
                };
                if key.trim() == DELAY_DIRECTIVE {
                    let value = value.trim();
                    let seconds: f64 = value
                        .parse()
                        .map_err(|_| malformed(format!("delay {value:?} is not a number")))?;
                    if !seconds.is_finite() || seconds < 0.0 {
                        return Err(malformed(format!(
                            "delay {value:?} must be a finite non-negative number"
                        )));
                    }
                    delay = Some(seconds);
                } else {
                    tracing::debug!("Ignoring unknown segment setting {:?}", key.trim());
                }
            }
            Ok((text, delay))
        }
        n => Err(malformed(format!(
            "expected at most one '{CONFIG_SEPARATOR}' block, found {}",
            n - 1
        ))),
    }
}

/// Read the script at `path`, split it, and write each segment's spoken text
/// to its numbered file in `layout`.
///
/// Returns the written paths alongside the parsed segments.
pub fn segment_script(
    path: &Path,
    layout: &OutputLayout,
    dictionary: Option<&Dictionary>,
) -> Result<Vec<(PathBuf, Segment)>> {
    let content = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let segments = split_script(&content, dictionary)?;

    segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| {
            let target = layout.script_text(index);
            std::fs::write(&target, &segment.text).map_err(|e| BuildError::io(&target, e))?;
            Ok((target, segment))
        })
        .collect()
}
