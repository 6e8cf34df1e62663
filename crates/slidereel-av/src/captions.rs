//! SRT caption files.
//!
//! Each segment gets a caption file with a single cue spanning its audio.
//! At aggregation time the per-segment files are merged onto one timeline.

use crate::{Error, Result};
use std::fmt::Write as _;
use std::path::Path;

/// One caption cue. Times are in seconds from the start of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    /// A cue covering `[0, duration]`.
    pub fn spanning(duration: f64, text: impl Into<String>) -> Self {
        Self {
            start: 0.0,
            end: duration,
            text: text.into(),
        }
    }
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{mins:02}:{secs:02},{ms:03}")
}

/// Parse an SRT timestamp (`HH:MM:SS,mmm`) into seconds.
pub fn parse_timestamp(s: &str) -> Option<f64> {
    let (hms, ms) = s.trim().split_once(',')?;
    let mut parts = hms.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let mins: u64 = parts.next()?.parse().ok()?;
    let secs: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let ms: u64 = ms.parse().ok()?;
    Some((hours * 3600 + mins * 60 + secs) as f64 + ms as f64 / 1000.0)
}

/// Render cues as SRT text, numbering them from 1.
///
/// Blank lines inside a cue's text are dropped.
pub fn render_srt(cues: &[Cue]) -> String {
    let mut out = String::new();
    for (i, cue) in cues.iter().enumerate() {
        let _ = writeln!(out, "{}", i + 1);
        let _ = writeln!(
            out,
            "{} --> {}",
            format_timestamp(cue.start),
            format_timestamp(cue.end)
        );
        // A blank line ends a cue, so paragraphs are joined line by line.
        for line in cue.text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let _ = writeln!(out, "{line}");
        }
        out.push('\n');
    }
    out
}

/// Parse SRT text into cues. Cue numbers are ignored.
pub fn parse_srt(content: &str) -> Result<Vec<Cue>> {
    let normalized = content.replace("\r\n", "\n");
    let mut cues = Vec::new();

    for block in normalized.split("\n\n") {
        let mut lines = block.lines().filter(|l| !l.trim().is_empty());
        let Some(_number) = lines.next() else {
            continue;
        };
        let timing = lines
            .next()
            .ok_or_else(|| Error::parse_error("srt", format!("cue without timing: {block:?}")))?;
        let (start, end) = timing
            .split_once("-->")
            .and_then(|(a, b)| Some((parse_timestamp(a)?, parse_timestamp(b)?)))
            .ok_or_else(|| Error::parse_error("srt", format!("bad timing line: {timing:?}")))?;
        let text = lines.collect::<Vec<_>>().join("\n");
        cues.push(Cue { start, end, text });
    }

    Ok(cues)
}

/// Write cues to an SRT file.
pub fn write_srt(path: &Path, cues: &[Cue]) -> Result<()> {
    std::fs::write(path, render_srt(cues))?;
    Ok(())
}

/// Read cues from an SRT file.
pub fn read_srt(path: &Path) -> Result<Vec<Cue>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path)
        } else {
            Error::Io(e)
        }
    })?;
    parse_srt(&content)
}

/// Lay caption tracks end to end.
///
/// Each track is shifted by the accumulated end time of the tracks before it,
/// so a track's length is the end of its last cue.
pub fn merge_timelines(tracks: &[Vec<Cue>]) -> Vec<Cue> {
    let mut merged = Vec::new();
    let mut offset = 0.0;
    for track in tracks {
        let mut track_end: f64 = 0.0;
        for cue in track {
            merged.push(Cue {
                start: cue.start + offset,
                end: cue.end + offset,
                text: cue.text.clone(),
            });
            track_end = track_end.max(cue.end);
        }
        offset += track_end;
    }
    merged
}

/// Merge the caption files at `inputs` into one file at `output`.
pub fn merge_files(inputs: &[std::path::PathBuf], output: &Path) -> Result<()> {
    let tracks = inputs
        .iter()
        .map(|p| read_srt(p))
        .collect::<Result<Vec<_>>>()?;
    write_srt(output, &merge_timelines(&tracks))
}
