//! Audio operations: silence padding and duration probing.

use crate::{Error, Result, ToolCommand, Workspace};
use serde::Deserialize;
use slidereel_common::PadEdge;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Add `seconds` of silence to one edge of `audio`, rewriting it in place.
///
/// A non-positive duration leaves the file untouched.
pub fn pad_silence(audio: &Path, seconds: f64, edge: PadEdge) -> Result<()> {
    if !audio.exists() {
        return Err(Error::file_not_found(audio));
    }
    if !seconds.is_finite() || seconds <= 0.0 {
        return Ok(());
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Padding {:?} with {:.3}s of silence at {:?}", audio, seconds, edge);

    let workspace = Workspace::new(audio)?;
    ToolCommand::ffmpeg()
        .arg("-i")
        .arg(audio)
        .arg("-af")
        .arg(silence_filter(seconds, edge))
        .arg(workspace.output())
        .execute()?;
    workspace.finalize()?;
    Ok(())
}

/// Build the ffmpeg audio filter that inserts silence at `edge`.
pub fn silence_filter(seconds: f64, edge: PadEdge) -> String {
    match edge {
        PadEdge::Start => {
            let millis = (seconds * 1000.0).round() as u64;
            format!("adelay=delays={millis}:all=1")
        }
        PadEdge::End => format!("apad=pad_dur={seconds:.3}"),
    }
}

/// Probe the duration of an audio (or any media) file in seconds.
pub fn duration(path: &Path) -> Result<f64> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = ToolCommand::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
        .arg(path)
        .execute()?;

    parse_duration_json(&output.stdout)
}

/// Parse the JSON emitted by `ffprobe -show_entries format=duration -of json`.
pub fn parse_duration_json(json: &str) -> Result<f64> {
    let parsed: FfprobeOutput = serde_json::from_str(json)?;
    let raw = parsed
        .format
        .duration
        .ok_or_else(|| Error::parse_error("ffprobe", "no duration reported"))?;
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::parse_error("ffprobe", format!("invalid duration {raw:?}")))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(Error::parse_error(
            "ffprobe",
            format!("invalid duration {raw:?}"),
        ));
    }
    Ok(seconds)
}
