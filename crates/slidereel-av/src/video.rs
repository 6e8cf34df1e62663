//! Video operations built on the ffmpeg CLI.

use crate::{Error, Result, ToolCommand, Workspace};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Frame rate of clips rendered from still images.
pub const CLIP_FRAME_RATE: u32 = 30;

/// Render a still image into an H.264 clip lasting exactly `duration` seconds.
///
/// Odd image dimensions are rounded down to even, as yuv420p requires.
pub fn image_to_clip(image: &Path, clip: &Path, duration: f64) -> Result<()> {
    if !image.exists() {
        return Err(Error::file_not_found(image));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "clip duration must be positive, got {duration}"
        )));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Rendering {:?} into {:?} ({:.3}s)", image, clip, duration);

    ToolCommand::ffmpeg()
        .args(["-loop", "1", "-framerate"])
        .arg(CLIP_FRAME_RATE.to_string())
        .arg("-t")
        .arg(format!("{duration:.3}"))
        .arg("-i")
        .arg(image)
        .args([
            "-vf",
            "scale=trunc(iw/2)*2:trunc(ih/2)*2",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
        ])
        .arg(clip)
        .execute()?;
    Ok(())
}

/// Mux a silent clip, its narration, and its captions into one segment clip.
///
/// Video is stream-copied; audio is encoded to AAC and captions are stored as
/// a soft `mov_text` track.
pub fn mux_segment(clip: &Path, audio: &Path, captions: &Path, output: &Path) -> Result<()> {
    for input in [clip, audio, captions] {
        if !input.exists() {
            return Err(Error::file_not_found(input));
        }
    }

    ToolCommand::ffmpeg()
        .arg("-i")
        .arg(clip)
        .arg("-i")
        .arg(audio)
        .arg("-i")
        .arg(captions)
        .args([
            "-map", "0:v", "-map", "1:a", "-map", "2:s", "-c:v", "copy", "-c:a", "aac",
            "-c:s", "mov_text",
        ])
        .arg(output)
        .execute()?;
    Ok(())
}

/// Concatenate clips, in order, without re-encoding.
pub fn concatenate(clips: &[PathBuf], output: &Path) -> Result<()> {
    if clips.is_empty() {
        return Err(Error::InvalidInput("no clips to concatenate".to_string()));
    }
    for clip in clips {
        if !clip.exists() {
            return Err(Error::file_not_found(clip));
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Concatenating {} clips into {:?}", clips.len(), output);

    let workspace = Workspace::new(output)?;
    let list_file = workspace.temp_file("concat.txt");
    std::fs::write(&list_file, concat_list(clips)?)?;

    ToolCommand::ffmpeg()
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(&list_file)
        .args(["-c", "copy"])
        .arg(workspace.output())
        .execute()?;
    workspace.finalize()?;
    Ok(())
}

/// Render the concat demuxer list for `clips`, using absolute paths.
pub fn concat_list(clips: &[PathBuf]) -> Result<String> {
    let mut list = String::new();
    for clip in clips {
        let absolute = std::path::absolute(clip)?;
        let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
        let _ = writeln!(list, "file '{escaped}'");
    }
    Ok(list)
}

/// Re-encode `input` with `captions` burned into the picture.
pub fn burn_captions(input: &Path, captions: &Path, output: &Path) -> Result<()> {
    for path in [input, captions] {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Burning captions {:?} into {:?}", captions, output);

    let absolute = std::path::absolute(captions)?;
    ToolCommand::ffmpeg()
        .arg("-i")
        .arg(input)
        .arg("-vf")
        .arg(format!("subtitles={}", escape_filter_value(&absolute)))
        .args([
            "-map", "0:v", "-map", "0:a", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-c:a",
            "aac",
        ])
        .arg(output)
        .execute()?;
    Ok(())
}

/// Escape a path for use as an ffmpeg filter option value.
pub fn escape_filter_value(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        if matches!(c, '\\' | ':' | '\'' | ',' | ';' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_absolute_and_quoted() {
        let clips = vec![
            PathBuf::from("/out/sub_paragraph_1.mp4"),
            PathBuf::from("/out/it's/sub_paragraph_2.mp4"),
        ];
        let list = concat_list(&clips).unwrap();
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines[0], "file '/out/sub_paragraph_1.mp4'");
        assert_eq!(lines[1], r"file '/out/it'\''s/sub_paragraph_2.mp4'");
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(
            escape_filter_value(Path::new("/tmp/a:b/it's.srt")),
            r"/tmp/a\:b/it\'s.srt"
        );
    }

    #[test]
    fn test_concatenate_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let result = concatenate(&[], &dir.path().join("output.mp4"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_image_to_clip_rejects_bad_duration() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("slide_1.png");
        std::fs::write(&image, b"png").unwrap();
        let result = image_to_clip(&image, &dir.path().join("clip.mp4"), 0.0);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_mux_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = mux_segment(
            &dir.path().join("clip.mp4"),
            &dir.path().join("a.wav"),
            &dir.path().join("a.srt"),
            &dir.path().join("out.mp4"),
        );
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }
}
