//! External tool detection and management.

use std::path::PathBuf;
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use slidereel_av::check_tool;
///
/// let info = check_tool("pdftoppm");
/// if info.available {
///     println!("pdftoppm version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_with_arg(name, "--version")
}

/// Check if a tool is available using a custom version argument.
///
/// Poppler tools print their version on stderr, so the first non-empty line of
/// either stream is taken as the version.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let Ok(path) = which::which(name) else {
        return ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        };
    };

    let version = Command::new(&path).arg(version_arg).output().ok().and_then(|output| {
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        stdout
            .lines()
            .chain(stderr.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(|s| s.to_string())
    });

    ToolInfo {
        name: name.to_string(),
        available: true,
        version,
        path: Some(path),
    }
}

/// Check every tool a slidereel build may invoke.
///
/// Returns information about ffmpeg, ffprobe, pdftoppm, pdfinfo, and the
/// Coqui `tts` CLI used by the local synthesis backend.
pub fn check_tools() -> Vec<ToolInfo> {
    vec![
        check_tool_with_arg("ffmpeg", "-version"),
        check_tool_with_arg("ffprobe", "-version"),
        check_tool_with_arg("pdftoppm", "-v"),
        check_tool_with_arg("pdfinfo", "-v"),
        check_tool("tts"),
    ]
}
