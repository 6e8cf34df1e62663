//! Error types for slidereel-av.

use std::path::PathBuf;

/// Result alias for media tool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving external media tools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// ffmpeg, ffprobe or a poppler binary is not on `PATH`.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// A tool exited non-zero; `message` holds its stderr.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// ffprobe JSON, pdfinfo text or an SRT file could not be understood.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A caller passed something no tool can work with, e.g. no clips.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The scratch file next to an output could not be set up or committed.
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}
