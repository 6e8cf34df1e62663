//! # slidereel-av
//!
//! External media tool plumbing for slidereel.
//!
//! This crate provides functionality for:
//! - Discovering external tools (ffmpeg, ffprobe, poppler, Coqui `tts`)
//! - Running them synchronously with captured output
//! - Audio operations: silence padding, duration probing
//! - Video operations: still image to clip, muxing, concatenation, caption burn-in
//! - SRT caption files: rendering, parsing, timeline merging
//! - Rasterizing PDF slide decks into ordered PNG frames
//!
//! Every operation blocks the calling thread until the tool exits.
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use slidereel_av::{audio, video};
//! use std::path::Path;
//!
//! let duration = audio::duration(Path::new("/out/sub_paragraph_1.wav"))?;
//! video::image_to_clip(
//!     Path::new("/out/slide_1.png"),
//!     Path::new("/out/sub_paragraph_without_sound_1.mp4"),
//!     duration,
//! )?;
//! # Ok::<(), slidereel_av::Error>(())
//! ```

pub mod audio;
pub mod captions;
pub mod command;
mod error;
pub mod rasterize;
pub mod tools;
pub mod video;
pub mod workspace;

// Re-exports
pub use captions::Cue;
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use tools::{check_tool, check_tools, ToolInfo};
pub use workspace::Workspace;
