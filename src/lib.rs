//! Slidereel - incremental slide deck to narrated video builder
//!
//! A build pairs each page of a slide deck with one segment of a narration
//! script, synthesizes the narration, renders one clip per segment and joins
//! them into a captioned video. Artifacts are fingerprinted and recorded in a
//! snapshot so that the next build only redoes segments whose inputs changed.
//!
//! This library crate exposes the build engine for the CLI and for
//! integration testing.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod project;
pub mod script;
pub mod tts;

pub use config::{ProjectConfig, RawConfig};
pub use coordinator::{BuildCoordinator, BuildOptions, BuildReport};
pub use error::{BuildError, ErrorCategory, Result};
