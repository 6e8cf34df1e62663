//! Slidereel-Common: Shared types, fingerprints, and path conventions.
//!
//! This crate provides functionality used across slidereel:
//!
//! - **Item kinds**: The four artifact categories a build tracks
//! - **Content hashes**: SHA-256 fingerprints of files on disk
//! - **Output layout**: Index-addressed artifact paths inside an output directory
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use slidereel_common::{ContentHash, ItemKind, OutputLayout};
//! use std::path::Path;
//!
//! let layout = OutputLayout::new("/tmp/build");
//! assert_eq!(layout.segment_clip(0), Path::new("/tmp/build/sub_paragraph_1.mp4"));
//!
//! let hash = ContentHash::from_bytes(b"hello");
//! assert_eq!(hash.as_str().len(), 64);
//! assert_eq!(ItemKind::SourceFrame.as_str(), "source-frame");
//! ```

pub mod error;
pub mod hash;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use hash::ContentHash;
pub use paths::OutputLayout;
pub use types::*;
