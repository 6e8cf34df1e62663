//! Artifact naming inside an output directory.
//!
//! Per-segment artifacts are addressed by segment number, which is the
//! zero-based index plus one. Whole-project outputs have fixed names.

use std::path::{Path, PathBuf};

/// Name of the persisted snapshot file.
pub const SNAPSHOT_FILE: &str = "project.json";

/// Resolves every artifact path under one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the snapshot file.
    pub fn snapshot_file(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    /// Rasterized slide image for the segment at `index`.
    pub fn slide_image(&self, index: usize) -> PathBuf {
        self.numbered("slide", index, "png")
    }

    /// Post-substitution segment text.
    pub fn script_text(&self, index: usize) -> PathBuf {
        self.numbered("sub_paragraph", index, "txt")
    }

    /// Audio exactly as the synthesis backend produced it.
    pub fn raw_audio(&self, index: usize) -> PathBuf {
        self.numbered("voice", index, "wav")
    }

    /// Audio after silence padding.
    pub fn padded_audio(&self, index: usize) -> PathBuf {
        self.numbered("sub_paragraph", index, "wav")
    }

    /// SRT captions for one segment.
    pub fn captions(&self, index: usize) -> PathBuf {
        self.numbered("sub_paragraph", index, "srt")
    }

    /// Still-image clip before audio is muxed in.
    pub fn silent_clip(&self, index: usize) -> PathBuf {
        self.numbered("sub_paragraph_without_sound", index, "mp4")
    }

    /// Final per-segment clip.
    pub fn segment_clip(&self, index: usize) -> PathBuf {
        self.numbered("sub_paragraph", index, "mp4")
    }

    /// All segment clips, in index order.
    pub fn segment_clips(&self, count: usize) -> Vec<PathBuf> {
        (0..count).map(|i| self.segment_clip(i)).collect()
    }

    /// Concatenation of every segment clip.
    pub fn concatenated(&self) -> PathBuf {
        self.root.join("output.mp4")
    }

    /// Captions of every segment merged onto one timeline.
    pub fn merged_captions(&self) -> PathBuf {
        self.root.join("output.srt")
    }

    /// Final output with captions burned in.
    pub fn captioned(&self) -> PathBuf {
        self.root.join("output_with_subtitles.mp4")
    }

    fn numbered(&self, stem: &str, index: usize, ext: &str) -> PathBuf {
        self.root.join(format!("{stem}_{}.{ext}", index + 1))
    }
}
