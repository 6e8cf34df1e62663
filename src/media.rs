//! Seams to the external media tools.
//!
//! The build engine talks to rasterization and encoding through these traits
//! so that the incremental logic can be exercised without ffmpeg or poppler.

use slidereel_av::{audio, rasterize, video, Result};
use slidereel_common::{OutputLayout, PadEdge};
use std::path::{Path, PathBuf};

/// Turns a slide deck into ordered page images.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `source` to `layout.slide_image(i)` and return the
    /// paths in page order.
    fn rasterize(&self, source: &Path, layout: &OutputLayout) -> Result<Vec<PathBuf>>;
}

/// Audio and video encoding steps used by segment tasks and aggregation.
pub trait Encoder: Send + Sync {
    /// Add `seconds` of silence to one edge of `audio` in place.
    fn pad_silence(&self, audio: &Path, seconds: f64, edge: PadEdge) -> Result<()>;

    /// Duration of an audio file in seconds.
    fn audio_duration(&self, audio: &Path) -> Result<f64>;

    /// Render a still image into a clip of exactly `duration` seconds.
    fn image_to_clip(&self, image: &Path, clip: &Path, duration: f64) -> Result<()>;

    /// Combine a silent clip, its audio and its captions into `output`.
    fn mux_segment(&self, clip: &Path, audio: &Path, captions: &Path, output: &Path) -> Result<()>;

    /// Join clips in order into `output`.
    fn concatenate(&self, clips: &[PathBuf], output: &Path) -> Result<()>;

    /// Render `captions` onto the frames of `input`.
    fn burn_captions(&self, input: &Path, captions: &Path, output: &Path) -> Result<()>;
}

/// Rasterizer backed by poppler's `pdfinfo` and `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdfRasterizer {
    dpi: u32,
}

impl PdfRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

impl Default for PdfRasterizer {
    fn default() -> Self {
        Self::new(rasterize::DEFAULT_DPI)
    }
}

impl Rasterizer for PdfRasterizer {
    fn rasterize(&self, source: &Path, layout: &OutputLayout) -> Result<Vec<PathBuf>> {
        rasterize::rasterize_pdf(source, layout, self.dpi)
    }
}

/// Encoder backed by the ffmpeg and ffprobe command line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEncoder;

impl Encoder for FfmpegEncoder {
    fn pad_silence(&self, audio: &Path, seconds: f64, edge: PadEdge) -> Result<()> {
        audio::pad_silence(audio, seconds, edge)
    }

    fn audio_duration(&self, audio: &Path) -> Result<f64> {
        audio::duration(audio)
    }

    fn image_to_clip(&self, image: &Path, clip: &Path, duration: f64) -> Result<()> {
        video::image_to_clip(image, clip, duration)
    }

    fn mux_segment(&self, clip: &Path, audio: &Path, captions: &Path, output: &Path) -> Result<()> {
        video::mux_segment(clip, audio, captions, output)
    }

    fn concatenate(&self, clips: &[PathBuf], output: &Path) -> Result<()> {
        video::concatenate(clips, output)
    }

    fn burn_captions(&self, input: &Path, captions: &Path, output: &Path) -> Result<()> {
        video::burn_captions(input, captions, output)
    }
}
