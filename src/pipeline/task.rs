//! The per-segment build.

use parking_lot::Mutex;
use slidereel_av::captions::{self, Cue};
use slidereel_common::{OutputLayout, PadEdge};
use std::path::Path;

use crate::error::{BuildError, Result};
use crate::media::Encoder;
use crate::project::Item;
use crate::tts::Synthesizer;

/// What a task did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Frame and text were both reused.
    Skipped,
    /// The segment clip was rebuilt.
    Rebuilt {
        /// Whether the text was synthesized again.
        synthesized: bool,
    },
}

/// Shared resources every task in one build uses.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    pub layout: &'a OutputLayout,
    pub synthesizer: &'a dyn Synthesizer,
    pub encoder: &'a dyn Encoder,
    /// Held around synthesis when the backend is not parallel-capable.
    pub synthesis_lock: Option<&'a Mutex<()>>,
    /// Inter-segment silence in seconds.
    pub delay: f64,
}

/// Build work for the segment at one index.
pub struct SegmentTask<'a> {
    index: usize,
    frame: &'a Item,
    text: &'a Item,
    ctx: TaskContext<'a>,
}

impl<'a> SegmentTask<'a> {
    pub fn new(index: usize, frame: &'a Item, text: &'a Item, ctx: TaskContext<'a>) -> Self {
        Self {
            index,
            frame,
            text,
            ctx,
        }
    }

    /// 1-based segment number.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn run(&self) -> Result<TaskOutcome> {
        if self.frame.cached && self.text.cached {
            tracing::debug!(segment = self.number(), "Segment cached");
            return Ok(TaskOutcome::Skipped);
        }

        let layout = self.ctx.layout;
        let number = self.number();
        let text = std::fs::read_to_string(self.text.path())
            .map_err(|e| BuildError::io(self.text.path(), e))?;

        let raw_audio = layout.raw_audio(self.index);
        let synthesized = !self.text.cached || !raw_audio.exists();
        if synthesized {
            if self.text.cached {
                tracing::warn!(segment = number, "Cached audio missing, synthesizing again");
            }
            self.synthesize(&text, &raw_audio)?;
        }

        // Padding always starts from the unpadded audio.
        let audio = layout.padded_audio(self.index);
        std::fs::copy(&raw_audio, &audio).map_err(|e| BuildError::io(&audio, e))?;
        self.pad(&audio)?;

        let duration = self
            .ctx
            .encoder
            .audio_duration(&audio)
            .map_err(|e| BuildError::encode("duration probe", Some(number), e))?;

        // At least one half of the segment changed, and the clip length
        // follows the audio, so the clip is always rebuilt here.
        let silent = layout.silent_clip(self.index);
        self.ctx
            .encoder
            .image_to_clip(self.frame.path(), &silent, duration)
            .map_err(|e| BuildError::encode("image to clip", Some(number), e))?;

        let captions_file = layout.captions(self.index);
        captions::write_srt(&captions_file, &[Cue::spanning(duration, text.trim())])
            .map_err(|e| BuildError::encode("caption write", Some(number), e))?;

        self.ctx
            .encoder
            .mux_segment(&silent, &audio, &captions_file, &layout.segment_clip(self.index))
            .map_err(|e| BuildError::encode("mux", Some(number), e))?;

        tracing::info!(segment = number, duration, synthesized, "Segment rebuilt");
        Ok(TaskOutcome::Rebuilt { synthesized })
    }

    fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        let _guard = self.ctx.synthesis_lock.map(|lock| lock.lock());
        tracing::debug!(
            segment = self.number(),
            backend = self.ctx.synthesizer.name(),
            "Synthesizing"
        );
        self.ctx
            .synthesizer
            .synthesize(text, output)
            .map_err(|source| BuildError::Producer {
                segment: self.number(),
                source,
            })
    }

    /// Leading silence of half the delay, except on the first segment;
    /// trailing silence of half the delay unless the text overrides it.
    fn pad(&self, audio: &Path) -> Result<()> {
        let half = self.ctx.delay / 2.0;
        let number = self.number();
        if self.index != 0 {
            self.ctx
                .encoder
                .pad_silence(audio, half, PadEdge::Start)
                .map_err(|e| BuildError::encode("silence padding", Some(number), e))?;
        }
        let trailing = self.text.delay_override().unwrap_or(half);
        self.ctx
            .encoder
            .pad_silence(audio, trailing, PadEdge::End)
            .map_err(|e| BuildError::encode("silence padding", Some(number), e))
    }
}
