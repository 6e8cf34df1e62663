//! On-device synthesis with the Coqui `tts` command line tool.
//!
//! The XTTS v2 model clones the voice of a speaker sample. One model instance
//! saturates the machine, so calls must not overlap.

use anyhow::Context;
use slidereel_av::ToolCommand;
use std::path::{Path, PathBuf};

use super::Synthesizer;
use crate::config::{ProjectConfig, DEFAULT_LANGUAGE};

pub const NAME: &str = "local";

const TOOL: &str = "tts";
const MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

/// Voice-cloning synthesis through a local XTTS v2 model.
#[derive(Debug, Clone)]
pub struct LocalSynthesizer {
    speaker_sample: PathBuf,
    language: String,
}

impl LocalSynthesizer {
    pub fn new(speaker_sample: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            speaker_sample: speaker_sample.into(),
            language: language.into(),
        }
    }

    /// Build from project settings; `voice` must name the speaker sample.
    ///
    /// The `tts` tool itself is looked up on first use, so listing or
    /// validating projects works on machines without it.
    pub fn from_config(config: &ProjectConfig) -> anyhow::Result<Self> {
        let voice = config
            .voice
            .as_deref()
            .context("the local backend requires `voice` (a speaker sample WAV)")?;
        let language = config.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
        Ok(Self::new(voice, language))
    }

    fn command(&self, text: &str, output: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(TOOL);
        cmd.arg("--text")
            .arg(text.trim())
            .args(["--model_name", MODEL])
            .arg("--speaker_wav")
            .arg(&self.speaker_sample)
            .arg("--language_idx")
            .arg(&self.language)
            .arg("--out_path")
            .arg(output);
        cmd
    }
}

impl Synthesizer for LocalSynthesizer {
    fn name(&self) -> &str {
        NAME
    }

    fn synthesize(&self, text: &str, output: &Path) -> anyhow::Result<()> {
        tracing::info!("Synthesizing {:?} locally", output);
        self.command(text, output)
            .execute()
            .with_context(|| format!("{TOOL} failed to write {}", output.display()))?;

        if !output.exists() {
            anyhow::bail!("{TOOL} exited without writing {}", output.display());
        }
        Ok(())
    }

    fn is_parallel_capable(&self) -> bool {
        false
    }
}
