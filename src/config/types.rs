use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::BuildError;

pub const DEFAULT_SPEECH_RATE: f64 = 1.0;
pub const DEFAULT_DELAY: f64 = 2.0;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Project settings as read from a TOML file or the command line.
///
/// Every field is optional here; [`ProjectConfig::try_from`] enforces the
/// required set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawConfig {
    /// Synthesis backend name (`local`, `playht`, ...)
    #[serde(default)]
    pub model: Option<String>,

    /// Slide deck (PDF)
    #[serde(default)]
    pub slides: Option<PathBuf>,

    /// Narration script (plain text)
    #[serde(default)]
    pub script: Option<PathBuf>,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub speech_rate: Option<f64>,

    /// Silence between segments, in seconds
    #[serde(default)]
    pub delay: Option<f64>,

    /// Backend voice: a speaker sample path for `local`, a voice id for `playht`
    #[serde(default)]
    pub voice: Option<String>,

    #[serde(default)]
    pub language: Option<String>,

    /// Replacement dictionary applied to every segment before synthesis
    #[serde(default)]
    pub dictionary: Option<PathBuf>,
}

impl RawConfig {
    /// Overlay `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: RawConfig) -> RawConfig {
        RawConfig {
            model: overrides.model.or(self.model),
            slides: overrides.slides.or(self.slides),
            script: overrides.script.or(self.script),
            output_dir: overrides.output_dir.or(self.output_dir),
            speech_rate: overrides.speech_rate.or(self.speech_rate),
            delay: overrides.delay.or(self.delay),
            voice: overrides.voice.or(self.voice),
            language: overrides.language.or(self.language),
            dictionary: overrides.dictionary.or(self.dictionary),
        }
    }

    /// Fill unset fields that have defaults.
    pub fn with_defaults(mut self) -> RawConfig {
        self.speech_rate.get_or_insert(DEFAULT_SPEECH_RATE);
        self.delay.get_or_insert(DEFAULT_DELAY);
        self.language
            .get_or_insert_with(|| DEFAULT_LANGUAGE.to_string());
        self
    }
}

/// Validated build parameters.
///
/// Equality covers every field; any difference from the previous build's
/// config invalidates the whole project.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub model: String,
    pub slides: PathBuf,
    pub script: PathBuf,
    pub output_dir: PathBuf,
    pub speech_rate: f64,
    pub delay: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<PathBuf>,
}

impl TryFrom<RawConfig> for ProjectConfig {
    type Error = BuildError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let config = ProjectConfig {
            model: raw.model.ok_or(BuildError::MissingField("model"))?,
            slides: raw.slides.ok_or(BuildError::MissingField("slides"))?,
            script: raw.script.ok_or(BuildError::MissingField("script"))?,
            output_dir: raw
                .output_dir
                .ok_or(BuildError::MissingField("output_dir"))?,
            speech_rate: raw
                .speech_rate
                .ok_or(BuildError::MissingField("speech_rate"))?,
            delay: raw.delay.ok_or(BuildError::MissingField("delay"))?,
            voice: raw.voice,
            language: raw.language,
            dictionary: raw.dictionary,
        };

        non_negative("speech_rate", config.speech_rate)?;
        non_negative("delay", config.delay)?;
        if config.speech_rate == 0.0 {
            return Err(BuildError::InvalidConfig {
                field: "speech_rate",
                reason: "must be greater than zero".to_string(),
            });
        }
        if config.model.trim().is_empty() {
            return Err(BuildError::MissingField("model"));
        }

        Ok(config)
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), BuildError> {
    if !value.is_finite() || value < 0.0 {
        return Err(BuildError::InvalidConfig {
            field,
            reason: format!("expected a finite non-negative number, got {value}"),
        });
    }
    Ok(())
}
