//! Error taxonomy for a build.
//!
//! Every failure surfaces to the top-level build call as a [`BuildError`].
//! [`BuildError::category`] groups variants into the three classes callers
//! care about: configuration problems found before any work starts, input
//! problems found while computing items, and producer failures raised by
//! synthesis or encoding tasks.

use std::path::PathBuf;

/// Result type alias for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Broad classification of a [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised before any work starts.
    Configuration,
    /// Raised while reading sources or the previous snapshot.
    Input,
    /// Raised inside a segment task or the aggregation step.
    Producer,
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing required config field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to load config file {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("unknown synthesis backend '{name}' (available: {available})")]
    UnknownBackend { name: String, available: String },

    #[error("synthesis backend '{backend}' could not be created: {source}")]
    BackendSetup {
        backend: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("refusing to reset {}: it contains source {}", dir.display(), source_path.display())]
    UnsafeOutputDir { dir: PathBuf, source_path: PathBuf },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Fingerprint(#[from] slidereel_common::Error),

    #[error("failed to rasterize {}: {source}", path.display())]
    Rasterize {
        path: PathBuf,
        #[source]
        source: slidereel_av::Error,
    },

    #[error("malformed segment {segment}: {reason}")]
    MalformedSegment { segment: usize, reason: String },

    #[error("malformed dictionary line {line}: {reason}")]
    MalformedDictionary { line: usize, reason: String },

    #[error("slide count ({frames}) does not match script segment count ({texts})")]
    CountMismatch { frames: usize, texts: usize },

    #[error("corrupt snapshot {}: {source}", path.display())]
    CorruptSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no snapshot found in {}", dir.display())]
    NoSnapshot { dir: PathBuf },

    #[error("segment {segment} out of range (project has {count})")]
    SegmentOutOfRange { segment: usize, count: usize },

    #[error("synthesis failed for segment {segment}: {source:#}")]
    Producer {
        segment: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("{step} failed{}: {source}", segment.map(|s| format!(" for segment {s}")).unwrap_or_default())]
    Encode {
        step: &'static str,
        segment: Option<usize>,
        #[source]
        source: slidereel_av::Error,
    },
}

impl BuildError {
    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an encoder error for a step, optionally tied to a segment number.
    pub fn encode(step: &'static str, segment: Option<usize>, source: slidereel_av::Error) -> Self {
        Self::Encode {
            step,
            segment,
            source,
        }
    }

    /// Which class of failure this is.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingField(_)
            | Self::InvalidConfig { .. }
            | Self::ConfigFile { .. }
            | Self::UnknownBackend { .. }
            | Self::BackendSetup { .. }
            | Self::UnsafeOutputDir { .. }
            | Self::WorkerPool(_) => ErrorCategory::Configuration,
            Self::Io { .. }
            | Self::Fingerprint(_)
            | Self::Rasterize { .. }
            | Self::MalformedSegment { .. }
            | Self::MalformedDictionary { .. }
            | Self::CountMismatch { .. }
            | Self::CorruptSnapshot { .. }
            | Self::NoSnapshot { .. }
            | Self::SegmentOutOfRange { .. } => ErrorCategory::Input,
            Self::Producer { .. } | Self::Encode { .. } => ErrorCategory::Producer,
        }
    }
}
