use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use slidereel::RawConfig;

#[derive(Parser)]
#[command(name = "slidereel")]
#[command(author, version, about = "Turn a slide deck and a narration script into a narrated video")]
pub struct Cli {
    /// Path to project file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the video, redoing only segments whose inputs changed
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        /// Worker threads (defaults to one per CPU)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Show per-segment cache state recorded in an output directory
    Status {
        /// Output directory of a previous build
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Mark a segment so its next build never reuses cached work
    ForceReset {
        /// Output directory of a previous build
        #[arg(long)]
        output_dir: PathBuf,

        /// Segment number (1-based)
        #[arg(long)]
        segment: usize,

        /// Only the slide image
        #[arg(long, conflicts_with = "text")]
        frame: bool,

        /// Only the narration text
        #[arg(long)]
        text: bool,

        /// Clear the flag instead of setting it
        #[arg(long)]
        clear: bool,
    },

    /// List registered synthesis backends
    Backends,

    /// Check that required external tools are available
    CheckTools,

    /// Display version information
    Version,
}

/// Project settings that override the project file.
#[derive(Args, Debug, Default)]
pub struct ProjectArgs {
    /// Synthesis backend
    #[arg(short, long)]
    pub model: Option<String>,

    /// Slide deck (PDF)
    #[arg(long)]
    pub slides: Option<PathBuf>,

    /// Narration script
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Speaker sample (local) or voice id (playht)
    #[arg(long)]
    pub voice: Option<String>,

    /// Speech rate multiplier
    #[arg(long)]
    pub speech_rate: Option<f64>,

    /// Silence between segments, in seconds
    #[arg(long)]
    pub delay: Option<f64>,

    /// Word replacement dictionary
    #[arg(long)]
    pub dictionary: Option<PathBuf>,

    /// Narration language
    #[arg(long)]
    pub language: Option<String>,
}

impl From<ProjectArgs> for RawConfig {
    fn from(args: ProjectArgs) -> Self {
        RawConfig {
            model: args.model,
            slides: args.slides,
            script: args.script,
            output_dir: args.output_dir,
            speech_rate: args.speech_rate,
            delay: args.delay,
            voice: args.voice,
            language: args.language,
            dictionary: args.dictionary,
        }
    }
}
