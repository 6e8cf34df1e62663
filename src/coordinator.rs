//! Top-level build sequence.
//!
//! A build fingerprints the current sources, reconciles them against the
//! snapshot in the output directory, rebuilds invalidated segments, reruns
//! the aggregation if anything changed, and finally records a new snapshot.
//! Any failure aborts before the snapshot is written.

use parking_lot::Mutex;
use slidereel_av::captions;
use slidereel_common::{ItemKind, OutputLayout};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ProjectConfig;
use crate::error::{BuildError, Result};
use crate::media::{Encoder, FfmpegEncoder, PdfRasterizer, Rasterizer};
use crate::pipeline::{self, Scheduler, TaskContext, TaskOutcome};
use crate::project::{Item, Project, Snapshot, SyncOutcome};
use crate::script::{self, Dictionary};
use crate::tts::BackendRegistry;

/// Per-invocation knobs that are not part of the project config.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Worker threads; rayon's global pool when unset.
    pub jobs: Option<usize>,
}

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub segments: usize,
    pub sync: SyncOutcome,
    /// Segments whose clip was rebuilt.
    pub rebuilt: usize,
    /// Segments whose text was synthesized.
    pub synthesized: usize,
    /// Whether concatenation and caption burn-in ran.
    pub aggregated: bool,
    /// The captioned output, when aggregation ran.
    pub output: Option<PathBuf>,
    pub snapshot: PathBuf,
}

/// Runs builds with an injected backend table and media tools.
pub struct BuildCoordinator {
    registry: BackendRegistry,
    encoder: Arc<dyn Encoder>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl BuildCoordinator {
    pub fn new(
        registry: BackendRegistry,
        encoder: Arc<dyn Encoder>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            registry,
            encoder,
            rasterizer,
        }
    }

    /// Built-in backends with ffmpeg and poppler.
    pub fn with_defaults() -> Self {
        Self::new(
            BackendRegistry::with_defaults(),
            Arc::new(FfmpegEncoder),
            Arc::new(PdfRasterizer::default()),
        )
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn build(&self, config: &ProjectConfig, options: &BuildOptions) -> Result<BuildReport> {
        let synthesizer = self.registry.create(config)?;
        let scheduler = Scheduler::new(options.jobs)?;
        let layout = OutputLayout::new(&config.output_dir);

        prepare_output_dir(config, &layout)?;

        let dictionary = config
            .dictionary
            .as_deref()
            .map(Dictionary::load)
            .transpose()?;
        if let Some(dict) = &dictionary {
            tracing::info!("Loaded {} dictionary entries", dict.len());
        }

        let frames = self.frame_items(&config.slides, &layout)?;
        let texts = text_items(&config.script, &layout, dictionary.as_ref())?;
        let previous = Snapshot::load(&layout.snapshot_file())?;

        let mut project = Project::new(config.clone(), frames, texts, previous)?;
        let sync = project.sync();
        tracing::info!("{} segment(s): {}", project.len(), sync);

        let synthesis_lock = (!synthesizer.is_parallel_capable()).then(|| Mutex::new(()));
        let ctx = TaskContext {
            layout: &layout,
            synthesizer: &*synthesizer,
            encoder: &*self.encoder,
            synthesis_lock: synthesis_lock.as_ref(),
            delay: config.delay,
        };
        let tasks = pipeline::segment_tasks(&project, ctx);
        let outcomes = scheduler.run(&tasks)?;

        let rebuilt = outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Rebuilt { .. }))
            .count();
        let synthesized = outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::Rebuilt { synthesized: true }))
            .count();

        let output = if project.all_cached() {
            tracing::info!("All segments cached, skipping aggregation");
            None
        } else {
            Some(self.aggregate(&layout, project.len())?)
        };

        let segments = project.len();
        let snapshot = layout.snapshot_file();
        project.into_snapshot().save(&snapshot)?;

        Ok(BuildReport {
            segments,
            sync,
            rebuilt,
            synthesized,
            aggregated: output.is_some(),
            output,
            snapshot,
        })
    }

    fn frame_items(&self, slides: &Path, layout: &OutputLayout) -> Result<Vec<Item>> {
        let images = self
            .rasterizer
            .rasterize(slides, layout)
            .map_err(|source| BuildError::Rasterize {
                path: slides.to_path_buf(),
                source,
            })?;

        images
            .into_iter()
            .map(|image| -> Result<Item> {
                Ok(Item::from_file(image, ItemKind::SourceFrame)?)
            })
            .collect()
    }

    /// Concatenate every segment clip and burn the merged captions in.
    fn aggregate(&self, layout: &OutputLayout, count: usize) -> Result<PathBuf> {
        tracing::info!("Aggregating {} segment clip(s)", count);

        let concatenated = layout.concatenated();
        self.encoder
            .concatenate(&layout.segment_clips(count), &concatenated)
            .map_err(|e| BuildError::encode("concatenate", None, e))?;

        let caption_files: Vec<PathBuf> = (0..count).map(|i| layout.captions(i)).collect();
        let merged = layout.merged_captions();
        captions::merge_files(&caption_files, &merged)
            .map_err(|e| BuildError::encode("caption merge", None, e))?;

        let captioned = layout.captioned();
        self.encoder
            .burn_captions(&concatenated, &merged, &captioned)
            .map_err(|e| BuildError::encode("caption burn-in", None, e))?;

        tracing::info!("Wrote {:?}", captioned);
        Ok(captioned)
    }
}

fn text_items(
    script_path: &Path,
    layout: &OutputLayout,
    dictionary: Option<&Dictionary>,
) -> Result<Vec<Item>> {
    script::segment_script(script_path, layout, dictionary)?
        .into_iter()
        .map(|(path, segment)| -> Result<Item> {
            Ok(Item::from_file(path, ItemKind::SourceText)?.with_extra(segment.extra()))
        })
        .collect()
}

/// Make sure the output directory exists and belongs to us.
///
/// A directory without a snapshot holds files of unknown origin; it is
/// removed and recreated so nothing in it can be mistaken for a cached
/// artifact.
fn prepare_output_dir(config: &ProjectConfig, layout: &OutputLayout) -> Result<()> {
    let dir = layout.root();

    if dir.exists() && !layout.snapshot_file().exists() {
        for source in [&config.slides, &config.script] {
            if is_within(source, dir) {
                return Err(BuildError::UnsafeOutputDir {
                    dir: dir.to_path_buf(),
                    source_path: source.clone(),
                });
            }
        }
        tracing::warn!("{:?} has no snapshot, starting from an empty directory", dir);
        std::fs::remove_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
    }

    std::fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))
}

fn is_within(path: &Path, dir: &Path) -> bool {
    let canonical = |p: &Path| std::fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    canonical(path).starts_with(canonical(dir))
}
