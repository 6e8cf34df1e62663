//! Shared test harness for integration tests.
//!
//! Provides [`TestProject`], a scratch project directory wired to fake media
//! tools and a fake synthesis backend, so builds run without ffmpeg, poppler
//! or a TTS engine. The fakes count their calls for assertions.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use slidereel::media::{Encoder, Rasterizer};
use slidereel::project::Snapshot;
use slidereel::tts::{BackendRegistry, Synthesizer};
use slidereel::{BuildCoordinator, BuildOptions, BuildReport, ProjectConfig, Result};
use slidereel_common::{OutputLayout, PadEdge};
use tempfile::TempDir;

/// Backend name the fake synthesizer is registered under.
pub const FAKE_BACKEND: &str = "fake";

/// Writes one configurable byte string per page.
#[derive(Default)]
pub struct FakeRasterizer {
    pages: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl FakeRasterizer {
    pub fn set_pages(&self, pages: &[&str]) {
        *self.pages.lock() = pages.iter().map(|p| p.to_string()).collect();
    }
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, source: &Path, layout: &OutputLayout) -> slidereel_av::Result<Vec<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !source.exists() {
            return Err(slidereel_av::Error::file_not_found(source));
        }
        self.pages
            .lock()
            .iter()
            .enumerate()
            .map(|(i, content)| -> slidereel_av::Result<PathBuf> {
                let path = layout.slide_image(i);
                std::fs::write(&path, content)?;
                Ok(path)
            })
            .collect()
    }
}

/// File-based stand-in for ffmpeg.
///
/// Audio "duration" is the file size divided by 1000, and padding appends
/// 1000 bytes per second of silence, so durations stay consistent with the
/// padding the task applied.
#[derive(Default)]
pub struct FakeEncoder {
    pub pads: AtomicUsize,
    pub clips: AtomicUsize,
    pub muxes: AtomicUsize,
    pub concatenations: AtomicUsize,
    pub burns: AtomicUsize,
    /// Time each clip render and mux blocks for.
    work: Mutex<Duration>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeEncoder {
    pub fn set_work(&self, work: Duration) {
        *self.work.lock() = work;
    }

    /// Highest number of overlapping clip renders and muxes observed.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn encode<T>(&self, step: impl FnOnce() -> T) -> T {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let work = *self.work.lock();
        if !work.is_zero() {
            std::thread::sleep(work);
        }
        let result = step();
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    pub fn aggregations(&self) -> usize {
        self.concatenations.load(Ordering::SeqCst)
    }

    pub fn muxes(&self) -> usize {
        self.muxes.load(Ordering::SeqCst)
    }
}

impl Encoder for FakeEncoder {
    fn pad_silence(&self, audio: &Path, seconds: f64, _edge: PadEdge) -> slidereel_av::Result<()> {
        self.pads.fetch_add(1, Ordering::SeqCst);
        let mut bytes = std::fs::read(audio)?;
        bytes.resize(bytes.len() + (seconds * 1000.0).round() as usize, 0);
        std::fs::write(audio, bytes)?;
        Ok(())
    }

    fn audio_duration(&self, audio: &Path) -> slidereel_av::Result<f64> {
        Ok(std::fs::metadata(audio)?.len() as f64 / 1000.0)
    }

    fn image_to_clip(&self, image: &Path, clip: &Path, duration: f64) -> slidereel_av::Result<()> {
        self.clips.fetch_add(1, Ordering::SeqCst);
        self.encode(|| -> slidereel_av::Result<()> {
            let image = std::fs::read_to_string(image)?;
            std::fs::write(clip, format!("{image}@{duration:.3}"))?;
            Ok(())
        })
    }

    fn mux_segment(
        &self,
        clip: &Path,
        _audio: &Path,
        captions: &Path,
        output: &Path,
    ) -> slidereel_av::Result<()> {
        self.muxes.fetch_add(1, Ordering::SeqCst);
        self.encode(|| -> slidereel_av::Result<()> {
            let clip = std::fs::read_to_string(clip)?;
            let captions = std::fs::read_to_string(captions)?;
            std::fs::write(output, format!("{clip}\n{captions}"))?;
            Ok(())
        })
    }

    fn concatenate(&self, clips: &[PathBuf], output: &Path) -> slidereel_av::Result<()> {
        self.concatenations.fetch_add(1, Ordering::SeqCst);
        let mut joined = String::new();
        for clip in clips {
            joined.push_str(&std::fs::read_to_string(clip)?);
            joined.push('\n');
        }
        std::fs::write(output, joined)?;
        Ok(())
    }

    fn burn_captions(&self, input: &Path, captions: &Path, output: &Path) -> slidereel_av::Result<()> {
        self.burns.fetch_add(1, Ordering::SeqCst);
        let video = std::fs::read_to_string(input)?;
        let captions = std::fs::read_to_string(captions)?;
        std::fs::write(output, format!("{video}\n{captions}"))?;
        Ok(())
    }
}

/// Synthesizer that writes the text bytes and tracks concurrency.
pub struct FakeSynthesizer {
    parallel: bool,
    work: Duration,
    pub calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    /// Texts containing this marker fail.
    fail_marker: Mutex<Option<String>>,
}

impl FakeSynthesizer {
    pub fn new(parallel: bool) -> Self {
        Self::with_work(parallel, Duration::ZERO)
    }

    /// A synthesizer whose every call blocks for `work`.
    pub fn with_work(parallel: bool, work: Duration) -> Self {
        Self {
            parallel,
            work,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            fail_marker: Mutex::new(None),
        }
    }

    pub fn fail_on(&self, marker: &str) {
        *self.fail_marker.lock() = Some(marker.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping `synthesize` calls observed.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl Synthesizer for FakeSynthesizer {
    fn name(&self) -> &str {
        FAKE_BACKEND
    }

    fn synthesize(&self, text: &str, output: &Path) -> anyhow::Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.work.is_zero() {
            std::thread::sleep(self.work);
        }

        let failing = self
            .fail_marker
            .lock()
            .as_deref()
            .is_some_and(|marker| text.contains(marker));
        let result = if failing {
            Err(anyhow::anyhow!("synthesis refused: {text}"))
        } else {
            std::fs::write(output, text.as_bytes()).map_err(Into::into)
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn is_parallel_capable(&self) -> bool {
        self.parallel
    }
}

/// A scratch project: sources in a temp dir, output in `<tmp>/out`.
pub struct TestProject {
    pub dir: TempDir,
    pub rasterizer: Arc<FakeRasterizer>,
    pub encoder: Arc<FakeEncoder>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub config: ProjectConfig,
    pub options: BuildOptions,
}

impl TestProject {
    /// A project with a parallel-capable fake backend.
    pub fn new() -> Self {
        Self::with_synthesizer(FakeSynthesizer::new(true))
    }

    pub fn with_synthesizer(synthesizer: FakeSynthesizer) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = dir.path();
        std::fs::write(root.join("deck.pdf"), b"%PDF").expect("failed to write deck");
        std::fs::write(root.join("script.txt"), "").expect("failed to write script");

        let config = ProjectConfig {
            model: FAKE_BACKEND.to_string(),
            slides: root.join("deck.pdf"),
            script: root.join("script.txt"),
            output_dir: root.join("out"),
            speech_rate: 1.0,
            delay: 1.0,
            voice: None,
            language: Some("en".to_string()),
            dictionary: None,
        };

        Self {
            dir,
            rasterizer: Arc::new(FakeRasterizer::default()),
            encoder: Arc::new(FakeEncoder::default()),
            synthesizer: Arc::new(synthesizer),
            config,
            options: BuildOptions::default(),
        }
    }

    /// Set slide pages and script segments in one go.
    pub fn set_segments(&self, slides: &[&str], texts: &[&str]) {
        self.rasterizer.set_pages(slides);
        self.write_script(&texts.join("\nNEWSLIDE\n"));
    }

    pub fn write_script(&self, content: &str) {
        std::fs::write(&self.config.script, content).expect("failed to write script");
    }

    pub fn coordinator(&self) -> BuildCoordinator {
        let mut registry = BackendRegistry::new();
        let synthesizer = self.synthesizer.clone();
        registry.register(FAKE_BACKEND, move |_| {
            Ok(synthesizer.clone() as Arc<dyn Synthesizer>)
        });
        BuildCoordinator::new(registry, self.encoder.clone(), self.rasterizer.clone())
    }

    pub fn build(&self) -> Result<BuildReport> {
        self.coordinator().build(&self.config, &self.options)
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.config.output_dir)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::load_from_dir(&self.config.output_dir).expect("snapshot should exist")
    }

    pub fn snapshot_json(&self) -> String {
        std::fs::read_to_string(self.layout().snapshot_file()).expect("snapshot should exist")
    }
}
