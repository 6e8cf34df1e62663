//! The persisted record of a completed build.

use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::Item;
use crate::config::ProjectConfig;
use crate::error::{BuildError, Result};

/// Which half of a segment a force-reset edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    Frame,
    Text,
    Both,
}

/// Config and item fingerprints of one build, as stored in `project.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub slides: PathBuf,
    pub script: PathBuf,
    pub output_dir: PathBuf,
    pub speech_rate: f64,
    pub config: ProjectConfig,
    pub frame_items: Vec<Item>,
    pub text_items: Vec<Item>,
}

impl Snapshot {
    pub fn new(config: &ProjectConfig, frame_items: Vec<Item>, text_items: Vec<Item>) -> Self {
        let name = config
            .output_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());

        Self {
            name,
            slides: config.slides.clone(),
            script: config.script.clone(),
            output_dir: config.output_dir.clone(),
            speech_rate: config.speech_rate,
            config: config.clone(),
            frame_items,
            text_items,
        }
    }

    /// Read a snapshot file.
    ///
    /// Returns `Ok(None)` when the file does not exist. A file that exists but
    /// cannot be parsed is [`BuildError::CorruptSnapshot`].
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BuildError::io(path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| BuildError::CorruptSnapshot {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Read the snapshot kept in an output directory; its absence is an error.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(slidereel_common::paths::SNAPSHOT_FILE);
        Self::load(&path)?.ok_or_else(|| BuildError::NoSnapshot {
            dir: dir.to_path_buf(),
        })
    }

    /// Write the snapshot, replacing any previous file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BuildError::io(dir, e))?;

        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)
                .map_err(|e| BuildError::io(path, e.into()))?;
            writer.flush().map_err(|e| BuildError::io(path, e))?;
        }

        tmp.persist(path)
            .map_err(|e| BuildError::io(path, e.error))?;
        Ok(())
    }

    /// Number of segments recorded.
    pub fn segment_count(&self) -> usize {
        self.frame_items.len().min(self.text_items.len())
    }

    /// Set or clear the sticky force-reset flag on segment `segment` (1-based).
    pub fn set_force_reset(&mut self, segment: usize, target: ResetTarget, value: bool) -> Result<()> {
        let count = self.segment_count();
        if segment == 0 || segment > count {
            return Err(BuildError::SegmentOutOfRange { segment, count });
        }
        let index = segment - 1;

        if matches!(target, ResetTarget::Frame | ResetTarget::Both) {
            self.frame_items[index].force_reset = value;
        }
        if matches!(target, ResetTarget::Text | ResetTarget::Both) {
            self.text_items[index].force_reset = value;
        }
        Ok(())
    }
}
