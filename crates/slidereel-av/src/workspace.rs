//! Scratch space for rewriting a file in place.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace for replacing one target file.
///
/// Provides a temporary directory next to the target (same filesystem, so the
/// final rename is atomic) for intermediate files, and an output path that
/// [`finalize`](Workspace::finalize) moves over the target.
///
/// # Example
///
/// ```no_run
/// use slidereel_av::Workspace;
///
/// let workspace = Workspace::new("/out/sub_paragraph_1.wav")?;
/// // Write the rewritten file to workspace.output()
/// workspace.finalize()?;
/// # Ok::<(), slidereel_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    target_path: PathBuf,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a new workspace for rewriting `target`.
    pub fn new<P: AsRef<Path>>(target: P) -> Result<Self> {
        let target = target.as_ref();
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp_dir = tempfile::Builder::new()
            .prefix(".slidereel-")
            .tempdir_in(&parent)
            .map_err(|e| Error::Workspace(e.to_string()))?;

        let file_name = target
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("Invalid target path: {:?}", target)))?;
        let output_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            target_path: target.to_path_buf(),
            output_path,
        })
    }

    /// Get the output file path.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Move the output over the target.
    ///
    /// If the target exists it is first moved aside; the original is restored
    /// when the replacement rename fails.
    pub fn finalize(self) -> Result<PathBuf> {
        let dest = &self.target_path;

        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "Output file does not exist: {:?}",
                self.output_path
            )));
        }

        if dest.exists() {
            let backup = self.temp_file("original.bak");
            std::fs::rename(dest, &backup).map_err(|e| {
                Error::Workspace(format!("Failed to move original aside: {}", e))
            })?;

            if let Err(e) = std::fs::rename(&self.output_path, dest) {
                let _ = std::fs::rename(&backup, dest);
                return Err(Error::Workspace(format!(
                    "Failed to move output to destination: {}",
                    e
                )));
            }
        } else {
            std::fs::rename(&self.output_path, dest).map_err(|e| {
                Error::Workspace(format!("Failed to move output to destination: {}", e))
            })?;
        }

        Ok(dest.to_path_buf())
    }
}
