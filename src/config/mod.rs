mod types;

pub use types::*;

use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

/// Load a project file.
pub fn load_config(path: &Path) -> Result<RawConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BuildError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    toml::from_str(&content).map_err(|e| BuildError::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load the given project file, or the first one found in a default location.
///
/// With no explicit path and nothing found, an empty [`RawConfig`] is
/// returned so that the command line alone can supply every field.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<RawConfig> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) => {
            tracing::debug!("Using project file {:?}", path);
            load_config(&path)
        }
        None => Ok(RawConfig::default()),
    }
}

fn default_config_path() -> Option<PathBuf> {
    let default_paths = ["./slidereel.toml", "~/.config/slidereel/config.toml"];

    default_paths
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Combine file values, command line overrides and defaults into a validated config.
pub fn resolve(file: RawConfig, overrides: RawConfig) -> Result<ProjectConfig> {
    ProjectConfig::try_from(file.merge(overrides).with_defaults())
}
