//! Fingerprinted artifacts.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use slidereel_common::{ContentHash, ItemKind};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Opaque per-item metadata, e.g. a `delay` override for one segment.
pub type Extra = BTreeMap<String, Value>;

/// Key in [`Extra`] holding a segment's trailing silence override.
pub const DELAY_KEY: &str = "delay";

/// One fingerprinted artifact instance.
///
/// Two items are equal when their content hash and `extra` match; the path,
/// kind and both cache flags are ignored by `==`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub path: PathBuf,
    pub kind: ItemKind,
    pub content_hash: ContentHash,

    /// Whether this build pass reused the previous artifact.
    #[serde(default)]
    pub cached: bool,

    /// Never reuse this item, even when its content is unchanged.
    #[serde(default)]
    pub force_reset: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Extra,
}

impl Item {
    /// Fingerprint the file at `path`.
    ///
    /// The hash is always computed from the bytes on disk; a missing file is
    /// an error.
    pub fn from_file(path: impl Into<PathBuf>, kind: ItemKind) -> slidereel_common::Result<Self> {
        let path = path.into();
        let content_hash = ContentHash::of_file(&path)?;
        Ok(Self {
            path,
            kind,
            content_hash,
            cached: false,
            force_reset: false,
            extra: Extra::new(),
        })
    }

    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The per-item `delay` override, if one is set and numeric.
    pub fn delay_override(&self) -> Option<f64> {
        self.extra.get(DELAY_KEY).and_then(Value::as_f64)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.content_hash == other.content_hash && self.extra == other.extra
    }
}
