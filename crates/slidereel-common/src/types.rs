//! Core types shared between the build engine and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a fingerprinted artifact.
///
/// Serialized in kebab-case (`"source-frame"`, `"source-text"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    /// A rasterized slide image.
    SourceFrame,
    /// One narration text segment.
    SourceText,
    /// Audio produced by a synthesis backend.
    SynthesizedAudio,
    /// A rendered per-segment clip.
    RenderedClip,
}

impl ItemKind {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::SourceFrame => "source-frame",
            ItemKind::SourceText => "source-text",
            ItemKind::SynthesizedAudio => "synthesized-audio",
            ItemKind::RenderedClip => "rendered-clip",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which edge of an audio file silence is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadEdge {
    /// Prepend silence.
    Start,
    /// Append silence.
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_serialization() {
        let json = serde_json::to_string(&ItemKind::SourceFrame).unwrap();
        assert_eq!(json, "\"source-frame\"");

        let kind: ItemKind = serde_json::from_str("\"rendered-clip\"").unwrap();
        assert_eq!(kind, ItemKind::RenderedClip);
    }

    #[test]
    fn test_item_kind_display_matches_serde() {
        for kind in [
            ItemKind::SourceFrame,
            ItemKind::SourceText,
            ItemKind::SynthesizedAudio,
            ItemKind::RenderedClip,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json.trim_matches('"'), kind.to_string());
        }
    }
}
