//! The working set of one build: fingerprinted items, the config, and the
//! snapshot left by the previous build.

mod item;
mod snapshot;
pub mod sync;

pub use item::{Extra, Item, DELAY_KEY};
pub use snapshot::{ResetTarget, Snapshot};
pub use sync::{InvalidationReason, SyncOutcome};

use crate::config::ProjectConfig;
use crate::error::{BuildError, Result};

/// Index-aligned frame and text items plus the config that produced them.
#[derive(Debug)]
pub struct Project {
    config: ProjectConfig,
    frame_items: Vec<Item>,
    text_items: Vec<Item>,
    previous: Option<Snapshot>,
}

impl Project {
    /// Pair up freshly fingerprinted items.
    ///
    /// Frame `i` and text `i` form segment `i + 1`, so the lists must have
    /// the same length.
    pub fn new(
        config: ProjectConfig,
        frame_items: Vec<Item>,
        text_items: Vec<Item>,
        previous: Option<Snapshot>,
    ) -> Result<Self> {
        if frame_items.len() != text_items.len() {
            return Err(BuildError::CountMismatch {
                frames: frame_items.len(),
                texts: text_items.len(),
            });
        }
        Ok(Self {
            config,
            frame_items,
            text_items,
            previous,
        })
    }

    /// Decide which items can be reused from the previous build.
    pub fn sync(&mut self) -> SyncOutcome {
        sync::reconcile(
            &self.config,
            &mut self.frame_items,
            &mut self.text_items,
            self.previous.as_ref(),
        )
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn frame_items(&self) -> &[Item] {
        &self.frame_items
    }

    pub fn text_items(&self) -> &[Item] {
        &self.text_items
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.frame_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_items.is_empty()
    }

    /// Whether every frame and text item was reused.
    pub fn all_cached(&self) -> bool {
        self.frame_items
            .iter()
            .chain(&self.text_items)
            .all(|item| item.cached)
    }

    /// Iterate over `(frame, text)` pairs in index order.
    pub fn segments(&self) -> impl Iterator<Item = (&Item, &Item)> {
        self.frame_items.iter().zip(&self.text_items)
    }

    /// The record to persist for this build.
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot::new(&self.config, self.frame_items, self.text_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidereel_common::{ContentHash, ItemKind};

    fn item(kind: ItemKind, content: &str) -> Item {
        Item {
            path: content.into(),
            kind,
            content_hash: ContentHash::from_bytes(content.as_bytes()),
            cached: false,
            force_reset: false,
            extra: Extra::new(),
        }
    }

    fn config() -> ProjectConfig {
        ProjectConfig {
            model: "local".into(),
            slides: "deck.pdf".into(),
            script: "script.txt".into(),
            output_dir: "out".into(),
            speech_rate: 1.0,
            delay: 2.0,
            voice: None,
            language: None,
            dictionary: None,
        }
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = Project::new(
            config(),
            vec![item(ItemKind::SourceFrame, "a")],
            vec![],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::CountMismatch { frames: 1, texts: 0 }));
    }

    #[test]
    fn test_sync_then_snapshot_round() {
        let frames = vec![item(ItemKind::SourceFrame, "a")];
        let texts = vec![item(ItemKind::SourceText, "x")];

        let mut first = Project::new(config(), frames.clone(), texts.clone(), None).unwrap();
        assert_eq!(first.sync(), SyncOutcome::Fresh);
        assert!(!first.all_cached());
        let snapshot = first.into_snapshot();

        let mut second = Project::new(config(), frames, texts, Some(snapshot)).unwrap();
        second.sync();
        assert!(second.all_cached());
        assert_eq!(second.segments().count(), 1);
    }
}
