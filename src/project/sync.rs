//! Reuse decisions against the previous build.
//!
//! A config change or a change in segment count invalidates everything,
//! since index `i` may no longer describe the same segment. Otherwise each
//! slot is compared on its own: frame and text at the same index are
//! decided independently, and a force-reset flag carries forward and blocks
//! reuse until cleared.

use std::fmt;

use super::{Item, Snapshot};
use crate::config::ProjectConfig;

/// Why a build discarded every previous artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    ConfigChanged,
    CountChanged { previous: usize, current: usize },
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigChanged => f.write_str("configuration changed"),
            Self::CountChanged { previous, current } => {
                write!(f, "segment count changed from {previous} to {current}")
            }
        }
    }
}

/// Result of comparing the current items with the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No previous snapshot.
    Fresh,
    /// A previous snapshot exists but nothing in it may be reused.
    FullRebuild(InvalidationReason),
    /// Slots were compared one by one.
    Reconciled {
        frames_reused: usize,
        texts_reused: usize,
    },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => f.write_str("fresh build"),
            Self::FullRebuild(reason) => write!(f, "full rebuild ({reason})"),
            Self::Reconciled {
                frames_reused,
                texts_reused,
            } => write!(
                f,
                "reused {frames_reused} frame(s) and {texts_reused} text(s)"
            ),
        }
    }
}

/// Set `cached` and `force_reset` on the current items.
///
/// `frames` and `texts` must be freshly fingerprinted, i.e. with both flags
/// false.
pub fn reconcile(
    config: &ProjectConfig,
    frames: &mut [Item],
    texts: &mut [Item],
    previous: Option<&Snapshot>,
) -> SyncOutcome {
    let Some(previous) = previous else {
        reset_all(frames, texts);
        return SyncOutcome::Fresh;
    };

    if let Some(reason) = invalidation(config, frames, texts, previous) {
        tracing::info!("Invalidating all segments: {}", reason);
        reset_all(frames, texts);
        return SyncOutcome::FullRebuild(reason);
    }

    let frames_reused = reconcile_slots(frames, &previous.frame_items);
    let texts_reused = reconcile_slots(texts, &previous.text_items);

    SyncOutcome::Reconciled {
        frames_reused,
        texts_reused,
    }
}

fn invalidation(
    config: &ProjectConfig,
    frames: &[Item],
    texts: &[Item],
    previous: &Snapshot,
) -> Option<InvalidationReason> {
    if *config != previous.config {
        return Some(InvalidationReason::ConfigChanged);
    }
    if frames.len() != previous.frame_items.len() || texts.len() != previous.text_items.len() {
        return Some(InvalidationReason::CountChanged {
            previous: previous.segment_count(),
            current: frames.len().min(texts.len()),
        });
    }
    None
}

fn reset_all(frames: &mut [Item], texts: &mut [Item]) {
    for item in frames.iter_mut().chain(texts.iter_mut()) {
        item.cached = false;
        item.force_reset = false;
    }
}

/// Compare slot by slot and return how many items were reused.
fn reconcile_slots(current: &mut [Item], previous: &[Item]) -> usize {
    let mut reused = 0;
    for (index, (item, prev)) in current.iter_mut().zip(previous).enumerate() {
        item.force_reset = prev.force_reset;
        item.cached = *item == *prev && !prev.force_reset;

        tracing::debug!(
            segment = index + 1,
            kind = %item.kind,
            hash = item.content_hash.short(),
            cached = item.cached,
            force_reset = item.force_reset,
            "Reconciled item"
        );

        if item.cached {
            reused += 1;
        }
    }
    reused
}
