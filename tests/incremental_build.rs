//! Incremental build behaviour: reuse, invalidation, force-reset, failures.

mod common;

use assert_matches::assert_matches;
use common::TestProject;
use slidereel::project::{InvalidationReason, ResetTarget, SyncOutcome};
use slidereel::{BuildError, ErrorCategory};

fn two_segments() -> TestProject {
    let project = TestProject::new();
    project.set_segments(&["slide one", "slide two"], &["Hello there.", "Goodbye now."]);
    project
}

#[test]
fn test_first_build_from_scratch() {
    let project = two_segments();
    let report = project.build().unwrap();

    assert_eq!(report.segments, 2);
    assert_eq!(report.sync, SyncOutcome::Fresh);
    assert_eq!(report.rebuilt, 2);
    assert_eq!(report.synthesized, 2);
    assert!(report.aggregated);
    assert_eq!(report.output, Some(project.layout().captioned()));

    let layout = project.layout();
    assert!(layout.segment_clip(0).exists());
    assert!(layout.segment_clip(1).exists());
    assert!(layout.concatenated().exists());
    assert!(layout.captioned().exists());
    assert!(layout.merged_captions().exists());
    assert_eq!(project.encoder.aggregations(), 1);

    let snapshot = project.snapshot();
    assert_eq!(snapshot.segment_count(), 2);
    assert!(snapshot
        .frame_items
        .iter()
        .chain(&snapshot.text_items)
        .all(|item| !item.cached && !item.force_reset));
}

#[test]
fn test_second_build_is_fully_cached() {
    let project = two_segments();
    project.build().unwrap();
    let synth_calls = project.synthesizer.calls();
    let muxes = project.encoder.muxes();

    let report = project.build().unwrap();

    assert_eq!(
        report.sync,
        SyncOutcome::Reconciled {
            frames_reused: 2,
            texts_reused: 2
        }
    );
    assert_eq!(report.rebuilt, 0);
    assert!(!report.aggregated);
    assert_eq!(report.output, None);
    assert_eq!(project.encoder.aggregations(), 1);
    assert_eq!(project.synthesizer.calls(), synth_calls);
    assert_eq!(project.encoder.muxes(), muxes);

    let snapshot = project.snapshot();
    assert!(snapshot
        .frame_items
        .iter()
        .chain(&snapshot.text_items)
        .all(|item| item.cached));
}

#[test]
fn test_idempotent_snapshot_content() {
    let project = two_segments();
    project.build().unwrap();
    project.build().unwrap();
    let second = project.snapshot_json();
    project.build().unwrap();
    assert_eq!(project.snapshot_json(), second);
}

#[test]
fn test_text_change_rebuilds_only_that_segment() {
    let project = TestProject::new();
    project.set_segments(&["a", "b", "c"], &["One.", "Two.", "Three."]);
    project.build().unwrap();
    let synth_calls = project.synthesizer.calls();
    let untouched = std::fs::read(project.layout().segment_clip(0)).unwrap();

    project.set_segments(&["a", "b", "c"], &["One.", "Two, revised.", "Three."]);
    let report = project.build().unwrap();

    assert_eq!(
        report.sync,
        SyncOutcome::Reconciled {
            frames_reused: 3,
            texts_reused: 2
        }
    );
    assert_eq!(report.rebuilt, 1);
    assert_eq!(report.synthesized, 1);
    assert!(report.aggregated);
    assert_eq!(project.synthesizer.calls(), synth_calls + 1);

    let snapshot = project.snapshot();
    assert!(!snapshot.text_items[1].cached);
    assert!(snapshot.text_items[0].cached && snapshot.text_items[2].cached);
    assert_eq!(std::fs::read(project.layout().segment_clip(0)).unwrap(), untouched);

    let clip = std::fs::read_to_string(project.layout().segment_clip(1)).unwrap();
    assert!(clip.contains("Two, revised."));
}

#[test]
fn test_frame_change_rebuilds_clip_without_synthesis() {
    let project = two_segments();
    project.build().unwrap();
    let synth_calls = project.synthesizer.calls();

    project.rasterizer.set_pages(&["slide one", "slide two, new art"]);
    let report = project.build().unwrap();

    assert_eq!(report.rebuilt, 1);
    assert_eq!(report.synthesized, 0);
    assert_eq!(project.synthesizer.calls(), synth_calls);

    let snapshot = project.snapshot();
    assert!(!snapshot.frame_items[1].cached);
    assert!(snapshot.text_items[1].cached);
    let clip = std::fs::read_to_string(project.layout().segment_clip(1)).unwrap();
    assert!(clip.starts_with("slide two, new art@"));
}

#[test]
fn test_reused_audio_is_not_padded_twice() {
    let project = two_segments();
    project.build().unwrap();
    let first = std::fs::read(project.layout().padded_audio(1)).unwrap().len();

    project.rasterizer.set_pages(&["slide one", "changed"]);
    project.build().unwrap();
    let second = std::fs::read(project.layout().padded_audio(1)).unwrap().len();

    assert_eq!(first, second);
}

#[test]
fn test_config_change_invalidates_everything() {
    let mut project = two_segments();
    project.build().unwrap();
    let synth_calls = project.synthesizer.calls();

    project.config.delay = 3.0;
    let report = project.build().unwrap();

    assert_eq!(
        report.sync,
        SyncOutcome::FullRebuild(InvalidationReason::ConfigChanged)
    );
    assert_eq!(report.rebuilt, 2);
    assert_eq!(project.synthesizer.calls(), synth_calls + 2);
    let snapshot = project.snapshot();
    assert!(snapshot
        .frame_items
        .iter()
        .chain(&snapshot.text_items)
        .all(|item| !item.cached));
    assert_eq!(snapshot.config.delay, 3.0);
}

#[test]
fn test_segment_count_change_invalidates_everything() {
    let project = two_segments();
    project.build().unwrap();

    project.set_segments(
        &["slide one", "slide two", "slide three"],
        &["Hello there.", "Goodbye now.", "Encore."],
    );
    let report = project.build().unwrap();

    assert_eq!(
        report.sync,
        SyncOutcome::FullRebuild(InvalidationReason::CountChanged {
            previous: 2,
            current: 3
        })
    );
    assert_eq!(report.rebuilt, 3);
    assert!(project
        .snapshot()
        .text_items
        .iter()
        .all(|item| !item.cached));
}

#[test]
fn test_force_reset_is_sticky_until_cleared() {
    let project = two_segments();
    project.build().unwrap();

    let mut snapshot = project.snapshot();
    snapshot.set_force_reset(1, ResetTarget::Text, true).unwrap();
    snapshot.save(&project.layout().snapshot_file()).unwrap();

    for _ in 0..2 {
        let calls = project.synthesizer.calls();
        let report = project.build().unwrap();
        assert_eq!(report.rebuilt, 1);
        assert_eq!(project.synthesizer.calls(), calls + 1);

        let snapshot = project.snapshot();
        assert!(!snapshot.text_items[0].cached);
        assert!(snapshot.text_items[0].force_reset);
        assert!(snapshot.frame_items[0].cached);
        assert!(!snapshot.frame_items[0].force_reset);
    }

    let mut snapshot = project.snapshot();
    snapshot.set_force_reset(1, ResetTarget::Text, false).unwrap();
    snapshot.save(&project.layout().snapshot_file()).unwrap();

    let report = project.build().unwrap();
    assert_eq!(report.rebuilt, 0);
    assert!(!report.aggregated);
}

#[test]
fn test_delay_override_invalidates_text() {
    let project = two_segments();
    project.build().unwrap();

    project.write_script("Hello there.\nNEWSLIDE\nGoodbye now.\n===\n#delay: 4\n");
    let report = project.build().unwrap();

    assert_eq!(report.rebuilt, 1);
    let snapshot = project.snapshot();
    assert!(snapshot.text_items[0].cached);
    assert!(!snapshot.text_items[1].cached);
    assert_eq!(snapshot.text_items[1].delay_override(), Some(4.0));
}

#[test]
fn test_dictionary_change_only_touches_affected_segments() {
    let mut project = TestProject::new();
    project.set_segments(&["a", "b"], &["Use the API.", "Nothing here."]);
    let dictionary = project.dir.path().join("dictionary.txt");
    std::fs::write(&dictionary, "API: A P I\n").unwrap();
    project.config.dictionary = Some(dictionary.clone());
    project.build().unwrap();

    let text = std::fs::read_to_string(project.layout().script_text(0)).unwrap();
    assert_eq!(text, "Use the A P I.");

    std::fs::write(&dictionary, "API: application interface\n").unwrap();
    let report = project.build().unwrap();
    assert_eq!(report.rebuilt, 1);
    assert!(project.snapshot().text_items[1].cached);
}

#[test]
fn test_count_mismatch_is_input_error() {
    let project = TestProject::new();
    project.set_segments(&["only slide"], &["One.", "Two."]);

    let err = project.build().unwrap_err();
    assert_matches!(err, BuildError::CountMismatch { frames: 1, texts: 2 });
    assert_eq!(err.category(), ErrorCategory::Input);
    assert!(!project.layout().snapshot_file().exists());
}

#[test]
fn test_producer_failure_aborts_without_snapshot() {
    let project = TestProject::new();
    project.set_segments(&["a", "b", "c"], &["Fine.", "FAIL here.", "Also fine."]);
    project.synthesizer.fail_on("FAIL");

    let err = project.build().unwrap_err();
    assert_matches!(err, BuildError::Producer { segment: 2, .. });
    assert_eq!(err.category(), ErrorCategory::Producer);

    // Every task ran before the failure was reported.
    assert_eq!(project.synthesizer.calls(), 3);
    assert!(project.layout().segment_clip(0).exists());
    assert!(project.layout().segment_clip(2).exists());
    assert!(!project.layout().snapshot_file().exists());
    assert_eq!(project.encoder.aggregations(), 0);
}

#[test]
fn test_failed_rebuild_keeps_previous_snapshot() {
    let project = two_segments();
    project.build().unwrap();
    let before = project.snapshot_json();

    project.set_segments(&["slide one", "slide two"], &["Hello there.", "FAIL now."]);
    project.synthesizer.fail_on("FAIL");
    assert!(project.build().is_err());

    assert_eq!(project.snapshot_json(), before);
}

#[test]
fn test_corrupt_snapshot_is_fatal() {
    let project = two_segments();
    project.build().unwrap();
    std::fs::write(project.layout().snapshot_file(), "{ truncated").unwrap();

    let err = project.build().unwrap_err();
    assert_matches!(err, BuildError::CorruptSnapshot { .. });
    assert_eq!(err.category(), ErrorCategory::Input);
}

#[test]
fn test_foreign_output_dir_is_reset() {
    let project = two_segments();
    std::fs::create_dir_all(&project.config.output_dir).unwrap();
    let stray = project.config.output_dir.join("notes.txt");
    std::fs::write(&stray, "not ours").unwrap();

    let report = project.build().unwrap();
    assert_eq!(report.sync, SyncOutcome::Fresh);
    assert!(!stray.exists());
}

#[test]
fn test_missing_slides_is_input_error() {
    let project = two_segments();
    std::fs::remove_file(&project.config.slides).unwrap();

    let err = project.build().unwrap_err();
    assert_matches!(err, BuildError::Rasterize { .. });
    assert_eq!(err.category(), ErrorCategory::Input);
}

#[test]
fn test_merged_captions_follow_segment_order() {
    let project = two_segments();
    project.build().unwrap();

    let cues = slidereel_av::captions::read_srt(&project.layout().merged_captions()).unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "Hello there.");
    assert_eq!(cues[1].text, "Goodbye now.");
    assert_eq!(cues[0].start, 0.0);
    assert!((cues[1].start - cues[0].end).abs() < 1e-9);
}

#[test]
fn test_multi_paragraph_segment_builds() {
    let project = TestProject::new();
    project.rasterizer.set_pages(&["slide one", "slide two"]);
    project.write_script("First paragraph.\n\nSecond paragraph.\nNEWSLIDE\nNext slide.");

    let report = project.build().unwrap();
    assert!(report.aggregated);

    let cues = slidereel_av::captions::read_srt(&project.layout().merged_captions()).unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "First paragraph.\nSecond paragraph.");
    assert_eq!(cues[1].text, "Next slide.");

    let segment = slidereel_av::captions::read_srt(&project.layout().captions(0)).unwrap();
    assert_eq!(segment.len(), 1);
}
