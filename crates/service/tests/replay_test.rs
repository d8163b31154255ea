use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use mapsweep_core::{humanize_bytes, CategoryId, EventBus, Phase, ResetPolicy};
use mapsweep_service::{load_options, Session, SessionOptions, TranscriptEngine};

fn fixture_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop(); // crates
    path.pop(); // workspace root
    path.push("fixtures");
    path.push("sample-transcript.json");
    path
}

fn open_session(options: SessionOptions) -> Result<(EventBus, Session<TranscriptEngine>)> {
    let bus = EventBus::new();
    let engine = TranscriptEngine::from_path(fixture_path(), &bus)?;
    let session = Session::new(engine, &bus, options);
    Ok((bus, session))
}

#[test]
fn replayed_scan_accumulates_fixture_totals() -> Result<()> {
    let (_bus, mut session) = open_session(SessionOptions::default())?;
    assert_eq!(session.start_scan("Songs")?, Phase::Complete);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.counts.scanned, 2_034);
    assert_eq!(snapshot.counts.parsed, 362);
    assert_eq!(snapshot.counts.filtered.background_image, 48);
    assert_eq!(snapshot.counts.filtered.other, 1_000);
    assert_eq!(snapshot.counts.filtered.total(), 1_934);
    assert_eq!(snapshot.status.subtitle, "Classified 1,934 files");

    let video = snapshot
        .categories
        .iter()
        .find(|entry| entry.id() == CategoryId::BackgroundVideo)
        .expect("background videos listed");
    assert_eq!(humanize_bytes(video.size), "70.00 MB");
    assert_eq!(video.count, 2);
    Ok(())
}

#[test]
fn deletion_then_rescan_keeps_selection() -> Result<()> {
    let (_bus, mut session) = open_session(SessionOptions::default())?;
    session.start_scan("Songs")?;
    session.toggle_selection("storyboard")?;
    session.toggle_selection("skin_element")?;

    let run = session.delete_selected()?;
    assert_eq!(
        run.completed,
        vec![CategoryId::Storyboard, CategoryId::SkinElement]
    );

    session.start_scan("Songs")?;
    let selected = session.controller().categories().selected_category_ids();
    assert_eq!(selected, vec![CategoryId::Storyboard, CategoryId::SkinElement]);

    let engine = session.close();
    assert_eq!(engine.cancel_requests(), 0);
    Ok(())
}

#[test]
fn options_file_controls_reset_policy() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let options_path = dir.path().join("options.json");
    fs::write(
        &options_path,
        r#"{ "reset_policy": "full", "session_id": "replay-1" }"#,
    )?;
    let options = load_options(&options_path)?;
    assert_eq!(options.reset_policy, ResetPolicy::Full);
    assert_eq!(options.event_log_limit, 10_000);

    let (_bus, mut session) = open_session(options)?;
    assert_eq!(session.id(), "replay-1");
    session.start_scan("Songs")?;
    session.toggle_selection("hitsound")?;
    session.start_scan("Songs")?;
    assert!(session
        .controller()
        .categories()
        .selected_category_ids()
        .is_empty());
    Ok(())
}

#[test]
fn missing_transcript_reports_path() {
    let bus = EventBus::new();
    let err = TranscriptEngine::from_path("does-not-exist.json", &bus)
        .expect_err("missing file fails");
    assert!(err.to_string().contains("does-not-exist.json"));
}
