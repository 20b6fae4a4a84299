//! Integration tests for the record pipeline and the one-shot commands

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use blockscope::{cli, Pipeline};
use blockscope_app::config::Settings;
use blockscope_app::{EngineEvent, Message, PolicyFilter};
use blockscope_core::{EpisodeRecord, Error, ListDisplayState, SortKey};

const APP_FRAME: &str = "com.example.feed.FeedAdapter.bind(FeedAdapter.java:88)";
const CHROMIUM_FRAME: &str = "org.chromium.content.Renderer.draw(Renderer.java:10)";
const FRAMEWORK_FRAME: &str = "android.os.Looper.loop(Looper.java:193)";

/// Helper to write a record file the way the detector does
fn write_record(
    dir: &Path,
    name: &str,
    start_time: &str,
    duration_ms: i64,
    frames: &[&str],
) -> PathBuf {
    let mut content = format!(
        "model = Pixel 6\r\n\
         process = com.example\r\n\
         time = {duration_ms}\r\n\
         time-start = {start_time}\r\n\
         stack = \r\n\
         06-12 10:00:00.500\r\n"
    );
    for frame in frames {
        content.push_str(frame);
        content.push_str("\r\n");
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// A: a slow block in app code. B: a whitelisted block. C: garbage.
struct Fixture {
    dir: TempDir,
    a: PathBuf,
    b: PathBuf,
    c: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let a = write_record(dir.path(), "a.log", "06-12 10:00:00.000", 500, &[APP_FRAME]);
    let b = write_record(
        dir.path(),
        "b.log",
        "06-12 10:00:01.000",
        100,
        &[CHROMIUM_FRAME, APP_FRAME],
    );
    let c = dir.path().join("c.log");
    fs::write(&c, [0x00, 0xff, 0x13, 0x37]).unwrap();
    Fixture { dir, a, b, c }
}

fn settings(delete_files_in_whitelist: bool, filter_non_concern_stack: bool) -> Settings {
    let mut settings = Settings::default();
    settings.filter.delete_files_in_whitelist = delete_files_in_whitelist;
    settings.filter.filter_non_concern_stack = filter_non_concern_stack;
    settings
}

fn starts(records: &[EpisodeRecord]) -> Vec<&str> {
    records.iter().map(|r| r.start_time.as_str()).collect()
}

#[tokio::test]
async fn test_whitelisted_record_hidden_but_kept() {
    let f = fixture();
    let mut pipeline = Pipeline::new(settings(false, false), f.dir.path());

    let records = pipeline.open().await.unwrap();

    assert_eq!(starts(&records), vec!["06-12 10:00:00.000"]);
    assert!(f.a.exists());
    assert!(f.b.exists());
    assert!(!f.c.exists());
    pipeline.finish().await;
}

#[tokio::test]
async fn test_whitelisted_record_deleted_when_configured() {
    let f = fixture();
    let mut pipeline = Pipeline::new(settings(true, false), f.dir.path());

    let records = pipeline.open().await.unwrap();

    assert_eq!(starts(&records), vec!["06-12 10:00:00.000"]);
    assert!(f.a.exists());
    assert!(!f.b.exists());
    assert!(!f.c.exists());
    pipeline.finish().await;
}

#[tokio::test]
async fn test_non_concern_record_hidden_but_kept() {
    let dir = TempDir::new().unwrap();
    write_record(dir.path(), "a.log", "06-12 10:00:00.000", 500, &[APP_FRAME]);
    let framework = write_record(
        dir.path(),
        "d.log",
        "06-12 10:00:02.000",
        800,
        &[FRAMEWORK_FRAME],
    );

    let mut pipeline = Pipeline::new(settings(true, true), dir.path());
    let records = pipeline.open().await.unwrap();
    assert_eq!(starts(&records), vec!["06-12 10:00:00.000"]);
    assert!(framework.exists());
    pipeline.finish().await;

    let mut pipeline = Pipeline::new(settings(true, false), dir.path());
    let records = pipeline.open().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].start_time, "06-12 10:00:02.000");
    assert!(records[0].stack_summary.is_empty());
    pipeline.finish().await;
}

#[tokio::test]
async fn test_custom_matcher_hides_and_deletes() {
    let dir = TempDir::new().unwrap();
    let slow = write_record(dir.path(), "a.log", "06-12 10:00:00.000", 500, &[APP_FRAME]);
    let short = write_record(dir.path(), "b.log", "06-12 10:00:01.000", 120, &[APP_FRAME]);

    let settings = settings(true, false);
    let policy = PolicyFilter::from_settings(&settings.filter)
        .with_matcher(|r: &EpisodeRecord| r.duration_ms < 200);
    let mut pipeline = Pipeline::new(settings, dir.path()).with_policy(policy);

    let records = pipeline.open().await.unwrap();

    assert_eq!(starts(&records), vec!["06-12 10:00:00.000"]);
    assert!(slow.exists());
    assert!(!short.exists());
    pipeline.finish().await;
}

#[tokio::test]
async fn test_empty_directory_reports_empty_state() {
    let dir = TempDir::new().unwrap();
    let mut pipeline = Pipeline::new(Settings::default(), dir.path());

    let records = pipeline.open().await.unwrap();

    assert!(records.is_empty());
    let session = pipeline.session().unwrap();
    assert_eq!(session.view().display_state(), ListDisplayState::Empty);
    pipeline.finish().await;
}

#[tokio::test]
async fn test_remove_shrinks_list_and_deletes_file() {
    let dir = TempDir::new().unwrap();
    let a = write_record(dir.path(), "a.log", "06-12 10:00:00.000", 500, &[APP_FRAME]);
    write_record(dir.path(), "b.log", "06-12 10:00:01.000", 300, &[APP_FRAME]);

    let mut pipeline = Pipeline::new(Settings::default(), dir.path());
    assert_eq!(pipeline.open().await.unwrap().len(), 2);

    pipeline.send(Message::Remove {
        start_time: "06-12 10:00:00.000".to_string(),
    });
    let event = pipeline
        .wait_for(|e| matches!(e, EngineEvent::RecordRemoved { .. }))
        .await
        .unwrap();

    match event {
        EngineEvent::RecordRemoved { record, .. } => assert_eq!(record.backing_file.path, a),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(!a.exists());
    let remaining = pipeline.session().unwrap().snapshot();
    assert_eq!(starts(&remaining), vec!["06-12 10:00:01.000"]);
    pipeline.finish().await;
}

#[tokio::test]
async fn test_refresh_picks_up_new_records() {
    let dir = TempDir::new().unwrap();
    write_record(dir.path(), "a.log", "06-12 10:00:00.000", 500, &[APP_FRAME]);

    let mut pipeline = Pipeline::new(Settings::default(), dir.path());
    assert_eq!(pipeline.open().await.unwrap().len(), 1);

    write_record(dir.path(), "b.log", "06-12 10:00:01.000", 900, &[APP_FRAME]);
    pipeline.send(Message::Load);
    let records = pipeline.wait_for_list().await.unwrap();

    assert_eq!(
        starts(&records),
        vec!["06-12 10:00:01.000", "06-12 10:00:00.000"]
    );
    pipeline.finish().await;
}

#[tokio::test]
async fn test_cli_list_prints_rows() {
    let f = fixture();
    write_record(f.dir.path(), "e.log", "06-12 10:00:03.000", 1200, &[APP_FRAME]);
    let mut out = Vec::new();

    let count = cli::list(settings(false, false), f.dir.path(), Some(SortKey::Cost), &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(count, 2);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("06-12 10:00:03.000"));
    assert!(lines[0].contains("blocked 1200ms"));
    assert!(lines[1].contains("blocked 500ms"));
}

#[tokio::test]
async fn test_cli_list_empty_directory() {
    let dir = TempDir::new().unwrap();
    let mut out = Vec::new();

    let count = cli::list(Settings::default(), dir.path(), None, &mut out)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(String::from_utf8(out).unwrap().starts_with("No block records in"));
}

#[tokio::test]
async fn test_cli_show_prints_record() {
    let f = fixture();
    let mut out = Vec::new();

    cli::show(settings(false, false), f.dir.path(), "06-12 10:00:00.000", &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with(&f.a.display().to_string()));
    assert!(text.contains("Pixel 6"));
    assert!(text.contains(APP_FRAME));
}

#[tokio::test]
async fn test_cli_show_unknown_start_time() {
    let f = fixture();
    let mut out = Vec::new();

    let result = cli::show(settings(false, false), f.dir.path(), "nope", &mut out).await;

    assert!(matches!(result, Err(Error::RecordNotFound { .. })));
}

#[tokio::test]
async fn test_cli_remove_deletes_file() {
    let f = fixture();
    let mut out = Vec::new();

    cli::remove(settings(false, false), f.dir.path(), "06-12 10:00:00.000", &mut out)
        .await
        .unwrap();

    assert!(!f.a.exists());
    assert!(String::from_utf8(out).unwrap().starts_with("Removed "));
}

#[tokio::test]
async fn test_cli_remove_hidden_record_is_not_found() {
    let f = fixture();
    let mut out = Vec::new();

    let result = cli::remove(
        settings(false, false),
        f.dir.path(),
        "06-12 10:00:01.000",
        &mut out,
    )
    .await;

    assert!(matches!(result, Err(Error::RecordNotFound { .. })));
    assert!(f.b.exists());
}

#[tokio::test]
async fn test_cli_clear_deletes_everything() {
    let f = fixture();
    let mut out = Vec::new();

    let deleted = cli::clear(settings(false, false), f.dir.path(), &mut out)
        .await
        .unwrap();

    assert_eq!(deleted, 3);
    assert_eq!(fs::read_dir(f.dir.path()).unwrap().count(), 0);
    assert_eq!(String::from_utf8(out).unwrap().trim(), "Deleted 3 record(s)");
}

#[tokio::test]
async fn test_cli_share_writes_text_export() {
    let f = fixture();
    let export = TempDir::new().unwrap();
    let mut out = Vec::new();

    let destination = cli::share(
        settings(false, false),
        f.dir.path(),
        "06-12 10:00:00.000",
        false,
        Some(export.path().to_path_buf()),
        &mut out,
    )
    .await
    .unwrap();

    let exported = export.path().join("a.txt");
    assert_eq!(destination, exported.display().to_string());
    let text = fs::read_to_string(exported).unwrap();
    assert!(text.contains("06-12 10:00:00.000"));
    assert!(f.a.exists());
}

#[tokio::test]
async fn test_cli_share_stack_dump_copies_file() {
    let f = fixture();
    let export = TempDir::new().unwrap();
    let mut out = Vec::new();

    cli::share(
        settings(false, false),
        f.dir.path(),
        "06-12 10:00:00.000",
        true,
        Some(export.path().to_path_buf()),
        &mut out,
    )
    .await
    .unwrap();

    let copied = fs::read(export.path().join("a.log")).unwrap();
    assert_eq!(copied, fs::read(&f.a).unwrap());
}

#[test]
fn test_resolve_record_dir_prefers_flag() {
    let mut settings = Settings::default();
    settings.records.directory = Some(PathBuf::from("/from/config"));

    let dir = cli::resolve_record_dir(Some(PathBuf::from("/from/flag")), &settings).unwrap();
    assert_eq!(dir, PathBuf::from("/from/flag"));

    let dir = cli::resolve_record_dir(None, &settings).unwrap();
    assert_eq!(dir, PathBuf::from("/from/config"));

    let result = cli::resolve_record_dir(None, &Settings::default());
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test]
fn test_init_config_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut out = Vec::new();

    let written = cli::init_config(&path, &mut out).unwrap();

    assert_eq!(written, path);
    assert!(path.exists());
}
