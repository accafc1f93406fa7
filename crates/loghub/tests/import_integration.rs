//! End-to-end: capture file -> pipeline -> SQLite -> queries
//!
//! Run with: cargo test -p loghub --test import_integration

use std::path::Path;
use std::process::Command;

use loghub::{FeedOptions, feed_lines, open_store};
use loghub_config::Config;
use loghub_protocol::MessageBody;
use loghub_query::{BodyQuery, DirectionFilter, RawQuery, query_body, query_raw};
use loghub_store::{Direction, KvEngine, SqliteEngine};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

const LOCATION_FRAME: &str = "7e02000070040261394651399400000000000c00c2018be6d8071c17180006000000b422093023392801040027997303020000140400000000150400000000160400000000170200002504000000002b040000000030011f310113eb11000700d4010087a209000600f800000000ef0d000000000000492492000011035a7e";

const ITEM_LIST_FRAME: &str = "7e0705001f01436833998727ba0002143327050058fec11704769004b8fd170058fef121ff0030cfffffffff327e";

const DEVICE: &str = "40261394651";

/// 2022-09-30 23:39:28 UTC
const BASE: i64 = 1_664_581_168;

fn capture() -> String {
    [
        format!("20220930233928 Rx {LOCATION_FRAME}"),
        format!(
            "2022-09-30 23:39:30 GpsDataService:37 - (0A1B)收到报文类型：512,报文内容：{LOCATION_FRAME}"
        ),
        format!("20220930233931 Tx {LOCATION_FRAME}"),
        format!("20220930233932 Rx {ITEM_LIST_FRAME}"),
        String::new(),
        "not a log line".to_string(),
    ]
    .join("\n")
}

fn sqlite_config(dir: &Path) -> Config {
    format!(
        "[store]\nengine = \"sqlite\"\npath = '{}'\n",
        dir.join("loghub.db").display()
    )
    .parse()
    .unwrap()
}

// =============================================================================
// Library wiring
// =============================================================================

#[tokio::test]
async fn test_import_then_query() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(dir.path());

    let store = open_store(&config).unwrap();
    let ingestor = store.start_ingestor(&config);
    let options = FeedOptions {
        tags: vec!["ds=2".to_string()],
        ..Default::default()
    };
    let lines = feed_lines(capture().as_bytes(), &ingestor.sender(), &options)
        .await
        .unwrap();
    ingestor.close().await;

    assert_eq!(lines, 5);
    let snap = ingestor.metrics();
    assert_eq!(snap.events_stored, 4);
    assert_eq!(snap.events_rejected, 1);
    assert_eq!(snap.entries_written, 4);

    // Everything is on disk once close returns
    let engine = SqliteEngine::open(dir.path().join("loghub.db")).unwrap();

    let result = query_raw(&engine, &RawQuery::new(DEVICE, BASE - 60, BASE + 60)).unwrap();
    assert_eq!(result.msgs.len(), 3);
    assert_eq!(result.msg_ids, vec![0x0200]);
    let stamps: Vec<i64> = result.msgs.iter().map(|m| m.timestamp.timestamp()).collect();
    assert_eq!(stamps, vec![BASE, BASE + 2, BASE + 3]);
    assert!(result.msgs.iter().all(|m| m.data_source == 2));
    assert_eq!(hex::encode(&result.msgs[0].raw), LOCATION_FRAME);

    let tx = query_raw(
        &engine,
        &RawQuery::new(DEVICE, BASE - 60, BASE + 60).with_directions(DirectionFilter::parse("tx")),
    )
    .unwrap();
    assert_eq!(tx.msgs.len(), 1);
    assert_eq!(tx.msgs[0].direction, Direction::Tx);

    let bodies = query_body(&engine, &BodyQuery::new(DEVICE, BASE, BASE, 0x0200)).unwrap();
    assert_eq!(bodies.len(), 1);
    let MessageBody::Location(report) = &bodies[0].body else {
        panic!("expected a location body, got {:?}", bodies[0].body);
    };
    assert_eq!(report.heading, 180);

    let items = query_body(
        &engine,
        &BodyQuery::new("14368339987", BASE - 60, BASE + 60, 0x0705),
    )
    .unwrap();
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0].body, MessageBody::ItemList(_)));

    engine.close().unwrap();
}

#[tokio::test]
async fn test_memory_store_is_fresh_each_open() {
    let config: Config = "[store]\nengine = \"memory\"\n".parse().unwrap();
    let store = open_store(&config).unwrap();
    assert_eq!(store.engine.name(), "memory");
    assert_eq!(store.sequence.next().unwrap(), 0);
}

// =============================================================================
// Binary
// =============================================================================

fn loghub() -> Command {
    Command::new(env!("CARGO_BIN_EXE_loghub"))
}

#[test]
fn test_cli_import() {
    let dir = TempDir::new().unwrap();
    let capture_path = dir.path().join("capture.log");
    std::fs::write(&capture_path, capture()).unwrap();
    let config_path = dir.path().join("loghub.toml");
    std::fs::write(
        &config_path,
        format!(
            "[log]\nlevel = \"warn\"\n\n[store]\nengine = \"sqlite\"\npath = '{}'\n",
            dir.path().join("loghub.db").display()
        ),
    )
    .unwrap();

    let output = loghub()
        .arg("--config")
        .arg(&config_path)
        .arg("import")
        .arg(&capture_path)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("5 lines, 4 stored, 0 empty, 1 rejected"), "{stdout}");

    let engine = SqliteEngine::open(dir.path().join("loghub.db")).unwrap();
    let result = query_raw(&engine, &RawQuery::new(DEVICE, BASE - 60, BASE + 60)).unwrap();
    assert_eq!(result.msgs.len(), 3);
    engine.close().unwrap();
}

#[test]
fn test_cli_import_missing_config() {
    let output = loghub()
        .args(["--config", "/nonexistent/loghub.toml", "import", "capture.log"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("config file not found"));
}

#[test]
fn test_cli_rejects_unknown_log_level() {
    let output = loghub()
        .args(["--log-level", "loud", "decode", ITEM_LIST_FRAME])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown log level"));
}

#[test]
fn test_cli_decode() {
    let output = loghub()
        .args(["decode", "--compact", ITEM_LIST_FRAME])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    let json: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(json["id"], 0x0705);
    assert_eq!(json["deviceId"], "14368339987");
}
