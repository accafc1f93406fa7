//! Tests for the ingestor

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use loghub_config::IngestConfig;
use loghub_store::{
    Direction, IndexKey, KvEngine, MESSAGE_SEQUENCE, MemoryEngine, Sequence, SqliteEngine,
    StoreError, ValueCodec,
};
use tempfile::TempDir;

use crate::{Admission, Event, EventBatch, IngestState, Ingestor, PipelineError};

const LOCATION_FRAME: &str = "7e02000070040261394651399400000000000c00c2018be6d8071c17180006000000b422093023392801040027997303020000140400000000150400000000160400000000170200002504000000002b040000000030011f310113eb11000700d4010087a209000600f800000000ef0d000000000000492492000011035a7e";

fn location_line() -> String {
    format!("20220930233928 Rx {LOCATION_FRAME}")
}

fn config(buffer_size: usize) -> IngestConfig {
    IngestConfig {
        buffer_size,
        flush_interval: Duration::from_secs(3600),
        reclaim_interval: Duration::from_secs(3600),
        stats_interval: Duration::from_secs(3600),
        ..Default::default()
    }
}

fn start(engine: Arc<dyn KvEngine>, config: &IngestConfig) -> Ingestor {
    let sequence = Arc::new(Sequence::new(Arc::clone(&engine), MESSAGE_SEQUENCE, 100));
    Ingestor::start(engine, sequence, config, ValueCodec::default())
}

fn stored(engine: &dyn KvEngine) -> Vec<(IndexKey, Vec<u8>)> {
    let mut out = Vec::new();
    engine
        .scan(&[], &mut |k, v| {
            out.push((
                IndexKey::decode(k).unwrap(),
                ValueCodec::decode(v).unwrap(),
            ));
            ControlFlow::Continue(())
        })
        .unwrap();
    out
}

// =============================================================================
// Event handling
// =============================================================================

#[tokio::test]
async fn test_event_stored_with_key_fields() {
    let engine = Arc::new(MemoryEngine::new());
    let ingestor = start(engine.clone(), &config(100));

    let event = Event::new(format!("  {}\r\n", location_line())).with_tags(["ds=7", "ttl=1h"]);
    assert_eq!(ingestor.handle_event(event).await.unwrap(), Admission::Stored);
    assert_eq!(ingestor.buffered(), 1);

    ingestor.flush().await;
    assert_eq!(ingestor.buffered(), 0);

    let records = stored(engine.as_ref());
    assert_eq!(records.len(), 1);
    let (key, value) = &records[0];
    assert_eq!(key.device_id, "40261394651");
    assert_eq!(key.timestamp, 1_664_581_168);
    assert_eq!(key.sequence, 0);
    assert_eq!(key.flags.data_source, 7);
    assert_eq!(key.flags.direction, Direction::Rx);
    assert_eq!(key.message_id, 0x0200);
    assert_eq!((key.part_total, key.part_index), (1, 0));
    assert_eq!(hex::encode(value), LOCATION_FRAME);

    let snap = ingestor.metrics();
    assert_eq!(snap.events_received, 1);
    assert_eq!(snap.events_stored, 1);
    assert_eq!(snap.entries_written, 1);
}

#[tokio::test]
async fn test_empty_frame_counted_not_stored() {
    let engine = Arc::new(MemoryEngine::new());
    let ingestor = start(engine.clone(), &config(100));

    let admission = ingestor
        .handle_event(Event::new("20220930233928 Rx 7e7e"))
        .await
        .unwrap();
    assert_eq!(admission, Admission::Empty);
    ingestor.flush().await;

    assert!(engine.is_empty());
    let snap = ingestor.metrics();
    assert_eq!(snap.events_empty, 1);
    assert_eq!(snap.events_rejected, 0);
}

#[tokio::test]
async fn test_bad_events_rejected() {
    let engine = Arc::new(MemoryEngine::new());
    let ingestor = start(engine.clone(), &config(100));

    let err = ingestor
        .handle_event(Event::new("not a log line"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidLine(_)));

    // markers present, header truncated
    let err = ingestor
        .handle_event(Event::new("20220930233928 Tx 7e0200000001027e"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Protocol(_)));

    assert_eq!(ingestor.metrics().events_rejected, 2);
    assert_eq!(ingestor.buffered(), 0);
}

#[tokio::test]
async fn test_sequence_failure_drops_event() {
    let engine = Arc::new(MemoryEngine::new());
    engine.close().unwrap();
    let ingestor = start(engine, &config(100));

    let err = ingestor
        .handle_event(Event::new(location_line()))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Store(StoreError::Closed)));
    assert_eq!(ingestor.metrics().sequence_failures, 1);
    assert_eq!(ingestor.buffered(), 0);
}

#[tokio::test]
async fn test_same_second_events_keep_arrival_order() {
    let engine = Arc::new(MemoryEngine::new());
    let ingestor = start(engine.clone(), &config(100));

    for tag in ["ds=1", "ds=2", "ds=3"] {
        ingestor
            .handle_event(Event::new(location_line()).with_tags([tag]))
            .await
            .unwrap();
    }
    ingestor.flush().await;

    let sources: Vec<u8> = stored(engine.as_ref())
        .iter()
        .map(|(key, _)| key.flags.data_source)
        .collect();
    assert_eq!(sources, vec![1, 2, 3]);
}

// =============================================================================
// Buffering and flushing
// =============================================================================

#[tokio::test]
async fn test_full_buffer_forces_flush() {
    let engine = Arc::new(MemoryEngine::new());
    let ingestor = start(engine.clone(), &config(2));

    for _ in 0..5 {
        ingestor
            .handle_event(Event::new(location_line()))
            .await
            .unwrap();
    }

    let snap = ingestor.metrics();
    assert_eq!(snap.forced_flushes, 2);
    assert_eq!(snap.entries_written, 4);
    assert_eq!(ingestor.buffered(), 1);
    assert_eq!(engine.len(), 4);
}

#[tokio::test]
async fn test_periodic_flush() {
    let engine = Arc::new(MemoryEngine::new());
    let config = IngestConfig {
        flush_interval: Duration::from_millis(20),
        ..config(100)
    };
    let ingestor = start(engine.clone(), &config);

    ingestor
        .handle_event(Event::new(location_line()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(ingestor.buffered(), 0);
    assert_eq!(engine.len(), 1);
}

#[tokio::test]
async fn test_batch_acknowledged_after_buffering() {
    let engine = Arc::new(MemoryEngine::new());
    let ingestor = start(engine.clone(), &config(100));

    let events = vec![
        Event::new(location_line()),
        Event::new("garbage"),
        Event::new(location_line()),
    ];
    let (batch, ack) = EventBatch::new(events);
    ingestor.sender().send(batch).await.unwrap();
    ack.await.unwrap();

    assert_eq!(ingestor.buffered(), 2);
    assert!(engine.is_empty());
    assert_eq!(ingestor.metrics().events_received, 3);
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test]
async fn test_close_drains_and_releases() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loghub.db");

    {
        let engine: Arc<dyn KvEngine> = Arc::new(SqliteEngine::open(&path).unwrap());
        let ingestor = start(Arc::clone(&engine), &config(100));

        ingestor
            .ingest_batch(EventBatch::unacknowledged(vec![
                Event::new(location_line()),
                Event::new(location_line()),
            ]))
            .await
            .unwrap();
        assert_eq!(ingestor.buffered(), 2);

        ingestor.close().await;
        assert_eq!(ingestor.state(), IngestState::Closed);
        assert!(matches!(
            engine.scan(&[], &mut |_, _| ControlFlow::Continue(())),
            Err(StoreError::Closed)
        ));

        // idempotent
        ingestor.close().await;
        assert!(matches!(
            ingestor.handle_event(Event::new(location_line())).await,
            Err(PipelineError::Closed)
        ));
    }

    let engine = SqliteEngine::open(&path).unwrap();
    let records = stored(&engine);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].0.sequence, 1);
    // unused lease tail was handed back
    assert_eq!(engine.lease_sequence(MESSAGE_SEQUENCE, 1).unwrap(), 2);
}

#[tokio::test]
async fn test_close_ingests_queued_batches() {
    let engine = Arc::new(MemoryEngine::new());
    let ingestor = start(engine.clone(), &config(100));

    let sender = ingestor.sender();
    for _ in 0..3 {
        sender
            .send(EventBatch::unacknowledged(vec![Event::new(location_line())]))
            .await
            .unwrap();
    }
    ingestor.close().await;

    assert_eq!(ingestor.metrics().entries_written, 3);
    assert_eq!(ingestor.metrics().events_stored, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_keeps_every_stored_admission() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loghub.db");

    let engine: Arc<dyn KvEngine> = Arc::new(SqliteEngine::open(&path).unwrap());
    let ingestor = Arc::new(start(engine, &config(16)));

    let admitters: Vec<_> = (0..400)
        .map(|_| {
            let ingestor = Arc::clone(&ingestor);
            tokio::spawn(async move { ingestor.handle_event(Event::new(location_line())).await })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(2)).await;
    ingestor.close().await;

    let mut accepted = 0;
    for admitter in admitters {
        match admitter.await.unwrap() {
            Ok(Admission::Stored) => accepted += 1,
            Err(PipelineError::Closed) => {}
            other => panic!("unexpected admission result {other:?}"),
        }
    }
    // admissions refused after close started do not count
    assert_eq!(ingestor.metrics().events_stored, accepted);

    let engine = SqliteEngine::open(&path).unwrap();
    assert_eq!(stored(&engine).len() as u64, accepted);
}
