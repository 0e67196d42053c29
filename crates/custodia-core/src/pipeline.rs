//! The archival pipeline: live stream → durably stored evidence.
//!
//! Drives the `live → completed|failed` transition for one stream while
//! keeping the custody log consistent with what actually happened:
//!
//!   guard → load+verify → `archive_initiated` persisted (checkpoint)
//!         → fetch → upload (upsert path) → `archive_completed` persisted
//!
//! Every failure path first captures an `archive_failed` entry and flips
//! the stream to `failed` — best-effort, exactly one attempt — and then
//! re-raises the original typed error. Only the secondary failure of that
//! best-effort write is reduced to a `warn!`; nothing else is swallowed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use custodia_contracts::{
    custody::{EventDetails, GpsFix},
    error::{CustodiaError, CustodiaResult},
    stream::{Stream, StreamId, StreamStatus},
};

use crate::config::ArchiveConfig;
use crate::inflight::InflightStreams;
use crate::traits::{BroadcastProvider, MediaSource, ObjectStore, RecordStore};

/// What a successful archival produced.
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    /// Public retrieval URL of the stored asset.
    pub archived_url: String,
    /// Object key within the configured bucket.
    pub file_path: String,
    /// Stored size in bytes.
    pub file_size: u64,
}

/// Final facts reported by the broadcaster on stop.
#[derive(Debug, Clone, Default)]
pub struct StopDetails {
    pub duration_secs: Option<u64>,
    pub final_gps: Option<GpsFix>,
}

/// Orchestrates archival and broadcast stop for stream records.
///
/// All collaborators are injected; the pipeline holds no global state.
/// The shared `InflightStreams` registry is the per-stream serialization
/// point — construct the pipeline and `EvidenceCapture` with clones of
/// the same registry so their operations exclude each other too.
pub struct ArchivalPipeline {
    media: Arc<dyn MediaSource>,
    objects: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
    provider: Arc<dyn BroadcastProvider>,
    config: ArchiveConfig,
    inflight: InflightStreams,
}

impl ArchivalPipeline {
    pub fn new(
        media: Arc<dyn MediaSource>,
        objects: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
        provider: Arc<dyn BroadcastProvider>,
        config: ArchiveConfig,
        inflight: InflightStreams,
    ) -> Self {
        Self {
            media,
            objects,
            records,
            provider,
            config,
            inflight,
        }
    }

    /// Archive the recorded media of a live stream.
    ///
    /// # Algorithm
    ///
    /// 1. Claim the per-stream guard (`Busy` if another operation holds it).
    /// 2. Load the stream, verify its custody digest, require `live`.
    /// 3. Append `archive_initiated` and persist — the durability
    ///    checkpoint that makes "started but never finished" records
    ///    detectable on recovery.
    /// 4. Fetch the recorded asset (bounded by the configured timeout).
    ///    No partial media is ever persisted.
    /// 5. Upload to `{streamer_id}/{stream_id}.mp4` — a deterministic path
    ///    with upsert semantics, so a retried upload overwrites rather
    ///    than duplicates.
    /// 6. Transition to `completed`, record url/path/size, append
    ///    `archive_completed`, seal, persist.
    ///
    /// # Errors
    ///
    /// `Fetch` and `Storage` failures flip the stream to `failed` (with an
    /// `archive_failed` entry) before propagating. A `Persistence` failure
    /// on the final update after a successful upload leaves the record
    /// stale while the media exists — that inconsistency is reported to
    /// the caller for reconciliation, not retried here.
    pub fn archive(
        &self,
        stream_id: StreamId,
        source_url: &str,
        actor: &str,
    ) -> CustodiaResult<ArchiveOutcome> {
        if source_url.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "source media url must not be empty".to_string(),
            });
        }
        if actor.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "actor must not be empty".to_string(),
            });
        }

        let _guard = self.inflight.begin(stream_id)?;

        let mut stream = self.records.get_stream(stream_id)?;
        custodia_custody::check_seal(&stream)?;

        // Check-then-act is atomic here: the guard excludes concurrent
        // writers and nothing has been persisted yet.
        if stream.status != StreamStatus::Live {
            return Err(CustodiaError::StateConflict {
                stream_id,
                current: stream.status,
                attempted: StreamStatus::Completed,
            });
        }

        info!(stream_id = %stream.id, source_url = %source_url, "archival initiated");

        stream.custody_log.append(
            actor,
            EventDetails::ArchiveInitiated {
                title: stream.title.clone(),
                description: stream.description.clone(),
                source_url: source_url.to_string(),
            },
        )?;
        custodia_custody::seal(&mut stream);
        self.records.update_stream(&stream)?;

        let bytes = match self.media.fetch(source_url, self.config.fetch_timeout()) {
            Ok(bytes) => bytes,
            Err(err) => {
                return Err(self.record_failure(&mut stream, actor, "media fetch failed", err));
            }
        };
        debug!(stream_id = %stream.id, bytes = bytes.len(), "recorded asset downloaded");

        let file_path = format!("{}/{}.mp4", stream.streamer_id, stream.id);
        if let Err(err) = self.objects.put_object(
            &self.config.bucket,
            &file_path,
            &bytes,
            &self.config.content_type,
            self.config.upload_timeout(),
        ) {
            // Any partially uploaded object stays put for reconciliation.
            return Err(self.record_failure(&mut stream, actor, "storage upload failed", err));
        }

        let public_url = self.objects.public_url(&self.config.bucket, &file_path);
        let file_size = bytes.len() as u64;

        custodia_lifecycle::transition(&mut stream, StreamStatus::Completed)?;
        stream.archived_url = Some(public_url.clone());
        stream.file_path = Some(file_path.clone());
        stream.file_size = Some(file_size);
        stream.custody_log.append(
            actor,
            EventDetails::ArchiveCompleted {
                public_url: public_url.clone(),
                file_path: file_path.clone(),
                file_size,
            },
        )?;
        custodia_custody::seal(&mut stream);
        self.records.update_stream(&stream)?;

        info!(
            stream_id = %stream.id,
            file_path = %file_path,
            file_size,
            "stream archived"
        );

        Ok(ArchiveOutcome {
            archived_url: public_url,
            file_path,
            file_size,
        })
    }

    /// Stop a live broadcast and archive the record evidentially, without
    /// running the media pipeline.
    ///
    /// Signals the broadcast provider (advisory — a refusal is logged,
    /// not fatal), appends `stream_stopped`, transitions
    /// `live → archived`, stamps `ended_at`, seals, and persists.
    ///
    /// A stop request while an archival for this stream is still in
    /// flight is rejected with `Busy`, never silently superseded.
    pub fn stop_broadcast(
        &self,
        stream_id: StreamId,
        actor: &str,
        details: StopDetails,
    ) -> CustodiaResult<Stream> {
        if actor.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "actor must not be empty".to_string(),
            });
        }

        let _guard = self.inflight.begin(stream_id)?;

        let mut stream = self.records.get_stream(stream_id)?;
        custodia_custody::check_seal(&stream)?;

        custodia_lifecycle::transition(&mut stream, StreamStatus::Archived)?;

        if let Some(provider_id) = &stream.provider_stream_id {
            if let Err(err) = self.provider.signal_complete(provider_id) {
                warn!(
                    stream_id = %stream.id,
                    error = %err,
                    "broadcast provider did not acknowledge stop"
                );
            }
        }

        stream.custody_log.append(
            actor,
            EventDetails::StreamStopped {
                duration_secs: details.duration_secs,
                final_gps: details.final_gps,
            },
        )?;
        stream.ended_at = Some(Utc::now());
        custodia_custody::seal(&mut stream);
        self.records.update_stream(&stream)?;

        info!(stream_id = %stream.id, "broadcast stopped and archived");
        Ok(stream)
    }

    /// Best-effort failure bookkeeping: one attempt to append
    /// `archive_failed`, flip the stream to `failed`, and persist. The
    /// original error is always returned; a secondary failure here is
    /// logged and never retried.
    fn record_failure(
        &self,
        stream: &mut Stream,
        actor: &str,
        reason: &str,
        err: CustodiaError,
    ) -> CustodiaError {
        warn!(stream_id = %stream.id, error = %err, "{}", reason);

        let appended = stream.custody_log.append(
            actor,
            EventDetails::ArchiveFailed {
                reason: reason.to_string(),
                error: err.to_string(),
            },
        );
        if let Err(log_err) = appended {
            warn!(stream_id = %stream.id, error = %log_err, "could not append archive_failed entry");
            return err;
        }

        if let Err(transition_err) = custodia_lifecycle::transition(stream, StreamStatus::Failed) {
            warn!(stream_id = %stream.id, error = %transition_err, "could not mark stream failed");
            return err;
        }

        custodia_custody::seal(stream);
        if let Err(persist_err) = self.records.update_stream(stream) {
            warn!(
                stream_id = %stream.id,
                error = %persist_err,
                "could not persist failure status"
            );
        }

        err
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use custodia_contracts::{
        custody::EventKind,
        error::{CustodiaError, CustodiaResult},
        evidence::EvidenceRecord,
        stream::{Stream, StreamId, StreamStatus, StreamerId},
    };

    use crate::config::ArchiveConfig;
    use crate::inflight::InflightStreams;
    use crate::memory::{
        MemoryBroadcastProvider, MemoryObjectStore, MemoryRecordStore, StaticMediaSource,
    };
    use crate::traits::{MediaSource, ObjectStore, RecordStore};

    use super::{ArchivalPipeline, StopDetails};

    const SOURCE_URL: &str = "https://recordings.test/asset.mp4";

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Insert a sealed live stream and return its id.
    fn seed_live_stream(records: &MemoryRecordStore) -> StreamId {
        let mut stream =
            Stream::new("March footage", "5th and Main", StreamerId::new("u-1"), "u-1").unwrap();
        custodia_lifecycle::transition(&mut stream, StreamStatus::Live).unwrap();
        stream.provider_stream_id = Some("ingest-0".to_string());
        custodia_custody::seal(&mut stream);
        records.insert_stream(&stream).unwrap();
        stream.id
    }

    fn make_pipeline(
        media: Arc<dyn MediaSource>,
        objects: Arc<dyn ObjectStore>,
        records: Arc<MemoryRecordStore>,
        inflight: InflightStreams,
    ) -> ArchivalPipeline {
        ArchivalPipeline::new(
            media,
            objects,
            records,
            Arc::new(MemoryBroadcastProvider::new()),
            ArchiveConfig::default(),
            inflight,
        )
    }

    fn events(stream: &Stream) -> Vec<EventKind> {
        stream.custody_log.entries.iter().map(|e| e.event).collect()
    }

    /// A record store whose updates start failing once `fail_after`
    /// updates have gone through.
    struct FlakyRecordStore {
        inner: MemoryRecordStore,
        updates_left: Mutex<u32>,
    }

    impl FlakyRecordStore {
        fn failing_after(updates: u32) -> Self {
            Self {
                inner: MemoryRecordStore::new(),
                updates_left: Mutex::new(updates),
            }
        }
    }

    impl RecordStore for FlakyRecordStore {
        fn insert_stream(&self, stream: &Stream) -> CustodiaResult<()> {
            self.inner.insert_stream(stream)
        }

        fn update_stream(&self, stream: &Stream) -> CustodiaResult<()> {
            let mut left = self.updates_left.lock().unwrap();
            if *left == 0 {
                return Err(CustodiaError::Persistence {
                    reason: "record store unavailable".to_string(),
                });
            }
            *left -= 1;
            self.inner.update_stream(stream)
        }

        fn get_stream(&self, id: StreamId) -> CustodiaResult<Stream> {
            self.inner.get_stream(id)
        }

        fn insert_evidence(&self, evidence: &EvidenceRecord) -> CustodiaResult<()> {
            self.inner.insert_evidence(evidence)
        }
    }

    /// An object store that always refuses uploads.
    struct RejectingObjectStore;

    impl ObjectStore for RejectingObjectStore {
        fn put_object(
            &self,
            _bucket: &str,
            path: &str,
            _bytes: &[u8],
            _content_type: &str,
            _timeout: Duration,
        ) -> CustodiaResult<()> {
            Err(CustodiaError::Storage {
                path: path.to_string(),
                reason: "bucket quota exceeded".to_string(),
            })
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("https://cdn.test/{}/{}", bucket, path)
        }

        fn delete_object(&self, _bucket: &str, _path: &str) -> CustodiaResult<()> {
            Ok(())
        }
    }

    /// A media source that parks fetches until released, and reports when
    /// a fetch has started. Used to hold an archival in flight.
    struct BlockingMediaSource {
        started: mpsc::Sender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl MediaSource for BlockingMediaSource {
        fn fetch(&self, _url: &str, _timeout: Duration) -> CustodiaResult<Vec<u8>> {
            self.started.send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            Ok(b"held bytes".to_vec())
        }
    }

    // ── Success path ──────────────────────────────────────────────────────────

    /// Scenario B: fetch succeeds (10 bytes), upload succeeds.
    #[test]
    fn successful_archive_completes_stream() {
        let records = Arc::new(MemoryRecordStore::new());
        let objects = Arc::new(MemoryObjectStore::new("https://cdn.test"));
        let media =
            Arc::new(StaticMediaSource::new().with_asset(SOURCE_URL, b"0123456789".to_vec()));
        let stream_id = seed_live_stream(&records);

        let pipeline = make_pipeline(
            media,
            objects.clone(),
            records.clone(),
            InflightStreams::new(),
        );
        let outcome = pipeline.archive(stream_id, SOURCE_URL, "system").unwrap();

        assert_eq!(outcome.file_size, 10);
        assert_eq!(outcome.file_path, format!("u-1/{}.mp4", stream_id));
        assert_eq!(
            outcome.archived_url,
            format!("https://cdn.test/archived-streams/u-1/{}.mp4", stream_id)
        );

        let stored = records.get_stream(stream_id).unwrap();
        assert_eq!(stored.status, StreamStatus::Completed);
        assert_eq!(stored.file_size, Some(10));
        assert_eq!(stored.file_path.as_deref(), Some(outcome.file_path.as_str()));
        assert_eq!(
            events(&stored),
            vec![
                EventKind::LogCreated,
                EventKind::ArchiveInitiated,
                EventKind::ArchiveCompleted
            ]
        );

        // The persisted digest matches the persisted log.
        assert!(custodia_custody::check_seal(&stored).is_ok());

        // The media landed at the deterministic path.
        assert_eq!(
            objects
                .object("archived-streams", &outcome.file_path)
                .unwrap(),
            b"0123456789"
        );
    }

    /// A retry after a failed final persist lands on the same object path:
    /// the upload overwrites, it does not duplicate.
    #[test]
    fn retried_archive_is_idempotent_on_the_object_path() {
        let records = Arc::new(FlakyRecordStore::failing_after(1));
        let objects = Arc::new(MemoryObjectStore::new("https://cdn.test"));
        let media =
            Arc::new(StaticMediaSource::new().with_asset(SOURCE_URL, b"0123456789".to_vec()));

        let mut stream =
            Stream::new("t", "d", StreamerId::new("u-1"), "u-1").unwrap();
        custodia_lifecycle::transition(&mut stream, StreamStatus::Live).unwrap();
        custodia_custody::seal(&mut stream);
        records.insert_stream(&stream).unwrap();
        let stream_id = stream.id;

        let pipeline = ArchivalPipeline::new(
            media.clone(),
            objects.clone(),
            records.clone(),
            Arc::new(MemoryBroadcastProvider::new()),
            ArchiveConfig::default(),
            InflightStreams::new(),
        );

        // First attempt: the initiated checkpoint persists (update #1),
        // the upload succeeds, the final persist fails.
        let first = pipeline.archive(stream_id, SOURCE_URL, "system");
        assert!(matches!(first, Err(CustodiaError::Persistence { .. })));
        assert_eq!(objects.object_count(), 1, "media is present despite the stale record");

        // The stored record is stale but still live — the retry runs the
        // same path end to end.
        *records.updates_left.lock().unwrap() = u32::MAX;
        let second = pipeline.archive(stream_id, SOURCE_URL, "system").unwrap();

        assert_eq!(second.file_path, format!("u-1/{}.mp4", stream_id));
        assert_eq!(objects.object_count(), 1, "retried upload must overwrite, not duplicate");
        assert_eq!(
            records.get_stream(stream_id).unwrap().status,
            StreamStatus::Completed
        );
    }

    // ── Failure paths ─────────────────────────────────────────────────────────

    /// Scenario A: fetch returns 404.
    #[test]
    fn fetch_404_fails_the_stream_with_reason() {
        let records = Arc::new(MemoryRecordStore::new());
        let objects = Arc::new(MemoryObjectStore::new("https://cdn.test"));
        let media = Arc::new(StaticMediaSource::new()); // no assets
        let stream_id = seed_live_stream(&records);

        let pipeline = make_pipeline(
            media,
            objects.clone(),
            records.clone(),
            InflightStreams::new(),
        );
        let result = pipeline.archive(stream_id, SOURCE_URL, "system");

        match result {
            Err(CustodiaError::Fetch { reason, .. }) => assert!(reason.contains("404")),
            other => panic!("expected Fetch, got {:?}", other),
        }

        let stored = records.get_stream(stream_id).unwrap();
        assert_eq!(stored.status, StreamStatus::Failed);
        assert_eq!(
            events(&stored),
            vec![
                EventKind::LogCreated,
                EventKind::ArchiveInitiated,
                EventKind::ArchiveFailed
            ]
        );
        assert!(custodia_custody::check_seal(&stored).is_ok());

        // The failure reason reaches the custody trail.
        let failure_json =
            serde_json::to_string(&stored.custody_log.entries.last().unwrap().details).unwrap();
        assert!(failure_json.contains("404"));

        // No partial media was persisted.
        assert_eq!(objects.object_count(), 0);
    }

    #[test]
    fn upload_failure_fails_the_stream() {
        let records = Arc::new(MemoryRecordStore::new());
        let media =
            Arc::new(StaticMediaSource::new().with_asset(SOURCE_URL, b"bytes".to_vec()));
        let stream_id = seed_live_stream(&records);

        let pipeline = make_pipeline(
            media,
            Arc::new(RejectingObjectStore),
            records.clone(),
            InflightStreams::new(),
        );
        let result = pipeline.archive(stream_id, SOURCE_URL, "system");

        assert!(matches!(result, Err(CustodiaError::Storage { .. })));
        let stored = records.get_stream(stream_id).unwrap();
        assert_eq!(stored.status, StreamStatus::Failed);
        assert_eq!(stored.custody_log.entries.last().unwrap().event, EventKind::ArchiveFailed);
    }

    /// If persisting the failure status itself fails, the primary error
    /// still wins and nothing loops.
    #[test]
    fn failure_bookkeeping_is_best_effort() {
        // One update allowed: the initiated checkpoint. The failure-status
        // persist is then refused.
        let records = Arc::new(FlakyRecordStore::failing_after(1));
        let media = Arc::new(StaticMediaSource::new()); // fetch will 404

        let mut stream = Stream::new("t", "d", StreamerId::new("u-1"), "u-1").unwrap();
        custodia_lifecycle::transition(&mut stream, StreamStatus::Live).unwrap();
        custodia_custody::seal(&mut stream);
        records.insert_stream(&stream).unwrap();

        let pipeline = ArchivalPipeline::new(
            media,
            Arc::new(MemoryObjectStore::new("https://cdn.test")),
            records.clone(),
            Arc::new(MemoryBroadcastProvider::new()),
            ArchiveConfig::default(),
            InflightStreams::new(),
        );

        let result = pipeline.archive(stream.id, SOURCE_URL, "system");

        // The fetch error is surfaced, not the secondary persistence one.
        assert!(matches!(result, Err(CustodiaError::Fetch { .. })));

        // The store still holds the initiated-but-never-finished record —
        // exactly what recovery tooling scans for.
        let stored = records.get_stream(stream.id).unwrap();
        assert_eq!(stored.status, StreamStatus::Live);
        assert_eq!(stored.custody_log.entries.last().unwrap().event, EventKind::ArchiveInitiated);
    }

    // ── Transition and concurrency guards ─────────────────────────────────────

    #[test]
    fn archive_requires_a_live_stream() {
        let records = Arc::new(MemoryRecordStore::new());
        let mut stream = Stream::new("t", "d", StreamerId::new("u-1"), "u-1").unwrap();
        custodia_custody::seal(&mut stream);
        records.insert_stream(&stream).unwrap();

        let pipeline = make_pipeline(
            Arc::new(StaticMediaSource::new()),
            Arc::new(MemoryObjectStore::new("https://cdn.test")),
            records.clone(),
            InflightStreams::new(),
        );

        match pipeline.archive(stream.id, SOURCE_URL, "system") {
            Err(CustodiaError::StateConflict {
                current, attempted, ..
            }) => {
                assert_eq!(current, StreamStatus::Pending);
                assert_eq!(attempted, StreamStatus::Completed);
            }
            other => panic!("expected StateConflict, got {:?}", other),
        }

        // No side effects: the log is untouched.
        let stored = records.get_stream(stream.id).unwrap();
        assert_eq!(stored.custody_log.len(), 1);
        assert_eq!(stored.status, StreamStatus::Pending);
    }

    #[test]
    fn tampered_record_is_refused_before_any_io() {
        let records = Arc::new(MemoryRecordStore::new());
        let mut stream = Stream::new("t", "d", StreamerId::new("u-1"), "u-1").unwrap();
        custodia_lifecycle::transition(&mut stream, StreamStatus::Live).unwrap();
        custodia_custody::seal(&mut stream);
        stream.custody_log.entries[0].actor = "intruder".to_string();
        records.insert_stream(&stream).unwrap();

        let pipeline = make_pipeline(
            Arc::new(StaticMediaSource::new().with_asset(SOURCE_URL, b"x".to_vec())),
            Arc::new(MemoryObjectStore::new("https://cdn.test")),
            records,
            InflightStreams::new(),
        );

        assert!(matches!(
            pipeline.archive(stream.id, SOURCE_URL, "system"),
            Err(CustodiaError::Integrity { .. })
        ));
    }

    /// Scenario D: a second archival for the same live stream while one is
    /// in flight is rejected, not run in parallel.
    #[test]
    fn concurrent_archival_is_rejected() {
        let records = Arc::new(MemoryRecordStore::new());
        let objects = Arc::new(MemoryObjectStore::new("https://cdn.test"));
        let stream_id = seed_live_stream(&records);

        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let media = Arc::new(BlockingMediaSource {
            started: started_tx,
            release: Mutex::new(release_rx),
        });

        let inflight = InflightStreams::new();
        let pipeline = Arc::new(make_pipeline(
            media,
            objects,
            records.clone(),
            inflight.clone(),
        ));

        let background = {
            let pipeline = Arc::clone(&pipeline);
            std::thread::spawn(move || pipeline.archive(stream_id, SOURCE_URL, "system"))
        };

        // Wait until the first run holds the guard and sits in fetch.
        started_rx.recv().unwrap();

        match pipeline.archive(stream_id, SOURCE_URL, "system") {
            Err(CustodiaError::Busy { stream_id: busy_id }) => assert_eq!(busy_id, stream_id),
            other => panic!("expected Busy, got {:?}", other),
        }

        // A stop request during the in-flight archival is also rejected.
        assert!(matches!(
            pipeline.stop_broadcast(stream_id, "u-1", StopDetails::default()),
            Err(CustodiaError::Busy { .. })
        ));

        release_tx.send(()).unwrap();
        let outcome = background.join().unwrap().unwrap();
        assert_eq!(outcome.file_size, b"held bytes".len() as u64);

        // The guard is released; the stream is now completed, so a new
        // attempt fails on the transition table, not on the guard.
        assert!(matches!(
            pipeline.archive(stream_id, SOURCE_URL, "system"),
            Err(CustodiaError::StateConflict { .. })
        ));
    }

    // ── stop_broadcast ────────────────────────────────────────────────────────

    #[test]
    fn stop_broadcast_archives_the_stream() {
        let records = Arc::new(MemoryRecordStore::new());
        let provider = Arc::new(MemoryBroadcastProvider::new());
        let stream_id = seed_live_stream(&records);

        let pipeline = ArchivalPipeline::new(
            Arc::new(StaticMediaSource::new()),
            Arc::new(MemoryObjectStore::new("https://cdn.test")),
            records.clone(),
            provider.clone(),
            ArchiveConfig::default(),
            InflightStreams::new(),
        );

        let stopped = pipeline
            .stop_broadcast(
                stream_id,
                "u-1",
                StopDetails {
                    duration_secs: Some(95),
                    final_gps: None,
                },
            )
            .unwrap();

        assert_eq!(stopped.status, StreamStatus::Archived);
        assert!(stopped.ended_at.is_some());
        assert_eq!(stopped.custody_log.entries.last().unwrap().event, EventKind::StreamStopped);
        assert_eq!(provider.completed(), vec!["ingest-0".to_string()]);

        let stored = records.get_stream(stream_id).unwrap();
        assert_eq!(stored.status, StreamStatus::Archived);
        assert!(custodia_custody::check_seal(&stored).is_ok());
    }

    #[test]
    fn stop_broadcast_rejects_non_live_streams() {
        let records = Arc::new(MemoryRecordStore::new());
        let mut stream = Stream::new("t", "d", StreamerId::new("u-1"), "u-1").unwrap();
        custodia_lifecycle::transition(&mut stream, StreamStatus::Live).unwrap();
        custodia_lifecycle::transition(&mut stream, StreamStatus::Failed).unwrap();
        custodia_custody::seal(&mut stream);
        records.insert_stream(&stream).unwrap();

        let pipeline = make_pipeline(
            Arc::new(StaticMediaSource::new()),
            Arc::new(MemoryObjectStore::new("https://cdn.test")),
            records.clone(),
            InflightStreams::new(),
        );

        assert!(matches!(
            pipeline.stop_broadcast(stream.id, "u-1", StopDetails::default()),
            Err(CustodiaError::StateConflict { .. })
        ));

        // The failed record is untouched.
        let stored = records.get_stream(stream.id).unwrap();
        assert_eq!(stored.status, StreamStatus::Failed);
        assert!(stored.ended_at.is_none());
    }
}
