//! In-memory reference implementations of the collaborator traits.
//!
//! These back the demo binary and the integration-style tests. They model
//! the semantics the pipeline relies on — upsert object writes, atomic
//! single-record updates, 404-shaped fetch misses — without any network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    evidence::EvidenceRecord,
    stream::{Stream, StreamId},
};

use crate::traits::{BroadcastProvider, LiveIngest, MediaSource, ObjectStore, RecordStore};

// ── Record store ──────────────────────────────────────────────────────────────

/// An in-memory `RecordStore` keyed by stream id.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    streams: Mutex<HashMap<StreamId, Stream>>,
    evidence: Mutex<Vec<EvidenceRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All evidence records captured from `stream_id`, in insert order.
    pub fn evidence_for(&self, stream_id: StreamId) -> Vec<EvidenceRecord> {
        self.evidence
            .lock()
            .expect("evidence lock poisoned")
            .iter()
            .filter(|e| e.stream_id == stream_id)
            .cloned()
            .collect()
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence.lock().expect("evidence lock poisoned").len()
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert_stream(&self, stream: &Stream) -> CustodiaResult<()> {
        let mut streams = self.streams.lock().map_err(|e| CustodiaError::Persistence {
            reason: format!("stream table lock poisoned: {}", e),
        })?;

        if streams.contains_key(&stream.id) {
            return Err(CustodiaError::Persistence {
                reason: format!("stream '{}' already exists", stream.id),
            });
        }
        streams.insert(stream.id, stream.clone());
        Ok(())
    }

    fn update_stream(&self, stream: &Stream) -> CustodiaResult<()> {
        let mut streams = self.streams.lock().map_err(|e| CustodiaError::Persistence {
            reason: format!("stream table lock poisoned: {}", e),
        })?;

        match streams.get_mut(&stream.id) {
            Some(slot) => {
                *slot = stream.clone();
                Ok(())
            }
            None => Err(CustodiaError::NotFound {
                stream_id: stream.id,
            }),
        }
    }

    fn get_stream(&self, id: StreamId) -> CustodiaResult<Stream> {
        let streams = self.streams.lock().map_err(|e| CustodiaError::Persistence {
            reason: format!("stream table lock poisoned: {}", e),
        })?;

        streams
            .get(&id)
            .cloned()
            .ok_or(CustodiaError::NotFound { stream_id: id })
    }

    fn insert_evidence(&self, evidence: &EvidenceRecord) -> CustodiaResult<()> {
        let mut records = self.evidence.lock().map_err(|e| CustodiaError::Persistence {
            reason: format!("evidence table lock poisoned: {}", e),
        })?;
        records.push(evidence.clone());
        Ok(())
    }
}

// ── Object store ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    #[allow(dead_code)]
    content_type: String,
}

/// An in-memory `ObjectStore` with upsert semantics and base-URL public
/// links.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// The stored bytes at `bucket`/`path`, if any.
    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("object map lock poisoned")
            .get(&(bucket.to_string(), path.to_string()))
            .map(|o| o.bytes.clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("object map lock poisoned").len()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        _timeout: Duration,
    ) -> CustodiaResult<()> {
        let mut objects = self.objects.lock().map_err(|e| CustodiaError::Storage {
            path: path.to_string(),
            reason: format!("object map lock poisoned: {}", e),
        })?;

        // Upsert: a retried upload overwrites rather than duplicates.
        objects.insert(
            (bucket.to_string(), path.to_string()),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, bucket, path)
    }

    fn delete_object(&self, bucket: &str, path: &str) -> CustodiaResult<()> {
        let mut objects = self.objects.lock().map_err(|e| CustodiaError::Storage {
            path: path.to_string(),
            reason: format!("object map lock poisoned: {}", e),
        })?;
        objects.remove(&(bucket.to_string(), path.to_string()));
        Ok(())
    }
}

// ── Media source ──────────────────────────────────────────────────────────────

/// A `MediaSource` serving a fixed url → bytes map.
///
/// A miss behaves like the recording store answering HTTP 404.
#[derive(Debug, Default)]
pub struct StaticMediaSource {
    assets: HashMap<String, Vec<u8>>,
}

impl StaticMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.assets.insert(url.into(), bytes);
        self
    }
}

impl MediaSource for StaticMediaSource {
    fn fetch(&self, url: &str, _timeout: Duration) -> CustodiaResult<Vec<u8>> {
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| CustodiaError::Fetch {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            })
    }
}

// ── Broadcast provider ────────────────────────────────────────────────────────

/// A `BroadcastProvider` issuing deterministic ingest credentials.
#[derive(Debug, Default)]
pub struct MemoryBroadcastProvider {
    counter: AtomicU64,
    completed: Mutex<Vec<String>>,
}

impl MemoryBroadcastProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider stream ids that have been signalled complete.
    pub fn completed(&self) -> Vec<String> {
        self.completed
            .lock()
            .expect("completed list lock poisoned")
            .clone()
    }
}

impl BroadcastProvider for MemoryBroadcastProvider {
    fn create_live_ingest(&self) -> CustodiaResult<LiveIngest> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(LiveIngest {
            stream_key: format!("key-{}", n),
            playback_id: format!("playback-{}", n),
            provider_stream_id: format!("ingest-{}", n),
        })
    }

    fn signal_complete(&self, provider_stream_id: &str) -> CustodiaResult<()> {
        self.completed
            .lock()
            .map_err(|e| CustodiaError::Provider {
                reason: format!("completed list lock poisoned: {}", e),
            })?
            .push(provider_stream_id.to_string());
        Ok(())
    }
}
