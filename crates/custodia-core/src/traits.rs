//! Collaborator trait definitions for the CUSTODIA pipeline.
//!
//! These four traits are the complete boundary to the hosted services the
//! product runs against:
//!
//! - `MediaSource`       — the recording store (network GET of a recorded asset)
//! - `ObjectStore`       — durable binary object storage
//! - `RecordStore`       — the persistent stream/evidence record store
//! - `BroadcastProvider` — the live video ingest provider
//!
//! The pipeline wires them together; it never talks to a concrete service
//! directly, and no process-wide client singletons exist — implementations
//! are injected at construction.

use std::time::Duration;

use custodia_contracts::{
    error::CustodiaResult,
    evidence::EvidenceRecord,
    stream::{Stream, StreamId},
};

/// Credentials and references issued when a live ingest is provisioned.
#[derive(Debug, Clone)]
pub struct LiveIngest {
    /// Secret key the broadcaster pushes the feed with.
    pub stream_key: String,
    /// Playback reference handed to viewers.
    pub playback_id: String,
    /// The provider's own identifier for this ingest.
    pub provider_stream_id: String,
}

/// Source of recorded media assets.
///
/// The fetch is the first of the two network steps in the pipeline; it
/// must respect `timeout` and return a typed `Fetch` error on expiry or
/// on a non-success response rather than hanging or returning partial
/// bytes.
pub trait MediaSource: Send + Sync {
    /// Download the recorded asset at `url` in full.
    fn fetch(&self, url: &str, timeout: Duration) -> CustodiaResult<Vec<u8>>;
}

/// Durable binary object storage.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `bucket`/`path` with upsert semantics: writing to
    /// an existing path overwrites it, which is what makes retried uploads
    /// idempotent. Must respect `timeout` and return a typed `Storage`
    /// error on expiry.
    fn put_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        timeout: Duration,
    ) -> CustodiaResult<()>;

    /// Resolve the public retrieval URL for a stored object.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove an object. Used only by reconciliation tooling for orphaned
    /// uploads — the pipeline itself never deletes.
    fn delete_object(&self, bucket: &str, path: &str) -> CustodiaResult<()>;
}

/// The persistent record store for streams and evidence.
///
/// Each call is atomic at the single-record level; the pipeline's
/// per-stream in-flight guard provides the serialization across calls.
pub trait RecordStore: Send + Sync {
    /// Insert a new stream record.
    fn insert_stream(&self, stream: &Stream) -> CustodiaResult<()>;

    /// Replace the stored record for `stream.id` with `stream`.
    fn update_stream(&self, stream: &Stream) -> CustodiaResult<()>;

    /// Load a stream record, or `NotFound`.
    fn get_stream(&self, id: StreamId) -> CustodiaResult<Stream>;

    /// Insert a new evidence record. Evidence is insert-only: records are
    /// never updated or deleted through this interface.
    fn insert_evidence(&self, evidence: &EvidenceRecord) -> CustodiaResult<()>;
}

/// The live video ingest provider.
///
/// Consumed only at broadcast start and stop, never by the archival core.
pub trait BroadcastProvider: Send + Sync {
    /// Provision a live ingest and return its credentials.
    fn create_live_ingest(&self) -> CustodiaResult<LiveIngest>;

    /// Tell the provider the broadcast is finished. Advisory — most
    /// providers finalize on their own when the feed ends.
    fn signal_complete(&self, provider_stream_id: &str) -> CustodiaResult<()>;
}
