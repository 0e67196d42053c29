//! Runtime error types for the CUSTODIA archival pipeline.
//!
//! All fallible operations in the CUSTODIA crates return `CustodiaResult<T>`.
//! Error variants carry enough context to produce actionable custody-log
//! entries: every pipeline failure is captured in the chain of custody
//! before being re-raised as one of these.

use thiserror::Error;

use crate::stream::{StreamId, StreamStatus};

/// The unified error type for the CUSTODIA runtime.
#[derive(Debug, Error)]
pub enum CustodiaError {
    /// Required input was missing or malformed. Never retried.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// Downloading the recorded asset failed (non-success response, network
    /// error, or timeout). Transient — eligible for retry by the caller.
    #[error("media fetch failed for '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// Uploading to durable object storage failed. Any partially uploaded
    /// object is left in place for reconciliation, never deleted here.
    #[error("storage upload failed for '{path}': {reason}")]
    Storage { path: String, reason: String },

    /// The record store rejected a write. When this occurs after a
    /// successful upload the stream record is known-inconsistent and the
    /// error must reach the caller unswallowed.
    #[error("record store write failed: {reason}")]
    Persistence { reason: String },

    /// The requested lifecycle transition is not in the transition table.
    ///
    /// Names both the current and the attempted state so the caller can
    /// see exactly which edge was rejected. No side effects are applied
    /// when this is returned.
    #[error("state conflict on stream '{stream_id}': cannot transition from '{current}' to '{attempted}'")]
    StateConflict {
        stream_id: StreamId,
        current: StreamStatus,
        attempted: StreamStatus,
    },

    /// Another archival or evidence-save operation already holds the
    /// per-stream serialization point. The second request is rejected,
    /// never queued or run concurrently.
    #[error("state conflict on stream '{stream_id}': another operation is already in flight")]
    Busy { stream_id: StreamId },

    /// The referenced stream does not exist in the record store.
    #[error("stream '{stream_id}' not found")]
    NotFound { stream_id: StreamId },

    /// A persisted custody log failed its tamper check on load: the stored
    /// digest does not match the recomputed one.
    #[error("custody log integrity check failed for stream '{stream_id}': {reason}")]
    Integrity { stream_id: StreamId, reason: String },

    /// The broadcast provider rejected an ingest-control call.
    #[error("broadcast provider error: {reason}")]
    Provider { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the CUSTODIA crates.
pub type CustodiaResult<T> = Result<T, CustodiaError>;
