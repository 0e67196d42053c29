//! Evidentiary snapshot types.
//!
//! An `EvidenceRecord` is a derived snapshot of a stream at capture time —
//! a distinct entity, not the stream itself. It copies the descriptive
//! fields, carries its own custody log (the parent's entries plus one
//! `saved_for_evidence` entry), and is immutable after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::custody::ChainOfCustodyLog;
use crate::stream::{StreamId, StreamerId};

/// Unique identifier for one evidence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceId(pub Uuid);

impl EvidenceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller-supplied facts attached to an evidence capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDetails {
    /// External incident/case reference, if any.
    pub incident_id: Option<String>,
    /// Free-text description of why the stream is being preserved.
    pub description: Option<String>,
}

/// A snapshot of one stream preserved as evidence.
///
/// The custody log here is seeded from the parent stream's log at capture
/// time plus the `saved_for_evidence` entry, so the evidence record's
/// provenance is independently verifiable even if the parent stream record
/// later diverges. `log_digest` is sealed before insert and checked on
/// load, exactly as for streams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub id: EvidenceId,
    /// The stream this evidence was captured from.
    pub stream_id: StreamId,

    // Copied from the parent stream at capture time.
    pub title: String,
    pub description: String,
    pub streamer_id: StreamerId,
    pub playback_id: Option<String>,
    pub stream_created_at: DateTime<Utc>,

    pub incident_id: Option<String>,
    pub evidence_description: Option<String>,

    pub custody_log: ChainOfCustodyLog,
    /// SHA-256 (hex) of the custody log's canonical form at insert.
    pub log_digest: String,

    pub captured_at: DateTime<Utc>,
}
