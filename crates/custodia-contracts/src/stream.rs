//! Stream identity, status, and record types.
//!
//! A `Stream` is one broadcast lifecycle: created on broadcast start,
//! mutated by the archival pipeline on stop, terminal at `completed`,
//! `failed`, or `archived`. Every status mutation goes through the
//! transition table in `custodia-lifecycle` — no component writes
//! `status` directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::custody::ChainOfCustodyLog;
use crate::error::{CustodiaError, CustodiaResult};

/// Unique identifier for one stream record.
///
/// Appears in every custody entry's parent log and in every error that
/// references a specific stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub Uuid);

impl StreamId {
    /// Create a new, unique stream ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable identifier of the broadcasting principal.
///
/// Also the first path segment of the archived object key, which is what
/// makes retried uploads land on the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamerId(pub String);

impl StreamerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for StreamerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The legal states of a stream record.
///
/// The allowed edges between these live in `custodia-lifecycle`; see the
/// transition table there. Serialized as snake_case strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    /// Record created, broadcast not yet live.
    Pending,
    /// Broadcast in progress.
    Live,
    /// Archival upload succeeded; media is durably stored.
    Completed,
    /// Download or upload failed. Terminal for automatic retries —
    /// re-broadcasting creates a new stream, never re-enters this one.
    Failed,
    /// Saved for evidence (stopped with an evidentiary snapshot).
    Archived,
}

impl StreamStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamStatus::Completed | StreamStatus::Failed | StreamStatus::Archived
        )
    }
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StreamStatus::Pending => "pending",
            StreamStatus::Live => "live",
            StreamStatus::Completed => "completed",
            StreamStatus::Failed => "failed",
            StreamStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// One broadcast lifecycle and its evidentiary record.
///
/// The custody log is owned 1:1 by the stream; `log_digest` is the SHA-256
/// digest of the log's canonical form, recomputed on every persist and
/// checked on every load (see `custodia_custody::seal` / `check_seal`).
/// `archived_url`, `file_path`, and `file_size` are populated only once
/// the stream reaches `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: StreamId,
    pub title: String,
    pub description: String,
    pub streamer_id: StreamerId,

    /// Ingest key handed to the broadcaster. Provider-issued.
    pub stream_key: Option<String>,
    /// Playback reference for viewers. Provider-issued.
    pub playback_id: Option<String>,
    /// The provider's own identifier for the live ingest, needed to
    /// signal completion on stop.
    pub provider_stream_id: Option<String>,

    pub status: StreamStatus,
    pub custody_log: ChainOfCustodyLog,
    /// SHA-256 (hex) of the custody log's canonical form at last persist.
    /// Empty only before the first seal.
    pub log_digest: String,

    pub archived_url: Option<String>,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,

    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Stream {
    /// Build a new `pending` stream with a freshly seeded custody log.
    ///
    /// Returns `Validation` if `title` or the streamer id is empty, or if
    /// `actor` is empty (the custody log refuses anonymous genesis
    /// entries).
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        streamer_id: StreamerId,
        actor: &str,
    ) -> CustodiaResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "stream title must not be empty".to_string(),
            });
        }
        if streamer_id.0.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "streamer id must not be empty".to_string(),
            });
        }

        let id = StreamId::new();
        let custody_log = ChainOfCustodyLog::create(id, actor)?;

        Ok(Self {
            id,
            title,
            description: description.into(),
            streamer_id,
            stream_key: None,
            playback_id: None,
            provider_stream_id: None,
            status: StreamStatus::Pending,
            custody_log,
            log_digest: String::new(),
            archived_url: None,
            file_path: None,
            file_size: None,
            created_at: Utc::now(),
            ended_at: None,
        })
    }
}
