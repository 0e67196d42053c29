//! Chain-of-custody log and entry types.
//!
//! A `ChainOfCustodyLog` is the append-only evidentiary record owned by
//! exactly one stream. Entries are never removed or mutated once appended;
//! the only way new facts enter the log is `append()`. Hashing and tamper
//! verification live in the `custodia-custody` crate — this module defines
//! only the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CustodiaError, CustodiaResult};
use crate::stream::StreamId;

/// Custody log schema version recorded in every `log_created` entry.
pub const LOG_VERSION: &str = "1.0";

/// The closed vocabulary of custody events.
///
/// This is an enumerated set, never a free string: a log entry can only
/// describe one of these facts. Serialized as snake_case tags
/// (e.g. `"archive_initiated"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LogCreated,
    BroadcastStarted,
    StreamStopped,
    ArchiveInitiated,
    ArchiveCompleted,
    ArchiveFailed,
    SavedForEvidence,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            EventKind::LogCreated => "log_created",
            EventKind::BroadcastStarted => "broadcast_started",
            EventKind::StreamStopped => "stream_stopped",
            EventKind::ArchiveInitiated => "archive_initiated",
            EventKind::ArchiveCompleted => "archive_completed",
            EventKind::ArchiveFailed => "archive_failed",
            EventKind::SavedForEvidence => "saved_for_evidence",
        };
        f.write_str(tag)
    }
}

/// A GPS fix captured from the broadcasting device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Event-specific structured facts carried by a log entry.
///
/// One variant per `EventKind`, internally tagged with `kind` so the
/// serialized form is unambiguous and deterministic. Free-form maps are
/// deliberately absent: every field that can enter the hash is declared
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventDetails {
    /// The log itself was created.
    LogCreated { version: String },

    /// A live ingest was provisioned and the broadcast went live.
    BroadcastStarted {
        playback_id: String,
        provider_stream_id: String,
    },

    /// The broadcaster ended the stream.
    StreamStopped {
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_secs: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        final_gps: Option<GpsFix>,
    },

    /// Archival began; recorded before any I/O as the durability checkpoint.
    ArchiveInitiated {
        title: String,
        description: String,
        source_url: String,
    },

    /// The recorded asset was durably stored.
    ArchiveCompleted {
        public_url: String,
        file_path: String,
        file_size: u64,
    },

    /// Archival failed; `reason` is the human-readable summary, `error`
    /// the underlying collaborator message.
    ArchiveFailed { reason: String, error: String },

    /// The stream was snapshotted into an evidentiary record.
    SavedForEvidence {
        #[serde(skip_serializing_if = "Option::is_none")]
        incident_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl EventDetails {
    /// The event kind this payload describes.
    pub fn kind(&self) -> EventKind {
        match self {
            EventDetails::LogCreated { .. } => EventKind::LogCreated,
            EventDetails::BroadcastStarted { .. } => EventKind::BroadcastStarted,
            EventDetails::StreamStopped { .. } => EventKind::StreamStopped,
            EventDetails::ArchiveInitiated { .. } => EventKind::ArchiveInitiated,
            EventDetails::ArchiveCompleted { .. } => EventKind::ArchiveCompleted,
            EventDetails::ArchiveFailed { .. } => EventKind::ArchiveFailed,
            EventDetails::SavedForEvidence { .. } => EventKind::SavedForEvidence,
        }
    }
}

/// One immutable fact in the custody trail.
///
/// The `event` tag is always derived from `details` at construction, so
/// the two can never disagree. Entries carry a fresh v4 UUID and are
/// stamped with a timestamp that never moves backwards within one log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Globally unique, assigned at creation, never reused.
    pub id: Uuid,
    /// Creation instant (UTC). Non-decreasing within one log.
    pub timestamp: DateTime<Utc>,
    /// Discriminant from the closed event vocabulary.
    pub event: EventKind,
    /// The principal (user or system) responsible for the event.
    pub actor: String,
    /// Event-specific structured facts.
    pub details: EventDetails,
}

impl LogEntry {
    fn new(actor: &str, details: EventDetails) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event: details.kind(),
            actor: actor.to_string(),
            details,
        }
    }
}

/// An immutable, append-only sequence of custody entries for one stream.
///
/// Invariants:
/// - the first entry is always `log_created`;
/// - entries are ordered by non-decreasing timestamp;
/// - entries are never removed or mutated after `append()` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOfCustodyLog {
    /// The stream this log documents.
    pub stream_id: StreamId,
    /// All entries in append order.
    pub entries: Vec<LogEntry>,
}

impl ChainOfCustodyLog {
    /// Build a new log containing exactly one `log_created` entry.
    ///
    /// Returns `Validation` if `actor` is empty — a custody entry without
    /// a responsible principal is meaningless as evidence.
    pub fn create(stream_id: StreamId, actor: &str) -> CustodiaResult<Self> {
        if actor.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "custody log actor must not be empty".to_string(),
            });
        }

        let genesis = LogEntry::new(
            actor,
            EventDetails::LogCreated {
                version: LOG_VERSION.to_string(),
            },
        );

        Ok(Self {
            stream_id,
            entries: vec![genesis],
        })
    }

    /// Append one entry describing `details`, attributed to `actor`.
    ///
    /// The new entry's timestamp is clamped to the previous entry's so the
    /// non-decreasing order invariant holds even across clock adjustments.
    /// Returns `Validation` only on an empty actor; a well-formed
    /// `EventDetails` can always be appended.
    pub fn append(&mut self, actor: &str, details: EventDetails) -> CustodiaResult<&LogEntry> {
        if actor.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "custody log actor must not be empty".to_string(),
            });
        }

        let mut entry = LogEntry::new(actor, details);
        if let Some(last) = self.entries.last() {
            if entry.timestamp < last.timestamp {
                entry.timestamp = last.timestamp;
            }
        }

        self.entries.push(entry);
        Ok(self.entries.last().expect("entry was just pushed"))
    }

    /// The number of entries recorded so far. Non-decreasing over the
    /// lifetime of a stream.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A created log always holds its genesis entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
