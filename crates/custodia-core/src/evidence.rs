//! Evidence capture: snapshotting a stream into an evidentiary record.
//!
//! The evidence record copies the stream's descriptive fields and carries
//! its own custody log — the parent's entries plus one `saved_for_evidence`
//! entry — so its provenance stands on its own. The three writes (evidence
//! insert, parent log append, parent status update) are logically one
//! operation, with one asymmetry: evidence is never deleted on partial
//! failure. If the parent update fails after the evidence insert, the
//! evidence stays and the error is surfaced.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use custodia_contracts::{
    custody::EventDetails,
    error::{CustodiaError, CustodiaResult},
    evidence::{EvidenceDetails, EvidenceId, EvidenceRecord},
    stream::{StreamId, StreamStatus},
};

use crate::inflight::InflightStreams;
use crate::traits::RecordStore;

/// Captures evidentiary snapshots of streams.
///
/// Shares the record store and in-flight registry with the archival
/// pipeline so evidence saves and archival runs exclude each other per
/// stream.
pub struct EvidenceCapture {
    records: Arc<dyn RecordStore>,
    inflight: InflightStreams,
}

impl EvidenceCapture {
    pub fn new(records: Arc<dyn RecordStore>, inflight: InflightStreams) -> Self {
        Self { records, inflight }
    }

    /// Preserve `stream_id` as evidence.
    ///
    /// Loads the stream (`NotFound` if absent, with no evidence record
    /// created), verifies its custody digest, and requires a state from
    /// which `archived` is reachable (`live` or `completed`). The evidence
    /// record is inserted first; the parent stream is then appended-to,
    /// transitioned to `archived`, sealed, and updated. A parent-update
    /// failure after the insert returns `Persistence` while the evidence
    /// record is retained.
    pub fn save_for_evidence(
        &self,
        stream_id: StreamId,
        actor: &str,
        details: EvidenceDetails,
    ) -> CustodiaResult<EvidenceRecord> {
        if actor.trim().is_empty() {
            return Err(CustodiaError::Validation {
                reason: "actor must not be empty".to_string(),
            });
        }

        let _guard = self.inflight.begin(stream_id)?;

        let mut stream = self.records.get_stream(stream_id)?;
        custodia_custody::check_seal(&stream)?;

        if !custodia_lifecycle::allowed(stream.status, StreamStatus::Archived) {
            return Err(CustodiaError::StateConflict {
                stream_id,
                current: stream.status,
                attempted: StreamStatus::Archived,
            });
        }

        let saved_entry = EventDetails::SavedForEvidence {
            incident_id: details.incident_id.clone(),
            description: details.description.clone(),
        };

        // The evidence log is seeded from the parent's trail at capture
        // time, so later changes to the stream record cannot reach it.
        let mut evidence_log = stream.custody_log.clone();
        evidence_log.append(actor, saved_entry.clone())?;

        let mut evidence = EvidenceRecord {
            id: EvidenceId::new(),
            stream_id,
            title: stream.title.clone(),
            description: stream.description.clone(),
            streamer_id: stream.streamer_id.clone(),
            playback_id: stream.playback_id.clone(),
            stream_created_at: stream.created_at,
            incident_id: details.incident_id,
            evidence_description: details.description,
            custody_log: evidence_log,
            log_digest: String::new(),
            captured_at: Utc::now(),
        };
        custodia_custody::seal_evidence(&mut evidence);

        // Insert first: if this fails there is no evidence record at all
        // and the stream is untouched.
        self.records.insert_evidence(&evidence)?;

        stream.custody_log.append(actor, saved_entry)?;
        custodia_lifecycle::transition(&mut stream, StreamStatus::Archived)?;
        if stream.ended_at.is_none() {
            stream.ended_at = Some(Utc::now());
        }
        custodia_custody::seal(&mut stream);

        if let Err(err) = self.records.update_stream(&stream) {
            // Evidence is never deleted on partial failure; the caller
            // must learn about the inconsistency instead.
            warn!(
                stream_id = %stream_id,
                evidence_id = %evidence.id,
                error = %err,
                "evidence record retained but parent stream update failed"
            );
            return Err(err);
        }

        info!(
            stream_id = %stream_id,
            evidence_id = %evidence.id,
            "stream saved for evidence"
        );
        Ok(evidence)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
