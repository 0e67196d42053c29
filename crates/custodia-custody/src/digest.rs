//! Custody log digests and tamper verification.
//!
//! The digest is a SHA-256 over the log's canonical JSON form (see the
//! `canonical` module), so it is a pure function of entry contents and
//! order: any party holding the stored log and its digest can re-verify
//! independently. Changing, removing, or reordering any entry changes
//! the digest.

use sha2::{Digest, Sha256};
use tracing::warn;

use custodia_contracts::{
    custody::ChainOfCustodyLog,
    error::{CustodiaError, CustodiaResult},
    evidence::EvidenceRecord,
    stream::Stream,
};

use crate::canonical::canonical_bytes;

/// Compute the SHA-256 digest of `log`'s canonical form.
///
/// Returns a lowercase 64-character hex string. Two structurally equal
/// logs always hash identically.
///
/// # Panics
///
/// Panics if the log cannot be serialized to JSON — which cannot happen
/// for the well-formed `ChainOfCustodyLog` type.
pub fn compute_hash(log: &ChainOfCustodyLog) -> String {
    let value =
        serde_json::to_value(log).expect("custody log must always be serializable to JSON");
    let bytes = canonical_bytes(&value);

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

/// Recompute `log`'s digest and compare against `expected`.
///
/// Used to detect tampering when a log is loaded back from storage
/// alongside a previously recorded digest.
pub fn verify(log: &ChainOfCustodyLog, expected: &str) -> bool {
    compute_hash(log) == expected
}

/// Recompute and store the digest on a stream record.
///
/// Called immediately before every persist so the digest at rest always
/// matches the log at rest.
pub fn seal(stream: &mut Stream) {
    stream.log_digest = compute_hash(&stream.custody_log);
}

/// Recompute and store the digest on an evidence record before insert.
pub fn seal_evidence(evidence: &mut EvidenceRecord) {
    evidence.log_digest = compute_hash(&evidence.custody_log);
}

/// Verify a loaded stream's custody log against its stored digest.
///
/// Returns `Integrity` if the digest is absent or does not match — either
/// way the record cannot be trusted as evidence and no pipeline operation
/// may proceed on it.
pub fn check_seal(stream: &Stream) -> CustodiaResult<()> {
    if stream.log_digest.is_empty() {
        warn!(stream_id = %stream.id, "loaded stream carries no custody digest");
        return Err(CustodiaError::Integrity {
            stream_id: stream.id,
            reason: "stored record carries no custody digest".to_string(),
        });
    }

    if !verify(&stream.custody_log, &stream.log_digest) {
        warn!(stream_id = %stream.id, "custody digest mismatch on load");
        return Err(CustodiaError::Integrity {
            stream_id: stream.id,
            reason: "stored digest does not match recomputed digest".to_string(),
        });
    }

    Ok(())
}
