//! The stream lifecycle transition table.
//!
//! Allowed edges:
//!
//!   pending   → live       (broadcast start succeeds)
//!   live      → completed  (archival upload succeeds)
//!   live      → failed     (download or upload fails)
//!   live      → archived   (stop with evidentiary save)
//!   completed → archived   (subsequent evidence save)
//!
//! Everything else is rejected with `StateConflict` naming both states.
//! `failed` is terminal for automatic retries; re-broadcasting creates a
//! new stream rather than re-entering a failed one.

use tracing::debug;

use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    stream::{Stream, StreamStatus},
};

/// Return true if the edge `from → to` is in the transition table.
pub fn allowed(from: StreamStatus, to: StreamStatus) -> bool {
    use StreamStatus::*;
    matches!(
        (from, to),
        (Pending, Live) | (Live, Completed) | (Live, Failed) | (Live, Archived) | (Completed, Archived)
    )
}

/// The set of states reachable in one step from `from`.
pub fn targets(from: StreamStatus) -> &'static [StreamStatus] {
    use StreamStatus::*;
    match from {
        Pending => &[Live],
        Live => &[Completed, Failed, Archived],
        Completed => &[Archived],
        Failed | Archived => &[],
    }
}

/// Move `stream` to `to`, or fail without touching it.
///
/// The check and the mutation happen on the same exclusively borrowed
/// record, so a rejected transition leaves no partial side effects: on
/// `StateConflict` the stream's status is exactly what it was before the
/// call.
pub fn transition(stream: &mut Stream, to: StreamStatus) -> CustodiaResult<()> {
    let from = stream.status;
    if !allowed(from, to) {
        return Err(CustodiaError::StateConflict {
            stream_id: stream.id,
            current: from,
            attempted: to,
        });
    }

    debug!(stream_id = %stream.id, from = %from, to = %to, "stream transition");
    stream.status = to;
    Ok(())
}
