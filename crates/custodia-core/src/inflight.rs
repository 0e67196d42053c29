//! Per-stream in-flight serialization.
//!
//! At most one archival or evidence-save operation may run per stream id
//! at a time; a second request is rejected with `Busy`, never queued or
//! run concurrently. This is the serialization point that keeps custody
//! appends and persistence for one stream totally ordered — no two
//! writers can interleave entries out of causal order.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use custodia_contracts::{
    error::{CustodiaError, CustodiaResult},
    stream::StreamId,
};

/// The set of stream ids with an operation currently in flight.
///
/// Cheap to clone; all clones share the same underlying set, so the
/// archival pipeline and evidence capture hand out guards from the same
/// registry.
#[derive(Debug, Clone, Default)]
pub struct InflightStreams {
    inner: Arc<Mutex<HashSet<StreamId>>>,
}

impl InflightStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `stream_id`, or fail if another operation already holds it.
    ///
    /// The claim is released when the returned guard drops, including on
    /// panic or early return.
    pub fn begin(&self, stream_id: StreamId) -> CustodiaResult<InflightGuard> {
        let mut set = self.inner.lock().map_err(|e| CustodiaError::Persistence {
            reason: format!("in-flight registry lock poisoned: {}", e),
        })?;

        if !set.insert(stream_id) {
            return Err(CustodiaError::Busy { stream_id });
        }

        Ok(InflightGuard {
            registry: Arc::clone(&self.inner),
            stream_id,
        })
    }

    /// Whether an operation currently holds `stream_id`.
    pub fn is_inflight(&self, stream_id: StreamId) -> bool {
        self.inner
            .lock()
            .map(|set| set.contains(&stream_id))
            .unwrap_or(false)
    }
}

/// RAII claim on one stream id.
#[derive(Debug)]
pub struct InflightGuard {
    registry: Arc<Mutex<HashSet<StreamId>>>,
    stream_id: StreamId,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        // Must not panic in drop; a poisoned lock just leaves the claim
        // behind, and the process is already unwinding in that case.
        if let Ok(mut set) = self.registry.lock() {
            set.remove(&self.stream_id);
        }
    }
}
