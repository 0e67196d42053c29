//! Broadcast start: provisioning an ingest and going live.
//!
//! The counterpart of `ArchivalPipeline::stop_broadcast`. A new stream is
//! born `pending` with a seeded custody log, picks up its ingest
//! credentials from the provider, records `broadcast_started`, and goes
//! `live` — all before the record is first persisted, so a stream never
//! exists in the store without a custody trail.

use std::sync::Arc;

use tracing::info;

use custodia_contracts::{
    custody::EventDetails,
    error::CustodiaResult,
    stream::{Stream, StreamStatus, StreamerId},
};

use crate::traits::{BroadcastProvider, RecordStore};

/// Starts broadcasts against the ingest provider and record store.
pub struct BroadcastManager {
    provider: Arc<dyn BroadcastProvider>,
    records: Arc<dyn RecordStore>,
}

impl BroadcastManager {
    pub fn new(provider: Arc<dyn BroadcastProvider>, records: Arc<dyn RecordStore>) -> Self {
        Self { provider, records }
    }

    /// Provision a live ingest and insert the new live stream.
    ///
    /// Returns the stream carrying the `stream_key` the broadcaster
    /// pushes with. `Validation` on empty title/streamer id, `Provider`
    /// if the ingest cannot be provisioned (in which case nothing is
    /// persisted).
    pub fn start(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        streamer_id: StreamerId,
        actor: &str,
    ) -> CustodiaResult<Stream> {
        let mut stream = Stream::new(title, description, streamer_id, actor)?;

        let ingest = self.provider.create_live_ingest()?;
        stream.stream_key = Some(ingest.stream_key);
        stream.playback_id = Some(ingest.playback_id.clone());
        stream.provider_stream_id = Some(ingest.provider_stream_id.clone());

        stream.custody_log.append(
            actor,
            EventDetails::BroadcastStarted {
                playback_id: ingest.playback_id,
                provider_stream_id: ingest.provider_stream_id,
            },
        )?;
        custodia_lifecycle::transition(&mut stream, StreamStatus::Live)?;
        custodia_custody::seal(&mut stream);

        self.records.insert_stream(&stream)?;

        info!(
            stream_id = %stream.id,
            streamer_id = %stream.streamer_id,
            "broadcast started"
        );
        Ok(stream)
    }
}
