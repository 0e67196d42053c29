//! # custodia-core
//!
//! The orchestration layer of CUSTODIA: the archival pipeline, evidence
//! capture, and broadcast start/stop, wired to hosted services through
//! four collaborator traits.
//!
//! This crate provides:
//! - The collaborator traits (`MediaSource`, `ObjectStore`, `RecordStore`,
//!   `BroadcastProvider`)
//! - `ArchivalPipeline` — drives `live → completed|failed` and keeps the
//!   custody log consistent with what actually happened
//! - `EvidenceCapture` — snapshots a stream into an evidentiary record
//! - `BroadcastManager` — provisions ingests and brings streams live
//! - `InflightStreams` — the per-stream serialization point
//! - In-memory reference implementations of all four traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custodia_core::{ArchivalPipeline, ArchiveConfig, InflightStreams};
//!
//! let inflight = InflightStreams::new();
//! let pipeline = ArchivalPipeline::new(media, objects, records, provider,
//!                                      ArchiveConfig::default(), inflight.clone());
//! let outcome = pipeline.archive(stream_id, recorded_url, "system")?;
//! ```

pub mod broadcast;
pub mod config;
pub mod evidence;
pub mod inflight;
pub mod memory;
pub mod pipeline;
pub mod traits;

pub use broadcast::BroadcastManager;
pub use config::ArchiveConfig;
pub use evidence::EvidenceCapture;
pub use inflight::{InflightGuard, InflightStreams};
pub use pipeline::{ArchivalPipeline, ArchiveOutcome, StopDetails};
