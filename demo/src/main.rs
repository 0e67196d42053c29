//! CUSTODIA — Evidentiary Archival Demo CLI
//!
//! Runs one or all of the archival scenarios against the in-memory
//! collaborator implementations.  Each scenario uses the real CUSTODIA
//! components (lifecycle machine, archival pipeline, evidence capture,
//! custody digests) end to end.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- archive-success
//!   cargo run -p demo -- archive-fetch-failure
//!   cargo run -p demo -- save-evidence
//!   cargo run -p demo -- tamper-check

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use custodia_contracts::{
    custody::{ChainOfCustodyLog, GpsFix},
    error::{CustodiaError, CustodiaResult},
    evidence::EvidenceDetails,
    stream::{Stream, StreamerId},
};
use custodia_core::{
    memory::{MemoryBroadcastProvider, MemoryObjectStore, MemoryRecordStore, StaticMediaSource},
    traits::RecordStore,
    ArchivalPipeline, ArchiveConfig, BroadcastManager, EvidenceCapture, InflightStreams,
    StopDetails,
};

/// Archive settings shared by all demo runs.
const ARCHIVE_CONFIG: &str = include_str!("../config/archive.toml");

const RECORDED_URL: &str = "https://recordings.example/asset-0.mp4";
const RECORDED_BYTES: &[u8] = b"not really mp4, but durable";

// ── CLI definition ────────────────────────────────────────────────────────────

/// CUSTODIA — evidentiary archival pipeline demo.
///
/// Each subcommand drives a full stream lifecycle and prints the
/// resulting chain-of-custody log with its digest.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "CUSTODIA archival pipeline demo",
    long_about = "Drives the CUSTODIA archival pipeline end to end against in-memory\n\
                  collaborators, showing lifecycle enforcement, custody logging,\n\
                  and tamper-evident digests."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all scenarios in sequence.
    RunAll,
    /// Happy path: broadcast, archival, completed stream.
    ArchiveSuccess,
    /// The recording store answers 404; the stream ends up failed.
    ArchiveFetchFailure,
    /// Snapshot a live stream into an evidentiary record.
    SaveEvidence,
    /// Show the digest catching a tampered custody log.
    TamperCheck,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::ArchiveSuccess => run_archive_success(),
        Command::ArchiveFetchFailure => run_archive_fetch_failure(),
        Command::SaveEvidence => run_save_evidence(),
        Command::TamperCheck => run_tamper_check(),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_all() -> CustodiaResult<()> {
    run_archive_success()?;
    run_archive_fetch_failure()?;
    run_save_evidence()?;
    run_tamper_check()?;
    Ok(())
}

// ── Shared wiring ─────────────────────────────────────────────────────────────

/// One demo environment: every collaborator in memory, the pipeline and
/// evidence capture sharing the same record store and in-flight registry.
struct Harness {
    records: Arc<MemoryRecordStore>,
    pipeline: ArchivalPipeline,
    capture: EvidenceCapture,
    manager: BroadcastManager,
}

impl Harness {
    fn new(media: StaticMediaSource) -> CustodiaResult<Self> {
        let config = ArchiveConfig::from_toml_str(ARCHIVE_CONFIG)?;
        let records = Arc::new(MemoryRecordStore::new());
        let objects = Arc::new(MemoryObjectStore::new("https://cdn.example"));
        let provider = Arc::new(MemoryBroadcastProvider::new());
        let inflight = InflightStreams::new();

        let pipeline = ArchivalPipeline::new(
            Arc::new(media),
            objects,
            records.clone(),
            provider.clone(),
            config,
            inflight.clone(),
        );
        let capture = EvidenceCapture::new(records.clone(), inflight);
        let manager = BroadcastManager::new(provider, records.clone());

        Ok(Self {
            records,
            pipeline,
            capture,
            manager,
        })
    }

    fn start_stream(&self) -> CustodiaResult<Stream> {
        self.manager.start(
            "Demonstration on 5th Avenue",
            "Handheld footage, north side",
            StreamerId::new("demo-streamer"),
            "demo-streamer",
        )
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

fn run_archive_success() -> CustodiaResult<()> {
    print_heading("Scenario: archive success");

    let harness = Harness::new(
        StaticMediaSource::new().with_asset(RECORDED_URL, RECORDED_BYTES.to_vec()),
    )?;
    let stream = harness.start_stream()?;
    println!(
        "Broadcast live: stream {} (key {})",
        stream.id,
        stream.stream_key.as_deref().unwrap_or("-")
    );

    let outcome = harness.pipeline.archive(stream.id, RECORDED_URL, "system")?;
    println!(
        "Archived {} bytes to {} ({})",
        outcome.file_size, outcome.file_path, outcome.archived_url
    );

    let stored = harness.records.get_stream(stream.id)?;
    println!("Final status: {}", stored.status);
    print_log(&stored.custody_log, &stored.log_digest);
    Ok(())
}

fn run_archive_fetch_failure() -> CustodiaResult<()> {
    print_heading("Scenario: archive fetch failure");

    // No assets registered: the recording store answers 404.
    let harness = Harness::new(StaticMediaSource::new())?;
    let stream = harness.start_stream()?;

    match harness.pipeline.archive(stream.id, RECORDED_URL, "system") {
        Err(CustodiaError::Fetch { url, reason }) => {
            println!("Fetch failed as expected: {} ({})", url, reason);
        }
        Ok(_) => {
            return Err(CustodiaError::Validation {
                reason: "fetch unexpectedly succeeded".to_string(),
            });
        }
        Err(other) => return Err(other),
    }

    let stored = harness.records.get_stream(stream.id)?;
    println!("Final status: {}", stored.status);
    print_log(&stored.custody_log, &stored.log_digest);
    Ok(())
}

fn run_save_evidence() -> CustodiaResult<()> {
    print_heading("Scenario: save for evidence");

    let harness = Harness::new(StaticMediaSource::new())?;
    let stream = harness.start_stream()?;

    let evidence = harness.capture.save_for_evidence(
        stream.id,
        "officer-7",
        EvidenceDetails {
            incident_id: Some("case-2210".to_string()),
            description: Some("requested by counsel".to_string()),
        },
    )?;
    println!(
        "Evidence {} captured from stream {}",
        evidence.id, evidence.stream_id
    );

    let stored = harness.records.get_stream(stream.id)?;
    println!("Parent stream status: {}", stored.status);
    print_log(&evidence.custody_log, &evidence.log_digest);
    Ok(())
}

fn run_tamper_check() -> CustodiaResult<()> {
    print_heading("Scenario: tamper check");

    let harness = Harness::new(StaticMediaSource::new())?;
    let stream = harness.start_stream()?;

    // Stop the broadcast so the record carries a stream_stopped entry.
    harness.pipeline.stop_broadcast(
        stream.id,
        "demo-streamer",
        StopDetails {
            duration_secs: Some(95),
            final_gps: Some(GpsFix {
                latitude: 40.7484,
                longitude: -73.9857,
            }),
        },
    )?;

    let mut stored = harness.records.get_stream(stream.id)?;
    println!(
        "Digest before tampering verifies: {}",
        custodia_custody::verify(&stored.custody_log, &stored.log_digest)
    );

    // Rewrite history on the loaded copy.
    stored.custody_log.entries[0].actor = "someone-else".to_string();
    println!(
        "Digest after tampering verifies:  {}",
        custodia_custody::verify(&stored.custody_log, &stored.log_digest)
    );

    match custodia_custody::check_seal(&stored) {
        Err(CustodiaError::Integrity { reason, .. }) => {
            println!("check_seal rejected the record: {}", reason);
            Ok(())
        }
        Ok(()) => Err(CustodiaError::Validation {
            reason: "tampered record passed verification".to_string(),
        }),
        Err(other) => Err(other),
    }
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_heading(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "-".repeat(title.len()));
}

fn print_log(log: &ChainOfCustodyLog, digest: &str) {
    let pretty = serde_json::to_string_pretty(log)
        .unwrap_or_else(|_| "<unserializable log>".to_string());
    println!("Chain of custody ({} entries):", log.len());
    println!("{}", pretty);
    println!("SHA-256 digest: {}", digest);
    println!("Verification: {}", custodia_custody::verify(log, digest));
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("CUSTODIA — Evidentiary Stream Archival");
    println!("======================================");
    println!();
    println!("Pipeline per stream:");
    println!("  [1] Lifecycle machine validates every status change (pending/live/completed/failed/archived)");
    println!("  [2] Chain-of-custody log records each step; appends are the only way facts enter it");
    println!("  [3] Canonical JSON + SHA-256 digest sealed on every persist, checked on every load");
    println!("  [4] Archival: fetch recording, upsert to durable storage, complete or fail with reasons");
    println!("  [5] Evidence capture snapshots a stream with its own independently verifiable trail");
    println!();
}
