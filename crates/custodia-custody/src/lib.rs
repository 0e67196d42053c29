//! # custodia-custody
//!
//! Tamper-evidence for chain-of-custody logs: canonical JSON encoding,
//! SHA-256 digests, and seal/verify helpers for persisted records.
//!
//! ## Overview
//!
//! The custody log is the evidentiary heart of CUSTODIA. Its digest must
//! be a deterministic function of entry contents and order, so the log is
//! first rendered into a canonical byte form (sorted keys, no whitespace
//! variance) and then hashed. Records are sealed (digest recomputed and
//! stored) before every persist and checked on every load.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custodia_custody::{compute_hash, verify};
//!
//! let digest = compute_hash(&stream.custody_log);
//! assert!(verify(&stream.custody_log, &digest));
//! ```

pub mod canonical;
pub mod digest;

pub use canonical::canonical_bytes;
pub use digest::{check_seal, compute_hash, seal, seal_evidence, verify};

// ── Tests ─────────────────────────────────────────────────────────────────────
