//! # custodia-contracts
//!
//! Shared types and contracts for the CUSTODIA archival runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions (streams, evidence records, custody
//! logs) and the unified error type.

pub mod custody;
pub mod error;
pub mod evidence;
pub mod stream;
