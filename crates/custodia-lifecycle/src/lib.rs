//! # custodia-lifecycle
//!
//! The finite state machine governing stream records.
//!
//! This crate owns the single source of truth for which status changes a
//! stream may undergo. All status mutation in the workspace goes through
//! `transition()` — no component writes `Stream::status` directly.

pub mod machine;

pub use machine::{allowed, targets, transition};
