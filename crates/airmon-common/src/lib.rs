//! Shared domain types for the airmon dashboard core.
//!
//! Everything here is transport-agnostic: the types mirror what the
//! sensor backend reports (readings, severity levels, statistics) without
//! depending on any HTTP or runtime machinery.

pub mod error;
pub mod types;
