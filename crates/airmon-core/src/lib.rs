//! Pure status-evaluation core for the airmon dashboard.
//!
//! Three pieces, all synchronous and I/O-free:
//!
//! - [`rules`]: per-metric threshold rules and the severity classifier
//! - [`aggregate`]: combines per-metric severities into a status snapshot
//! - [`buffer`]: a bounded, time-ordered window of readings for charting
//!
//! The polling layer feeds readings in; renderers read snapshots out.
//! Nothing here touches a clock except through explicit parameters, so
//! every behavior is testable without waiting on real time.

pub mod aggregate;
pub mod buffer;
pub mod error;
pub mod rules;


pub use aggregate::aggregate;
pub use buffer::SeriesBuffer;
pub use rules::{Ruleset, ThresholdRule};
