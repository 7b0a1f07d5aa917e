//! Periodic refresh driver for the airmon dashboard.
//!
//! Three independently-cadenced tasks (current status, history,
//! statistics) poll an abstract [`DataSource`] and serialize their results
//! into a shared [`state::DashboardState`]. A slow or failing stream never
//! delays the others, a failed poll marks its stream stale instead of
//! propagating, and stopping the scheduler guarantees no further
//! data-source calls.

pub mod scheduler;
pub mod source;
pub mod state;


pub use scheduler::{PollConfig, PollScheduler, SchedulerHandle};
pub use source::DataSource;
pub use state::{DashboardState, Stream, StreamHealth};
