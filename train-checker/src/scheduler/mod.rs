//! Cron scheduling of the forward and reverse train checks.
//!
//! Each direction is a [`TrainCheckJob`] with its own [`JobSlot`], so a
//! trigger that fires while the same direction is still running is skipped
//! rather than queued. The two directions never block each other.

mod job;
mod runner;

pub use job::{Direction, FireOutcome, JobSlot, RunGuard, StationPairJob, TrainCheckJob};
pub use runner::{SchedulerError, TrainCheckScheduler};
