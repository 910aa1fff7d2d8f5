//! Scheduled train-check jobs.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ConfigError;
use crate::domain::StationPair;
use crate::service::TrainService;

/// Which way along the configured route a job checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Configured departure station to arrival station.
    Forward,
    /// Arrival station back to departure station.
    Reverse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration for one direction: the station pair it checks and the cron
/// expressions that fire it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationPairJob {
    pub direction: Direction,
    pub pair: StationPair,
    pub schedules: Vec<String>,
}

impl StationPairJob {
    /// Fails when no trigger is given, since the job would never run.
    pub fn new(
        direction: Direction,
        pair: StationPair,
        schedules: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let schedules: Vec<String> = schedules
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if schedules.is_empty() {
            return Err(ConfigError::NoSchedules(direction));
        }
        Ok(Self {
            direction,
            pair,
            schedules,
        })
    }
}

/// Per-job "is running" flag.
///
/// `Idle -> Running` happens through a single compare-and-swap in
/// [`JobSlot::try_start`]; `Running -> Idle` happens when the returned
/// guard is dropped, whether the run succeeded or failed.
#[derive(Debug, Default)]
pub struct JobSlot {
    running: AtomicBool,
}

impl JobSlot {
    /// Claim the slot, or `None` if a run is already in flight.
    pub fn try_start(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { slot: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Marks a [`JobSlot`] as running until dropped.
#[derive(Debug)]
pub struct RunGuard<'a> {
    slot: &'a JobSlot,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.slot.running.store(false, Ordering::Release);
    }
}

/// Result of a single firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The check ran and the outcome was reported.
    Completed,
    /// The check ran and failed; the error was logged.
    Failed,
    /// A previous run of the same job was still in flight.
    Skipped,
}

/// A train check bound to one direction.
///
/// Firings of the same job never overlap; firings of different jobs are
/// independent.
pub struct TrainCheckJob {
    direction: Direction,
    pair: StationPair,
    service: TrainService,
    slot: JobSlot,
}

impl TrainCheckJob {
    pub fn new(direction: Direction, pair: StationPair, service: TrainService) -> Self {
        Self {
            direction,
            pair,
            service,
            slot: JobSlot::default(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pair(&self) -> &StationPair {
        &self.pair
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_running()
    }

    /// Run the check unless this job is already running.
    ///
    /// Errors are logged here and never returned, so a failed check cannot
    /// stop later firings.
    pub async fn fire(&self) -> FireOutcome {
        let Some(_guard) = self.slot.try_start() else {
            tracing::info!(
                job = %self.direction,
                "previous train check still running, skipping this firing"
            );
            return FireOutcome::Skipped;
        };

        tracing::info!(job = %self.direction, pair = %self.pair, "train check started");

        match self
            .service
            .check_and_notify(&self.pair.origin, &self.pair.destination)
            .await
        {
            Ok(_) => {
                tracing::info!(job = %self.direction, "train check finished");
                FireOutcome::Completed
            }
            Err(e) => {
                tracing::error!(job = %self.direction, error = %e, "error checking train status");
                FireOutcome::Failed
            }
        }
    }
}
