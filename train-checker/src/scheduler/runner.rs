//! Cron-driven scheduler for train-check jobs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::service::TrainService;

use super::job::{Direction, StationPairJob, TrainCheckJob};

/// How often shutdown re-checks for in-flight runs.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors from building or stopping the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A cron expression could not be parsed.
    #[error("invalid {direction} trigger {expression:?}: {source}")]
    InvalidTrigger {
        direction: Direction,
        expression: String,
        #[source]
        source: JobSchedulerError,
    },

    /// The underlying scheduler failed.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

/// Count of firings spawned but not yet finished.
///
/// A firing is counted from before its task is spawned, so shutdown also
/// waits for tasks that have not yet claimed their job slot.
#[derive(Debug, Default, Clone)]
struct Firings(Arc<AtomicUsize>);

impl Firings {
    fn start(&self) -> FiringGuard {
        self.0.fetch_add(1, Ordering::AcqRel);
        FiringGuard(self.0.clone())
    }

    fn in_flight(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

struct FiringGuard(Arc<AtomicUsize>);

impl Drop for FiringGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Running scheduler for the forward and reverse checks.
///
/// Cron expressions are evaluated in the server's local time zone, the
/// same zone used for the departure lookup time. Every firing runs on a
/// separate tokio task so a slow API call never delays other triggers.
pub struct TrainCheckScheduler {
    inner: JobScheduler,
    jobs: Vec<Arc<TrainCheckJob>>,
    firings: Firings,
}

impl TrainCheckScheduler {
    /// Register every job's triggers and start firing them.
    ///
    /// Fails before anything runs if any trigger expression is invalid.
    pub async fn start(
        service: TrainService,
        registrations: Vec<StationPairJob>,
    ) -> Result<Self, SchedulerError> {
        let inner = JobScheduler::new().await?;
        let firings = Firings::default();
        let mut jobs = Vec::with_capacity(registrations.len());

        for registration in registrations {
            let job = Arc::new(TrainCheckJob::new(
                registration.direction,
                registration.pair.clone(),
                service.clone(),
            ));

            for expression in &registration.schedules {
                let cron_job = cron_job(expression, job.clone(), firings.clone()).map_err(|source| {
                    SchedulerError::InvalidTrigger {
                        direction: registration.direction,
                        expression: expression.clone(),
                        source,
                    }
                })?;
                inner.add(cron_job).await?;
            }

            tracing::info!(
                job = %registration.direction,
                pair = %registration.pair,
                triggers = ?registration.schedules,
                "registered train check"
            );
            jobs.push(job);
        }

        inner.start().await?;
        tracing::info!(jobs = jobs.len(), "scheduler started");

        Ok(Self {
            inner,
            jobs,
            firings,
        })
    }

    pub fn jobs(&self) -> &[Arc<TrainCheckJob>] {
        &self.jobs
    }

    /// Stop firing and wait up to `grace` for in-flight checks.
    ///
    /// Returns `false` if some check was still running when the grace period
    /// ran out; that check is abandoned.
    pub async fn shutdown(mut self, grace: Duration) -> Result<bool, SchedulerError> {
        self.inner.shutdown().await?;

        let jobs = self.jobs;
        let firings = self.firings;
        let drained = tokio::time::timeout(grace, async {
            while firings.in_flight() > 0 {
                tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
            }
        })
        .await
        .is_ok();

        if drained {
            tracing::info!("scheduler stopped");
        } else {
            let busy: Vec<_> = jobs
                .iter()
                .filter(|job| job.is_running())
                .map(|job| job.direction())
                .collect();
            tracing::warn!(
                jobs = ?busy,
                in_flight = firings.in_flight(),
                "abandoning train checks still running at shutdown"
            );
        }
        Ok(drained)
    }
}

/// Wrap a train-check job in a cron trigger on local time.
fn cron_job(
    expression: &str,
    job: Arc<TrainCheckJob>,
    firings: Firings,
) -> Result<Job, JobSchedulerError> {
    Job::new_async_tz(expression, Local, move |_id, _scheduler| {
        let job = job.clone();
        let firing = firings.start();
        Box::pin(async move {
            tokio::spawn(async move {
                let _firing = firing;
                job.fire().await;
            });
        })
    })
}
