//! Cron-based runtime for the recurring laundry task.
//!
//! The first activation is persisted through a [`ScheduleAnchorStore`], so a
//! restart keeps firing on the original time of day instead of pushing the
//! first run out again. The anchor becomes a UTC cron expression; triggers
//! that arrive before the anchor are ignored, and a trigger that finds a run
//! still in flight is dropped.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use launder_core::{LaundryService, ScheduleAnchorStore};
//! use launder_infra::observability::LaundryMetrics;
//! use launder_infra::scheduling::{
//!     LaundryScheduler, LaundrySchedulerConfig, SchedulerResult,
//! };
//!
//! # async fn example(
//! #     service: Arc<LaundryService>,
//! #     anchors: Arc<dyn ScheduleAnchorStore>,
//! # ) -> SchedulerResult<()> {
//! let metrics = Arc::new(LaundryMetrics::new());
//! let mut scheduler =
//!     LaundryScheduler::new(LaundrySchedulerConfig::default(), service, anchors, metrics);
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use launder_core::{
    ensure_anchor, LaundrySchedule, LaundryService, ScheduleAnchorStore, SchedulerTrigger,
};
use launder_domain::constants::{
    DEFAULT_INITIAL_DELAY_SECS, DEFAULT_JOB_TIMEOUT_SECS, LAUNDRY_PROCESS,
};
use launder_domain::{LaunderError, LaundryReport, Recurrence, Result, SchedulerConfig};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::observability::{LaundryMetrics, MetricsResult};
use crate::scheduling::error::{CronStage, SchedulerError, SchedulerResult};

/// Configuration for the laundry scheduler.
#[derive(Debug, Clone)]
pub struct LaundrySchedulerConfig {
    /// Name the schedule anchor is persisted under.
    pub task: String,
    pub recurrence: Recurrence,
    /// Delay between first setup and first activation.
    pub initial_delay: Duration,
    /// Timeout applied to a single laundry run.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for LaundrySchedulerConfig {
    fn default() -> Self {
        Self {
            task: LAUNDRY_PROCESS.to_string(),
            recurrence: Recurrence::default(),
            initial_delay: Duration::from_secs(DEFAULT_INITIAL_DELAY_SECS),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SchedulerConfig> for LaundrySchedulerConfig {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            recurrence: config.recurrence,
            initial_delay: Duration::from_secs(config.initial_delay_seconds),
            job_timeout: Duration::from_secs(config.job_timeout_seconds),
            ..Self::default()
        }
    }
}

/// Laundry scheduler with explicit lifecycle management.
pub struct LaundryScheduler {
    scheduler: Option<Arc<RwLock<JobScheduler>>>,
    config: LaundrySchedulerConfig,
    job_id: Option<Uuid>,
    schedule: Mutex<Option<LaundrySchedule>>,
    run_lock: Arc<Mutex<()>>,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    service: Arc<LaundryService>,
    anchors: Arc<dyn ScheduleAnchorStore>,
    metrics: Arc<LaundryMetrics>,
}

impl LaundryScheduler {
    pub fn new(
        config: LaundrySchedulerConfig,
        service: Arc<LaundryService>,
        anchors: Arc<dyn ScheduleAnchorStore>,
        metrics: Arc<LaundryMetrics>,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            job_id: None,
            schedule: Mutex::new(None),
            run_lock: Arc::new(Mutex::new(())),
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            service,
            anchors,
            metrics,
        }
    }

    pub fn config(&self) -> &LaundrySchedulerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<LaundryMetrics> {
        &self.metrics
    }

    /// Schedule resolved by the last `ensure_scheduled` call, if any.
    pub async fn schedule(&self) -> Option<LaundrySchedule> {
        *self.schedule.lock().await
    }

    /// Start the scheduler, registering the laundry job and spawning the
    /// monitoring task.
    #[instrument(skip(self), fields(task = %self.config.task))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let schedule = self
            .ensure_scheduled()
            .await
            .map_err(SchedulerError::AnchorUnavailable)?;

        let start_timeout = self.config.start_timeout;
        let raw_scheduler = tokio::time::timeout(start_timeout, JobScheduler::new())
            .await
            .map_err(|_| SchedulerError::timeout(CronStage::Create, start_timeout))?
            .map_err(|err| SchedulerError::cron(CronStage::Create, err))?;
        let scheduler = Arc::new(RwLock::new(raw_scheduler));

        let job_id = self.register_laundry_job(&scheduler, schedule).await?;

        let runner = scheduler.clone();
        let start_result = tokio::time::timeout(start_timeout, async move {
            let guard = runner.read().await;
            guard.start().await
        })
        .await
        .map_err(|_| SchedulerError::timeout(CronStage::Start, start_timeout))?;

        start_result.map_err(|err| SchedulerError::cron(CronStage::Start, err))?;

        self.cancellation = CancellationToken::new();
        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel, schedule).await;
        });

        self.scheduler = Some(scheduler);
        self.job_id = Some(job_id);
        self.monitor_handle = Some(handle);
        info!(
            cron = %schedule.cron_expression(),
            next_run = %schedule.next_run_after(Utc::now()),
            "Laundry scheduler started"
        );
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self), fields(task = %self.config.task))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        if let Some(scheduler) = self.scheduler.take() {
            let stop_timeout = self.config.stop_timeout;
            let stop_result = tokio::time::timeout(stop_timeout, async move {
                let mut guard = scheduler.write().await;
                guard.shutdown().await
            })
            .await
            .map_err(|_| SchedulerError::timeout(CronStage::Shutdown, stop_timeout))?;

            stop_result.map_err(|err| SchedulerError::cron(CronStage::Shutdown, err))?;
        }

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::timeout(CronStage::Join, join_timeout))?
                .map_err(|err| SchedulerError::cron(CronStage::Join, err))?;
        }

        self.job_id = None;
        info!("Laundry scheduler stopped");
        Ok(())
    }

    /// Returns true when the monitor task is active.
    pub fn is_running(&self) -> bool {
        self.monitor_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Run one laundry pass now, waiting for any in-flight run to finish.
    pub async fn run_now(&self) -> Result<LaundryReport> {
        let _guard = self.run_lock.lock().await;
        execute_run(&self.service, &self.metrics, self.config.job_timeout).await
    }

    /// Forget the persisted schedule. A running job keeps its registration
    /// until the next `stop`.
    pub async fn unschedule(&self) -> Result<bool> {
        let mut cached = self.schedule.lock().await;
        let removed = self.anchors.clear_anchor(&self.config.task).await?;
        *cached = None;
        if removed {
            info!(task = %self.config.task, "Laundry task unscheduled");
        }
        Ok(removed)
    }

    async fn register_laundry_job(
        &self,
        scheduler: &Arc<RwLock<JobScheduler>>,
        schedule: LaundrySchedule,
    ) -> SchedulerResult<Uuid> {
        let cron_expr = schedule.cron_expression();
        let service = self.service.clone();
        let metrics = self.metrics.clone();
        let run_lock = self.run_lock.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(cron_expr.as_str(), move |_id, _lock| {
            let service = service.clone();
            let metrics = metrics.clone();
            let run_lock = run_lock.clone();

            Box::pin(async move {
                if !schedule.is_active(Utc::now()) {
                    debug!(first_run = %schedule.anchor, "Trigger before first activation");
                    return;
                }

                let Ok(_guard) = run_lock.try_lock() else {
                    log_metric(metrics.record_overlap_skipped(), "scheduler.laundry.overlap");
                    warn!("Previous laundry run still in flight, skipping trigger");
                    return;
                };

                // Failures are logged and counted inside execute_run.
                let _ = execute_run(&service, &metrics, job_timeout).await;
            })
        })
        .map_err(|err| SchedulerError::cron(CronStage::Register, err))?;

        let guard = scheduler.read().await;
        let job_id = guard
            .add(job_definition)
            .await
            .map_err(|err| SchedulerError::cron(CronStage::Register, err))?;

        debug!(cron = %cron_expr, job_id = %job_id, "Registered laundry job");
        Ok(job_id)
    }

    async fn monitor_task(cancel: CancellationToken, schedule: LaundrySchedule) {
        cancel.cancelled().await;
        debug!(
            next_run = %schedule.next_run_after(Utc::now()),
            "Laundry scheduler monitor cancelled"
        );
    }
}

#[async_trait]
impl SchedulerTrigger for LaundryScheduler {
    async fn ensure_scheduled(&self) -> Result<LaundrySchedule> {
        let mut cached = self.schedule.lock().await;
        if let Some(schedule) = *cached {
            return Ok(schedule);
        }

        let initial_delay = chrono::Duration::from_std(self.config.initial_delay)
            .map_err(|err| LaunderError::Scheduler(format!("Invalid initial delay: {err}")))?;
        let (schedule, _created) = ensure_anchor(
            self.anchors.as_ref(),
            &self.config.task,
            Utc::now(),
            initial_delay,
            self.config.recurrence,
        )
        .await?;

        *cached = Some(schedule);
        Ok(schedule)
    }
}

async fn execute_run(
    service: &LaundryService,
    metrics: &LaundryMetrics,
    job_timeout: Duration,
) -> Result<LaundryReport> {
    let started = Instant::now();

    match tokio::time::timeout(job_timeout, service.process_laundry()).await {
        Ok(Ok(report)) => {
            log_metric(metrics.record_run(&report, started.elapsed()), "scheduler.laundry.run");
            info!(
                scanned = report.scanned,
                laundered = report.laundered.len(),
                skipped = report.skipped.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Laundry run finished"
            );
            Ok(report)
        }
        Ok(Err(err)) => {
            log_metric(metrics.record_failure(), "scheduler.laundry.error");
            error!(error = %err, "Laundry run failed");
            Err(err)
        }
        Err(_) => {
            log_metric(metrics.record_timeout(), "scheduler.laundry.timeout");
            warn!(timeout_secs = job_timeout.as_secs(), "Laundry run timed out");
            Err(SchedulerError::timeout(CronStage::Run, job_timeout).into())
        }
    }
}

fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(metric = metric, error = ?err, "Failed to record scheduler metric");
    }
}

impl Drop for LaundryScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("LaundryScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
