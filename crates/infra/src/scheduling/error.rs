//! Laundry scheduler errors

use std::fmt;

use launder_domain::LaunderError;
use thiserror::Error;

use crate::errors::InfraError;

/// Step of the cron runtime lifecycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronStage {
    Create,
    Register,
    Start,
    Shutdown,
    /// Waiting for the monitor task to exit
    Join,
    /// One laundry pass
    Run,
}

impl fmt::Display for CronStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Register => "register job",
            Self::Start => "start",
            Self::Shutdown => "shut down",
            Self::Join => "join monitor",
            Self::Run => "run laundry",
        })
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("laundry scheduler already running")]
    AlreadyRunning,

    #[error("laundry scheduler not running")]
    NotRunning,

    /// The persisted anchor could not be loaded or created
    #[error("laundry schedule unavailable: {0}")]
    AnchorUnavailable(#[source] LaunderError),

    #[error("cron runtime failed to {stage}: {reason}")]
    Cron { stage: CronStage, reason: String },

    #[error("cron runtime timed out trying to {stage} after {seconds}s")]
    Timeout { stage: CronStage, seconds: u64 },
}

impl SchedulerError {
    pub(crate) fn cron(stage: CronStage, err: impl fmt::Display) -> Self {
        Self::Cron { stage, reason: err.to_string() }
    }

    pub(crate) fn timeout(stage: CronStage, limit: std::time::Duration) -> Self {
        Self::Timeout { stage, seconds: limit.as_secs() }
    }
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let launder_err = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                LaunderError::InvalidInput(err.to_string())
            }
            SchedulerError::AnchorUnavailable(inner) => inner,
            SchedulerError::Cron { stage: CronStage::Join, .. } => {
                LaunderError::Internal(err.to_string())
            }
            SchedulerError::Cron { .. } | SchedulerError::Timeout { .. } => {
                LaunderError::Scheduler(err.to_string())
            }
        };
        InfraError(launder_err)
    }
}

impl From<SchedulerError> for LaunderError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn lifecycle_errors_map_to_invalid_input() {
        let err: LaunderError = SchedulerError::AlreadyRunning.into();
        assert!(matches!(err, LaunderError::InvalidInput(_)));
    }

    #[test]
    fn run_timeout_names_the_stage() {
        let err: LaunderError =
            SchedulerError::timeout(CronStage::Run, Duration::from_secs(5)).into();
        assert_eq!(
            err,
            LaunderError::Scheduler("cron runtime timed out trying to run laundry after 5s".into())
        );
    }

    #[test]
    fn anchor_failures_keep_the_store_error() {
        let store_err = LaunderError::Database("disk I/O error".into());
        let err: LaunderError = SchedulerError::AnchorUnavailable(store_err.clone()).into();
        assert_eq!(err, store_err);
    }

    #[test]
    fn monitor_join_failures_are_internal() {
        let err: LaunderError = SchedulerError::cron(CronStage::Join, "task panicked").into();
        assert!(matches!(err, LaunderError::Internal(_)));
    }
}
