//! Application context - dependency injection container

use std::sync::Arc;

use launder_core::{
    DateLaunderer, IntervalCatalog, KnownRangeTracker, LaundrySchedule, LaundryService,
    RequestTokenGuard, SchedulerTrigger, SettingsService,
};
use launder_domain::{Config, LaundryReport, Result};
use launder_infra::{
    Blake3RequestTokenGuard, DbManager, LaundryMetrics, LaundryScheduler, LaundrySchedulerConfig,
    SqliteEventRepository, SqliteScheduleRepository,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub events: Arc<SqliteEventRepository>,
    pub catalog: Arc<IntervalCatalog>,
    pub laundry: Arc<LaundryService>,
    pub settings: Arc<SettingsService>,
    pub metrics: Arc<LaundryMetrics>,
    scheduler: RwLock<LaundryScheduler>,
}

impl AppContext {
    /// Create a new application context with default configuration
    pub async fn new() -> Result<Self> {
        Self::new_with_config(Config::default()).await
    }

    /// Create a new application context with custom configuration
    ///
    /// Opens the database, applies the schema, recomputes the known event
    /// range and wires every service. The scheduler is created but not
    /// started; see [`Self::start_scheduler`].
    pub async fn new_with_config(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let events = Arc::new(SqliteEventRepository::new(db.clone()));
        if let Err(err) = events.rebuild_known_range().await {
            warn!(error = %err, "failed to rebuild known event range");
        }
        let anchors = Arc::new(SqliteScheduleRepository::new(db.clone()));
        let catalog = Arc::new(IntervalCatalog::with_builtin());

        let launderer =
            DateLaunderer::new(catalog.clone()).with_draw_policy(config.laundry.random_draw);
        let laundry = Arc::new(
            LaundryService::new(
                events.clone(),
                events.clone(),
                events.clone(),
                events.clone(),
                launderer,
            )
            .with_default_timezone(config.laundry.default_timezone.clone()),
        );

        let guard: Arc<dyn RequestTokenGuard> = match config.laundry.token_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {
                Arc::new(Blake3RequestTokenGuard::from_secret(secret))
            }
            _ => {
                warn!("no token secret configured; settings tokens will not survive a restart");
                Arc::new(Blake3RequestTokenGuard::random())
            }
        };
        let settings = Arc::new(SettingsService::new(events.clone(), guard, catalog.clone()));

        let metrics = Arc::new(LaundryMetrics::new());
        let scheduler = LaundryScheduler::new(
            LaundrySchedulerConfig::from(&config.scheduler),
            laundry.clone(),
            anchors,
            metrics.clone(),
        );

        info!(
            db_path = %db.path().display(),
            intervals = catalog.len(),
            draw_policy = %config.laundry.random_draw,
            "application context initialised"
        );

        Ok(Self {
            config,
            db,
            events,
            catalog,
            laundry,
            settings,
            metrics,
            scheduler: RwLock::new(scheduler),
        })
    }

    /// Ensure the laundry task is scheduled and start the cron runtime.
    pub async fn start_scheduler(&self) -> Result<LaundrySchedule> {
        let mut scheduler = self.scheduler.write().await;
        let schedule = scheduler.ensure_scheduled().await?;
        if !scheduler.is_running() {
            scheduler.start().await?;
        }
        Ok(schedule)
    }

    pub async fn scheduler_running(&self) -> bool {
        self.scheduler.read().await.is_running()
    }

    /// Run one laundry pass immediately.
    pub async fn run_laundry_now(&self) -> Result<LaundryReport> {
        self.scheduler.read().await.run_now().await
    }

    /// Stop the scheduler if it is running.
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.write().await;
        if scheduler.is_running() {
            scheduler.stop().await?;
        }
        info!(metrics = ?self.metrics.snapshot(), "application context shut down");
        Ok(())
    }
}
