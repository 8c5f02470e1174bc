//! Application context - dependency injection container

use std::sync::Arc;

use leadpipe_core::{
    LeadService, RemoteStore, ResilientExecutor, TelemetryError, TelemetryReporter,
    TelemetryWorker,
};
use leadpipe_domain::{Config, LeadpipeError, Result};
use leadpipe_infra::{config, RestStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::utils::logging::error_label;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub executor: ResilientExecutor,
    pub leads: LeadService,
    pub telemetry: TelemetryReporter,
    worker: Mutex<TelemetryWorker>,
}

impl AppContext {
    /// Load configuration (env, `.env`, config file) and wire the pipeline.
    ///
    /// A missing store endpoint or key aborts startup.
    pub fn from_env() -> Result<Self> {
        let config = config::load().inspect_err(|err| {
            warn!(error = %err, kind = error_label(err), "failed to load configuration");
        })?;
        Self::from_config(config)
    }

    /// Wire the pipeline against the REST store described by `config`.
    ///
    /// Must be called inside a Tokio runtime; the telemetry worker is
    /// spawned here.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let store = RestStore::new(&config.store, config.pipeline.timeout())?;
        Self::with_store(config, Arc::new(store))
    }

    /// Wire the pipeline against an arbitrary store implementation.
    pub fn with_store(config: Config, store: Arc<dyn RemoteStore>) -> Result<Self> {
        let executor = ResilientExecutor::new(&config.pipeline)?;

        let mut worker = TelemetryWorker::new(
            Arc::clone(&store),
            config.store.error_logs_table.clone(),
            config.telemetry.clone(),
        );
        let telemetry = worker.start().map_err(|err| {
            LeadpipeError::Internal(format!("failed to start telemetry worker: {err}"))
        })?;

        let leads = LeadService::new(
            store,
            executor.clone(),
            telemetry.clone(),
            config.store.leads_table.clone(),
        );

        info!(
            leads_table = %config.store.leads_table,
            error_logs_table = %config.store.error_logs_table,
            timeout_ms = config.pipeline.timeout_ms,
            max_attempts = config.pipeline.max_attempts,
            "application context ready"
        );

        Ok(Self { config, executor, leads, telemetry, worker: Mutex::new(worker) })
    }

    /// Stop the telemetry worker after its final flush. Safe to call twice.
    pub async fn shutdown(&self) -> Result<()> {
        info!("shutdown called on AppContext");

        let mut worker = self.worker.lock().await;
        match worker.stop().await {
            Ok(()) | Err(TelemetryError::NotRunning) => Ok(()),
            Err(err) => {
                warn!(error = %err, "telemetry worker did not stop cleanly");
                Err(LeadpipeError::Internal(err.to_string()))
            }
        }
    }

    /// Number of requests waiting in the shared request queue.
    pub fn queued_requests(&self) -> usize {
        self.executor.queue().len()
    }
}
