//! Scheduler implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ScheduleConfig;
use crate::ingest::{IngestRunner, RunOptions, RunReport};

use super::types::{SchedulerError, SchedulerStatus};

/// Delay before the next run: uniform in `[min, max)` seconds.
pub fn jittered_delay(config: &ScheduleConfig) -> Duration {
    let min = config.min_interval_secs as f64;
    let max = (config.max_interval_secs as f64).max(min);
    let secs = min + rand::rng().random::<f64>() * (max - min);
    Duration::from_secs_f64(secs)
}

#[derive(Debug, Default)]
struct History {
    runs_completed: u64,
    runs_failed: u64,
    last_finished_at: Option<chrono::DateTime<Utc>>,
    last_error: Option<String>,
}

/// Re-runs an [`IngestRunner`] in the background with randomized delays.
///
/// The first run starts as soon as the scheduler is started.
pub struct Scheduler {
    runner: Arc<IngestRunner>,
    config: ScheduleConfig,
    options: RunOptions,

    // Runtime state
    run_lock: Arc<Mutex<()>>,
    history: Arc<RwLock<History>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    loop_handle: StdMutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(runner: Arc<IngestRunner>, config: ScheduleConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            runner,
            config,
            options: RunOptions::default(),
            run_lock: Arc::new(Mutex::new(())),
            history: Arc::new(RwLock::new(History::default())),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            loop_handle: StdMutex::new(None),
        }
    }

    /// Options applied to every run started by this scheduler.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the background loop.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Scheduler already running");
            return;
        }

        info!(
            min_interval_secs = self.config.min_interval_secs,
            max_interval_secs = self.config.max_interval_secs,
            "Starting scheduler"
        );
        let handle = self.spawn_loop();
        *self.loop_handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Stop the loop. Returns once the loop has exited and any run in flight
    /// has finished; no scheduled run starts after this returns.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Scheduler not running");
            return;
        }

        info!("Stopping scheduler");
        let _ = self.shutdown_tx.send(());

        let handle = self
            .loop_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Ingestion loop ended abnormally: {}", e);
            }
        }

        // A run started through run_now may still hold the lock
        let _guard = self.run_lock.lock().await;
        info!("Scheduler stopped");
    }

    /// Run immediately, unless a run is already in progress.
    pub async fn run_now(&self) -> Result<RunReport, SchedulerError> {
        Self::run_locked(&self.runner, &self.run_lock, &self.history, self.options).await
    }

    pub async fn status(&self) -> SchedulerStatus {
        let history = self.history.read().await;
        SchedulerStatus {
            running: self.is_running(),
            run_in_progress: self.run_lock.try_lock().is_err(),
            runs_completed: history.runs_completed,
            runs_failed: history.runs_failed,
            last_finished_at: history.last_finished_at,
            last_error: history.last_error.clone(),
        }
    }

    fn spawn_loop(&self) -> JoinHandle<()> {
        let running = Arc::clone(&self.running);
        let runner = Arc::clone(&self.runner);
        let run_lock = Arc::clone(&self.run_lock);
        let history = Arc::clone(&self.history);
        let config = self.config.clone();
        let options = self.options;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Ingestion loop started");
            let mut delay = Duration::ZERO;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Ingestion loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        match Self::run_locked(&runner, &run_lock, &history, options).await {
                            Ok(_) => {}
                            Err(SchedulerError::RunInProgress) => {
                                debug!("Run already in progress, skipping this tick");
                            }
                            Err(e) => warn!("Scheduled run failed: {}", e),
                        }
                    }
                }

                delay = jittered_delay(&config);
                info!(delay_secs = delay.as_secs(), "Next run scheduled");
            }
            info!("Ingestion loop stopped");
        })
    }

    /// Run once under the run lock, recording the outcome.
    ///
    /// The run executes in its own task so a panic is contained; the dedup
    /// session persists without pruning as it unwinds.
    async fn run_locked(
        runner: &Arc<IngestRunner>,
        run_lock: &Mutex<()>,
        history: &RwLock<History>,
        options: RunOptions,
    ) -> Result<RunReport, SchedulerError> {
        let _guard = run_lock
            .try_lock()
            .map_err(|_| SchedulerError::RunInProgress)?;

        let runner = Arc::clone(runner);
        let result = match tokio::spawn(async move { runner.run(options).await }).await {
            Ok(result) => result.map_err(SchedulerError::from),
            Err(e) => {
                error!("Ingestion run crashed: {}", e);
                Err(SchedulerError::Crashed(e.to_string()))
            }
        };

        let mut history = history.write().await;
        history.last_finished_at = Some(Utc::now());
        match &result {
            Ok(_) => {
                history.runs_completed += 1;
                history.last_error = None;
            }
            Err(e) => {
                history.runs_failed += 1;
                history.last_error = Some(e.to_string());
            }
        }

        result
    }
}
