use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::{JoinError, JoinHandle};

use super::error::ServiceError;
use super::types::{ServiceOptions, ServiceState, ServiceStatus};
use crate::pipeline::{ProcessTrackUseCase, ProcessingMetrics};

#[derive(Debug)]
struct Shared {
    status: ServiceStatus,
}

struct LoopExit {
    use_case: ProcessTrackUseCase,
    result: Result<(), ServiceError>,
}

struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<LoopExit>,
}

/// Drives a `ProcessTrackUseCase` in a loop on a blocking worker thread.
///
/// `Idle → Running → Stopping → Idle`. Per-message failures are logged and
/// counted; only an unrecoverable transport error ends the loop on its own.
pub struct CalculatorService {
    options: ServiceOptions,
    shared: Arc<StdMutex<Shared>>,
    use_case: Option<ProcessTrackUseCase>,
    worker: Option<WorkerHandle>,
}

fn lock(shared: &StdMutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CalculatorService {
    pub fn new(use_case: ProcessTrackUseCase, options: ServiceOptions) -> Self {
        Self {
            options,
            shared: Arc::new(StdMutex::new(Shared {
                status: ServiceStatus {
                    state: ServiceState::Idle,
                    metrics: use_case.metrics(),
                    last_error: None,
                },
            })),
            use_case: Some(use_case),
            worker: None,
        }
    }

    pub fn status(&self) -> ServiceStatus {
        lock(&self.shared).status.clone()
    }

    pub fn state(&self) -> ServiceState {
        lock(&self.shared).status.state.clone()
    }

    pub fn metrics(&self) -> ProcessingMetrics {
        lock(&self.shared).status.metrics.clone()
    }

    /// Start the processing loop and return immediately.
    ///
    /// A worker that already ended on a fatal error is collected first; its
    /// error stays visible in `status().last_error` until another failure
    /// replaces it.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        if let Some(worker) = &self.worker {
            if !worker.join.is_finished() {
                return Err(ServiceError::AlreadyRunning);
            }
        }
        if self.worker.is_some() {
            if let Err(e) = self.wait().await {
                log::warn!("Collected failed processing worker: {}", e);
            }
        }

        let use_case = self.use_case.take().ok_or(ServiceError::NotIdle)?;
        let shared = self.shared.clone();
        let options = self.options;
        let (stop_tx, stop_rx) = oneshot::channel();

        {
            let mut locked = lock(&self.shared);
            locked.status.state = ServiceState::Running {
                started_at: Utc::now(),
            };
        }

        let join = tokio::task::spawn_blocking(move || {
            run_processing_loop(use_case, shared, options, stop_rx)
        });
        self.worker = Some(WorkerHandle { stop_tx, join });

        log::info!("Calculator service started");
        Ok(())
    }

    /// Request a graceful stop and wait for the in-flight cycle to finish.
    ///
    /// Returns the loop's result, so a fatal error that already ended the
    /// loop surfaces here.
    pub async fn stop(&mut self) -> Result<(), ServiceError> {
        let worker = self.worker.take().ok_or(ServiceError::NotRunning)?;
        {
            let mut locked = lock(&self.shared);
            if matches!(locked.status.state, ServiceState::Running { .. }) {
                locked.status.state = ServiceState::Stopping;
            }
        }
        let _ = worker.stop_tx.send(());
        let result = self.collect(worker.join.await);
        log::info!("Calculator service stopped");
        result
    }

    /// Wait for the loop to end without asking it to. Only a fatal error
    /// ends it, so this resolves with that error.
    pub async fn wait(&mut self) -> Result<(), ServiceError> {
        let worker = self.worker.as_mut().ok_or(ServiceError::NotRunning)?;
        let joined = (&mut worker.join).await;
        self.worker = None;
        self.collect(joined)
    }

    /// Zero the metrics. Only allowed while idle.
    pub fn reset_metrics(&mut self) -> Result<(), ServiceError> {
        if self.worker.is_some() {
            return Err(ServiceError::NotIdle);
        }
        let use_case = self.use_case.as_mut().ok_or(ServiceError::NotIdle)?;
        use_case.reset_metrics();
        lock(&self.shared).status.metrics = use_case.metrics();
        Ok(())
    }

    fn collect(&mut self, joined: Result<LoopExit, JoinError>) -> Result<(), ServiceError> {
        let mut locked = lock(&self.shared);
        locked.status.state = ServiceState::Idle;
        match joined {
            Ok(exit) => {
                locked.status.metrics = exit.use_case.metrics();
                self.use_case = Some(exit.use_case);
                exit.result
            }
            Err(e) => {
                let err = ServiceError::WorkerPanicked(e.to_string());
                locked.status.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

fn run_processing_loop(
    mut use_case: ProcessTrackUseCase,
    shared: Arc<StdMutex<Shared>>,
    options: ServiceOptions,
    mut stop_rx: oneshot::Receiver<()>,
) -> LoopExit {
    let mut last_report = Instant::now();

    let result = loop {
        match stop_rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            Ok(()) | Err(TryRecvError::Closed) => break Ok(()),
        }

        if let Err(e) = use_case.process_one() {
            if e.is_fatal() {
                log::error!("Stopping calculator service: {}", e);
                break Err(ServiceError::Fatal(e));
            }
            log::warn!("Track processing failed: {}", e);
        }

        let metrics = use_case.metrics();
        if stats_due(options.stats_interval, last_report.elapsed()) {
            log::info!("Processing stats: {}", metrics);
            last_report = Instant::now();
        }
        lock(&shared).status.metrics = metrics;
    };

    {
        let mut locked = lock(&shared);
        locked.status.metrics = use_case.metrics();
        if let Err(e) = &result {
            locked.status.state = ServiceState::Idle;
            locked.status.last_error = Some(e.to_string());
        }
    }

    LoopExit { use_case, result }
}

/// A zero interval disables the periodic stats line.
fn stats_due(interval: Duration, elapsed: Duration) -> bool {
    !interval.is_zero() && elapsed >= interval
}
