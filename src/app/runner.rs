use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::error::{HttpError, RunError};
use crate::http::{Executor, HttpExecutor};
use crate::metrics::{Report, ReportAggregator, ReportSummary};
use crate::shutdown::{ShutdownReceiver, ShutdownSender};
use crate::sinks::{OutcomeSink, sink_for};

use super::partition::partition;

/// Lifecycle of a [`LoadCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    /// A fatal transport error stopped the run; no report was produced.
    Aborted,
}

/// Drives a fixed request budget through a pool of concurrent workers and
/// folds every outcome into one shared report.
pub struct LoadCoordinator {
    config: RunConfig,
    executor: Arc<dyn Executor>,
    sink: Arc<dyn OutcomeSink>,
    shutdown_tx: ShutdownSender,
    /// Subscribed at construction so a shutdown sent before `run` is seen.
    pending_rx: ShutdownReceiver,
    state: RunState,
}

struct WorkerContext {
    worker: usize,
    iterations: u64,
    executor: Arc<dyn Executor>,
    aggregator: Arc<ReportAggregator>,
    sink: Arc<dyn OutcomeSink>,
    shutdown_tx: ShutdownSender,
}

#[derive(Debug, Clone, Copy)]
enum WorkerExit {
    Finished,
    Stopped { completed: u64 },
}

impl LoadCoordinator {
    #[must_use]
    pub fn new(
        config: RunConfig,
        executor: Arc<dyn Executor>,
        sink: Arc<dyn OutcomeSink>,
        shutdown_tx: ShutdownSender,
    ) -> Self {
        let pending_rx = shutdown_tx.subscribe();
        Self {
            config,
            executor,
            sink,
            shutdown_tx,
            pending_rx,
            state: RunState::Idle,
        }
    }

    /// Coordinator issuing real HTTP requests, with per-request log lines
    /// when the config is verbose.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn for_http(config: RunConfig, shutdown_tx: ShutdownSender) -> Result<Self, HttpError> {
        let executor: Arc<dyn Executor> = Arc::new(HttpExecutor::new(&config)?);
        let sink = sink_for(config.verbose());
        Ok(Self::new(config, executor, sink, shutdown_tx))
    }

    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs every worker to completion and returns the derived statistics.
    ///
    /// A shutdown signal from outside (Ctrl+C) stops workers before their
    /// next request; the summary then covers what was merged and is marked
    /// `interrupted`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Fatal`] when the target is unreachable (all
    /// workers are stopped and partial statistics are discarded),
    /// [`RunError::Worker`] when a worker task panics, and
    /// [`RunError::AlreadyStarted`] when called more than once.
    pub async fn run(&mut self) -> Result<ReportSummary, RunError> {
        if self.state != RunState::Idle {
            return Err(RunError::AlreadyStarted);
        }

        let aggregator = Arc::new(ReportAggregator::new(Report::new()?));
        let shares = partition(self.config.requests(), self.config.concurrency());
        info!(
            url = %self.config.url(),
            method = %self.config.method(),
            concurrency = self.config.concurrency(),
            requests = self.config.requests(),
            timeout_ms = u64::try_from(self.config.timeout().as_millis()).unwrap_or(u64::MAX),
            "Starting load run"
        );
        debug!(?shares, "Partitioned request budget");

        self.transition(RunState::Running);
        let started = Instant::now();
        // Workers subscribe first; a shutdown that landed before that is
        // replayed so they stop before their first request.
        let receivers: Vec<ShutdownReceiver> =
            shares.iter().map(|_| self.shutdown_tx.subscribe()).collect();
        if shutdown_requested(&mut self.pending_rx) {
            info!("Shutdown requested before workers started");
            drop(self.shutdown_tx.send(()));
        }
        let handles = self.spawn_workers(&shares, receivers, &aggregator);

        let mut fatal: Option<HttpError> = None;
        let mut worker_failure: Option<tokio::task::JoinError> = None;
        let mut interrupted = false;
        for handle in handles {
            match handle.await {
                Ok(Ok(WorkerExit::Finished)) => {}
                Ok(Ok(WorkerExit::Stopped { completed })) => {
                    debug!(completed, "Worker stopped early");
                    interrupted = true;
                }
                Ok(Err(err)) => {
                    if fatal.is_none() {
                        fatal = Some(err);
                    }
                }
                Err(err) => {
                    drop(self.shutdown_tx.send(()));
                    if worker_failure.is_none() {
                        worker_failure = Some(err);
                    }
                }
            }
        }
        let total_time = started.elapsed();

        if let Some(err) = fatal {
            error!("Aborting run: {}", err);
            self.transition(RunState::Aborted);
            return Err(RunError::Fatal(err));
        }
        if let Some(err) = worker_failure {
            self.transition(RunState::Aborted);
            return Err(RunError::Worker { source: err });
        }

        let mut summary = aggregator.summarize(total_time);
        if interrupted {
            warn!(
                issued = summary.total_requests,
                planned = self.config.requests(),
                "Run interrupted; report covers requests merged so far."
            );
            summary.interrupted = true;
        }
        self.transition(RunState::Completed);
        info!(
            total_requests = summary.total_requests,
            elapsed_ms = u64::try_from(total_time.as_millis()).unwrap_or(u64::MAX),
            "Load run completed"
        );
        Ok(summary)
    }

    fn spawn_workers(
        &self,
        shares: &[u64],
        receivers: Vec<ShutdownReceiver>,
        aggregator: &Arc<ReportAggregator>,
    ) -> Vec<JoinHandle<Result<WorkerExit, HttpError>>> {
        shares
            .iter()
            .zip(receivers)
            .enumerate()
            .map(|(worker, (&iterations, shutdown_rx))| {
                let context = WorkerContext {
                    worker,
                    iterations,
                    executor: Arc::clone(&self.executor),
                    aggregator: Arc::clone(aggregator),
                    sink: Arc::clone(&self.sink),
                    shutdown_tx: self.shutdown_tx.clone(),
                };
                tokio::spawn(run_worker(context, shutdown_rx))
            })
            .collect()
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Run state change");
        self.state = next;
    }
}

async fn run_worker(
    context: WorkerContext,
    mut shutdown_rx: ShutdownReceiver,
) -> Result<WorkerExit, HttpError> {
    let mut completed: u64 = 0;
    while completed < context.iterations {
        if shutdown_requested(&mut shutdown_rx) {
            return Ok(WorkerExit::Stopped { completed });
        }

        // The report lock is not held here; only the merge below takes it.
        let result = tokio::select! {
            biased;
            _ = shutdown_rx.recv() => return Ok(WorkerExit::Stopped { completed }),
            result = context.executor.execute() => result,
        };

        match result {
            Ok(outcome) => {
                context.aggregator.merge(&outcome);
                context.sink.on_outcome(context.worker, &outcome);
                completed = completed.saturating_add(1);
            }
            Err(err) => {
                error!(worker = context.worker, "Fatal transport error: {}", err);
                drop(context.shutdown_tx.send(()));
                return Err(err);
            }
        }
    }
    Ok(WorkerExit::Finished)
}

fn shutdown_requested(shutdown_rx: &mut ShutdownReceiver) -> bool {
    !matches!(shutdown_rx.try_recv(), Err(TryRecvError::Empty))
}
