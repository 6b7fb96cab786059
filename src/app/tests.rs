use super::summary::format_duration;
use super::*;
use crate::args::TimeUnit;
use crate::config::RunConfig;
use crate::error::{ConfigError, HttpError, RunError};
use crate::http::Executor;
use crate::metrics::{FailureKind, Percentage, RequestOutcome};
use crate::sinks::{NullSink, OutcomeSink};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

/// Replays a fixed outcome on every call, optionally failing fatally on the
/// n-th call and sleeping before each answer.
struct ScriptedExecutor {
    outcome: RequestOutcome,
    delay: Duration,
    fatal_on_call: Option<u64>,
    calls: AtomicU64,
}

impl ScriptedExecutor {
    fn new(outcome: RequestOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            fatal_on_call: None,
            calls: AtomicU64::new(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_fatal_on_call(mut self, call: u64) -> Self {
        self.fatal_on_call = Some(call);
        self
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn execute(&self) -> Result<RequestOutcome, HttpError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fatal_on_call == Some(call) {
            return Err(HttpError::Unreachable {
                url: "http://127.0.0.1:1/".to_owned(),
                source: "connection refused".into(),
            });
        }
        Ok(self.outcome)
    }
}

#[derive(Default)]
struct CountingSink {
    seen: AtomicU64,
}

impl OutcomeSink for CountingSink {
    fn on_outcome(&self, _worker: usize, _outcome: &RequestOutcome) {
        self.seen.fetch_add(1, Ordering::SeqCst);
    }
}

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn config(concurrency: usize, requests: u64) -> Result<RunConfig, String> {
    RunConfig::new(
        "http://localhost:8080/",
        "GET",
        concurrency,
        requests,
        Duration::from_secs(1),
    )
    .map_err(|err| err.to_string())
}

fn ok_outcome() -> RequestOutcome {
    RequestOutcome::Success {
        status: 200,
        latency: Duration::from_millis(2),
    }
}

fn coordinator(
    run_config: RunConfig,
    executor: &Arc<ScriptedExecutor>,
) -> (LoadCoordinator, broadcast::Sender<()>) {
    let (shutdown_tx, _) = broadcast::channel(1);
    let executor: Arc<dyn Executor> = executor.clone();
    let coordinator = LoadCoordinator::new(
        run_config,
        executor,
        Arc::new(NullSink),
        shutdown_tx.clone(),
    );
    (coordinator, shutdown_tx)
}

#[test]
fn partition_distributes_remainder() -> Result<(), String> {
    let cases: [(u64, usize, &[u64]); 5] = [
        (10, 3, &[4, 3, 3]),
        (9, 3, &[3, 3, 3]),
        (2, 5, &[1, 1, 0, 0, 0]),
        (1, 1, &[1]),
        (7, 4, &[2, 2, 2, 1]),
    ];
    for (requests, concurrency, expected) in cases {
        let shares = partition(requests, concurrency);
        if shares != expected {
            return Err(format!(
                "partition({}, {}) = {:?}",
                requests, concurrency, shares
            ));
        }
    }
    Ok(())
}

#[test]
fn partition_always_sums_to_requests() -> Result<(), String> {
    for requests in 1..=40_u64 {
        for concurrency in 1..=12_usize {
            let shares = partition(requests, concurrency);
            if shares.len() != concurrency {
                return Err(format!("Expected {} shares", concurrency));
            }
            if shares.iter().sum::<u64>() != requests {
                return Err(format!(
                    "partition({}, {}) lost requests: {:?}",
                    requests, concurrency, shares
                ));
            }
            let max = shares.iter().max().copied().unwrap_or(0);
            let min = shares.iter().min().copied().unwrap_or(0);
            if max.saturating_sub(min) > 1 {
                return Err(format!("Uneven shares: {:?}", shares));
            }
        }
    }
    Ok(())
}

#[test]
fn uneven_budget_issues_every_request() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(ScriptedExecutor::new(ok_outcome()));
        let (mut coordinator, _shutdown_tx) = coordinator(config(3, 10)?, &executor);

        let summary = coordinator.run().await.map_err(|err| err.to_string())?;
        if summary.total_requests != 10 || executor.calls() != 10 {
            return Err(format!(
                "Expected 10 requests, got total={} calls={}",
                summary.total_requests,
                executor.calls()
            ));
        }
        if summary.succeeded.saturating_add(summary.failed) != summary.total_requests {
            return Err("succeeded + failed must equal total".to_owned());
        }
        if summary.percentage_succeeded != Percentage::FULL {
            return Err(format!("Unexpected success %: {}", summary.percentage_succeeded));
        }
        Ok(())
    })
}

#[test]
fn more_workers_than_requests() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(ScriptedExecutor::new(ok_outcome()));
        let (mut coordinator, _shutdown_tx) = coordinator(config(5, 2)?, &executor);

        let summary = coordinator.run().await.map_err(|err| err.to_string())?;
        if summary.total_requests != 2 || executor.calls() != 2 {
            return Err(format!("Unexpected total: {}", summary.total_requests));
        }
        Ok(())
    })
}

#[test]
fn not_found_target_fails_every_request() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(ScriptedExecutor::new(RequestOutcome::Failure {
            kind: FailureKind::NonOkStatus { status: 404 },
            latency: Duration::from_millis(1),
        }));
        let (mut coordinator, _shutdown_tx) = coordinator(config(1, 5)?, &executor);

        let summary = coordinator.run().await.map_err(|err| err.to_string())?;
        if summary.succeeded != 0 || summary.failed != 5 {
            return Err(format!("Unexpected counts: {:?}", summary));
        }
        if summary.status_counts.get(&404) != Some(&5) {
            return Err(format!("Unexpected status counts: {:?}", summary.status_counts));
        }
        if summary.percentage_failed != Percentage::FULL {
            return Err(format!("Unexpected failed %: {}", summary.percentage_failed));
        }
        Ok(())
    })
}

#[test]
fn timeouts_are_counted() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(ScriptedExecutor::new(RequestOutcome::Failure {
            kind: FailureKind::Timeout,
            latency: Duration::from_secs(1),
        }));
        let (mut coordinator, _shutdown_tx) = coordinator(config(2, 6)?, &executor);

        let summary = coordinator.run().await.map_err(|err| err.to_string())?;
        if summary.timed_out != summary.total_requests || summary.total_requests != 6 {
            return Err(format!("Unexpected counts: {:?}", summary));
        }
        if summary.percentage_timed_out != Percentage::FULL {
            return Err("Expected 100% timed out".to_owned());
        }
        Ok(())
    })
}

#[test]
fn state_moves_from_idle_to_completed() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(ScriptedExecutor::new(ok_outcome()));
        let (mut coordinator, _shutdown_tx) = coordinator(config(2, 4)?, &executor);
        if coordinator.state() != RunState::Idle {
            return Err("Expected Idle before run".to_owned());
        }

        coordinator.run().await.map_err(|err| err.to_string())?;
        if coordinator.state() != RunState::Completed {
            return Err(format!("Expected Completed, got {:?}", coordinator.state()));
        }

        match coordinator.run().await {
            Err(RunError::AlreadyStarted) => Ok(()),
            other => Err(format!("Expected AlreadyStarted, got {:?}", other.map(|_| ()))),
        }
    })
}

#[test]
fn fatal_error_aborts_all_workers() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(
            ScriptedExecutor::new(ok_outcome())
                .with_delay(Duration::from_millis(5))
                .with_fatal_on_call(3),
        );
        let (mut coordinator, _shutdown_tx) = coordinator(config(4, 10_000)?, &executor);

        match coordinator.run().await {
            Err(RunError::Fatal(HttpError::Unreachable { .. })) => {}
            other => return Err(format!("Expected fatal error, got {:?}", other.map(|_| ()))),
        }
        if coordinator.state() != RunState::Aborted {
            return Err(format!("Expected Aborted, got {:?}", coordinator.state()));
        }
        // Each worker may have one request in flight when the signal lands.
        if executor.calls() > 20 {
            return Err(format!("Workers kept going: {} calls", executor.calls()));
        }
        Ok(())
    })
}

#[test]
fn external_shutdown_reports_partial_run() -> Result<(), String> {
    run_async_test(async {
        let executor =
            Arc::new(ScriptedExecutor::new(ok_outcome()).with_delay(Duration::from_millis(20)));
        let (mut coordinator, shutdown_tx) = coordinator(config(2, 1_000)?, &executor);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            drop(shutdown_tx.send(()));
        });

        let summary = coordinator.run().await.map_err(|err| err.to_string())?;
        if !summary.interrupted {
            return Err("Expected interrupted summary".to_owned());
        }
        if summary.total_requests >= 1_000 {
            return Err(format!("Run was not stopped: {}", summary.total_requests));
        }
        if summary.succeeded != summary.total_requests {
            return Err("Partial counters must stay consistent".to_owned());
        }
        Ok(())
    })
}

#[test]
fn shutdown_before_run_stops_every_worker() -> Result<(), String> {
    run_async_test(async {
        let executor =
            Arc::new(ScriptedExecutor::new(ok_outcome()).with_delay(Duration::from_millis(5)));
        let (mut coordinator, shutdown_tx) = coordinator(config(2, 200)?, &executor);

        // Another subscriber drains its copy, as the signal handler's would.
        let mut other_rx = shutdown_tx.subscribe();
        shutdown_tx
            .send(())
            .map_err(|err| format!("Failed to send shutdown: {}", err))?;
        other_rx
            .recv()
            .await
            .map_err(|err| format!("Subscriber missed shutdown: {}", err))?;

        let summary = coordinator.run().await.map_err(|err| err.to_string())?;
        if !summary.interrupted {
            return Err("Expected interrupted summary".to_owned());
        }
        if summary.total_requests != 0 || executor.calls() != 0 {
            return Err(format!(
                "Workers ran after shutdown: total={} calls={}",
                summary.total_requests,
                executor.calls()
            ));
        }
        Ok(())
    })
}

#[test]
fn sink_sees_every_merged_outcome() -> Result<(), String> {
    run_async_test(async {
        let executor: Arc<dyn Executor> = Arc::new(ScriptedExecutor::new(ok_outcome()));
        let sink = Arc::new(CountingSink::default());
        let sink_dyn: Arc<dyn OutcomeSink> = sink.clone();
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut coordinator = LoadCoordinator::new(config(3, 25)?, executor, sink_dyn, shutdown_tx);

        let summary = coordinator.run().await.map_err(|err| err.to_string())?;
        let seen = sink.seen.load(Ordering::SeqCst);
        if seen != summary.total_requests || seen != 25 {
            return Err(format!("Sink saw {} of {}", seen, summary.total_requests));
        }
        Ok(())
    })
}

#[test]
fn zero_counts_fail_before_any_request() -> Result<(), String> {
    for (concurrency, requests) in [(0_usize, 10_u64), (2, 0)] {
        match RunConfig::new(
            "http://localhost",
            "GET",
            concurrency,
            requests,
            Duration::from_secs(1),
        ) {
            Err(ConfigError::ZeroConcurrency | ConfigError::ZeroRequests) => {}
            Err(other) => return Err(format!("Unexpected error: {}", other)),
            Ok(_) => {
                return Err(format!(
                    "Expected concurrency={} requests={} to be rejected",
                    concurrency, requests
                ));
            }
        }
    }
    Ok(())
}

#[test]
fn text_report_lists_status_codes() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(ScriptedExecutor::new(RequestOutcome::Failure {
            kind: FailureKind::NonOkStatus { status: 404 },
            latency: Duration::from_micros(1_500),
        }));
        let run_config = config(1, 5)?;
        let (mut coordinator, _shutdown_tx) = coordinator(run_config.clone(), &executor);
        let summary = coordinator.run().await.map_err(|err| err.to_string())?;

        let lines = summary_lines(&run_config, &summary, TimeUnit::Ms);
        for expected in [
            "Requests: 5",
            "Succeeded: 0 (0.00%)",
            "Failed: 5 (100.00%)",
            "Timed Out: 0 (0.00%)",
            "Fastest: 1.500ms",
            "Average: 1.500ms",
            "Status 404: 5",
        ] {
            if !lines.iter().any(|line| line == expected) {
                return Err(format!("Missing '{}' in {:?}", expected, lines));
            }
        }

        let json = render_json(&run_config, &summary).map_err(|err| err.to_string())?;
        let value: serde_json::Value = serde_json::from_str(&json).map_err(|err| err.to_string())?;
        if value.get("url").and_then(serde_json::Value::as_str) != Some("http://localhost:8080/") {
            return Err(format!("Unexpected url in {}", json));
        }
        let not_found = value
            .get("status_counts")
            .and_then(|counts| counts.get("404"))
            .and_then(serde_json::Value::as_u64);
        if not_found != Some(5) {
            return Err(format!("Unexpected status counts in {}", json));
        }
        Ok(())
    })
}

#[test]
fn empty_statistics_render_as_undefined() -> Result<(), String> {
    let report = crate::metrics::Report::new().map_err(|err| err.to_string())?;
    let summary = report.summarize(Duration::ZERO);
    let lines = summary_lines(&config(1, 1)?, &summary, TimeUnit::S);
    if !lines.iter().any(|line| line == "Average: n/a") {
        return Err(format!("Expected undefined average in {:?}", lines));
    }
    if !lines.iter().any(|line| line == "Succeeded: 0 (0.00%)") {
        return Err(format!("Expected zero percentage in {:?}", lines));
    }
    Ok(())
}

#[test]
fn durations_render_in_both_units() -> Result<(), String> {
    let cases = [
        (Duration::from_millis(1_234), TimeUnit::S, "1.234s"),
        (Duration::from_millis(1_234), TimeUnit::Ms, "1234.000ms"),
        (Duration::from_micros(2_345), TimeUnit::Ms, "2.345ms"),
        (Duration::from_micros(2_345), TimeUnit::S, "0.002s"),
    ];
    for (value, unit, expected) in cases {
        let rendered = format_duration(value, unit);
        if rendered != expected {
            return Err(format!("{:?} rendered as {}", value, rendered));
        }
    }
    Ok(())
}
