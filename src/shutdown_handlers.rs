use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::shutdown::{ShutdownReceiver, ShutdownSender};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// One signal fans out to every worker.
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Forwards every Ctrl+C (and SIGTERM on unix) to the shutdown channel.
///
/// The task runs until it is aborted, so repeated signals are all
/// forwarded for as long as the run lasts.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut signals = TerminationSignals::register();
        while let Some(name) = signals.next().await {
            info!(signal = name, "Stopping workers");
            drop(shutdown_tx.send(()));
        }
        warn!("Signal streams closed; the run can no longer be interrupted");
    })
}

#[cfg(unix)]
struct TerminationSignals {
    interrupt: Option<Signal>,
    terminate: Option<Signal>,
}

#[cfg(unix)]
impl TerminationSignals {
    fn register() -> Self {
        Self {
            interrupt: register_signal(SignalKind::interrupt(), "SIGINT"),
            terminate: register_signal(SignalKind::terminate(), "SIGTERM"),
        }
    }

    /// Name of the next signal received, or `None` once no stream is left.
    async fn next(&mut self) -> Option<&'static str> {
        if self.interrupt.is_none() && self.terminate.is_none() {
            return None;
        }
        tokio::select! {
            Some(()) = recv_or_pending(self.interrupt.as_mut()) => Some("SIGINT"),
            Some(()) = recv_or_pending(self.terminate.as_mut()) => Some("SIGTERM"),
            else => None,
        }
    }
}

#[cfg(unix)]
fn register_signal(kind: SignalKind, name: &str) -> Option<Signal> {
    match signal(kind) {
        Ok(stream) => Some(stream),
        Err(err) => {
            warn!("Failed to register {} handler: {}", name, err);
            None
        }
    }
}

#[cfg(unix)]
async fn recv_or_pending(stream: Option<&mut Signal>) -> Option<()> {
    match stream {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(not(unix))]
struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    const fn register() -> Self {
        Self
    }

    async fn next(&mut self) -> Option<&'static str> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some("Ctrl+C"),
            Err(err) => {
                warn!("Failed to listen for Ctrl+C: {}", err);
                None
            }
        }
    }
}
