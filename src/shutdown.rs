//! Process-level shutdown around the blocking poll task.
//!
//! The first SIGINT or SIGTERM cancels the poll loop and waits for it to
//! release the bus. The loop only sees the token between ticks, so a bus
//! transfer that never returns would hold the process forever. A second
//! signal or an expired grace period gives up on the task instead.

use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::controller::PollError;

pub type PollOutcome = Result<Result<u64, PollError>, JoinError>;

#[derive(Debug)]
pub enum Shutdown {
    /// The poll task returned, with or without a cancel request
    Finished(PollOutcome),
    /// The poll task was still running when shutdown gave up on it
    Abandoned { signal: &'static str },
}

/// Forwards every SIGINT and SIGTERM as its name.
pub fn listen_for_signals() -> std::io::Result<mpsc::Receiver<&'static str>> {
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        loop {
            let name = tokio::select! {
                Some(()) = interrupt.recv() => "SIGINT",
                Some(()) = terminate.recv() => "SIGTERM",
                else => break,
            };
            if tx.send(name).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Waits for the poll task, cancelling it on the first signal.
///
/// After cancellation the task gets `grace` to finish; a second signal cuts
/// that short.
pub async fn supervise(
    mut poll_task: JoinHandle<Result<u64, PollError>>,
    token: &CancellationToken,
    signals: &mut mpsc::Receiver<&'static str>,
    grace: Duration,
) -> Shutdown {
    let first = tokio::select! {
        result = &mut poll_task => return Shutdown::Finished(result),
        Some(name) = signals.recv() => name,
    };

    info!("{} received, stopping poll loop", first);
    token.cancel();

    tokio::select! {
        result = &mut poll_task => Shutdown::Finished(result),
        _ = tokio::time::sleep(grace) => {
            error!("Poll loop did not stop within {:?}; bus appears hung", grace);
            Shutdown::Abandoned { signal: first }
        }
        Some(second) = signals.recv() => {
            warn!("{} received again, abandoning poll loop", second);
            Shutdown::Abandoned { signal: second }
        }
    }
}
