//! Termination signals that stop the server.

use std::fmt;
use tokio::signal;

/// Signal that asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// SIGINT, or Ctrl+C where there are no Unix signals
    Interrupt,
    Terminate,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Interrupt => f.write_str("SIGINT"),
            Termination::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Waits for the first termination signal.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<Termination> {
    use signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::select! {
        _ = interrupt.recv() => Termination::Interrupt,
        _ = terminate.recv() => Termination::Terminate,
    })
}

/// Waits for Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<Termination> {
    signal::ctrl_c().await?;
    Ok(Termination::Interrupt)
}
