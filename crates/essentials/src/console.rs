//! Server console: reads command lines and runs them as `CONSOLE`.

use game_server::{CommandRegistry, ConsoleSource, GameServer};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

/// Runs one console line and returns what should be printed.
///
/// Operator and ban changes made by the command are on disk before this
/// returns.
pub async fn execute_line(
    line: &str,
    commands: &CommandRegistry,
    server: &GameServer,
) -> Vec<String> {
    let replies = match commands.execute(&ConsoleSource, line, server) {
        Ok(output) => output.lines().map(str::to_string).collect(),
        Err(e) => {
            warn!("⚠️ Console command failed: {}", e);
            vec![e.to_string()]
        }
    };
    if let Err(e) = server.save_permissions().await {
        error!("❌ Failed to save permission lists: {}", e);
    }
    replies
}

/// Reads lines from `input` until it closes or shutdown is requested.
///
/// Blank lines are skipped. Replies are written to `output`, one per line.
pub async fn run_console<R, W>(
    input: R,
    mut output: W,
    server: Arc<GameServer>,
    commands: Arc<CommandRegistry>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut shutdown = server.subscribe_shutdown();

    while !server.shutdown_requested() {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.changed() => break,
        };
        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        for reply in execute_line(line, &commands, &server).await {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.flush().await?;
    }

    Ok(())
}
