//! Subscribers the server attaches to every player session.
//!
//! Each subscriber is created per session and carries the player's name,
//! since handlers like Quit receive no context.

use game_server::{GameServer, PlayerSession};
use handler_system::{
    subscriber, ChatHandler, CommandExecutionHandler, CommandRef, Diagnostics, DiagnosticsHandler,
    EventContext, HandlerResult, QuitHandler,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Logs chat lines as the player typed them.
///
/// Attached ahead of plugin subscribers, so it never sees their rewrites.
pub struct ChatLogger {
    player: String,
}

impl ChatHandler for ChatLogger {
    fn handle_chat(&self, ctx: &mut EventContext, message: &mut String) -> HandlerResult {
        if !ctx.is_cancelled() {
            info!("💬 <{}> {}", self.player, message);
        }
        Ok(())
    }
}

subscriber!(ChatLogger: Chat);

/// Records every command a player attempts, allowed or not.
pub struct CommandAudit {
    player: String,
}

impl CommandExecutionHandler for CommandAudit {
    fn handle_command_execution(
        &self,
        _ctx: &mut EventContext,
        command: &CommandRef,
        args: &[String],
    ) -> HandlerResult {
        info!("📝 {} issued /{} {}", self.player, command.name, args.join(" "));
        Ok(())
    }
}

subscriber!(CommandAudit: CommandExecution);

/// Logs how long a player stayed.
pub struct QuitLogger {
    player: String,
    joined_at: Instant,
}

impl QuitHandler for QuitLogger {
    fn handle_quit(&self) -> HandlerResult {
        info!(
            "⏱️ {} played for {}s",
            self.player,
            self.joined_at.elapsed().as_secs()
        );
        Ok(())
    }
}

subscriber!(QuitLogger: Quit);

/// Latest client diagnostics of every online player.
#[derive(Debug, Default)]
pub struct DiagnosticsBoard {
    reports: RwLock<BTreeMap<String, Diagnostics>>,
}

impl DiagnosticsBoard {
    pub fn get(&self, player: &str) -> Option<Diagnostics> {
        self.reports.read().get(player).cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    /// Average frame rate over every reporting player.
    pub fn average_fps(&self) -> Option<f64> {
        let reports = self.reports.read();
        if reports.is_empty() {
            return None;
        }
        let total: f64 = reports.values().map(|d| d.average_frames_per_second).sum();
        Some(total / reports.len() as f64)
    }

    /// All reports as a JSON object keyed by player name.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.reports.read())
    }
}

/// Keeps a player's latest diagnostics on the board until they quit.
pub struct DiagnosticsRecorder {
    player: String,
    board: Arc<DiagnosticsBoard>,
}

impl DiagnosticsHandler for DiagnosticsRecorder {
    fn handle_diagnostics(&self, diagnostics: &Diagnostics) -> HandlerResult {
        debug!(
            "📈 {} reports {:.1} fps",
            self.player, diagnostics.average_frames_per_second
        );
        self.board
            .reports
            .write()
            .insert(self.player.clone(), diagnostics.clone());
        Ok(())
    }
}

impl QuitHandler for DiagnosticsRecorder {
    fn handle_quit(&self) -> HandlerResult {
        self.board.reports.write().remove(&self.player);
        Ok(())
    }
}

subscriber!(DiagnosticsRecorder: Diagnostics, Quit);

/// Attaches the default subscribers to `session`.
pub fn attach(
    session: &PlayerSession,
    board: &Arc<DiagnosticsBoard>,
) -> Result<(), handler_system::EventError> {
    let player = session.name().to_string();
    let handlers = session.handlers();

    handlers.register(Arc::new(ChatLogger {
        player: player.clone(),
    }))?;
    handlers.register(Arc::new(CommandAudit {
        player: player.clone(),
    }))?;
    handlers.register(Arc::new(QuitLogger {
        player: player.clone(),
        joined_at: session.joined_at(),
    }))?;
    handlers.register(Arc::new(DiagnosticsRecorder {
        player,
        board: Arc::clone(board),
    }))?;
    Ok(())
}

/// Installs a join hook attaching the default subscribers to every new session.
pub fn install(server: &GameServer) -> Arc<DiagnosticsBoard> {
    let board = Arc::new(DiagnosticsBoard::default());
    let hook_board = Arc::clone(&board);
    server.add_join_hook(move |session| attach(session, &hook_board));
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_server::{create_server, ServerConfig};
    use handler_system::EventKind;
    use permission::{PermissionSettings, Permissions};
    use tempfile::TempDir;

    async fn server(dir: &TempDir) -> Arc<GameServer> {
        let permissions = Permissions::load(dir.path(), &PermissionSettings::default())
            .await
            .unwrap();
        create_server(ServerConfig::default(), Arc::new(permissions))
    }

    fn report(fps: f64) -> Diagnostics {
        Diagnostics {
            average_frames_per_second: fps,
            ..Diagnostics::default()
        }
    }

    #[tokio::test]
    async fn test_default_subscribers_attached_on_join() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;
        install(&server);

        let steve = server.join("Steve", "127.0.0.1:50000".parse().unwrap()).unwrap();
        let handlers = steve.handlers();
        assert_eq!(handlers.subscriber_count(EventKind::Chat), 1);
        assert_eq!(handlers.subscriber_count(EventKind::CommandExecution), 1);
        assert_eq!(handlers.subscriber_count(EventKind::Diagnostics), 1);
        assert_eq!(handlers.subscriber_count(EventKind::Quit), 2);
        assert_eq!(handlers.subscriber_count(EventKind::Move), 0);

        // Logging subscribers leave chat untouched.
        assert_eq!(steve.chat("hello").unwrap().as_deref(), Some("hello"));
    }

    struct Shout;

    impl ChatHandler for Shout {
        fn handle_chat(&self, _ctx: &mut EventContext, message: &mut String) -> HandlerResult {
            *message = message.to_uppercase();
            Ok(())
        }
    }

    subscriber!(Shout: Chat);

    #[tokio::test]
    async fn test_chat_logger_runs_ahead_of_plugin_hooks() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;
        install(&server);
        server.add_join_hook(|session| {
            session.handlers().register(Arc::new(Shout))?;
            Ok(())
        });

        let steve = server.join("Steve", "127.0.0.1:50000".parse().unwrap()).unwrap();
        assert_eq!(steve.handlers().subscriber_count(EventKind::Chat), 2);
        assert_eq!(steve.chat("hello").unwrap().as_deref(), Some("HELLO"));
    }

    #[tokio::test]
    async fn test_diagnostics_board_tracks_online_players() {
        let dir = TempDir::new().unwrap();
        let server = server(&dir).await;
        let board = install(&server);

        let steve = server.join("Steve", "127.0.0.1:50000".parse().unwrap()).unwrap();
        let alex = server.join("Alex", "127.0.0.1:50001".parse().unwrap()).unwrap();
        assert!(board.is_empty());
        assert_eq!(board.average_fps(), None);

        steve.report_diagnostics(&report(30.0)).unwrap();
        alex.report_diagnostics(&report(60.0)).unwrap();
        steve.report_diagnostics(&report(50.0)).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board.get("Steve").unwrap().average_frames_per_second, 50.0);
        assert_eq!(board.average_fps(), Some(55.0));

        let json: serde_json::Value = serde_json::from_str(&board.to_json().unwrap()).unwrap();
        assert_eq!(json["Alex"]["average_frames_per_second"], 60.0);

        server.disconnect("Steve", "").unwrap();
        assert!(board.get("Steve").is_none());
        assert_eq!(board.len(), 1);
    }
}
