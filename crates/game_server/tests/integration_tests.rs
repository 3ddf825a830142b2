//! Integration tests for admission, session handlers and commands.
//!
//! These tests drive the server the way an embedding engine would: players
//! join through `GameServer::join`, act through the session helpers, and
//! leave through `disconnect`.

use game_server::*;
use handler_system::{
    subscriber, CommandExecutionHandler, CommandRef, EventContext, HandlerError, HandlerResult,
    QuitHandler,
};
use parking_lot::Mutex;
use permission::{PermissionSettings, Permissions, CONSOLE_NAME};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn addr() -> SocketAddr {
    "127.0.0.1:50000".parse().unwrap()
}

async fn create_test_server(dir: &TempDir, max_players: usize) -> Arc<GameServer> {
    let permissions = Permissions::load(dir.path(), &PermissionSettings::default())
        .await
        .unwrap();
    let config = ServerConfig {
        max_players,
        motd: String::new(),
        ..ServerConfig::default()
    };
    create_server(config, Arc::new(permissions))
}

/// Counts Quit events across every session it is attached to.
struct QuitCounter(Arc<AtomicUsize>);

impl QuitHandler for QuitCounter {
    fn handle_quit(&self) -> HandlerResult {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

subscriber!(QuitCounter: Quit);

/// Blocks `/ban` and records every command seen.
struct CommandGuard(Arc<Mutex<Vec<String>>>);

impl CommandExecutionHandler for CommandGuard {
    fn handle_command_execution(
        &self,
        ctx: &mut EventContext,
        command: &CommandRef,
        args: &[String],
    ) -> HandlerResult {
        self.0.lock().push(format!("{} {}", command.name, args.join(" ")));
        if command.name == "ban" {
            ctx.cancel();
        }
        Ok(())
    }
}

subscriber!(CommandGuard: CommandExecution);

#[tokio::test]
async fn test_join_hooks_attach_and_disconnect_detaches() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    let quits = Arc::new(AtomicUsize::new(0));
    let counter = quits.clone();
    server.add_join_hook(move |session| {
        session.handlers().register(Arc::new(QuitCounter(counter.clone())))?;
        Ok(())
    });

    let steve = server.join("Steve", addr()).unwrap();
    assert_eq!(steve.handlers().stats().memberships, 1);
    assert_eq!(server.player_count(), 1);

    server.disconnect("Steve", "").unwrap();
    assert_eq!(quits.load(Ordering::SeqCst), 1);
    assert_eq!(steve.handlers().stats().memberships, 0);
    assert!(server.player("Steve").is_none());
    assert!(matches!(server.disconnect("Steve", ""), Err(ServerError::UnknownPlayer(_))));
}

#[tokio::test]
async fn test_admission_rules() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 2).await;
    server.permissions().bans().add("Griefer");

    match server.join("Griefer", addr()) {
        Err(ServerError::Rejected(rejection)) => assert_eq!(rejection.message, "You are banned"),
        other => panic!("expected rejection, got {other:?}"),
    }

    server.join("Steve", addr()).unwrap();
    assert!(matches!(server.join("Steve", addr()), Err(ServerError::AlreadyOnline(_))));
    server.join("Alex", addr()).unwrap();
    assert!(matches!(
        server.join("Notch", addr()),
        Err(ServerError::ServerFull { max_players: 2 })
    ));

    let names: Vec<String> = server.online_players().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["Alex".to_string(), "Steve".to_string()]);
}

#[tokio::test]
async fn test_failing_join_hook_aborts_join() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    server.add_join_hook(|session| {
        if session.name() == "Herobrine" {
            return Err(handler_system::EventError::InvalidSubscriber {
                subscriber: "nobody".to_string(),
            });
        }
        Ok(())
    });

    assert!(matches!(server.join("Herobrine", addr()), Err(ServerError::Event(_))));
    assert_eq!(server.player_count(), 0);
    server.join("Steve", addr()).unwrap();
}

#[tokio::test]
async fn test_operator_gate() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    let commands = CommandRegistry::with_defaults();
    let steve = server.join("Steve", addr()).unwrap();

    let output = steve.run_command("/list", &commands, &server).unwrap();
    assert_eq!(output.messages()[0], "There are 1/10 players online:");
    assert_eq!(output.messages()[1], "Steve");

    let err = steve.run_command("/op Steve", &commands, &server).unwrap_err();
    assert!(matches!(err, ServerError::Command(CommandError::PermissionDenied { .. })));
    assert_eq!(steve.messages().last().unwrap(), "You are not operator");

    let output = commands.execute(&ConsoleSource, "op Steve", &server).unwrap();
    assert_eq!(output.messages(), &["Opped: Steve".to_string()]);
    assert!(steve.messages().contains(&"You have been opped".to_string()));

    let output = steve.run_command("/status", &commands, &server).unwrap();
    assert!(output.messages()[0].starts_with("Uptime: "));

    commands.execute(&ConsoleSource, "deop Steve", &server).unwrap();
    assert!(!server.permissions().is_operator("Steve"));
    assert!(server.permissions().is_operator(CONSOLE_NAME));
}

#[tokio::test]
async fn test_ban_kick_and_unban() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    let commands = CommandRegistry::with_defaults();
    let steve = server.join("Steve", addr()).unwrap();
    let alex = server.join("Alex", addr()).unwrap();

    let output = commands.execute(&ConsoleSource, "kick Alex spamming chat", &server).unwrap();
    assert_eq!(output.messages(), &["Kicked player Alex".to_string()]);
    assert_eq!(alex.disconnect_reason().as_deref(), Some("Kicked by admin: spamming chat"));

    assert_eq!(
        commands.execute(&ConsoleSource, "kick Alex", &server).unwrap_err(),
        CommandError::TargetNotFound("Alex".to_string())
    );
    assert!(matches!(
        commands.execute(&ConsoleSource, "ban", &server),
        Err(CommandError::BadArguments { .. })
    ));

    commands.execute(&ConsoleSource, "ban Steve", &server).unwrap();
    assert_eq!(steve.disconnect_reason().as_deref(), Some("Banned by admin"));
    assert!(server.join("Steve", addr()).is_err());

    let output = commands.execute(&ConsoleSource, "banlist", &server).unwrap();
    assert_eq!(output.messages()[0], "There are 2 banned players:");

    let output = commands.execute(&ConsoleSource, "unban Steve", &server).unwrap();
    assert_eq!(output.messages(), &["Unbanned player Steve".to_string()]);
    server.join("Steve", addr()).unwrap();
}

#[tokio::test]
async fn test_player_ban_survives_reload_after_save() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    server.permissions().operators().add("Steve");
    let commands = CommandRegistry::with_defaults();
    let steve = server.join("Steve", addr()).unwrap();
    server.join("Alex", addr()).unwrap();

    steve.run_command("/ban Alex", &commands, &server).unwrap();
    server.save_permissions().await.unwrap();

    let reloaded = Permissions::load(dir.path(), &PermissionSettings::default())
        .await
        .unwrap();
    assert!(reloaded.is_banned("Alex"));
    assert!(reloaded.is_operator("Steve"));
    assert!(server.online_players().iter().all(|p| p.name() != "Alex"));
}

#[tokio::test]
async fn test_command_execution_can_be_cancelled() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    server.permissions().operators().add("Steve");
    let commands = CommandRegistry::with_defaults();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    server.add_join_hook(move |session| {
        session.handlers().register(Arc::new(CommandGuard(log.clone())))?;
        Ok(())
    });
    let steve = server.join("Steve", addr()).unwrap();
    server.join("Alex", addr()).unwrap();

    let output = steve.run_command("/ban Alex", &commands, &server).unwrap();
    assert!(output.is_cancelled());
    assert!(!server.permissions().is_banned("Alex"));

    let output = steve.run_command("/ver", &commands, &server).unwrap();
    assert!(output.is_success());
    assert_eq!(*seen.lock(), vec!["ban Alex".to_string(), "version ".to_string()]);
}

#[tokio::test]
async fn test_help_lists_only_allowed_commands() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    let commands = CommandRegistry::with_defaults();
    let steve = server.join("Steve", addr()).unwrap();

    let output = steve.run_command("?", &commands, &server).unwrap();
    assert_eq!(
        output.messages(),
        &[
            "/help: Provides help/list of commands.".to_string(),
            "/list: Lists all online players".to_string(),
            "/version: Gets the version of this server in use.".to_string(),
        ]
    );

    let output = commands.execute(&ConsoleSource, "help kick", &server).unwrap();
    assert_eq!(output.messages()[0], "/kick <player> [reason]");
}

/// Fails on quit so shutdown has to carry on past it.
struct BrokenQuit;

impl QuitHandler for BrokenQuit {
    fn handle_quit(&self) -> HandlerResult {
        Err(HandlerError::new("save failed"))
    }
}

subscriber!(BrokenQuit: Quit);

#[tokio::test]
async fn test_stop_and_shutdown() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    let commands = CommandRegistry::with_defaults();
    server.add_join_hook(|session| {
        session.handlers().register(Arc::new(BrokenQuit))?;
        Ok(())
    });
    let steve = server.join("Steve", addr()).unwrap();
    let mut shutdown = server.subscribe_shutdown();

    commands.execute(&ConsoleSource, "stop", &server).unwrap();
    shutdown.changed().await.unwrap();
    assert!(*shutdown.borrow());
    assert!(steve.messages().contains(&"Stopping the server".to_string()));
    assert!(matches!(server.join("Alex", addr()), Err(ServerError::ShuttingDown)));

    server.permissions().operators().add("Steve");
    server.shutdown().await.unwrap();

    assert_eq!(server.player_count(), 0);
    assert_eq!(steve.disconnect_reason().as_deref(), Some("Server closed"));
    let ops = tokio::fs::read_to_string(dir.path().join("ops.txt")).await.unwrap();
    assert_eq!(ops, "CONSOLE\nSteve\n");
}

#[tokio::test]
async fn test_join_hook_may_install_another_hook() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(&dir, 10).await;
    let quits = Arc::new(AtomicUsize::new(0));

    let weak = Arc::downgrade(&server);
    let counter = quits.clone();
    server.add_join_hook(move |_session| {
        if let Some(server) = weak.upgrade() {
            let counter = counter.clone();
            server.add_join_hook(move |session| {
                session.handlers().register(Arc::new(QuitCounter(counter.clone())))?;
                Ok(())
            });
        }
        Ok(())
    });

    let steve = server.join("Steve", addr()).unwrap();
    assert_eq!(steve.handlers().subscriber_count(handler_system::EventKind::Quit), 0);
    let alex = server.join("Alex", addr()).unwrap();
    assert_eq!(alex.handlers().subscriber_count(handler_system::EventKind::Quit), 1);

    server.disconnect("Alex", "").unwrap();
    assert_eq!(quits.load(Ordering::SeqCst), 1);
}
