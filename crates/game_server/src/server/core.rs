//! Core game server implementation.
//!
//! `GameServer` owns the online sessions. Every session gets its own
//! [`HandlerRegistry`], populated by the join hooks plugins install, and
//! dropped again when the player leaves.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::session::PlayerSession;
use handler_system::{create_handler_registry, EventError, RegistryStats};
use parking_lot::RwLock;
use permission::{Allower, AllowerChain, ListAllower, LoginRequest, Permissions};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Callback run for every joining player, typically to register subscribers.
pub type JoinHook = Arc<dyn Fn(&PlayerSession) -> Result<(), EventError> + Send + Sync>;

/// The core game server structure.
///
/// Sessions are keyed by player name. The server is shared as
/// `Arc<GameServer>` between the embedding engine, the console and commands.
pub struct GameServer {
    /// Server configuration settings
    config: ServerConfig,

    /// Operator and ban lists
    permissions: Arc<Permissions>,

    /// Checks every login must pass, ban list first
    admission: AllowerChain,

    /// Online players by name
    sessions: RwLock<HashMap<String, Arc<PlayerSession>>>,

    /// Hooks run on every join, in installation order
    join_hooks: RwLock<Vec<JoinHook>>,

    started_at: Instant,

    /// Flips to `true` once shutdown has been requested
    shutdown_sender: watch::Sender<bool>,
}

impl GameServer {
    /// Creates a server whose admission chain refuses banned players with
    /// `config.ban_message`.
    pub fn new(config: ServerConfig, permissions: Arc<Permissions>) -> Self {
        let admission = AllowerChain::new().with(ListAllower::deny(
            Arc::clone(permissions.bans()),
            config.ban_message.clone(),
        ));
        let (shutdown_sender, _) = watch::channel(false);

        Self {
            config,
            permissions,
            admission,
            sessions: RwLock::new(HashMap::new()),
            join_hooks: RwLock::new(Vec::new()),
            started_at: Instant::now(),
            shutdown_sender,
        }
    }

    /// Appends an allower to the admission chain. Runs after the ban check.
    pub fn with_allower(mut self, allower: impl Allower + 'static) -> Self {
        self.admission.push(allower);
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Installs a hook run for every player who joins from now on.
    ///
    /// A hook may install further hooks; they first run for the next join.
    pub fn add_join_hook<F>(&self, hook: F)
    where
        F: Fn(&PlayerSession) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.join_hooks.write().push(Arc::new(hook));
    }

    /// Admits a player.
    ///
    /// Runs the admission chain, builds a session with a fresh handler
    /// registry and runs every join hook on it before the player becomes
    /// visible. A failing hook aborts the join.
    pub fn join(&self, name: &str, addr: SocketAddr) -> Result<Arc<PlayerSession>, ServerError> {
        if self.shutdown_requested() {
            return Err(ServerError::ShuttingDown);
        }

        let request = LoginRequest::new(name, addr);
        if let Err(rejection) = self.admission.allow(&request) {
            info!("🚫 Refused {} from {}: {}", name, addr, rejection);
            return Err(rejection.into());
        }
        if self.sessions.read().contains_key(name) {
            return Err(ServerError::AlreadyOnline(name.to_string()));
        }

        let session = Arc::new(PlayerSession::new(name, addr, create_handler_registry()));
        let hooks: Vec<JoinHook> = self.join_hooks.read().clone();
        for hook in &hooks {
            if let Err(e) = hook(session.as_ref()) {
                error!("❌ Join hook failed for {}: {}", name, e);
                session.handlers().clear();
                return Err(e.into());
            }
        }

        {
            let mut sessions = self.sessions.write();
            if sessions.contains_key(name) {
                session.handlers().clear();
                return Err(ServerError::AlreadyOnline(name.to_string()));
            }
            if sessions.len() >= self.config.max_players {
                session.handlers().clear();
                return Err(ServerError::ServerFull {
                    max_players: self.config.max_players,
                });
            }
            sessions.insert(name.to_string(), Arc::clone(&session));
        }

        if !self.config.motd.is_empty() {
            session.send_message(self.config.motd.clone());
        }
        info!("👋 {} joined from {} ({})", name, addr, session.id());
        Ok(session)
    }

    pub fn player(&self, name: &str) -> Option<Arc<PlayerSession>> {
        self.sessions.read().get(name).cloned()
    }

    /// Online players sorted by name.
    pub fn online_players(&self) -> Vec<Arc<PlayerSession>> {
        let mut players: Vec<_> = self.sessions.read().values().cloned().collect();
        players.sort_by(|a, b| a.name().cmp(b.name()));
        players
    }

    pub fn player_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Sends `message` to every online player.
    pub fn broadcast(&self, message: &str) {
        for player in self.sessions.read().values() {
            player.send_message(message);
        }
    }

    /// Removes a player, raising Quit on their handlers and detaching them.
    ///
    /// A failing quit handler is logged; the player is removed regardless.
    pub fn disconnect(&self, name: &str, reason: &str) -> Result<Arc<PlayerSession>, ServerError> {
        let session = self
            .sessions
            .write()
            .remove(name)
            .ok_or_else(|| ServerError::UnknownPlayer(name.to_string()))?;

        if let Err(e) = session.quit(reason) {
            warn!("⚠️ Quit handler failed for {}: {}", name, e);
        }
        info!("👋 {} left: {}", name, if reason.is_empty() { "disconnected" } else { reason });
        Ok(session)
    }

    /// Handler statistics summed over every online session.
    pub fn handler_stats(&self) -> RegistryStats {
        self.sessions
            .read()
            .values()
            .map(|s| s.handlers().stats())
            .fold(RegistryStats::default(), |mut total, stats| {
                total.memberships += stats.memberships;
                total.registrations += stats.registrations;
                total.unregistrations += stats.unregistrations;
                total.dispatches += stats.dispatches;
                total.handler_failures += stats.handler_failures;
                total.handler_panics += stats.handler_panics;
                total
            })
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Marks the server as stopping and wakes every shutdown subscriber.
    pub fn request_shutdown(&self) {
        self.shutdown_sender.send_replace(true);
    }

    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown_sender.borrow()
    }

    /// Receiver that observes `true` once shutdown is requested.
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_sender.subscribe()
    }

    /// Writes back any permission list changed since the last save.
    ///
    /// Unchanged lists are not touched on disk.
    pub async fn save_permissions(&self) -> Result<(), ServerError> {
        self.permissions.flush().await?;
        Ok(())
    }

    /// Disconnects everyone and flushes the permission lists.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🧹 Performing server cleanup...");
        self.request_shutdown();

        let names: Vec<String> = self.sessions.read().keys().cloned().collect();
        for name in names {
            // The player may have left in the meantime.
            let _ = self.disconnect(&name, "Server closed");
        }

        self.save_permissions().await?;
        info!("✅ Server cleanup completed");
        Ok(())
    }
}

impl std::fmt::Debug for GameServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameServer")
            .field("config", &self.config)
            .field("players", &self.player_count())
            .field("shutdown_requested", &self.shutdown_requested())
            .finish()
    }
}
