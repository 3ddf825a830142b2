//! # Game Server
//!
//! Player sessions, admission control and administrative commands for the
//! essentials server. The server itself contains no game logic: the engine
//! that embeds it reports player activity through the [`PlayerSession`]
//! helpers, and plugins react through the handlers they attach to each
//! session.
//!
//! ## Architecture Overview
//!
//! * **Admission** - Every join passes an [`AllowerChain`](permission::AllowerChain)
//!   that starts with the ban list
//! * **Sessions** - One [`PlayerSession`] per online player, each with its own
//!   [`HandlerRegistry`](handler_system::HandlerRegistry)
//! * **Join Hooks** - Plugins install hooks that register subscribers on every
//!   new session
//! * **Commands** - A [`CommandRegistry`] of built-in operator commands, run
//!   by players or the console
//!
//! ## Event Flow
//!
//! 1. The engine calls a session helper such as [`PlayerSession::chat`]
//! 2. The helper builds a fresh context and dispatches to the session's handlers
//! 3. Subscribers may rewrite the payload or cancel the event
//! 4. The helper returns what is left, or `None` if the event was cancelled
//!
//! ## Example
//!
//! ```rust,ignore
//! let server = create_server(ServerConfig::default(), permissions);
//! server.add_join_hook(|session| {
//!     session.handlers().register(Arc::new(ChatLogger::default()))?;
//!     Ok(())
//! });
//!
//! let steve = server.join("Steve", "127.0.0.1:50000".parse()?)?;
//! if let Some(message) = steve.chat("hello")? {
//!     server.broadcast(&message);
//! }
//! ```

pub use commands::{
    Command, CommandContext, CommandError, CommandOutput, CommandRegistry, CommandSource,
    ConsoleSource,
};
pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{GameServer, JoinHook};
pub use session::{BlockBreakOutcome, PlayerSession};

pub mod commands;
pub mod config;
pub mod error;
pub mod server;
pub mod session;

use permission::Permissions;
use std::sync::Arc;

/// Creates a shareable server.
pub fn create_server(config: ServerConfig, permissions: Arc<Permissions>) -> Arc<GameServer> {
    Arc::new(GameServer::new(config, permissions))
}
