//! Error types for the game server.

use crate::commands::CommandError;
use handler_system::EventError;
use permission::{PermissionError, Rejection};

/// Errors that can occur while admitting, running or shutting down players.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The admission chain refused the player
    #[error("Login refused: {0}")]
    Rejected(#[from] Rejection),
    /// A player with the same name is already online
    #[error("Player {0} is already online")]
    AlreadyOnline(String),
    /// The server is at capacity
    #[error("Server is full ({max_players} players)")]
    ServerFull { max_players: usize },
    /// No online player has this name
    #[error("Player {0} is not online")]
    UnknownPlayer(String),
    /// The server is shutting down and no longer admits players
    #[error("Server is shutting down")]
    ShuttingDown,
    /// Registration or dispatch failed
    #[error("Event error: {0}")]
    Event(#[from] EventError),
    /// A command failed
    #[error(transparent)]
    Command(#[from] CommandError),
    /// Permission lists could not be persisted
    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),
}
