//! Server configuration types and defaults.

use serde::{Deserialize, Serialize};

/// Configuration of a [`GameServer`](crate::GameServer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Display name of the server
    #[serde(default = "default_name")]
    pub name: String,

    /// Maximum number of concurrent players
    #[serde(default = "default_max_players")]
    pub max_players: usize,

    /// Message shown to banned players who try to join
    #[serde(default = "default_ban_message")]
    pub ban_message: String,

    /// Message sent to every player on join. Empty disables it.
    #[serde(default = "default_motd")]
    pub motd: String,
}

fn default_name() -> String {
    "Essentials Server".to_string()
}

fn default_max_players() -> usize {
    20
}

fn default_ban_message() -> String {
    "You are banned".to_string()
}

fn default_motd() -> String {
    "Welcome to the server!".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_players: default_max_players(),
            ban_message: default_ban_message(),
            motd: default_motd(),
        }
    }
}
