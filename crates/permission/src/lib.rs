//! # Permission
//!
//! Operator and ban lists kept in plain text files, one name per line, and
//! the allowers that turn them into admission and command checks.
//!
//! Lists are services: they are loaded once at startup, shared through
//! `Arc`, consulted in memory, and flushed back to disk on shutdown or
//! whenever the owner chooses.

pub mod allower;
pub mod error;
pub mod list;

pub use allower::{Allower, AllowerChain, ListAllower, LoginRequest, Membership, Rejection};
pub use error::PermissionError;
pub use list::PermissionList;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Name of the server console as it appears in permission lists.
pub const CONSOLE_NAME: &str = "CONSOLE";

/// File names of the stock lists, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSettings {
    /// Operator list file
    #[serde(default = "default_operators_file")]
    pub operators_file: String,
    /// Ban list file
    #[serde(default = "default_bans_file")]
    pub bans_file: String,
}

fn default_operators_file() -> String {
    "ops.txt".to_string()
}

fn default_bans_file() -> String {
    "banned-players.txt".to_string()
}

impl Default for PermissionSettings {
    fn default() -> Self {
        Self {
            operators_file: default_operators_file(),
            bans_file: default_bans_file(),
        }
    }
}

/// The operator and ban lists of one server.
#[derive(Debug, Clone)]
pub struct Permissions {
    operators: Arc<PermissionList>,
    bans: Arc<PermissionList>,
}

impl Permissions {
    /// Loads both lists from `dir`, creating missing files with the console entry.
    pub async fn load(
        dir: impl AsRef<Path>,
        settings: &PermissionSettings,
    ) -> Result<Self, PermissionError> {
        let dir = dir.as_ref();
        let operators =
            PermissionList::load(dir.join(&settings.operators_file), &[CONSOLE_NAME]).await?;
        let bans = PermissionList::load(dir.join(&settings.bans_file), &[CONSOLE_NAME]).await?;
        info!(
            "🔐 Loaded {} operator(s) and {} ban(s) from {}",
            operators.len(),
            bans.len(),
            dir.display()
        );
        Ok(Self::from_lists(Arc::new(operators), Arc::new(bans)))
    }

    pub fn from_lists(operators: Arc<PermissionList>, bans: Arc<PermissionList>) -> Self {
        Self { operators, bans }
    }

    pub fn operators(&self) -> &Arc<PermissionList> {
        &self.operators
    }

    pub fn bans(&self) -> &Arc<PermissionList> {
        &self.bans
    }

    pub fn is_operator(&self, name: &str) -> bool {
        self.operators.has(name)
    }

    pub fn is_banned(&self, name: &str) -> bool {
        self.bans.has(name)
    }

    /// Writes whichever lists changed.
    pub async fn flush(&self) -> Result<(), PermissionError> {
        self.operators.flush().await?;
        self.bans.flush().await?;
        Ok(())
    }
}
