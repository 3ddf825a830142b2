//! Server core: admission, session tracking and shutdown.

mod core;

pub use self::core::{GameServer, JoinHook};
