//! Per-dispatch event context.

use crate::types::PlayerId;

/// Mutable context threaded through every subscriber of one dispatch call.
///
/// A fresh context is created by the event source for each occurrence. Any
/// subscriber may cancel it; the flag is read by the event source after the
/// whole fan-out has run and never stops the remaining subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    cancelled: bool,
    player: Option<PlayerId>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for an event concerning a specific player.
    pub fn for_player(player: PlayerId) -> Self {
        Self {
            cancelled: false,
            player: Some(player),
        }
    }

    /// Requests that the engine skip its default behaviour for this event.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Withdraws an earlier cancellation.
    pub fn uncancel(&mut self) {
        self.cancelled = false;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Player the event concerns, if the source supplied one.
    pub fn player(&self) -> Option<PlayerId> {
        self.player
    }
}
