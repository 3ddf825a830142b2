//! Player sessions and the engine-side event helpers.
//!
//! Each helper follows the same contract: build a fresh [`EventContext`],
//! dispatch to the session's handlers, then read the cancellation flag and
//! whatever the subscribers left in the `&mut` arguments.

use crate::commands::{CommandOutput, CommandRegistry, CommandSource};
use crate::error::ServerError;
use crate::server::GameServer;
use handler_system::{
    BlockPos, CommandRef, Diagnostics, EventContext, EventError, HandlerRegistry, ItemStack,
    PlayerId,
};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What is left of a block break after subscribers ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBreakOutcome {
    pub drops: Vec<ItemStack>,
    pub experience: i32,
}

/// One connected player and the handlers attached to them.
pub struct PlayerSession {
    id: PlayerId,
    name: String,
    addr: SocketAddr,
    joined_at: Instant,
    handlers: HandlerRegistry,
    outbox: Mutex<Vec<String>>,
    disconnect_reason: Mutex<Option<String>>,
}

impl PlayerSession {
    pub(crate) fn new(
        name: impl Into<String>,
        addr: SocketAddr,
        handlers: HandlerRegistry,
    ) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            addr,
            joined_at: Instant::now(),
            handlers,
            outbox: Mutex::new(Vec::new()),
            disconnect_reason: Mutex::new(None),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn joined_at(&self) -> Instant {
        self.joined_at
    }

    pub fn online_for(&self) -> Duration {
        self.joined_at.elapsed()
    }

    /// Registry plugins attach this player's subscribers to.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Fresh context for an event concerning this player.
    pub fn context(&self) -> EventContext {
        EventContext::for_player(self.id)
    }

    /// Queues a message for the player.
    pub fn send_message(&self, message: impl Into<String>) {
        self.outbox.lock().push(message.into());
    }

    /// Messages sent to the player so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.outbox.lock().clone()
    }

    /// Drains the outbox.
    pub fn take_messages(&self) -> Vec<String> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Reason the player was disconnected, once they have been.
    pub fn disconnect_reason(&self) -> Option<String> {
        self.disconnect_reason.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.disconnect_reason.lock().is_none()
    }

    /// Raises a chat message.
    ///
    /// Returns the message as rewritten by subscribers, or `None` when one of
    /// them cancelled it.
    pub fn chat(&self, message: impl Into<String>) -> Result<Option<String>, EventError> {
        let mut ctx = self.context();
        let mut message = message.into();
        self.handlers.dispatch_chat(&mut ctx, &mut message)?;
        if ctx.is_cancelled() {
            debug!("Chat from {} was cancelled", self.name);
            return Ok(None);
        }
        Ok(Some(message))
    }

    /// Raises a block break with the engine's default drops.
    ///
    /// Returns `None` when the break was cancelled and the block stays.
    pub fn break_block(
        &self,
        pos: BlockPos,
        drops: Vec<ItemStack>,
    ) -> Result<Option<BlockBreakOutcome>, EventError> {
        let mut ctx = self.context();
        let mut drops = drops;
        let mut experience = 0;
        self.handlers
            .dispatch_block_break(&mut ctx, pos, &mut drops, &mut experience)?;
        if ctx.is_cancelled() {
            debug!("Block break at {} by {} was cancelled", pos, self.name);
            return Ok(None);
        }
        Ok(Some(BlockBreakOutcome { drops, experience }))
    }

    /// Raises a transfer to `addr`. Returns the final target, or `None` if cancelled.
    pub fn transfer(&self, addr: SocketAddr) -> Result<Option<SocketAddr>, EventError> {
        let mut ctx = self.context();
        let mut addr = addr;
        self.handlers.dispatch_transfer(&mut ctx, &mut addr)?;
        if ctx.is_cancelled() {
            return Ok(None);
        }
        info!("🔀 Transferring {} to {}", self.name, addr);
        Ok(Some(addr))
    }

    /// Passes the client's periodic performance report to subscribers.
    pub fn report_diagnostics(&self, diagnostics: &Diagnostics) -> Result<(), EventError> {
        self.handlers.dispatch_diagnostics(diagnostics)
    }

    /// Runs a command line typed by this player.
    ///
    /// Subscribers see the resolved command first; if any of them cancels it
    /// the command does not run and the returned output is marked cancelled.
    /// Output lines and command errors are delivered to the player's outbox.
    pub fn run_command(
        &self,
        line: &str,
        commands: &CommandRegistry,
        server: &GameServer,
    ) -> Result<CommandOutput, ServerError> {
        let (command, args) = match commands.resolve(line) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.send_message(e.to_string());
                return Err(e.into());
            }
        };

        let command_ref = CommandRef {
            name: command.name().to_string(),
            aliases: command.aliases().iter().map(|a| a.to_string()).collect(),
        };
        let mut ctx = self.context();
        self.handlers
            .dispatch_command_execution(&mut ctx, &command_ref, &args)?;
        if ctx.is_cancelled() {
            debug!("Command /{} from {} was cancelled", command_ref.name, self.name);
            return Ok(CommandOutput::cancelled());
        }

        match commands.run(command.as_ref(), self, &args, server) {
            Ok(output) => {
                for line in output.lines() {
                    self.send_message(line);
                }
                Ok(output)
            }
            Err(e) => {
                self.send_message(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Raises Quit and detaches every subscriber.
    ///
    /// The registry is cleared even when a quit handler fails.
    pub fn quit(&self, reason: &str) -> Result<(), EventError> {
        {
            let mut slot = self.disconnect_reason.lock();
            if slot.is_some() {
                return Ok(());
            }
            *slot = Some(reason.to_string());
        }
        if !reason.is_empty() {
            self.send_message(reason);
        }
        let result = self.handlers.dispatch_quit();
        let dropped = self.handlers.clear();
        debug!("Detached {} handler membership(s) from {}", dropped, self.name);
        result
    }
}

impl CommandSource for PlayerSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) {
        PlayerSession::send_message(self, message);
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("addr", &self.addr)
            .finish()
    }
}
