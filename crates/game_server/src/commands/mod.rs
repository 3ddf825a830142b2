//! Command framework and the built-in administrative commands.
//!
//! Commands are looked up by name or alias, case-insensitively. A command's
//! [`allow`](Command::allow) check runs before [`run`](Command::run); the
//! console passes every check.

mod admin;
mod info;

pub use admin::{
    BanCommand, BanListCommand, DeopCommand, KickCommand, OpCommand, StopCommand, UnbanCommand,
};
pub use info::{HelpCommand, ListCommand, StatusCommand, VersionCommand};

use crate::server::GameServer;
use permission::{Permissions, CONSOLE_NAME};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Errors raised while resolving or running a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("You are not operator")]
    PermissionDenied { command: String },
    #[error("Command argument error")]
    BadArguments { usage: String },
    #[error("Target not found")]
    TargetNotFound(String),
    #[error("Command {0} is already registered")]
    AlreadyRegistered(String),
}

/// Whoever issued a command.
pub trait CommandSource: Send + Sync {
    fn name(&self) -> &str;

    fn is_console(&self) -> bool {
        false
    }

    fn send_message(&self, message: &str);
}

/// The server console. Messages sent to it are logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSource;

impl CommandSource for ConsoleSource {
    fn name(&self) -> &str {
        CONSOLE_NAME
    }

    fn is_console(&self) -> bool {
        true
    }

    fn send_message(&self, message: &str) {
        info!("{}", message);
    }
}

/// Lines produced by one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    messages: Vec<String>,
    errors: Vec<String>,
    cancelled: bool,
}

impl CommandOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output of a command a subscriber stopped before it ran.
    pub fn cancelled() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    pub fn print(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }

    /// Messages followed by errors.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().chain(self.errors.iter()).map(String::as_str)
    }
}

/// What a command can reach while it runs.
pub struct CommandContext<'a> {
    pub server: &'a GameServer,
    pub permissions: &'a Permissions,
    pub commands: &'a CommandRegistry,
}

impl CommandContext<'_> {
    /// Console or listed operator.
    pub fn is_operator(&self, source: &dyn CommandSource) -> bool {
        source.is_console() || self.permissions.is_operator(source.name())
    }
}

/// A command that can be executed by players or the console.
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Argument synopsis shown by `help <command>`.
    fn usage(&self) -> &str {
        ""
    }

    /// Whether `source` may run the command. Everyone may by default.
    fn allow(&self, _source: &dyn CommandSource, _ctx: &CommandContext<'_>) -> bool {
        true
    }

    fn run(
        &self,
        source: &dyn CommandSource,
        args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError>;
}

/// Commands by name and alias.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    lookup: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let defaults: Vec<Arc<dyn Command>> = vec![
            Arc::new(HelpCommand),
            Arc::new(VersionCommand),
            Arc::new(StatusCommand),
            Arc::new(ListCommand),
            Arc::new(StopCommand),
            Arc::new(OpCommand),
            Arc::new(DeopCommand),
            Arc::new(BanCommand),
            Arc::new(UnbanCommand),
            Arc::new(BanListCommand),
            Arc::new(KickCommand),
        ];
        for command in defaults {
            // Built-in names are distinct.
            let _ = registry.register(command);
        }
        registry
    }

    /// Adds a command under its name and aliases.
    ///
    /// Fails without changing anything if any of them is taken.
    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<(), CommandError> {
        let keys: Vec<String> = std::iter::once(command.name())
            .chain(command.aliases().iter().copied())
            .map(str::to_lowercase)
            .collect();
        if let Some(taken) = keys.iter().find(|key| self.lookup.contains_key(*key)) {
            return Err(CommandError::AlreadyRegistered(taken.clone()));
        }

        let index = self.commands.len();
        for key in keys {
            self.lookup.insert(key, index);
        }
        debug!("Registered command /{}", command.name());
        self.commands.push(command);
        Ok(())
    }

    /// Looks up a command by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.lookup
            .get(&name.to_lowercase())
            .map(|index| Arc::clone(&self.commands[*index]))
    }

    /// Commands sorted by name.
    pub fn commands(&self) -> Vec<Arc<dyn Command>> {
        let mut commands = self.commands.clone();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Splits a command line into the command and its arguments.
    ///
    /// A leading `/` is optional.
    pub fn resolve(&self, line: &str) -> Result<(Arc<dyn Command>, Vec<String>), CommandError> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let command = self
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        Ok((command, parts.map(str::to_string).collect()))
    }

    /// Checks `allow` and runs a resolved command.
    pub fn run(
        &self,
        command: &dyn Command,
        source: &dyn CommandSource,
        args: &[String],
        server: &GameServer,
    ) -> Result<CommandOutput, CommandError> {
        let ctx = CommandContext {
            server,
            permissions: server.permissions(),
            commands: self,
        };
        if !command.allow(source, &ctx) {
            debug!("{} may not run /{}", source.name(), command.name());
            return Err(CommandError::PermissionDenied {
                command: command.name().to_string(),
            });
        }

        let mut output = CommandOutput::new();
        command.run(source, args, &ctx, &mut output)?;
        info!("⌨️ {} ran /{} {}", source.name(), command.name(), args.join(" "));
        Ok(output)
    }

    /// Resolves and runs a command line.
    pub fn execute(
        &self,
        source: &dyn CommandSource,
        line: &str,
        server: &GameServer,
    ) -> Result<CommandOutput, CommandError> {
        let (command, args) = self.resolve(line)?;
        self.run(command.as_ref(), source, &args, server)
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|c| c.name()))
            .finish()
    }
}

/// Allow check shared by operator-only commands.
pub(crate) fn operator_only(source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
    ctx.is_operator(source)
}

/// First argument, or the command's usage as an error.
pub(crate) fn target<'a>(args: &'a [String], usage: &str) -> Result<&'a str, CommandError> {
    args.first()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CommandError::BadArguments {
            usage: usage.to_string(),
        })
}
