//! Operator commands: stopping the server and managing operators and bans.

use super::{
    operator_only, target, Command, CommandContext, CommandError, CommandOutput, CommandSource,
};
use tracing::warn;

/// Reason shown to a player removed by `/ban`.
pub const BAN_REASON: &str = "Banned by admin";

/// Reason shown to a player removed by `/kick`, before any custom reason.
pub const KICK_REASON: &str = "Kicked by admin";

/// `/stop`: tells every player and requests shutdown.
pub struct StopCommand;

impl Command for StopCommand {
    fn name(&self) -> &str {
        "stop"
    }

    fn description(&self) -> &str {
        "Stops the server."
    }

    fn allow(&self, source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
        operator_only(source, ctx)
    }

    fn run(
        &self,
        source: &dyn CommandSource,
        _args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        ctx.server.broadcast("Stopping the server");
        ctx.server.request_shutdown();
        warn!("🛑 Shutdown requested by {}", source.name());
        output.print("Stopping the server");
        Ok(())
    }
}

/// `/op <player>`
pub struct OpCommand;

impl Command for OpCommand {
    fn name(&self) -> &str {
        "op"
    }

    fn description(&self) -> &str {
        "Grants operator status to a player."
    }

    fn usage(&self) -> &str {
        "<player>"
    }

    fn allow(&self, source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
        operator_only(source, ctx)
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        let name = target(args, self.usage())?;
        if let Some(player) = ctx.server.player(name) {
            player.send_message("You have been opped");
        }
        ctx.permissions.operators().add(name);
        output.print(format!("Opped: {}", name));
        Ok(())
    }
}

/// `/deop <player>`
pub struct DeopCommand;

impl Command for DeopCommand {
    fn name(&self) -> &str {
        "deop"
    }

    fn description(&self) -> &str {
        "Revokes operator status from a player."
    }

    fn usage(&self) -> &str {
        "<player>"
    }

    fn allow(&self, source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
        operator_only(source, ctx)
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        let name = target(args, self.usage())?;
        ctx.permissions.operators().remove(name);
        output.print(format!("De-opped: {}", name));
        Ok(())
    }
}

/// `/ban <player>`: lists the player and disconnects them if online.
pub struct BanCommand;

impl Command for BanCommand {
    fn name(&self) -> &str {
        "ban"
    }

    fn description(&self) -> &str {
        "Adds player to banlist."
    }

    fn usage(&self) -> &str {
        "<player>"
    }

    fn allow(&self, source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
        operator_only(source, ctx)
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        let name = target(args, self.usage())?;
        ctx.permissions.bans().add(name);
        if ctx.server.player(name).is_some() {
            if let Err(e) = ctx.server.disconnect(name, BAN_REASON) {
                warn!("Failed to disconnect banned player {}: {}", name, e);
            }
        }
        output.print(format!("Banned player {}", name));
        Ok(())
    }
}

/// `/unban <player>`
pub struct UnbanCommand;

impl Command for UnbanCommand {
    fn name(&self) -> &str {
        "unban"
    }

    fn description(&self) -> &str {
        "Removes player from banlist."
    }

    fn usage(&self) -> &str {
        "<player>"
    }

    fn allow(&self, source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
        operator_only(source, ctx)
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        let name = target(args, self.usage())?;
        ctx.permissions.bans().remove(name);
        output.print(format!("Unbanned player {}", name));
        Ok(())
    }
}

/// `/banlist`
pub struct BanListCommand;

impl Command for BanListCommand {
    fn name(&self) -> &str {
        "banlist"
    }

    fn description(&self) -> &str {
        "View all players banned from this server"
    }

    fn allow(&self, source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
        operator_only(source, ctx)
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        _args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        let names = ctx.permissions.bans().names();
        output.print(format!("There are {} banned players:", names.len()));
        output.print(names.join(", "));
        Ok(())
    }
}

/// `/kick <player> [reason...]`
pub struct KickCommand;

impl Command for KickCommand {
    fn name(&self) -> &str {
        "kick"
    }

    fn description(&self) -> &str {
        "Kicks a player from the server."
    }

    fn usage(&self) -> &str {
        "<player> [reason]"
    }

    fn allow(&self, source: &dyn CommandSource, ctx: &CommandContext<'_>) -> bool {
        operator_only(source, ctx)
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        let name = target(args, self.usage())?;
        if ctx.server.player(name).is_none() {
            return Err(CommandError::TargetNotFound(name.to_string()));
        }

        let mut reason = KICK_REASON.to_string();
        if args.len() > 1 {
            reason.push_str(": ");
            reason.push_str(&args[1..].join(" "));
        }
        ctx.server
            .disconnect(name, &reason)
            .map_err(|_| CommandError::TargetNotFound(name.to_string()))?;
        output.print(format!("Kicked player {}", name));
        Ok(())
    }
}
