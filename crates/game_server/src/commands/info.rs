//! Informational commands.

use super::{operator_only, Command, CommandContext, CommandError, CommandOutput, CommandSource};

/// `/help [command]`, alias `/?`
pub struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Provides help/list of commands."
    }

    fn aliases(&self) -> &[&str] {
        &["?"]
    }

    fn usage(&self) -> &str {
        "[command]"
    }

    fn run(
        &self,
        source: &dyn CommandSource,
        args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        if let Some(name) = args.first() {
            let command = ctx
                .commands
                .get(name)
                .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;
            output.print(format!("/{} {}", command.name(), command.usage()).trim_end().to_string());
            output.print(command.description());
            if !command.aliases().is_empty() {
                output.print(format!("Aliases: {}", command.aliases().join(", ")));
            }
            return Ok(());
        }

        for command in ctx.commands.commands() {
            if command.allow(source, ctx) {
                output.print(format!("/{}: {}", command.name(), command.description()));
            }
        }
        Ok(())
    }
}

/// `/version`, aliases `/ver` and `/about`
pub struct VersionCommand;

impl Command for VersionCommand {
    fn name(&self) -> &str {
        "version"
    }

    fn description(&self) -> &str {
        "Gets the version of this server in use."
    }

    fn aliases(&self) -> &[&str] {
        &["ver", "about"]
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        _args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        output.print(format!("This server is running {}", ctx.server.config().name));
        output.print(format!("Server version: {}", env!("CARGO_PKG_VERSION")));
        output.print(format!(
            "ARCH/OS: {}/{}",
            std::env::consts::ARCH,
            std::env::consts::OS
        ));
        Ok(())
    }
}

/// `/status`, alias `/stat`
pub struct StatusCommand;

impl Command for StatusCommand {
    fn name(&self) -> &str {
        "status"
    }

    fn description(&self) -> &str {
        "Reads back the server's performance."
    }

    fn aliases(&self) -> &[&str] {
        &["stat"]
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
        let stats = ctx.server.handler_stats();
        output.print(format!("Uptime: {}s", ctx.server.uptime().as_secs()));
        output.print(format!(
            "Players: {}/{}",
            ctx.server.player_count(),
            ctx.server.config().max_players
        ));
        output.print(format!("Handler memberships: {}", stats.memberships));
        output.print(format!("Events dispatched: {}", stats.dispatches));
        output.print(format!(
            "Handler failures: {} ({} panics)",
            stats.handler_failures, stats.handler_panics
        ));
        Ok(())
    }
}

/// `/list`
pub struct ListCommand;

impl Command for ListCommand {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "Lists all online players"
    }

    fn run(
        &self,
        _source: &dyn CommandSource,
        _args: &[String],
        ctx: &CommandContext<'_>,
        output: &mut CommandOutput,
    ) -> Result<(), CommandError> {
        let names: Vec<String> = ctx
            .server
            .online_players()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        output.print(format!(
            "There are {}/{} players online:",
            names.len(),
            ctx.server.config().max_players
        ));
        output.print(names.join(", "));
        Ok(())
    }
}
