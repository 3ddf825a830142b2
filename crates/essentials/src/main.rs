//! Main application entry point for the essentials server.
//!
//! Loads configuration and permission lists, builds the server with its
//! default session hooks and commands, then runs the console until a signal
//! or `/stop` ends it.

mod cli;
mod config;
mod console;
mod hooks;
mod logging;
mod signals;

use anyhow::{anyhow, Context, Result};
use cli::CliArgs;
use config::AppConfig;
use game_server::{create_server, CommandRegistry, GameServer};
use hooks::DiagnosticsBoard;
use permission::Permissions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const STATS_INTERVAL: Duration = Duration::from_secs(60);
const SAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Main application struct holding the configured server.
pub struct Application {
    config: AppConfig,
    server: Arc<GameServer>,
    commands: Arc<CommandRegistry>,
    diagnostics: Arc<DiagnosticsBoard>,
}

impl Application {
    /// Loads configuration, applies CLI overrides and sets up logging.
    pub async fn new(args: CliArgs) -> Result<Self> {
        // Configuration is loaded before logging exists.
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(data_dir) = args.data_dir {
            config.data_dir = data_dir.to_string_lossy().to_string();
        }
        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        logging::setup_logging(&config.logging)?;

        let permissions = Permissions::load(&config.data_dir(), &config.permissions)
            .await
            .context("loading permission lists")?;
        let server = create_server(config.to_server_config(), Arc::new(permissions));
        let diagnostics = hooks::install(&server);
        let commands = Arc::new(CommandRegistry::with_defaults());

        info!(
            "🚀 {} v{} | Config: {} | Data: {}",
            config.server.name,
            env!("CARGO_PKG_VERSION"),
            args.config_path.display(),
            config.data_dir
        );

        Ok(Self {
            config,
            server,
            commands,
            diagnostics,
        })
    }

    /// Runs until a termination signal or `/stop`, then shuts down cleanly.
    pub async fn run(self) -> Result<()> {
        info!("📋 Configuration Summary:");
        info!("  👥 Max players: {}", self.config.server.max_players);
        info!("  📂 Operators: {}", self.server.permissions().operators().path().display());
        info!("  🚫 Bans: {}", self.server.permissions().bans().path().display());
        info!("  ⌨️ Commands: {}", self.commands.len());

        let console_handle = {
            let server = Arc::clone(&self.server);
            let commands = Arc::clone(&self.commands);
            tokio::spawn(async move {
                let input = tokio::io::BufReader::new(tokio::io::stdin());
                let output = tokio::io::stdout();
                if let Err(e) = console::run_console(input, output, server, commands).await {
                    error!("❌ Console error: {}", e);
                }
            })
        };

        let monitoring_handle = {
            let server = Arc::clone(&self.server);
            let diagnostics = Arc::clone(&self.diagnostics);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(STATS_INTERVAL);
                interval.tick().await;
                let mut last_dispatches = 0u64;

                loop {
                    interval.tick().await;

                    let stats = server.handler_stats();
                    // Sessions that left take their counters with them.
                    let dispatches_this_period = stats.dispatches.saturating_sub(last_dispatches);
                    last_dispatches = stats.dispatches;

                    info!(
                        "📊 System Health - {} players | {} events/min | {} handler memberships | {} failures",
                        server.player_count(),
                        dispatches_this_period,
                        stats.memberships,
                        stats.handler_failures
                    );
                    if let Some(fps) = diagnostics.average_fps() {
                        info!(
                            "📈 Average client fps: {:.1} over {} players",
                            fps,
                            diagnostics.len()
                        );
                    }
                }
            })
        };

        // Player commands change the lists outside the console.
        let save_handle = {
            let server = Arc::clone(&self.server);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(SAVE_INTERVAL);
                loop {
                    interval.tick().await;
                    if let Err(e) = server.save_permissions().await {
                        error!("❌ Failed to save permission lists: {}", e);
                    }
                }
            })
        };

        info!("✅ Server is now running! Type 'help' for commands, Ctrl+C or 'stop' to shut down");

        let mut shutdown = self.server.subscribe_shutdown();
        tokio::select! {
            result = signals::wait_for_termination() => match result {
                Ok(signal) => info!("📡 Received {}", signal),
                Err(e) => warn!("⚠️ Signal handling failed: {}", e),
            },
            _ = shutdown.wait_for(|stopping| *stopping) => {
                info!("🛑 Stop command received");
            }
        }

        info!("🛑 Initiating graceful shutdown...");
        monitoring_handle.abort();
        save_handle.abort();
        console_handle.abort();

        self.server.shutdown().await?;

        info!("👋 Server stopped after {}s", self.server.uptime().as_secs());
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = CliArgs::parse();
    let app = match Application::new(args).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("❌ Failed to start application: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run().await {
        error!("❌ Application error: {:?}", e);
        std::process::exit(1);
    }
    // A pending stdin read would keep the runtime from dropping.
    std::process::exit(0);
}
