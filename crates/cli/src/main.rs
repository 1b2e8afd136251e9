//! CLI entrypoint and subcommand orchestration.

mod config;
mod tui;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::Config;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Top-level command-line arguments for studychat.
#[derive(Parser)]
#[command(name = "studychat")]
#[command(about = "Streaming study assistant chat", version = "0.1.0")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug logging to ~/.studychat/logs
    #[arg(long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// CLI subcommands available in the application.
#[derive(Subcommand)]
enum Commands {
    /// Start the full-screen chat TUI (default when no subcommand is given)
    Tui {
        /// Relay endpoint URL override
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Run the relay endpoint
    Serve {
        /// Bind address override (host:port)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine effective command (default to Tui if none given)
    let command = cli.command.unwrap_or(Commands::Tui { endpoint: None });
    let is_tui = matches!(command, Commands::Tui { .. });

    // Initialize tracing — suppress console output in TUI mode to avoid
    // corrupting the display. When --debug is passed, write debug-level logs
    // to ~/.studychat/logs/debug.YYYY-MM-DD.log with daily rotation.
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // WorkerGuard must outlive main() so buffered file writes are flushed on exit.
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>;

    let debug_writer = if cli.debug {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let log_dir = std::path::PathBuf::from(home).join(".studychat").join("logs");
        std::fs::create_dir_all(&log_dir).ok();
        let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        _file_guard = Some(guard);
        Some(writer)
    } else {
        _file_guard = None;
        None
    };

    match (is_tui, debug_writer) {
        (true, Some(writer)) => {
            let console = fmt::layer()
                .with_writer(std::io::sink)
                .with_target(false)
                .with_filter(console_filter);
            let file = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
            tracing_subscriber::registry().with(console).with(file).init();
        }
        (true, None) => {
            fmt()
                .with_env_filter(console_filter)
                .with_writer(std::io::sink)
                .with_target(false)
                .init();
        }
        (false, Some(writer)) => {
            let console = fmt::layer().with_target(false).with_filter(console_filter);
            let file = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
            tracing_subscriber::registry().with(console).with(file).init();
        }
        (false, None) => {
            fmt()
                .with_env_filter(console_filter)
                .with_target(false)
                .init();
        }
    }

    // Load config
    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Failed to load config ({e}), using defaults");
        Config::default()
    });

    match command {
        Commands::Tui { endpoint } => cmd_tui(config, endpoint).await,
        Commands::Serve { bind } => cmd_serve(config, bind).await,
    }
}

/// Runs the relay endpoint until ctrl-c.
async fn cmd_serve(config: Config, bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or(config.relay.bind);
    let backend = Arc::new(relay::OpenAiBackend::with_base_url(
        config.relay.api_key,
        config.relay.api_base,
    ));

    info!(%bind, "Starting relay");
    relay::serve(&bind, backend).await?;
    Ok(())
}

/// Runs the full-screen chat TUI.
async fn cmd_tui(config: Config, endpoint: Option<String>) -> anyhow::Result<()> {
    let endpoint = endpoint.unwrap_or(config.client.endpoint);
    tui::run_tui(endpoint).await
}
