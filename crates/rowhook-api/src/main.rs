//! rowhook CLI and webhook receiver entry point.
//!
//! Binary name: `rowhook`
//!
//! Parses CLI arguments, initializes the trigger state store and Baserow
//! client, then dispatches to a command handler or starts the receiver.

mod cli;
mod http;
mod sink;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;
use tokio::sync::mpsc;

use rowhook_core::lifecycle::Activation;
use rowhook_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "rowhook", &mut std::io::stdout());
        return Ok(());
    }

    let serving = matches!(cli.command, Commands::Serve { .. });
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if serving => "info",
        0 => "warn",
        1 => "info,rowhook=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // `status` only reads local state
    let require_credentials = !matches!(cli.command, Commands::Status { .. });
    let state = AppState::init(require_credentials).await?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_activate,
        } => serve(state, &host, port, !no_activate, cli.quiet).await?,

        Commands::Activate { trigger } => {
            cli::trigger::activate(&state, &trigger, cli.json).await?;
        }

        Commands::Deactivate { trigger } => {
            cli::trigger::deactivate(&state, &trigger, cli.json).await?;
        }

        Commands::Status { trigger } => {
            cli::trigger::status(&state, trigger.as_deref(), cli.json).await?;
        }

        Commands::Databases => {
            cli::resource::databases(&state, cli.json).await?;
        }

        Commands::Tables { database_id } => {
            cli::resource::tables(&state, &database_id, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Activate configured triggers, then receive deliveries until shutdown.
///
/// Subscriptions are left in place on shutdown so they survive restarts.
async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    activate: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    if activate {
        for trigger in &state.config.triggers {
            match state.activate(&trigger.name).await? {
                Activation::AlreadyActive { subscription_id } => {
                    tracing::info!(trigger = %trigger.name, %subscription_id, "webhook already registered");
                }
                Activation::Registered(registration) => {
                    tracing::info!(
                        trigger = %trigger.name,
                        subscription_id = %registration.subscription_id,
                        granted_events = ?registration.granted_events,
                        "webhook registered"
                    );
                }
            }
        }
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let sink = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        sink::run_sink(events_rx, &mut stdout).await
    });

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if !quiet {
        eprintln!(
            "  {} rowhook listening on {}",
            style("⚡").bold(),
            style(format!("http://{addr}")).cyan()
        );
        eprintln!("  {}", style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state.webhook_state(events_tx));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let written = sink.await?;
    tracing::info!(events = written, "receiver stopped");
    if !quiet {
        eprintln!("\n  Server stopped.");
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
