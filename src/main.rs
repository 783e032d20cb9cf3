//! Console API Demo
//!
//! Runs the HTTP API in the background and the interactive console menu in
//! the foreground. Choosing Exit, closing stdin, or sending Ctrl+C/SIGTERM
//! ends the process; in-flight requests are not drained.

use std::io;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console_api_demo::config::Config;
use console_api_demo::console::Console;
use console_api_demo::routes;
use console_api_demo::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of the menu on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "console_api_demo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;

    println!("Program is running with PID: {}", std::process::id());
    tracing::info!("Starting Console API Demo v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(config);
    let app = routes::build_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", state.config().server.host, state.config().server.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API server on {}", addr))?;
    tracing::info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server stopped: {}", e);
        }
    });

    // stdin reads block, so the console gets its own OS thread
    let (done_tx, done_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let result = Console::new(state, stdin.lock(), stdout.lock()).run();
            let _ = done_tx.send(result);
        })
        .context("Failed to start console thread")?;

    tokio::select! {
        result = done_rx => {
            if let Ok(Err(e)) = result {
                tracing::error!("Console failed: {}", e);
            }
        },
        _ = shutdown_signal() => {},
    }

    tracing::info!("Shutting down");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM");
        },
    }
}
