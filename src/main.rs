use tracing_subscriber::EnvFilter;

use trakt_mcp::config::{Settings, Transport};
use trakt_mcp::mcp::stdio;
use trakt_mcp::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let (settings, state) = match Settings::from_env()
        .and_then(|settings| AppState::from_settings(&settings).map(|state| (settings, state)))
    {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    let client = state.client.clone();

    tracing::info!(
        tools = state.registry.len(),
        transport = ?settings.transport,
        "Trakt.tv MCP Server v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let result = serve(state, settings.transport).await;

    // Runs on every exit path: clean EOF, signal, or transport failure.
    client.close();

    if let Err(e) = &result {
        tracing::error!("Server stopped with error: {:#}", e);
    } else {
        tracing::info!("Server stopped");
    }
    result
}

async fn serve(state: AppState, transport: Transport) -> anyhow::Result<()> {
    match transport {
        Transport::Stdio => {
            tokio::select! {
                res = stdio::run(state) => res?,
                _ = shutdown_signal() => {},
            }
        }
        Transport::Http { port } => {
            let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("MCP server listening on http://{}/mcp", addr);

            axum::serve(listener, trakt_mcp::create_router(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    Ok(())
}

/// Logs go to stderr: on the stdio transport stdout carries protocol frames only.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            std::env::var("LOG_LEVEL")
                .map_err(anyhow::Error::from)
                .and_then(|level| EnvFilter::try_new(level.to_lowercase()).map_err(Into::into))
        })
        .unwrap_or_else(|_| "info".into());

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
