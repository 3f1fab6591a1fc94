pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod mcp;
pub mod payload;
pub mod state;
pub mod tools;

use axum::Router;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// JSON-RPC frames are small; anything bigger is rejected before parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the HTTP transport router with the given state.
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a network port.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(mcp::server::health))
        .route("/mcp", post(mcp::server::mcp_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
