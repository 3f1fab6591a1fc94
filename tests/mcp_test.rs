// HTTP transport integration tests: the real router, driven with `oneshot`,
// backed by a TraktClient pointed at a scripted local server.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use trakt_mcp::client::TraktClient;
use trakt_mcp::client::retry::RetryPolicy;
use trakt_mcp::config::{ClientConfig, Credentials};
use trakt_mcp::create_router;
use trakt_mcp::state::AppState;

fn app_for(base_url: &str) -> Router {
    let creds = Credentials {
        client_id: "cid".to_string(),
        access_token: "tok".to_string(),
        api_version: "2".to_string(),
    };
    let config = ClientConfig::new(creds)
        .with_base_url(base_url)
        .with_retry(RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(5),
            multiplier: 2,
            max_backoff: Duration::from_millis(20),
        });
    let client = Arc::new(TraktClient::new(config).unwrap());
    create_router(AppState::new(client))
}

fn app() -> Router {
    app_for("http://127.0.0.1:9")
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn rpc(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

/// Collect a response body into a `serde_json::Value`.
async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(app: Router, message: Value) -> Value {
    let response = app.oneshot(rpc(message.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn health_reports_ok_and_tool_count() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["name"], "Trakt.tv MCP Server");
    assert_eq!(json["tools"], 9);
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn initialize_returns_session_header() {
    let response = app()
        .oneshot(rpc(
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let session = response
        .headers()
        .get("mcp-session-id")
        .expect("session header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(session.len(), 36);

    let json = body_json(response).await;
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(json["result"]["serverInfo"]["name"], "Trakt.tv MCP Server");
}

#[tokio::test]
async fn notification_is_accepted_without_body() {
    let response = app()
        .oneshot(rpc(
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn tools_list_advertises_every_tool() {
    let json = call(app(), json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    let tools = json["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 9);
    for tool in tools {
        assert!(tool["name"].is_string());
        assert!(!tool["description"].as_str().unwrap().is_empty());
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
    let season = tools
        .iter()
        .find(|t| t["name"] == "get_show_season_episodes")
        .unwrap();
    assert_eq!(season["inputSchema"]["required"], json!(["show_id", "season"]));
}

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let response = app().oneshot(rpc("{oops")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], -32700);
    assert!(json["id"].is_null());
}

#[tokio::test]
async fn truncated_initialize_gets_parse_error_and_no_session() {
    let response = app()
        .oneshot(rpc(r#"{"jsonrpc":"2.0","id":1,"method":"initialize""#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("mcp-session-id").is_none());
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], -32700);
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let json = call(app(), json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})).await;
    assert_eq!(json["error"]["code"], -32601);
    assert_eq!(json["id"], 3);
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let json = call(
        app(),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "get_movies"}}),
    )
    .await;
    assert_eq!(json["error"]["code"], -32602);
}

#[tokio::test]
async fn bad_arguments_yield_error_result() {
    let json = call(
        app(),
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "get_show_season_episodes", "arguments": {"show_id": "1388", "season": -1}}
        }),
    )
    .await;
    assert_eq!(json["result"]["isError"], true);
    let text = json["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("season"));
}

#[tokio::test]
async fn tool_call_formats_trakt_response() {
    let trakt = Router::new().route(
        "/shows/trending",
        get(|| async {
            Json(json!([
                {"watchers": 12345, "show": {"title": "The Bear", "year": 2022, "ids": {"trakt": 1}}},
                {"watchers": 900, "show": {"title": "Severance", "year": 2022, "ids": {"trakt": 2}}}
            ]))
        }),
    );
    let base = spawn(trakt).await;

    let json = call(
        app_for(&base),
        json!({
            "jsonrpc": "2.0",
            "id": 6,
            "method": "tools/call",
            "params": {"name": "get_trending_shows", "arguments": {"limit": 2}}
        }),
    )
    .await;
    assert_eq!(json["result"]["isError"], false);
    let text = json["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("1. **The Bear** (2022)"));
    assert!(text.contains("12,345"));
    assert!(text.contains("2. **Severance**"));
}

#[tokio::test]
async fn trakt_auth_failure_is_error_result_not_protocol_error() {
    let trakt = Router::new().route(
        "/sync/watchlist/shows",
        get(|| async { StatusCode::UNAUTHORIZED }),
    );
    let base = spawn(trakt).await;

    let json = call(
        app_for(&base),
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": "get_watchlist"}
        }),
    )
    .await;
    assert!(json.get("error").is_none());
    assert_eq!(json["result"]["isError"], true);
    let text = json["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("TRAKT_ACCESS_TOKEN"));
}
