//! MCP server: exposes the Trakt tools over JSON-RPC 2.0.
//!
//! Supported methods:
//! - `initialize`: server info + capabilities
//! - `notifications/*`: client acks (no response)
//! - `ping`: liveness
//! - `tools/list`: every registered tool with its input schema
//! - `tools/call`: execute a tool

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "Trakt.tv MCP Server";
pub const SESSION_HEADER: &str = "mcp-session-id";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

// ── Dispatch ────────────────────────────────────────────────────────────────

/// Handle one decoded JSON-RPC message.
///
/// Returns `None` for notifications (messages without an `id`), which never
/// get a response.
pub async fn handle_message(state: &AppState, message: Value) -> Option<Value> {
    let Some(request) = message.as_object() else {
        return Some(json_rpc_error(Value::Null, INVALID_REQUEST, "Invalid Request"));
    };

    let id = request.get("id").cloned();
    let Some(method) = request.get("method").and_then(|m| m.as_str()) else {
        return id.map(|id| json_rpc_error(id, INVALID_REQUEST, "Missing 'method'"));
    };

    let Some(id) = id else {
        tracing::debug!(method = %method, "MCP notification");
        return None;
    };

    tracing::debug!(method = %method, "MCP request");

    let response = match method {
        "initialize" => handle_initialize(&id),
        "ping" => json_rpc_result(&id, json!({})),
        "tools/list" => handle_tools_list(state, &id),
        "tools/call" => handle_tools_call(state, request.get("params"), &id).await,
        _ => json_rpc_error(id, METHOD_NOT_FOUND, &format!("Method not found: {}", method)),
    };
    Some(response)
}

/// Decode and handle one raw frame. Malformed JSON yields a `-32700` error.
pub async fn handle_frame(state: &AppState, frame: &[u8]) -> Option<Value> {
    match parse_frame(frame) {
        Ok(message) => handle_message(state, message).await,
        Err(reply) => Some(reply),
    }
}

/// Parse a raw frame, or build the `-32700` reply for it.
fn parse_frame(frame: &[u8]) -> Result<Value, Value> {
    serde_json::from_slice::<Value>(frame).map_err(|e| {
        tracing::warn!("MCP parse error: {}", e);
        json_rpc_error(Value::Null, PARSE_ERROR, &format!("Parse error: {}", e))
    })
}

// ── initialize ──────────────────────────────────────────────────────────────

fn handle_initialize(id: &Value) -> Value {
    json_rpc_result(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

// ── tools/list ──────────────────────────────────────────────────────────────

fn handle_tools_list(state: &AppState, id: &Value) -> Value {
    let tools: Vec<Value> = state.registry.iter().map(|t| t.to_mcp()).collect();
    json_rpc_result(id, json!({ "tools": tools }))
}

// ── tools/call ──────────────────────────────────────────────────────────────

async fn handle_tools_call(state: &AppState, params: Option<&Value>, id: &Value) -> Value {
    let tool_name = params
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("");

    if tool_name.is_empty() {
        return json_rpc_error(id.clone(), INVALID_PARAMS, "Missing 'name' in params");
    }

    let arguments = match params.and_then(|p| p.get("arguments")) {
        None | Some(Value::Null) => json!({}),
        Some(args @ Value::Object(_)) => args.clone(),
        Some(_) => {
            return json_rpc_error(id.clone(), INVALID_PARAMS, "'arguments' must be an object");
        }
    };

    tracing::info!(tool = %tool_name, "MCP tools/call");

    match state
        .registry
        .call(state.client.clone(), tool_name, arguments)
        .await
    {
        Some(output) => json_rpc_result(
            id,
            json!({
                "content": [{ "type": "text", "text": output.text }],
                "isError": output.is_error
            }),
        ),
        None => json_rpc_error(
            id.clone(),
            INVALID_PARAMS,
            &format!("Unknown tool: {}", tool_name),
        ),
    }
}

// ── HTTP transport ──────────────────────────────────────────────────────────

/// `POST /mcp`: one JSON-RPC message per request.
///
/// Notifications are acknowledged with `202 Accepted` and no body. A
/// successful `initialize` carries a fresh `Mcp-Session-Id` header.
pub async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let message = match parse_frame(&body) {
        Ok(message) => message,
        Err(reply) => return (StatusCode::OK, Json(reply)).into_response(),
    };
    let is_initialize = message.get("method").and_then(|m| m.as_str()) == Some("initialize");

    let Some(reply) = handle_message(&state, message).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let mut response = (StatusCode::OK, Json(reply)).into_response();
    if is_initialize {
        let session_id = uuid::Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&session_id) {
            tracing::info!(session_id = %session_id, "MCP session started");
            response.headers_mut().insert(SESSION_HEADER, value);
        }
    }
    response
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub tools: usize,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: if state.client.is_closed() { "closing" } else { "ok" },
        name: SERVER_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        tools: state.registry.len(),
    })
}

// ── JSON-RPC helpers ────────────────────────────────────────────────────────

fn json_rpc_result(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

pub fn json_rpc_error(id: Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}
