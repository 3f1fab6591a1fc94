//! MCP (Model Context Protocol) server.
//!
//! **Protocol** (`server`): JSON-RPC 2.0 dispatch shared by both transports,
//! plus the axum handlers for the HTTP transport (`POST /mcp`, `GET /health`).
//!
//! **stdio** (`stdio`): newline-delimited JSON-RPC over stdin/stdout.
//!
//! Protocol revision: 2024-11-05.

pub mod server;
pub mod stdio;
