//! stdio transport: one JSON-RPC message per line on stdin, one response per
//! line on stdout.
//!
//! Every request runs in its own task so a slow Trakt call never blocks the
//! next line. Responses funnel through a single writer task, which keeps
//! lines whole when replies finish out of order.

use std::io;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::server;
use crate::state::AppState;

/// Serve on the process stdin/stdout until stdin closes.
pub async fn run(state: AppState) -> io::Result<()> {
    tracing::info!("MCP server listening on stdio");
    serve(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Serve over an arbitrary line reader and writer. Returns after EOF, once
/// all in-flight requests have answered.
pub async fn serve<R, W>(state: AppState, reader: R, writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Value>();
    let writer_task = tokio::spawn(write_responses(writer, rx));

    let mut reader = reader;
    let mut in_flight = JoinSet::new();

    loop {
        // Raw bytes: a line that is not UTF-8 gets a parse error reply
        // instead of ending the session.
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let state = state.clone();
        let tx = tx.clone();
        in_flight.spawn(async move {
            let Some(reply) = server::handle_frame(&state, &line).await else {
                return;
            };
            if tx.send(reply).is_err() {
                tracing::debug!("stdout writer gone, dropping response");
            }
        });

        // Reap finished requests so the set does not grow unbounded.
        while in_flight.try_join_next().is_some() {}
    }

    tracing::info!("stdin closed, waiting for {} in-flight request(s)", in_flight.len());
    while in_flight.join_next().await.is_some() {}

    drop(tx);
    writer_task.await.map_err(io::Error::other)?
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Value>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        let mut line = reply.to_string();
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
