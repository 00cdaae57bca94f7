//! Newline-delimited JSON request loop.
//!
//! Each input line is one request:
//! `{"id": 1, "method": "list_tools"}` or
//! `{"id": 2, "method": "call_tool", "name": "get_incident", "arguments": {...}}`.
//! Each response is one line echoing the request `id`. Calls run concurrently,
//! so responses may arrive out of order.

use anyhow::Result;
use now_mcp_tools::Dispatcher;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
enum Request {
    ListTools {
        #[serde(default)]
        id: Option<Value>,
    },
    CallTool {
        #[serde(default)]
        id: Option<Value>,
        name: String,
        #[serde(default)]
        arguments: Value,
    },
}

/// Serves requests on stdin, writing responses to stdout.
pub async fn run(dispatcher: Arc<Dispatcher>) -> Result<()> {
    info!(
        "Serving {} tools from package '{}' on stdio",
        dispatcher.exposed().len(),
        dispatcher.exposed().package()
    );
    let stdin = BufReader::new(tokio::io::stdin());
    serve(dispatcher, stdin, tokio::io::stdout()).await
}

/// Runs until the reader hits EOF, then drains calls still in flight.
///
/// A line that cannot be decoded is answered with an `error` response. A read
/// failure ends input the same way EOF does.
pub async fn serve<R, W>(dispatcher: Arc<Dispatcher>, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    // `read_until` keeps partial input in `buf` when the other branch wins.
    let mut buf = Vec::new();

    loop {
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => {
                let eof = match read {
                    Ok(0) => true,
                    Ok(_) => false,
                    Err(e) => {
                        warn!("Failed to read request input: {}", e);
                        true
                    }
                };
                if !buf.is_empty() {
                    submit(&dispatcher, &tx, std::mem::take(&mut buf));
                }
                if eof {
                    break;
                }
            }
            Some(response) = rx.recv() => write_response(&mut writer, &response).await?,
        }
    }

    debug!("Input closed; waiting for in-flight calls");
    drop(tx);
    while let Some(response) = rx.recv().await {
        write_response(&mut writer, &response).await?;
    }
    Ok(())
}

fn submit(dispatcher: &Arc<Dispatcher>, tx: &mpsc::UnboundedSender<Value>, raw: Vec<u8>) {
    let line = match String::from_utf8(raw) {
        Ok(line) => line,
        Err(e) => {
            warn!("Rejected request line that is not valid UTF-8");
            let _ = tx.send(invalid_request(e));
            return;
        }
    };
    if line.trim().is_empty() {
        return;
    }

    let dispatcher = dispatcher.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let response = handle_line(&dispatcher, &line).await;
        let _ = tx.send(response);
    });
}

/// Answers one request line. Malformed requests get an `error` response.
pub async fn handle_line(dispatcher: &Dispatcher, line: &str) -> Value {
    match serde_json::from_str::<Request>(line) {
        Ok(Request::ListTools { id }) => json!({"id": id, "tools": dispatcher.list_tools()}),
        Ok(Request::CallTool {
            id,
            name,
            arguments,
        }) => {
            let result = dispatcher.invoke(&name, arguments).await;
            json!({"id": id, "result": result})
        }
        Err(e) => {
            warn!("Rejected malformed request: {}", e);
            invalid_request(e)
        }
    }
}

fn invalid_request(reason: impl fmt::Display) -> Value {
    json!({"id": null, "error": format!("invalid request: {}", reason)})
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Value) -> Result<()> {
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
