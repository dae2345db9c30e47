//! In-process mock endpoints for lifecycle and primitive tests
//!
//! A discovery HTTP responder plus a WebSocket RPC endpoint that answers
//! every command frame through a caller-supplied `(method) -> result`
//! function. No real browser involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// WebSocket endpoint answering every command with
/// `{id, result: respond(method)}`. Accepts any number of connections.
pub(crate) async fn spawn_rpc_ws<F>(respond: F) -> String
where
    F: Fn(&str) -> Value + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else { continue };
                    let Ok(frame) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    let method = frame["method"].as_str().unwrap_or("").to_string();
                    let reply = json!({ "id": frame["id"], "result": respond(&method) });
                    if ws.send(Message::Text(reply.to_string())).await.is_err() {
                        break;
                    }
                }
            });
        }
    });
    format!("ws://{}/devtools/page/mock", addr)
}

/// Discovery HTTP endpoint pointing every target at `ws_url`. With
/// `create_fails` the create-target route answers a non-JSON body, so
/// callers exercise the list-targets fallback; the listing deliberately
/// puts a non-page entry first. Returns (port, request counter).
pub(crate) async fn spawn_discovery_http(
    create_fails: bool,
    ws_url: String,
) -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            counter.fetch_add(1, Ordering::SeqCst);

            let body = if request.starts_with("GET /json/new") {
                if create_fails {
                    "create-target unsupported".to_string()
                } else {
                    json!({
                        "id": "fresh",
                        "type": "page",
                        "title": "",
                        "url": "about:blank",
                        "webSocketDebuggerUrl": ws_url
                    })
                    .to_string()
                }
            } else if request.starts_with("GET /json/list") {
                json!([
                    { "id": "bg", "type": "background_page", "webSocketDebuggerUrl": ws_url },
                    { "id": "tab", "type": "page", "webSocketDebuggerUrl": ws_url }
                ])
                .to_string()
            } else if request.starts_with("GET /json/version") {
                json!({
                    "Browser": "MockBrowser/1.0",
                    "Protocol-Version": "1.3",
                    "User-Agent": "mock",
                    "webSocketDebuggerUrl": ws_url
                })
                .to_string()
            } else {
                "not found".to_string()
            };

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });

    (port, hits)
}
