//! CDP transport - request/response correlation over one WebSocket
//!
//! Design decisions:
//! 1. Single WebSocket per page connection, shared by every primitive
//! 2. Correlation strictly by id - responses may arrive in any order
//! 3. Per-call deadline; a closing socket rejects every call in flight
//! 4. Event frames are dropped here - this layer is request/response only

use dashmap::DashMap;
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::protocol::*;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

#[derive(Error, Debug)]
pub enum CdpError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Protocol error for {method}: {message}")]
    Protocol {
        method: String,
        code: i32,
        message: String,
    },

    #[error("No response to {method} within {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("Connection closed")]
    Closed,

    #[error("CDP not connected")]
    NotConnected,
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, CdpError>;

/// The correlating WebSocket client for one page target
pub struct CdpClient {
    /// Monotonic request ID counter
    next_id: AtomicU64,

    /// In-flight requests waiting for a correlated response
    pending: Arc<DashMap<RequestId, oneshot::Sender<CdpResponse>>>,

    /// WebSocket write half, shared by concurrent senders
    sink: RwLock<WsSink>,

    /// Flipped by the reader task when the socket dies
    open: Arc<AtomicBool>,

    /// Per-call deadline
    call_timeout: Duration,
}

impl CdpClient {
    /// Connect to a page target's debugger WebSocket and spawn the
    /// reader task.
    pub async fn connect(ws_url: &str, call_timeout: Duration) -> Result<Arc<Self>> {
        let (ws_stream, _) = connect_async(ws_url).await?;
        let (sink, mut stream) = ws_stream.split();

        let client = Arc::new(Self {
            next_id: AtomicU64::new(1),
            pending: Arc::new(DashMap::new()),
            sink: RwLock::new(sink),
            open: Arc::new(AtomicBool::new(true)),
            call_timeout,
        });

        let pending = Arc::clone(&client.pending);
        let open = Arc::clone(&client.open);
        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                match msg {
                    Ok(Message::Text(text)) => dispatch(&pending, &text),
                    Ok(Message::Close(_)) => {
                        tracing::info!("CDP WebSocket closed by remote");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("CDP WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            open.store(false, Ordering::SeqCst);
            // Dropping the senders settles every call in flight with
            // Closed - nothing is left hanging on a dead socket.
            pending.clear();
        });

        Ok(client)
    }

    /// Send a command and wait for its correlated response.
    ///
    /// Fails fast with `NotConnected` when the socket is not open, with
    /// `Timeout` when no response arrives within the deadline, and with
    /// `Closed` when the socket dies while the call is in flight.
    pub async fn send(&self, method: impl Into<String>, params: Value) -> Result<Value> {
        let method = method.into();
        if !self.is_open() {
            return Err(CdpError::NotConnected);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let command = CdpCommand {
            id,
            method: method.clone(),
            params,
        };

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        let frame = serde_json::to_string(&command)?;
        {
            let mut sink = self.sink.write().await;
            if let Err(e) = sink.send(Message::Text(frame)).await {
                self.pending.remove(&id);
                self.open.store(false, Ordering::SeqCst);
                return Err(CdpError::WebSocket(e));
            }
        }

        let response = match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(CdpError::Closed),
            Err(_) => {
                self.pending.remove(&id);
                return Err(CdpError::Timeout {
                    method,
                    timeout: self.call_timeout,
                });
            }
        };

        if let Some(error) = response.error {
            return Err(CdpError::Protocol {
                method,
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Close the connection gracefully.
    pub async fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        let mut sink = self.sink.write().await;
        sink.close().await?;
        Ok(())
    }
}

/// Single inbound dispatch point. Malformed frames and stray ids are
/// logged and dropped - they must never take the connection down.
fn dispatch(pending: &DashMap<RequestId, oneshot::Sender<CdpResponse>>, text: &str) {
    let msg: CdpMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("CDP: dropping unparsable frame: {}", e);
            return;
        }
    };

    match msg {
        CdpMessage::Response(response) => {
            if let Some((_, tx)) = pending.remove(&response.id) {
                let _ = tx.send(response); // Receiver may have timed out
            } else {
                tracing::warn!("CDP: response for unknown request {}", response.id);
            }
        }
        CdpMessage::Event(event) => {
            tracing::trace!("CDP: ignoring event frame {}", event.method);
        }
    }
}
