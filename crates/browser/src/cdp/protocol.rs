//! CDP wire types
//!
//! The frames exchanged over the page WebSocket, plus the payload shapes
//! the discovery HTTP endpoint returns. Keep them minimal - add
//! domain-specific types only when needed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request ID - monotonically increasing, never reused for the lifetime
/// of one connection, so a stale response can never settle the wrong
/// caller.
pub type RequestId = u64;

/// Target ID from the browser
pub type TargetId = String;

/// Outbound command frame: `{id, method, params}`
#[derive(Debug, Clone, Serialize)]
pub struct CdpCommand {
    pub id: RequestId,
    pub method: String,
    pub params: Value,
}

/// Response frame, correlated by `id`
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
    pub id: RequestId,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ProtocolError>,
}

/// Error payload the remote end attaches to a failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolError {
    #[serde(default)]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Unsolicited event frame (no request id)
#[derive(Debug, Clone, Deserialize)]
pub struct CdpEventFrame {
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Unified inbound frame - parsed at the single dispatch point
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CdpMessage {
    Response(CdpResponse),
    Event(CdpEventFrame),
}

/// A debuggable browsing context listed by the discovery endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub id: TargetId,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

impl Target {
    /// Only page-typed targets are usable for browsing primitives.
    pub fn is_page(&self) -> bool {
        self.kind == "page"
    }
}

/// `/json/version` metadata - the health probe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}
