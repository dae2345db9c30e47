//! Connection establishment and target selection
//!
//! One live session against exactly one page target. Establishment runs
//! the discovery fallback chain (create a fresh target, else reuse a
//! listed one), opens the WebSocket and best-effort enables the baseline
//! protocol domains.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::cdp::protocol::Target;
use crate::cdp::CdpClient;
use crate::discovery::DiscoveryClient;
use crate::error::{Error, Result};

/// Socket lifecycle. There is no automatic reconnect: Disconnected only
/// leaves on the next explicit ensure-connected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// A live session against one page target
pub struct Connection {
    /// Correlation id for logs and events.
    pub id: Uuid,
    pub target: Target,
    client: Arc<CdpClient>,
}

impl Connection {
    /// Discovery fallback chain, socket open, baseline domain enabling.
    pub async fn establish(
        discovery: &DiscoveryClient,
        call_timeout: Duration,
    ) -> Result<Self> {
        let target = match discovery.create_target().await {
            Ok(target) => target,
            Err(e) => {
                tracing::info!(
                    "CDP: could not create a new target ({}), reusing an existing one",
                    e
                );
                let list = discovery.list_targets().await?;
                pick_target(list).ok_or(Error::NoTarget)?
            }
        };

        let ws_url = target.web_socket_debugger_url.clone().ok_or(Error::NoTarget)?;
        // A target advertising a malformed debugger URL is as unusable
        // as one advertising none.
        if Url::parse(&ws_url).is_err() {
            return Err(Error::NoTarget);
        }

        let client = CdpClient::connect(&ws_url, call_timeout).await?;

        let connection = Self {
            id: Uuid::now_v7(),
            target,
            client,
        };
        connection.enable_baseline_domains().await;
        Ok(connection)
    }

    /// Page lifecycle and script runtime. Most primitives still work
    /// without them, so failure here is logged, never fatal.
    async fn enable_baseline_domains(&self) {
        for method in ["Page.enable", "Runtime.enable"] {
            if let Err(e) = self.client.send(method, json!({})).await {
                tracing::warn!("CDP: {} failed: {}", method, e);
            }
        }
    }

    pub fn client(&self) -> &Arc<CdpClient> {
        &self.client
    }

    pub fn is_open(&self) -> bool {
        self.client.is_open()
    }

    pub async fn close(&self) {
        if let Err(e) = self.client.close().await {
            tracing::debug!("CDP: close failed (socket may already be down): {}", e);
        }
    }
}

/// Fallback selection over `/json/list`: prefer a page-typed entry with
/// a debugger URL regardless of order, else the first entry that has
/// one.
pub(crate) fn pick_target(targets: Vec<Target>) -> Option<Target> {
    let mut first_usable = None;
    for target in targets {
        if target.web_socket_debugger_url.is_none() {
            continue;
        }
        if target.is_page() {
            return Some(target);
        }
        if first_usable.is_none() {
            first_usable = Some(target);
        }
    }
    first_usable
}
