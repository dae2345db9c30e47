//! Browser controller - the caller-facing browsing primitives
//!
//! An explicitly constructed, injectable service object: no process-wide
//! instance. One active connection at a time, established lazily on the
//! first primitive call and re-established by the next call after the
//! socket drops.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::cdp::client::CdpError;
use crate::cdp::protocol::VersionInfo;
use crate::cdp::CdpClient;
use crate::connection::{Connection, ConnectionState};
use crate::discovery::DiscoveryClient;
use crate::error::{Error, Result};
use crate::events::{BrowserEvent, EventBus};
use crate::launch::LaunchConfig;

/// Size assumed when layout metrics come back without a usable viewport.
const FALLBACK_VIEWPORT: (f64, f64) = (1200.0, 800.0);

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub host: String,
    pub port: u16,
    /// Per-RPC deadline. A call with no response by then fails with a
    /// timeout instead of leaking its pending entry.
    pub call_timeout: Duration,
    pub launch: LaunchConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9222,
            call_timeout: Duration::from_secs(30),
            launch: LaunchConfig::default(),
        }
    }
}

/// Which viewport measurement a normalized coordinate resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportBasis {
    /// Content size, with the 1200x800 fallback when metrics are
    /// missing.
    ContentSize,
    /// Layout viewport (the visible area).
    LayoutViewport,
}

/// Browser controller - manages the connection and exposes primitives
pub struct BrowserController {
    pub config: ControllerConfig,
    pub event_bus: EventBus,
    discovery: DiscoveryClient,
    connection: RwLock<Option<Connection>>,
    state: RwLock<ConnectionState>,
}

impl BrowserController {
    pub fn new(config: ControllerConfig) -> Self {
        let discovery = DiscoveryClient::new(&config.host, config.port);
        Self {
            config,
            event_bus: EventBus::new(),
            discovery,
            connection: RwLock::new(None),
            state: RwLock::new(ConnectionState::Disconnected),
        }
    }

    /// Idempotent connect: reuse the open connection, else run the full
    /// discovery + socket-open sequence.
    pub async fn ensure_connected(&self) -> Result<()> {
        if let Some(connection) = self.connection.read().await.as_ref() {
            if connection.is_open() {
                return Ok(());
            }
        }

        let mut slot = self.connection.write().await;
        // Re-check under the write lock: another caller may have
        // reconnected while we waited.
        if let Some(connection) = slot.as_ref() {
            if connection.is_open() {
                return Ok(());
            }
        }
        if slot.take().is_some() {
            self.event_bus.publish(BrowserEvent::Disconnected);
        }

        *self.state.write().await = ConnectionState::Connecting;
        match Connection::establish(&self.discovery, self.config.call_timeout).await {
            Ok(connection) => {
                tracing::info!(
                    target_id = %connection.target.id,
                    connection = %connection.id,
                    "CDP connected"
                );
                self.event_bus.publish(BrowserEvent::Connected {
                    target_id: connection.target.id.clone(),
                });
                *slot = Some(connection);
                *self.state.write().await = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                *self.state.write().await = ConnectionState::Disconnected;
                tracing::warn!("CDP connection failed: {}", e);
                Err(match e {
                    // Socket-open failures become the actionable hint;
                    // discovery and no-target keep their identity.
                    Error::Cdp(CdpError::WebSocket(inner)) => {
                        tracing::debug!("WebSocket open failed: {}", inner);
                        Error::NotConnected(self.config.port)
                    }
                    other => other,
                })
            }
        }
    }

    /// Current lifecycle state; reports Disconnected as soon as the
    /// socket is gone, before the next ensure-connected observes it.
    pub async fn state(&self) -> ConnectionState {
        let state = *self.state.read().await;
        if state == ConnectionState::Connected {
            let open = self
                .connection
                .read()
                .await
                .as_ref()
                .map(Connection::is_open)
                .unwrap_or(false);
            if !open {
                return ConnectionState::Disconnected;
            }
        }
        state
    }

    /// Handle to the open transport, connecting first if needed.
    pub(crate) async fn client(&self) -> Result<Arc<CdpClient>> {
        self.ensure_connected().await?;
        let slot = self.connection.read().await;
        let connection = slot
            .as_ref()
            .ok_or(Error::NotConnected(self.config.port))?;
        Ok(Arc::clone(connection.client()))
    }

    /// Health probe against the discovery endpoint; needs no socket.
    pub async fn version(&self) -> Result<VersionInfo> {
        self.discovery.version().await
    }

    /// Close the active connection. The next primitive call reconnects.
    pub async fn close(&self) {
        if let Some(connection) = self.connection.write().await.take() {
            connection.close().await;
            self.event_bus.publish(BrowserEvent::Disconnected);
        }
        *self.state.write().await = ConnectionState::Disconnected;
    }

    /// Navigate the page. URL validation is the caller's concern.
    pub async fn navigate(&self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        let client = self.client().await?;
        self.event_bus
            .publish(BrowserEvent::NavigationStarted { url: url.clone() });
        client.send("Page.navigate", json!({ "url": url })).await?;
        self.event_bus
            .publish(BrowserEvent::NavigationComplete { url });
        Ok(())
    }

    /// PNG screenshot as a base64 payload; `None` when the browser
    /// returned an empty result.
    pub async fn screenshot(&self) -> Result<Option<String>> {
        let client = self.client().await?;
        let result = client
            .send("Page.captureScreenshot", json!({ "format": "png" }))
            .await?;
        Ok(result.get("data").and_then(Value::as_str).map(str::to_owned))
    }

    async fn viewport_size(&self, client: &CdpClient, basis: ViewportBasis) -> Result<(f64, f64)> {
        let metrics = client.send("Page.getLayoutMetrics", json!({})).await?;
        let section = match basis {
            ViewportBasis::ContentSize => &metrics["contentSize"],
            ViewportBasis::LayoutViewport => &metrics["layoutViewport"],
        };
        let width = section
            .get("width")
            .or_else(|| section.get("clientWidth"))
            .and_then(Value::as_f64);
        let height = section
            .get("height")
            .or_else(|| section.get("clientHeight"))
            .and_then(Value::as_f64);
        match (width, height) {
            (Some(w), Some(h)) if w >= 1.0 && h >= 1.0 => Ok((w, h)),
            _ => Ok(FALLBACK_VIEWPORT),
        }
    }

    async fn dispatch_click(&self, client: &CdpClient, x: i64, y: i64) -> Result<()> {
        for kind in ["mousePressed", "mouseReleased"] {
            client
                .send(
                    "Input.dispatchMouseEvent",
                    json!({
                        "type": kind,
                        "x": x,
                        "y": y,
                        "button": "left",
                        "clickCount": 1,
                    }),
                )
                .await?;
        }
        Ok(())
    }

    /// Shared resolve-and-click: normalized [0,1] coordinates against
    /// the chosen basis, clamped so an out-of-range input never
    /// dispatches outside the viewport.
    async fn click_normalized(
        &self,
        norm_x: f64,
        norm_y: f64,
        basis: ViewportBasis,
    ) -> Result<(i64, i64)> {
        let client = self.client().await?;
        let (width, height) = self.viewport_size(&client, basis).await?;
        let x = clamp_norm(norm_x, width);
        let y = clamp_norm(norm_y, height);
        self.dispatch_click(&client, x, y).await?;
        Ok((x, y))
    }

    /// Click at normalized coordinates resolved against the content
    /// size.
    pub async fn click_at(&self, norm_x: f64, norm_y: f64) -> Result<()> {
        self.click_normalized(norm_x, norm_y, ViewportBasis::ContentSize)
            .await
            .map(|_| ())
    }

    /// Alternate entry point resolved against the layout viewport;
    /// returns the pixel point it dispatched.
    pub async fn click(&self, norm_x: f64, norm_y: f64) -> Result<(i64, i64)> {
        self.click_normalized(norm_x, norm_y, ViewportBasis::LayoutViewport)
            .await
    }

    /// IME-style direct text insertion into the focused element.
    pub async fn insert_text(&self, text: impl Into<String>) -> Result<()> {
        let client = self.client().await?;
        client
            .send("Input.insertText", json!({ "text": text.into() }))
            .await?;
        Ok(())
    }

    /// Raw keyDown dispatch - some fields only react to key events.
    pub async fn type_key(&self, text: impl Into<String>) -> Result<()> {
        let client = self.client().await?;
        client
            .send(
                "Input.dispatchKeyEvent",
                json!({ "type": "keyDown", "text": text.into() }),
            )
            .await?;
        Ok(())
    }

    /// Wheel event at the content-size center.
    pub async fn scroll(&self, delta_y: f64) -> Result<()> {
        let client = self.client().await?;
        let (width, height) = self
            .viewport_size(&client, ViewportBasis::ContentSize)
            .await?;
        client
            .send(
                "Input.dispatchMouseEvent",
                json!({
                    "type": "mouseWheel",
                    "x": (width / 2.0).floor(),
                    "y": (height / 2.0).floor(),
                    "deltaX": 0,
                    "deltaY": delta_y,
                }),
            )
            .await?;
        Ok(())
    }
}

/// Clamp a normalized coordinate into `[0, size-1]` pixel space.
fn clamp_norm(norm: f64, size: f64) -> i64 {
    (norm * size).round().clamp(0.0, size - 1.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use serde_json::json;
    use std::sync::atomic::Ordering as AtomicOrdering;

    #[test]
    fn clamping_never_leaves_the_viewport() {
        assert_eq!(clamp_norm(-0.5, 1200.0), 0);
        assert_eq!(clamp_norm(1.5, 1200.0), 1199);
        assert_eq!(clamp_norm(0.5, 1200.0), 600);
        assert_eq!(clamp_norm(1.0, 800.0), 799);
        assert_eq!(clamp_norm(0.0, 800.0), 0);
    }

    #[test]
    fn default_config_targets_the_well_known_port() {
        let config = ControllerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9222);
        assert_eq!(config.call_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn ensure_connected_is_idempotent() {
        let ws_url = testutil::spawn_rpc_ws(|_| json!({})).await;
        let (port, hits) = testutil::spawn_discovery_http(false, ws_url).await;

        let controller = BrowserController::new(ControllerConfig {
            port,
            ..Default::default()
        });

        controller.ensure_connected().await.unwrap();
        let after_first = hits.load(AtomicOrdering::SeqCst);
        assert!(after_first >= 1);

        controller.ensure_connected().await.unwrap();
        controller.ensure_connected().await.unwrap();
        assert_eq!(hits.load(AtomicOrdering::SeqCst), after_first);
        assert_eq!(controller.state().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn create_target_failure_falls_back_to_page_typed_listing() {
        let ws_url = testutil::spawn_rpc_ws(|_| json!({})).await;
        let (port, _) = testutil::spawn_discovery_http(true, ws_url).await;

        let controller = BrowserController::new(ControllerConfig {
            port,
            ..Default::default()
        });
        controller.ensure_connected().await.unwrap();

        let slot = controller.connection.read().await;
        let target = &slot.as_ref().unwrap().target;
        // The listing puts a non-page entry first; page-typed wins.
        assert_eq!(target.kind, "page");
        assert_eq!(target.id, "tab");
    }

    #[tokio::test]
    async fn navigate_publishes_lifecycle_events() {
        let ws_url = testutil::spawn_rpc_ws(|_| json!({})).await;
        let (port, _) = testutil::spawn_discovery_http(false, ws_url).await;

        let controller = BrowserController::new(ControllerConfig {
            port,
            ..Default::default()
        });
        let mut rx = controller.event_bus.subscribe();

        controller.navigate("https://example.test/").await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            BrowserEvent::Connected { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            BrowserEvent::NavigationStarted { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            BrowserEvent::NavigationComplete { .. }
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_surfaces_discovery_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let controller = BrowserController::new(ControllerConfig {
            port,
            ..Default::default()
        });
        let err = controller.ensure_connected().await.unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
        assert_eq!(controller.state().await, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn clicks_clamp_against_the_reported_viewport() {
        let ws_url = testutil::spawn_rpc_ws(|method| match method {
            "Page.getLayoutMetrics" => json!({
                "contentSize": { "width": 1000.0, "height": 500.0 },
                "layoutViewport": { "clientWidth": 800, "clientHeight": 600 }
            }),
            _ => json!({}),
        })
        .await;
        let (port, _) = testutil::spawn_discovery_http(false, ws_url).await;

        let controller = BrowserController::new(ControllerConfig {
            port,
            ..Default::default()
        });

        // Layout-viewport variant reports the resolved pixel point.
        let (x, y) = controller.click(1.5, -0.25).await.unwrap();
        assert_eq!((x, y), (799, 0));

        // Content-size variant stays in bounds too.
        controller.click_at(2.0, 2.0).await.unwrap();
    }
}
