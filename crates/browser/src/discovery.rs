//! HTTP discovery client
//!
//! Plain GETs against the browser's local debugging server to create or
//! list page targets and fetch version metadata. Connection refused here
//! means no debuggable browser is listening on the port - surfaced as a
//! discovery error the caller can act on.

use serde::de::DeserializeOwned;

use crate::cdp::protocol::{Target, VersionInfo};
use crate::error::Result;

pub struct DiscoveryClient {
    base: String,
    http: reqwest::Client,
}

impl DiscoveryClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            base: format!("http://{host}:{port}"),
            http: reqwest::Client::new(),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base, path);
        let response = self.http.get(&url).send().await?;
        Ok(response.json::<T>().await?)
    }

    /// Ask the browser for a fresh blank-page target. Preferred over
    /// reusing a listed one: the page is isolated and known clean.
    pub async fn create_target(&self) -> Result<Target> {
        self.fetch_json("/json/new?about:blank").await
    }

    /// Every live target, any type.
    pub async fn list_targets(&self) -> Result<Vec<Target>> {
        self.fetch_json("/json/list").await
    }

    /// Browser/protocol metadata - a health probe independent of any
    /// target.
    pub async fn version(&self) -> Result<VersionInfo> {
        self.fetch_json("/json/version").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// One-shot HTTP responder: answers a single request with `body`.
    async fn serve_once(body: String) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });
        port
    }

    #[tokio::test]
    async fn list_targets_parses_endpoint_entries() {
        let port = serve_once(
            r#"[{"id":"abc","type":"page","title":"t","url":"about:blank","webSocketDebuggerUrl":"ws://127.0.0.1:1/devtools/page/abc"}]"#
                .to_string(),
        )
        .await;

        let client = DiscoveryClient::new("127.0.0.1", port);
        let targets = client.list_targets().await.unwrap();
        assert_eq!(targets.len(), 1);
        assert!(targets[0].is_page());
        assert_eq!(targets[0].id, "abc");
    }

    #[tokio::test]
    async fn refused_connection_is_a_discovery_error() {
        // Bind-then-drop yields a port nothing is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = DiscoveryClient::new("127.0.0.1", port);
        let err = client.version().await.unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_a_discovery_error() {
        let port = serve_once("<html>nope</html>".to_string()).await;
        let client = DiscoveryClient::new("127.0.0.1", port);
        let err = client.list_targets().await.unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }
}
