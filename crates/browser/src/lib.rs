//! CDP browser controller
//!
//! Discovers or launches a debuggable Chromium-family browser, holds one
//! WebSocket session against a page target, and exposes browsing
//! primitives (navigate, click, type, scroll, extract, fuzzy find) on
//! top of a correlating request/response transport.
//!
//! Connection is lazy: the first primitive call discovers a target and
//! opens the socket; a dropped socket is re-established by the next
//! call. There is no global instance - construct a [`BrowserController`]
//! and hand it to whatever needs browser control.

pub mod cdp;
pub mod connection;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod events;
pub mod extract;
pub mod launch;

#[cfg(test)]
pub(crate) mod testutil;

pub use cdp::{CdpClient, CdpError};
pub use connection::{Connection, ConnectionState};
pub use controller::{BrowserController, ControllerConfig, ViewportBasis};
pub use discovery::DiscoveryClient;
pub use error::{Error, Result};
pub use events::{BrowserEvent, EventBus};
pub use launch::{find_executable_path, launch_hidden_browser, BrowserProcess, LaunchConfig};
