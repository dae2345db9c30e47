//! Chrome DevTools Protocol plumbing
//!
//! - `protocol`: wire frames and discovery payload types
//! - `client`: the correlating WebSocket transport

pub mod client;
pub mod protocol;

pub use client::{CdpClient, CdpError};
pub use protocol::{CdpResponse, Target, VersionInfo};
