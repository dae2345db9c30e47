//! Error taxonomy for the controller
//!
//! Connection-establishment failures carry an actionable message (the
//! user can start the browser with the debugging flag). Page-script
//! failures never show up here: scripts catch their own errors and
//! degrade to empty results at the script boundary.

use thiserror::Error;

use crate::cdp::CdpError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The debugging HTTP endpoint is unreachable or returned a body
    /// that is not JSON - no debuggable browser is listening.
    #[error("Discovery failed: {0}")]
    Discovery(#[from] reqwest::Error),

    /// Discovery answered, but no usable page target was offered.
    #[error("No CDP target with a debugger URL is available")]
    NoTarget,

    /// A primitive needed an open socket and none could be established.
    #[error("Could not connect to the browser. Start it with --remote-debugging-port={0}")]
    NotConnected(u16),

    #[error(transparent)]
    Cdp(#[from] CdpError),

    #[error(transparent)]
    Script(#[from] page::ScriptError),
}
