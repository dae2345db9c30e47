//! Page-side data model and injected-script protocol
//!
//! The browser crate drives a page by evaluating self-contained script
//! expressions in the page's own context and reading back JSON-safe
//! values. This crate owns both halves of that convention:
//!
//! - the script sources and builders ([`scripts`]), which pass caller
//!   values as one structured JSON argument instead of splicing text
//!   into source
//! - the typed shapes those scripts resolve with ([`types`])
//! - the element-locator strategy chain ([`locator`]) shared by lookup,
//!   smart click and smart type

pub mod error;
pub mod locator;
pub mod scripts;
pub mod types;

pub use error::{Result, ScriptError};
pub use locator::{Action, LocateArgs, Strategy, DEFAULT_STRATEGIES};
pub use types::*;
