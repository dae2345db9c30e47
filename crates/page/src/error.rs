//! Error types for script building
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScriptError>;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Script argument serialization failed: {0}")]
    Args(#[from] serde_json::Error),
}
