//! Element-locator strategy chain
//!
//! One parameterized locate routine serves plain lookup, smart click and
//! smart type. Strategies run in order until one matches; the chain is
//! explicit data, so callers can reorder or trim it instead of carrying
//! their own near-duplicate matching scripts.

use serde::{Deserialize, Serialize};

/// A single way of matching a caller-supplied description to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Case-insensitive substring over button/link/input text content.
    TextContent,
    /// Input/textarea placeholder substring.
    Placeholder,
    /// `aria-label` attribute substring.
    AriaLabel,
    /// `title` attribute substring.
    TitleAttr,
    /// Token-overlap scoring over clickable elements. Last resort: catches
    /// descriptions that only partially overlap the visible label.
    FuzzyText,
}

/// The default chain, most-precise first.
pub const DEFAULT_STRATEGIES: [Strategy; 5] = [
    Strategy::TextContent,
    Strategy::Placeholder,
    Strategy::AriaLabel,
    Strategy::TitleAttr,
    Strategy::FuzzyText,
];

/// What to do with the element once a strategy matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Action {
    /// Report the match only.
    Locate,
    /// Invoke the element's click handler.
    Click,
    /// Fill the matched (or description-matched) input and fire
    /// `input` + `change`.
    Type { text: String },
}

/// Argument struct handed to the locator script as one JSON literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateArgs {
    pub description: String,
    pub strategies: Vec<Strategy>,
    pub timeout_ms: u64,
    pub action: Action,
}

impl LocateArgs {
    /// Locate-only with the default chain.
    pub fn locate(description: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            description: description.into(),
            strategies: DEFAULT_STRATEGIES.to_vec(),
            timeout_ms,
            action: Action::Locate,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }
}
