//! Script-injection primitives: extraction and description-based lookup
//!
//! Convention shared by every primitive here: evaluate a self-contained
//! expression with `returnByValue` + `awaitPromise` and read
//! `result.result.value`, treating any missing shape as the primitive's
//! empty default. The scripts themselves catch page-side failures, so a
//! hostile page degrades the result instead of erroring the session.

use page::locator::{Action, LocateArgs};
use page::scripts::{self, WaitArgs};
use page::types::{ElementMatch, FormInfo, LocateOutcome, ReadableContent, TableInfo};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::controller::BrowserController;
use crate::error::Result;

pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOCATE_TIMEOUT_MS: u64 = 10_000;

impl BrowserController {
    /// Evaluate an expression in the page, returning the by-value
    /// payload (Null when the page produced nothing).
    async fn evaluate(&self, expression: String) -> Result<Value> {
        let client = self.client().await?;
        let result = client
            .send(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Evaluate and deserialize, degrading to the type's default when
    /// the page returned nothing usable.
    async fn evaluate_into<T>(&self, expression: String) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let value = self.evaluate(expression).await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// Every form on the page with its nested control metadata. A
    /// page-side failure yields an empty list.
    pub async fn extract_forms(&self) -> Result<Vec<FormInfo>> {
        self.evaluate_into(scripts::EXTRACT_FORMS.to_string()).await
    }

    /// Every table as a header row plus trimmed body rows.
    pub async fn extract_tables(&self) -> Result<Vec<TableInfo>> {
        self.evaluate_into(scripts::EXTRACT_TABLES.to_string())
            .await
    }

    /// Reader-mode extraction of the densest content container.
    pub async fn extract_readable(&self) -> Result<ReadableContent> {
        self.evaluate_into(scripts::EXTRACT_READABLE.to_string())
            .await
    }

    /// True once `selector` matches (watching DOM mutations), false at
    /// the timeout. A timeout is a result, not an error.
    pub async fn wait_for_element(
        &self,
        selector: impl Into<String>,
        timeout_ms: Option<u64>,
    ) -> Result<bool> {
        let script = scripts::wait_for_element(&WaitArgs {
            selector: selector.into(),
            timeout_ms: timeout_ms.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS),
        })?;
        let value = self.evaluate(script).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn locate(&self, args: LocateArgs) -> Result<LocateOutcome> {
        let script = scripts::locate_element(&args)?;
        self.evaluate_into(script).await
    }

    /// Fuzzy element lookup by plain-language description, retried
    /// every 100 ms page-side. `None` when nothing matched within the
    /// timeout.
    pub async fn find_element_by_description(
        &self,
        description: impl Into<String>,
        timeout_ms: Option<u64>,
    ) -> Result<Option<ElementMatch>> {
        let outcome = self
            .locate(LocateArgs::locate(
                description,
                timeout_ms.unwrap_or(DEFAULT_LOCATE_TIMEOUT_MS),
            ))
            .await?;
        if outcome.found {
            Ok(outcome.element)
        } else {
            Ok(None)
        }
    }

    /// Locate by description and click the match. False when nothing
    /// matched within the timeout.
    pub async fn smart_click(&self, description: impl Into<String>) -> Result<bool> {
        let args = LocateArgs::locate(description, DEFAULT_LOCATE_TIMEOUT_MS)
            .with_action(Action::Click);
        let outcome = self.locate(args).await?;
        if !outcome.found {
            tracing::debug!(
                "smart_click found nothing: {}",
                outcome.error.as_deref().unwrap_or("no match")
            );
        }
        Ok(outcome.found)
    }

    /// Locate an input by description, set its value and fire
    /// `input`/`change`. False when no field matched.
    pub async fn smart_type(
        &self,
        description: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<bool> {
        let args = LocateArgs::locate(description, DEFAULT_LOCATE_TIMEOUT_MS)
            .with_action(Action::Type { text: text.into() });
        let outcome = self.locate(args).await?;
        Ok(outcome.found)
    }
}
