//! Typed results for the injected extraction scripts
//!
//! Every struct here mirrors the JSON shape its script resolves with.
//! Field names follow the page-side convention (camelCase) via serde
//! renames; every container tolerates missing fields so a partial or
//! degraded script result deserializes to the documented default instead
//! of failing.

use serde::{Deserialize, Serialize};

/// One control inside a form: input, select, textarea or button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    /// `type` attribute, or the lowercased tag name when absent.
    #[serde(rename = "type")]
    pub field_type: String,
    /// `name` attribute, falling back to `id`.
    pub name: String,
    pub placeholder: String,
    pub value: String,
    pub required: bool,
    pub disabled: bool,
}

/// A `<form>` element and its controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInfo {
    pub action: String,
    pub method: String,
    pub inputs: Vec<FormField>,
}

/// A `<table>` element split into header row and body rows of trimmed
/// cell text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableInfo {
    pub headers: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<Vec<String>>,
    pub caption: String,
}

/// An absolute-resolved link found in the readable region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRef {
    pub text: String,
    pub href: String,
}

/// An absolute-resolved image found in the readable region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

/// Open Graph / twitter-card metadata scraped from the document head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadableMeta {
    pub title: String,
    pub description: String,
    pub image: String,
}

/// Reader-mode extraction result: the highest-scoring content container,
/// sanitized and flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadableContent {
    pub title: String,
    pub html: String,
    pub text: String,
    pub links: Vec<LinkRef>,
    pub images: Vec<ImageRef>,
    pub meta: ReadableMeta,
}

impl ReadableContent {
    /// True when the extraction produced no usable content.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.text.is_empty() && self.links.is_empty()
    }
}

/// Description of the element a locator strategy settled on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementMatch {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    #[serde(rename = "textContent")]
    pub text_content: String,
    pub placeholder: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(rename = "className")]
    pub class_name: String,
    pub id: String,
}

/// What the locator script resolved with: a match, or a not-found marker
/// with an optional reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocateOutcome {
    pub found: bool,
    pub element: Option<ElementMatch>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_info_roundtrips_wire_shape() {
        let value = json!({
            "action": "https://example.test/login",
            "method": "post",
            "inputs": [
                { "type": "email", "name": "user", "placeholder": "Email",
                  "value": "", "required": true, "disabled": false },
                { "type": "submit", "name": "", "placeholder": "",
                  "value": "Sign in", "required": false, "disabled": false }
            ]
        });

        let form: FormInfo = serde_json::from_value(value).unwrap();
        assert_eq!(form.method, "post");
        assert_eq!(form.inputs.len(), 2);
        assert!(form.inputs[0].required);
        assert_eq!(form.inputs[1].field_type, "submit");
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let table: TableInfo = serde_json::from_value(json!({
            "headers": ["Name", "Age"]
        }))
        .unwrap();
        assert!(table.rows.is_empty());
        assert!(table.caption.is_empty());

        let readable: ReadableContent = serde_json::from_value(json!({})).unwrap();
        assert!(readable.is_empty());
    }

    #[test]
    fn locate_outcome_uses_page_side_names() {
        let outcome: LocateOutcome = serde_json::from_value(json!({
            "found": true,
            "element": {
                "tagName": "BUTTON",
                "textContent": "Sign in",
                "type": "submit",
                "className": "btn primary",
                "id": "login"
            }
        }))
        .unwrap();

        assert!(outcome.found);
        let element = outcome.element.unwrap();
        assert_eq!(element.tag_name, "BUTTON");
        assert_eq!(element.input_type, "submit");
        assert_eq!(element.class_name, "btn primary");
        assert!(element.placeholder.is_empty());
    }
}
