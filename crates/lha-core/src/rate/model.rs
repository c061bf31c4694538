//! Reading the BRMA and rate out of an API response.
//!
//! The API has been seen to return the fields either nested under `data` or
//! at the top level, so both places are checked. Two precedence rules exist:
//!
//! - [`RateResult::extract`] resolves each field on its own: `data.<field>`
//!   if present and not null, then `<field>`, then empty. The notification
//!   email uses this.
//! - [`RateResult::locate`] picks one object: `data` when it has a non-empty
//!   `brma` or `rate`, otherwise the top level when it has either, otherwise
//!   nothing. The form uses this and falls back to the raw JSON. Values are
//!   rendered the way the browser script interpolates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateResult {
    pub brma: String,
    pub rate: String,
}

impl RateResult {
    pub fn extract(response: &Value) -> Self {
        let field = |name: &str| {
            present(response.get("data").and_then(|d| d.get(name)))
                .or_else(|| present(response.get(name)))
                .map(value_text)
                .unwrap_or_default()
        };
        Self {
            brma: field("brma"),
            rate: field("rate"),
        }
    }

    pub fn locate(response: &Value) -> Option<Self> {
        let from = |obj: &Value| {
            let result = Self {
                brma: truthy_text(obj.get("brma")),
                rate: truthy_text(obj.get("rate")),
            };
            (!result.brma.is_empty() || !result.rate.is_empty()).then_some(result)
        };
        response
            .get("data")
            .and_then(from)
            .or_else(|| from(response))
    }

    /// `"{brma}  |  £{rate}"`, the line shown to visitors.
    pub fn display(&self) -> String {
        format!("{}  |  \u{a3}{}", self.brma, self.rate)
    }
}

/// Message for a successful lookup: the formatted rate when the fields can
/// be found, otherwise the payload as compact JSON.
pub fn render_payload(payload: &Value) -> String {
    match RateResult::locate(payload) {
        Some(result) => result.display(),
        None => payload.to_string(),
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Text of a field as the notification email shows it.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Text of a truthy field as the browser interpolates it; falsy fields are
/// empty.
fn truthy_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(v) => script_text(v),
    }
}

fn script_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(script_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
