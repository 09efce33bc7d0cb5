use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// One decoded list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Absolute URL of the following page
    pub next: Option<Url>,
}

/// Decode a list body: either a flat array or `{results, next}`.
///
/// A relative `next` link is resolved against `url`, the page it came from.
pub fn parse_page<T: DeserializeOwned>(body: Value, url: &Url) -> Result<Page<T>, ClientError> {
    match body {
        Value::Array(_) => Ok(Page {
            items: decode_items(body)?,
            next: None,
        }),
        Value::Object(mut map) => {
            let results = map.remove("results").ok_or_else(|| {
                ClientError::Decode("expected a list or a {results} envelope".to_string())
            })?;
            let next = match map.remove("next") {
                Some(Value::String(link)) if !link.is_empty() => Some(url.join(&link)?),
                _ => None,
            };
            Ok(Page {
                items: decode_items(results)?,
                next,
            })
        }
        other => Err(ClientError::Decode(format!(
            "expected a list, got {}",
            json_kind(&other)
        ))),
    }
}

fn decode_items<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(format!("list item: {}", e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
