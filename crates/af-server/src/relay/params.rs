//! Lenient parameter extraction for DigiLocker callbacks.
//!
//! Redirects sometimes arrive with a second `?` appended to an existing query
//! (`?user_id=7?requestId=abc`), and POST callbacks use either JSON or form
//! bodies. Everything is flattened into one string map; the first occurrence
//! of a key wins.

use std::collections::HashMap;

use axum::http::HeaderMap;
use serde_json::Value;

pub type Params = HashMap<String, String>;

/// Parses a raw query string, treating every further `?` as `&`.
pub fn parse_query(raw: Option<&str>) -> Params {
    let mut params = Params::new();
    if let Some(raw) = raw {
        extend_urlencoded(&mut params, &raw.replace('?', "&"));
    }
    params
}

/// Adds body fields that the query did not already provide.
pub fn merge_body(params: &mut Params, body: &[u8]) {
    if body.iter().all(u8::is_ascii_whitespace) {
        return;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => {
            for (key, value) in fields {
                if let Some(value) = scalar(&value) {
                    params.entry(key).or_insert(value);
                }
            }
        }
        Ok(_) => {}
        Err(_) => {
            if let Ok(text) = std::str::from_utf8(body) {
                extend_urlencoded(params, text);
            }
        }
    }
}

pub fn first_of(params: &Params, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| params.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Header list for logs, with credentials blanked.
pub fn redacted_headers(headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| match name.as_str() {
            "authorization" | "cookie" | "proxy-authorization" => format!("{name}: [REDACTED]"),
            _ => format!("{name}: {}", value.to_str().unwrap_or("<binary>")),
        })
        .collect()
}

fn extend_urlencoded(params: &mut Params, raw: &str) {
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        if !key.is_empty() {
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
