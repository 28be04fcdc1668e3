//! Lenient accessors for backend JSON.
//!
//! The backend is inconsistent about numbers vs. numeric strings and uses
//! several aliases for the same field, so lookups take a list of keys and
//! return the first usable value.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

pub(crate) fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find(|v| !v.is_null())
}

/// String-ish field: strings are returned as-is, numbers are formatted.
pub(crate) fn string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match value.get(*k) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Monetary field. Accepts integers, floats and numeric strings such as
/// `"100000.00"`; fractional rupees are rounded.
pub(crate) fn amount(value: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| value.get(*k).and_then(amount_of))
}

pub(crate) fn amount_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',').collect();
            let cleaned = cleaned.trim();
            cleaned.parse::<u64>().ok().or_else(|| {
                cleaned
                    .parse::<f64>()
                    .ok()
                    .filter(|f| *f >= 0.0)
                    .map(|f| f.round() as u64)
            })
        }
        _ => None,
    }
}

/// Truthy flag: `true`, `1`, `"1"`, `"true"`.
pub(crate) fn flag(value: &Value, keys: &[&str]) -> bool {
    field(value, keys).is_some_and(|v| match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Parses backend timestamps. RFC 3339 carries its own offset; the bare
/// `YYYY-MM-DD HH:mm:ss` form is interpreted in `offset`.
pub(crate) fn timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_accepts_numbers_and_numeric_strings() {
        let v = json!({ "a": 100000, "b": "250000.00", "c": "1,50,000", "d": "n/a" });
        assert_eq!(amount(&v, &["a"]), Some(100_000));
        assert_eq!(amount(&v, &["b"]), Some(250_000));
        assert_eq!(amount(&v, &["c"]), Some(150_000));
        assert_eq!(amount(&v, &["d"]), None);
    }

    #[test]
    fn string_falls_through_aliases() {
        let v = json!({ "name": null, "title": "Flat 2B" });
        assert_eq!(string(&v, &["name", "title"]), Some("Flat 2B".to_string()));
    }

    #[test]
    fn bare_timestamp_uses_offset() {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let dt = timestamp("2025-01-15 10:30:00", ist).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-15T05:00:00+00:00");
    }
}
