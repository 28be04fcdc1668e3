use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json;

/// A selectable filter value (region, city, property type, seller).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: u64,
    pub max: u64,
}

/// Option lists for the filter panel, from `home/filters-data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiltersData {
    pub regions: Vec<FilterOption>,
    pub price_range: Vec<PriceRange>,
    pub cities: Vec<FilterOption>,
    pub property_types: Vec<FilterOption>,
    pub sellers: Vec<FilterOption>,
}

impl FiltersData {
    /// Reads `result ?? data ?? <root>`; missing or non-array lists are empty.
    pub fn normalize(value: &Value) -> Self {
        let payload = json::field(value, &["result", "data"]).unwrap_or(value);

        let price_range = array(payload, "price_range")
            .iter()
            .filter_map(|v| {
                Some(PriceRange {
                    min: json::amount(v, &["min"])?,
                    max: json::amount(v, &["max"])?,
                })
            })
            .collect();

        Self {
            regions: options(payload, "regions"),
            price_range,
            cities: options(payload, "cities"),
            property_types: options(payload, "property_types"),
            sellers: options(payload, "sellers"),
        }
    }
}

fn array<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn options(payload: &Value, key: &str) -> Vec<FilterOption> {
    array(payload, key)
        .iter()
        .filter_map(|v| {
            Some(FilterOption {
                id: json::string(v, &["id"])?,
                label: json::string(v, &["display_name", "name"]).unwrap_or_default(),
            })
        })
        .collect()
}

/// Filters slice of the application store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiltersState {
    pub data: Option<FiltersData>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetched: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_result_envelope() {
        let body = json!({
            "result": {
                "regions": [{ "id": 1, "display_name": "West" }],
                "price_range": [{ "min": 0, "max": "5000000" }],
                "property_types": [{ "id": 4, "name": "Residential" }],
                "sellers": "not-a-list"
            }
        });
        let data = FiltersData::normalize(&body);
        assert_eq!(data.regions[0].label, "West");
        assert_eq!(data.price_range[0].max, 5_000_000);
        assert_eq!(data.property_types[0].id, "4");
        assert!(data.sellers.is_empty());
        assert!(data.cities.is_empty());
    }
}
