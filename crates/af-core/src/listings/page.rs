use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::auction::AuctionItem;
use crate::json;

/// One page of listing results, normalised from whatever envelope the
/// backend used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingsPage {
    pub data: Vec<AuctionItem>,
    pub total: u64,
    pub page: u32,
    pub records: u32,
}

impl ListingsPage {
    /// Accepts a bare array, `{ data: [...] }` or
    /// `{ result: { items: [...], totalItems } }`.
    ///
    /// Rows that cannot be mapped are skipped with a warning rather than
    /// failing the whole page.
    pub fn normalize(value: &Value, requested_page: u32, offset: FixedOffset) -> Self {
        let result = value.get("result");
        let rows: &[Value] = match value {
            Value::Array(rows) => rows,
            _ => value
                .get("data")
                .and_then(Value::as_array)
                .or_else(|| result.and_then(|r| r.get("items")).and_then(Value::as_array))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        };

        let data: Vec<AuctionItem> = rows
            .iter()
            .filter_map(|row| match AuctionItem::from_api(row, offset) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(error = %err, "Skipping unmappable listing row");
                    None
                }
            })
            .collect();

        let total = json::amount(value, &["total"])
            .or_else(|| result.and_then(|r| json::amount(r, &["totalItems"])))
            .unwrap_or(0);
        let page = json::amount(value, &["page"])
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(requested_page);
        let records = json::amount(value, &["records"])
            .and_then(|r| u32::try_from(r).ok())
            .unwrap_or(data.len() as u32);

        Self {
            data,
            total,
            page,
            records,
        }
    }

    /// Whether a page after this one exists, given the page size that was
    /// requested.
    pub fn has_more(&self, page_size: u32) -> bool {
        u64::from(self.page) * u64::from(page_size) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    #[test]
    fn bare_array_uses_requested_page() {
        let page = ListingsPage::normalize(&json!([{ "id": 1 }, { "id": 2 }]), 3, ist());
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.records, 2);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn result_items_envelope_reads_total_items() {
        let body = json!({
            "result": { "items": [{ "id": 1 }], "totalItems": 45 }
        });
        let page = ListingsPage::normalize(&body, 1, ist());
        assert_eq!(page.total, 45);
        assert!(page.has_more(21));
    }

    #[test]
    fn data_envelope_prefers_explicit_paging() {
        let body = json!({
            "data": [{ "id": 1 }, { "name": "no id" }],
            "total": 42,
            "page": 2,
            "records": 21
        });
        let page = ListingsPage::normalize(&body, 9, ist());
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.page, 2);
        assert_eq!(page.records, 21);
        assert!(!page.has_more(21));
    }
}
