use serde::Deserialize;
use serde_json::Value;

use crate::app::{DailyTopError, Result};
use crate::domain::RawItem;

/// One position of a fetched listing: the parsed entry, or why it could not be parsed.
pub type ListingEntry = Result<RawItem>;

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a listing body (`data.children[].data`) into entries in upstream order.
    ///
    /// A body without the listing structure is an error for the whole batch.
    /// Individual entries that fail to parse are returned as `MalformedItem`
    /// so their position still counts toward rank.
    pub fn normalize(&self, body: &[u8]) -> Result<Vec<ListingEntry>> {
        let listing: Value = serde_json::from_slice(body)
            .map_err(|e| DailyTopError::ListingParse(e.to_string()))?;

        let children = listing
            .get("data")
            .and_then(|d| d.get("children"))
            .and_then(Value::as_array)
            .ok_or_else(|| DailyTopError::ListingParse("missing data.children".into()))?;

        let entries = children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                let position = index + 1;
                let data = child.get("data").ok_or_else(|| DailyTopError::MalformedItem {
                    position,
                    reason: "missing data".into(),
                })?;
                RawItem::deserialize(data).map_err(|e| DailyTopError::MalformedItem {
                    position,
                    reason: e.to_string(),
                })
            })
            .collect();

        Ok(entries)
    }
}
