//! Identifier derivation for catalogue items.
//!
//! The remote resource never sends an id; it is the trailing numeric path
//! segment of the item's resource URL (`.../pokemon/25/` is item 25).

use crate::error::{CatalogueError, Result};
use crate::types::{Item, RawItem};

/// Extract the trailing numeric path segment of a resource URL.
///
/// A single trailing slash is allowed. The segment must be plain decimal
/// digits with no sign and no leading zeros (other than `"0"` itself).
pub fn derive_id(url: &str) -> Result<u64> {
    let malformed = || CatalogueError::MalformedIdentifier(url.to_string());

    let trimmed = url.strip_suffix('/').unwrap_or(url);
    let segment = trimmed.rsplit('/').next().ok_or_else(malformed)?;

    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return Err(malformed());
    }

    segment.parse::<u64>().map_err(|_| malformed())
}

impl Item {
    /// Build a display item, deriving its id from the URL.
    pub fn from_raw(raw: &RawItem) -> Result<Self> {
        Ok(Item {
            id: derive_id(&raw.url)?,
            name: raw.name.clone(),
            url: raw.url.clone(),
        })
    }
}

/// Convert raw entries to items, skipping (and logging) any entry whose
/// URL does not yield an identifier.
pub fn items_from_raw(raw: &[RawItem]) -> Vec<Item> {
    raw.iter()
        .filter_map(|entry| match Item::from_raw(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(name = %entry.name, "skipping item: {e}");
                None
            }
        })
        .collect()
}
