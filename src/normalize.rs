//! Conversion of raw search API payloads into [`Image`] records.
//!
//! The API nests everything under `collection`:
//!
//! ```json
//! { "collection": {
//!     "items": [
//!       { "data":  [ { "nasa_id": "1", "title": "Rocket", "description": "",
//!                      "date_created": "2020-05-01T00:00:00Z",
//!                      "media_type": "image", "center": "JPL" } ],
//!         "links": [ { "href": "http://x/1.jpg" } ] }
//!     ],
//!     "metadata": { "total_hits": 21 } } }
//! ```
//!
//! Only the first `data` entry and the first `links` entry of an item are
//! used. A payload without `collection` or `collection.items` is a
//! [`NormalizationError`]; so is an item that doesn't match the record shape
//! at all. Optional fields degrade gracefully: no link gives an empty URL,
//! no description gives [`NO_DESCRIPTION`].

use crate::types::{Image, NO_DESCRIPTION};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizationError {
    #[error("payload has no `collection` object")]
    MissingCollection,
    #[error("payload collection has no `items` array")]
    MissingItems,
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    collection: Option<RawCollection>,
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    items: Option<Vec<RawItem>>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    total_hits: u64,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    data: Vec<RawData>,
    #[serde(default)]
    links: Option<Vec<RawLink>>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    nasa_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    date_created: String,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    center: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    href: String,
}

/// One page of normalized results.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPage {
    /// Images in payload order. May contain duplicate ids; the store drops them.
    pub images: Vec<Image>,
    /// Total matches reported by the API across all pages.
    pub total_hits: u64,
}

/// Normalize a raw JSON payload.
pub fn normalize(payload: &serde_json::Value) -> Result<NormalizedPage, NormalizationError> {
    let raw = RawResponse::deserialize(payload)?;
    let collection = raw.collection.ok_or(NormalizationError::MissingCollection)?;
    let items = collection.items.ok_or(NormalizationError::MissingItems)?;
    let total_hits = collection.metadata.map(|m| m.total_hits).unwrap_or(0);

    let mut images = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match normalize_item(item) {
            Some(image) => images.push(image),
            None => tracing::warn!(position, "skipping search result without data entry"),
        }
    }

    Ok(NormalizedPage { images, total_hits })
}

fn normalize_item(item: RawItem) -> Option<Image> {
    let data = item.data.into_iter().next()?;
    let url = item
        .links
        .and_then(|links| links.into_iter().next())
        .map(|link| link.href)
        .unwrap_or_default();
    let description = data
        .description
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    Some(Image {
        id: data.nasa_id,
        title: data.title,
        description,
        date: data.date_created,
        url,
        media_type: data.media_type.unwrap_or_default(),
        center: data.center.unwrap_or_default(),
    })
}

/// Number of pages needed for `total_hits` results, never less than 1.
pub fn total_pages(total_hits: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total_hits.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
