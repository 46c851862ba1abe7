//! Shared test utilities for the nasa-gallery test suite.
//!
//! Provides record builders, raw payload builders, and id extractors for
//! asserting on store and filter output.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let payload = nasa_payload(vec![nasa_item("1", "Rocket", "2020-05-01")], 1);
//! let mut store = GalleryStore::new();
//! store.ingest_fetch_result(&payload, 20).unwrap();
//! assert_eq!(store_ids(&store), vec!["1"]);
//! ```

use serde_json::{Value, json};

use crate::gallery::GalleryStore;
use crate::types::Image;

// =========================================================================
// Record builders
// =========================================================================

/// A normalized image with an empty description, JPL as center and a
/// predictable URL.
pub fn image(id: &str, title: &str, date: &str) -> Image {
    Image {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        date: date.to_string(),
        url: format!("http://x/{id}.jpg"),
        media_type: "image".to_string(),
        center: "JPL".to_string(),
    }
}

// =========================================================================
// Raw payload builders
// =========================================================================

/// One raw search result item in the API's nested shape.
pub fn nasa_item(id: &str, title: &str, date: &str) -> Value {
    json!({
        "data": [{
            "nasa_id": id,
            "title": title,
            "description": format!("About {title}"),
            "date_created": date,
            "media_type": "image",
            "center": "JPL",
        }],
        "links": [{ "href": format!("http://x/{id}.jpg") }],
    })
}

/// A complete search payload wrapping `items`.
pub fn nasa_payload(items: Vec<Value>, total_hits: u64) -> Value {
    json!({
        "collection": {
            "items": items,
            "metadata": { "total_hits": total_hits },
        }
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Ids of a filtered view in order.
pub fn image_ids<'a>(images: &[&'a Image]) -> Vec<&'a str> {
    images.iter().map(|img| img.id.as_str()).collect()
}

/// Ids of everything in the store in order.
pub fn store_ids(store: &GalleryStore) -> Vec<&str> {
    store.images().iter().map(|img| img.id.as_str()).collect()
}
