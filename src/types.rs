//! Shared types used across the gallery store, collections and renderers.
//!
//! [`Image`] is the normalized record every other module works with. It is
//! produced by [`normalize`](crate::normalize) from remote payloads or by
//! [`GalleryStore::add_local_image`](crate::gallery::GalleryStore::add_local_image)
//! from user input, and copied into collections when added to one.

use serde::{Deserialize, Serialize};

/// Description substituted when the remote item has none (or an empty one).
pub const NO_DESCRIPTION: &str = "No description available";

/// Number of results requested per page from the image API.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A normalized, displayable image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Unique within a loaded set (`nasa_id` for remote images, a UUID for local ones)
    pub id: String,
    pub title: String,
    pub description: String,
    /// ISO-8601-like creation date, e.g. `2020-05-01T00:00:00Z`
    pub date: String,
    /// Display URL. Empty when the remote item carried no link.
    pub url: String,
    /// Media kind tag (`image`, `video`, `audio`)
    #[serde(default)]
    pub media_type: String,
    /// Source center tag, e.g. `JPL`
    #[serde(default)]
    pub center: String,
}

impl Image {
    /// The 4-character year prefix of [`Image::date`] (shorter if the date is).
    pub fn year(&self) -> &str {
        match self.date.char_indices().nth(4) {
            Some((end, _)) => &self.date[..end],
            None => &self.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::image;

    #[test]
    fn year_is_four_character_prefix() {
        let img = image("1", "Rocket", "2020-05-01T00:00:00Z");
        assert_eq!(img.year(), "2020");
    }

    #[test]
    fn year_of_short_date_is_whole_date() {
        let img = image("1", "Rocket", "98");
        assert_eq!(img.year(), "98");
    }

    #[test]
    fn year_of_empty_date_is_empty() {
        let img = image("1", "Rocket", "");
        assert_eq!(img.year(), "");
    }

    #[test]
    fn image_serializes_all_fields() {
        let img = image("1", "Rocket", "2020-05-01");
        let json = serde_json::to_value(&img).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["media_type"], "image");
        assert_eq!(json["center"], "JPL");
    }
}
