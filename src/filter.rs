//! Client-side search and filter predicates.
//!
//! A [`FilterState`] combines a free-text search with three optional
//! selection filters. All set predicates must match (AND). The search text
//! matches when the title *or* the description contains it, ignoring case.
//!
//! ```text
//! search  "mars"   → title/description contains "mars" (case-insensitive)
//! year    "2020"   → date starts with "2020"
//! media   "image"  → media_type == "image"
//! center  "JPL"    → center == "JPL"
//! ```
//!
//! Filtering never reorders: the result is a subsequence of the input.

use crate::types::Image;
use std::fmt;
use std::str::FromStr;

/// Media kinds offered by the media-type selector.
pub const MEDIA_TYPES: &[&str] = &["image", "video", "audio"];

/// NASA centers offered by the center selector.
pub const NASA_CENTERS: &[&str] = &[
    "JPL",
    "Johnson Space Center",
    "Kennedy Space Center",
    "Goddard Space Flight Center",
    "Marshall Space Flight Center",
    "Ames Research Center",
    "Langley Research Center",
    "Glenn Research Center",
    "Dryden Flight Research Center",
    "Stennis Space Center",
];

/// One of the selectable (non-text) filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Year,
    MediaType,
    Center,
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterField::Year => "year",
            FilterField::MediaType => "media",
            FilterField::Center => "center",
        };
        f.write_str(name)
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(FilterField::Year),
            "media" | "media-type" | "media_type" => Ok(FilterField::MediaType),
            "center" => Ok(FilterField::Center),
            other => Err(format!("unknown filter '{other}' (expected year, media or center)")),
        }
    }
}

/// Current search text plus the optional selection filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Raw search box text. Empty matches everything.
    pub search: String,
    pub year: Option<String>,
    pub media_type: Option<String>,
    pub center: Option<String>,
}

impl FilterState {
    /// Set a selection filter. An empty value clears it ("All Years" etc.).
    pub fn set(&mut self, field: FilterField, value: &str) {
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        match field {
            FilterField::Year => self.year = value,
            FilterField::MediaType => self.media_type = value,
            FilterField::Center => self.center = value,
        }
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Year => self.year.as_deref(),
            FilterField::MediaType => self.media_type.as_deref(),
            FilterField::Center => self.center.as_deref(),
        }
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// True when no predicate would exclude anything.
    pub fn is_clear(&self) -> bool {
        self.search.is_empty()
            && self.year.is_none()
            && self.media_type.is_none()
            && self.center.is_none()
    }

    /// Whether a single image passes every active predicate.
    pub fn matches(&self, image: &Image) -> bool {
        self.matches_search(image)
            && self
                .year
                .as_deref()
                .is_none_or(|year| image.date.starts_with(year))
            && self
                .media_type
                .as_deref()
                .is_none_or(|media| image.media_type == media)
            && self
                .center
                .as_deref()
                .is_none_or(|center| image.center == center)
    }

    fn matches_search(&self, image: &Image) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        image.title.to_lowercase().contains(&needle)
            || image.description.to_lowercase().contains(&needle)
    }

    /// Apply the predicates to `images`, preserving order.
    pub fn apply<'a>(&self, images: &'a [Image]) -> Vec<&'a Image> {
        images.iter().filter(|img| self.matches(img)).collect()
    }
}
