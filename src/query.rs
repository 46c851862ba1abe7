//! Outbound query construction for the image search API.
//!
//! [`build_query`] is a pure function from the current search state to a
//! [`QueryRequest`]: an ordered list of query parameters. Nothing here
//! touches the network. [`QueryRequest::url`] renders the descriptor
//! against the configured endpoint, URL-encoding every value.
//!
//! ```text
//! media_type=image&page_size=20&page=3        ← always present
//!   &q=mars                                   ← trimmed search text, if any
//!   &year_start=2020                          ← year filter
//!   &media_type=video                         ← media-type override
//!   &center=Goddard+Space+Flight+Center       ← center filter
//! ```
//!
//! An empty (or whitespace-only) search adds no `q` parameter at all, so
//! "no search" is never sent as "search for the empty string".

use crate::filter::FilterState;
use reqwest::Url;

/// Media kind always requested from the API.
pub const BASE_MEDIA_TYPE: &str = "image";

/// An outbound request descriptor: ordered `(name, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    params: Vec<(&'static str, String)>,
}

impl QueryRequest {
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value for `name`, in order (`media_type` may appear twice).
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// The free-text query, if one was added.
    pub fn text(&self) -> Option<&str> {
        self.get("q")
    }

    pub fn page(&self) -> Option<u32> {
        self.get("page").and_then(|p| p.parse().ok())
    }

    /// Render against `base`, replacing any query string it carries.
    pub fn url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_query(None);
        url.query_pairs_mut()
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())));
        url
    }
}

/// Build the request descriptor for one page of results.
///
/// `search_text` is the settled (debounced) search text; `filters` supplies
/// the year, media-type and center selections (its `search` field is the
/// live input and is not used here).
pub fn build_query(
    search_text: &str,
    filters: &FilterState,
    page: u32,
    page_size: u32,
) -> QueryRequest {
    let mut params = vec![
        ("media_type", BASE_MEDIA_TYPE.to_string()),
        ("page_size", page_size.to_string()),
        ("page", page.to_string()),
    ];

    let text = search_text.trim();
    if !text.is_empty() {
        params.push(("q", text.to_string()));
    }
    if let Some(year) = &filters.year {
        params.push(("year_start", year.clone()));
    }
    if let Some(media_type) = &filters.media_type {
        params.push(("media_type", media_type.clone()));
    }
    if let Some(center) = &filters.center {
        params.push(("center", center.clone()));
    }

    QueryRequest { params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterField;

    fn endpoint() -> Url {
        Url::parse("https://images-api.nasa.gov/search").unwrap()
    }

    #[test]
    fn base_parameters_only_when_nothing_is_set() {
        let q = build_query("", &FilterState::default(), 1, 20);
        assert_eq!(
            q.params(),
            &[
                ("media_type", "image".to_string()),
                ("page_size", "20".to_string()),
                ("page", "1".to_string()),
            ]
        );
        assert_eq!(q.text(), None);
    }

    #[test]
    fn whitespace_search_adds_no_text_parameter() {
        let q = build_query("   ", &FilterState::default(), 1, 20);
        assert_eq!(q.text(), None);
        assert_eq!(q.params().len(), 3);
    }

    #[test]
    fn search_text_is_trimmed() {
        let q = build_query("  mars rover ", &FilterState::default(), 2, 20);
        assert_eq!(q.text(), Some("mars rover"));
        assert_eq!(q.page(), Some(2));
    }

    #[test]
    fn filters_append_in_fixed_order() {
        let mut filters = FilterState::default();
        filters.set(FilterField::Center, "JPL");
        filters.set(FilterField::Year, "2020");
        filters.set(FilterField::MediaType, "video");
        let q = build_query("mars", &filters, 1, 20);
        let names: Vec<&str> = q.params().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec!["media_type", "page_size", "page", "q", "year_start", "media_type", "center"]
        );
        assert_eq!(q.get_all("media_type"), vec!["image", "video"]);
        assert_eq!(q.get("year_start"), Some("2020"));
    }

    #[test]
    fn live_search_field_is_ignored() {
        let filters = FilterState {
            search: "typing in progress".into(),
            ..Default::default()
        };
        let q = build_query("", &filters, 1, 20);
        assert_eq!(q.text(), None);
    }

    #[test]
    fn url_encodes_values() {
        let mut filters = FilterState::default();
        filters.set(FilterField::Center, "Goddard Space Flight Center");
        let q = build_query("rings & moons", &filters, 1, 20);
        let url = q.url(&endpoint());
        assert_eq!(
            url.as_str(),
            "https://images-api.nasa.gov/search?media_type=image&page_size=20&page=1\
             &q=rings+%26+moons&center=Goddard+Space+Flight+Center"
        );
    }

    #[test]
    fn url_replaces_existing_query_string() {
        let base = Url::parse("https://example.test/search?stale=1").unwrap();
        let q = build_query("", &FilterState::default(), 4, 10);
        assert_eq!(
            q.url(&base).as_str(),
            "https://example.test/search?media_type=image&page_size=10&page=4"
        );
    }
}
