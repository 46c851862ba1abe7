//! The gallery state store.
//!
//! [`GalleryStore`] is the single owner of the loaded images, the
//! loading/error status and the page window. Every mutation goes through one
//! of its methods and each committed mutation is announced to subscribers as
//! a [`GalleryEvent`].
//!
//! # Fetch lifecycle
//!
//! ```text
//! begin_load()                  loading = true, error cleared, images kept
//!     │
//!     ├─ ingest_fetch_result()  Ok  → images replaced, total pages updated
//!     │                         Err → nothing touched
//!     ▼
//! end_load(error)               loading = false, fixed message on error
//! ```
//!
//! Images are only cleared once a response has normalized successfully, so a
//! failed fetch leaves the previous page on screen.
//!
//! # Identity
//!
//! No two images share an id. Inserting an id that is already present is a
//! no-op: the first write wins, both within one payload and for local adds.

use crate::filter::FilterState;
use crate::normalize::{self, NormalizationError};
use crate::observe::{Listeners, SubscriptionId};
use crate::pagination::Pagination;
use crate::types::Image;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeSet;

/// The only message ever shown for a failed fetch.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch images. Please try again later.";

/// Media type given to images added by hand.
pub const LOCAL_MEDIA_TYPE: &str = "image";

/// A committed change to the gallery store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    LoadStarted,
    /// A fetch result replaced the image list.
    ImagesReplaced { count: usize, total_pages: u32 },
    LoadFinished { failed: bool },
    ImageAdded { id: String },
    ImageRemoved { id: String },
    /// The current page moved; renderers scroll back to the top.
    PageChanged { page: u32 },
    PageReset,
}

/// Fields of the "add image" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewImage {
    pub title: String,
    pub description: String,
    pub url: String,
    /// Defaults to the current time when absent.
    pub date: Option<String>,
}

#[derive(Debug, Default)]
pub struct GalleryStore {
    images: Vec<Image>,
    loading: bool,
    error: Option<String>,
    pagination: Pagination,
    listeners: Listeners<GalleryEvent>,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- read-only snapshots ----

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|img| img.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Images passing `filters`, in store order.
    pub fn filtered_images(&self, filters: &FilterState) -> Vec<&Image> {
        filters.apply(&self.images)
    }

    /// Distinct 4-character year prefixes of all loaded dates, newest first.
    pub fn unique_years(&self) -> Vec<String> {
        let years: BTreeSet<&str> = self
            .images
            .iter()
            .map(Image::year)
            .filter(|year| !year.is_empty())
            .collect();
        years.into_iter().rev().map(str::to_string).collect()
    }

    // ---- subscriptions ----

    pub fn subscribe(&mut self, listener: impl FnMut(&GalleryEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ---- fetch lifecycle ----

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
        self.listeners.notify(&GalleryEvent::LoadStarted);
    }

    /// Normalize `payload` and, on success, replace the image list with it.
    ///
    /// Returns the number of images stored. On error the store is untouched;
    /// the caller still finishes with [`end_load`](Self::end_load).
    pub fn ingest_fetch_result(
        &mut self,
        payload: &serde_json::Value,
        page_size: u32,
    ) -> Result<usize, NormalizationError> {
        let page = normalize::normalize(payload)?;

        self.images.clear();
        let offered = page.images.len();
        for image in page.images {
            if !self.insert_unique(image) {
                tracing::debug!("dropping duplicate image id from payload");
            }
        }
        let count = self.images.len();
        if count < offered {
            tracing::warn!(offered, kept = count, "payload contained duplicate image ids");
        }

        let total = normalize::total_pages(page.total_hits, page_size);
        self.pagination.set_total_pages(total);
        tracing::info!(
            count,
            total_hits = page.total_hits,
            total_pages = total,
            "ingested search results"
        );

        self.listeners.notify(&GalleryEvent::ImagesReplaced {
            count,
            total_pages: total,
        });
        Ok(count)
    }

    /// Finish a fetch attempt, successful or not.
    ///
    /// The underlying error is logged; users only ever see
    /// [`FETCH_ERROR_MESSAGE`].
    pub fn end_load(&mut self, error: Option<&dyn std::error::Error>) {
        self.loading = false;
        if let Some(err) = error {
            tracing::error!(error = %err, "error fetching images");
            self.error = Some(FETCH_ERROR_MESSAGE.to_string());
        }
        self.listeners.notify(&GalleryEvent::LoadFinished {
            failed: error.is_some(),
        });
    }

    // ---- local edits ----

    /// Add a hand-made image. Requires a title and a URL; otherwise nothing
    /// happens and `None` is returned.
    pub fn add_local_image(&mut self, new: NewImage) -> Option<String> {
        if new.title.trim().is_empty() || new.url.trim().is_empty() {
            tracing::debug!("ignoring local image without title or url");
            return None;
        }
        let image = Image {
            id: uuid::Uuid::now_v7().to_string(),
            title: new.title,
            description: new.description,
            date: new
                .date
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            url: new.url,
            media_type: LOCAL_MEDIA_TYPE.to_string(),
            center: String::new(),
        };
        self.add_image(image)
    }

    /// Insert an already-formed image. Duplicate ids are ignored.
    pub fn add_image(&mut self, image: Image) -> Option<String> {
        let id = image.id.clone();
        if !self.insert_unique(image) {
            return None;
        }
        self.error = None;
        self.listeners
            .notify(&GalleryEvent::ImageAdded { id: id.clone() });
        Some(id)
    }

    /// Remove the image with `id`. Returns `false` if there was none.
    pub fn remove_image(&mut self, id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.id != id);
        if self.images.len() == before {
            return false;
        }
        self.listeners
            .notify(&GalleryEvent::ImageRemoved { id: id.to_string() });
        true
    }

    // ---- pagination ----

    /// Move to page `n`. Returns `false` (and changes nothing) when `n` is
    /// out of range or already current.
    pub fn go_to_page(&mut self, n: u32) -> bool {
        if !self.pagination.go_to_page(n) {
            tracing::debug!(requested = n, total = self.pagination.total_pages(), "page change ignored");
            return false;
        }
        self.listeners.notify(&GalleryEvent::PageChanged { page: n });
        true
    }

    pub fn reset_page(&mut self) {
        self.pagination.reset();
        self.listeners.notify(&GalleryEvent::PageReset);
    }

    fn insert_unique(&mut self, image: Image) -> bool {
        if self.images.iter().any(|img| img.id == image.id) {
            return false;
        }
        self.images.push(image);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterField;
    use crate::test_helpers::{image, image_ids, nasa_item, nasa_payload, store_ids};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn loaded(ids: &[&str], total_hits: u64) -> GalleryStore {
        let mut store = GalleryStore::new();
        let items = ids
            .iter()
            .map(|id| nasa_item(id, &format!("Image {id}"), "2020-01-01T00:00:00Z"))
            .collect();
        store.begin_load();
        store
            .ingest_fetch_result(&nasa_payload(items, total_hits), 20)
            .unwrap();
        store.end_load(None);
        store
    }

    fn recorded(store: &mut GalleryStore) -> Rc<RefCell<Vec<GalleryEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    // =========================================================================
    // Fetch lifecycle
    // =========================================================================

    #[test]
    fn begin_load_sets_loading_and_clears_error() {
        let mut store = loaded(&["a"], 1);
        store.begin_load();
        store.end_load(Some(&NormalizationError::MissingItems));
        assert!(store.error().is_some());

        store.begin_load();
        assert!(store.is_loading());
        assert_eq!(store.error(), None);
        assert_eq!(store_ids(&store), vec!["a"]);
    }

    #[test]
    fn successful_ingest_replaces_images() {
        let mut store = loaded(&["a", "b"], 2);
        store.begin_load();
        let payload = nasa_payload(vec![nasa_item("c", "C", "2021-01-01")], 1);
        assert_eq!(store.ingest_fetch_result(&payload, 20).unwrap(), 1);
        store.end_load(None);

        assert_eq!(store_ids(&store), vec!["c"]);
        assert!(!store.is_loading());
        assert_eq!(store.error(), None);
    }

    #[test]
    fn duplicate_ids_in_payload_keep_first() {
        let mut store = GalleryStore::new();
        let payload = nasa_payload(
            vec![
                nasa_item("a", "First", "2020-01-01"),
                nasa_item("b", "Other", "2020-01-01"),
                nasa_item("a", "Second", "2020-01-01"),
            ],
            3,
        );
        assert_eq!(store.ingest_fetch_result(&payload, 20).unwrap(), 2);
        assert_eq!(store_ids(&store), vec!["a", "b"]);
        assert_eq!(store.image("a").unwrap().title, "First");
    }

    #[test]
    fn repeated_ingestion_never_duplicates() {
        let mut store = GalleryStore::new();
        let payload = nasa_payload(
            vec![nasa_item("a", "A", "2020"), nasa_item("a", "A again", "2020")],
            2,
        );
        for _ in 0..3 {
            store.ingest_fetch_result(&payload, 20).unwrap();
            let ids = store_ids(&store);
            let unique: BTreeSet<&str> = ids.iter().copied().collect();
            assert_eq!(ids.len(), unique.len());
        }
    }

    #[test]
    fn ingest_sets_total_pages() {
        let store = loaded(&["a"], 21);
        assert_eq!(store.pagination().total_pages(), 2);
        let store = loaded(&[], 0);
        assert_eq!(store.pagination().total_pages(), 1);
    }

    #[test]
    fn malformed_payload_leaves_store_unchanged() {
        let mut store = loaded(&["a", "b"], 45);
        store.go_to_page(3);
        store.begin_load();

        let result = store.ingest_fetch_result(&json!({}), 20);
        assert!(matches!(result, Err(NormalizationError::MissingCollection)));
        let err = result.unwrap_err();
        store.end_load(Some(&err));

        assert_eq!(store_ids(&store), vec!["a", "b"]);
        assert_eq!(store.pagination().current_page(), 3);
        assert_eq!(store.pagination().total_pages(), 3);
        assert!(!store.is_loading());
        assert_eq!(store.error(), Some(FETCH_ERROR_MESSAGE));
    }

    #[test]
    fn end_load_without_error_keeps_error_clear() {
        let mut store = GalleryStore::new();
        store.begin_load();
        store.end_load(None);
        assert!(!store.is_loading());
        assert_eq!(store.error(), None);
    }

    // =========================================================================
    // Local edits
    // =========================================================================

    #[test]
    fn add_local_image_generates_id_and_defaults() {
        let mut store = GalleryStore::new();
        let id = store
            .add_local_image(NewImage {
                title: "My Telescope".into(),
                description: "Backyard setup".into(),
                url: "https://example.test/scope.jpg".into(),
                date: None,
            })
            .unwrap();
        let img = store.image(&id).unwrap();
        assert_eq!(img.title, "My Telescope");
        assert_eq!(img.media_type, LOCAL_MEDIA_TYPE);
        assert_eq!(img.center, "");
        assert!(img.date.ends_with('Z'));
        assert!(!img.year().is_empty());
    }

    #[test]
    fn add_local_image_keeps_given_date() {
        let mut store = GalleryStore::new();
        let id = store
            .add_local_image(NewImage {
                title: "Old".into(),
                url: "u".into(),
                date: Some("1999-12-31".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.image(&id).unwrap().date, "1999-12-31");
    }

    #[test]
    fn add_local_image_requires_title_and_url() {
        let mut store = GalleryStore::new();
        let events = recorded(&mut store);
        assert_eq!(
            store.add_local_image(NewImage {
                title: "  ".into(),
                url: "u".into(),
                ..Default::default()
            }),
            None
        );
        assert_eq!(
            store.add_local_image(NewImage {
                title: "t".into(),
                url: String::new(),
                ..Default::default()
            }),
            None
        );
        assert!(store.images().is_empty());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn local_ids_are_unique() {
        let mut store = GalleryStore::new();
        for n in 0..50 {
            store.add_local_image(NewImage {
                title: format!("t{n}"),
                url: "u".into(),
                ..Default::default()
            });
        }
        assert_eq!(store.images().len(), 50);
    }

    #[test]
    fn add_image_with_existing_id_is_ignored() {
        let mut store = loaded(&["a"], 1);
        assert_eq!(store.add_image(image("a", "Impostor", "2000")), None);
        assert_eq!(store.image("a").unwrap().title, "Image a");
        assert_eq!(store.images().len(), 1);
    }

    #[test]
    fn remove_image_present_and_absent() {
        let mut store = loaded(&["a", "b", "c"], 3);
        assert!(store.remove_image("b"));
        assert_eq!(store_ids(&store), vec!["a", "c"]);
        assert!(!store.remove_image("zzz"));
        assert_eq!(store_ids(&store), vec!["a", "c"]);
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    #[test]
    fn unique_years_descending_and_deduplicated() {
        let mut store = GalleryStore::new();
        for (id, date) in [
            ("a", "2019-01-01"),
            ("b", "2021-06-01"),
            ("c", "2019-12-31"),
            ("d", ""),
            ("e", "1969-07-20"),
        ] {
            store.add_image(image(id, id, date));
        }
        assert_eq!(store.unique_years(), vec!["2021", "2019", "1969"]);
    }

    #[test]
    fn filtered_images_track_current_state() {
        let mut store = GalleryStore::new();
        store.add_image(image("a", "Mars", "2020-01-01"));
        store.add_image(image("b", "Moon", "2021-01-01"));
        let mut filters = FilterState::default();
        filters.set(FilterField::Year, "2021");
        assert_eq!(image_ids(&store.filtered_images(&filters)), vec!["b"]);

        store.remove_image("b");
        assert!(store.filtered_images(&filters).is_empty());
        assert_eq!(
            image_ids(&store.filtered_images(&FilterState::default())),
            vec!["a"]
        );
    }

    // =========================================================================
    // Pagination and events
    // =========================================================================

    #[test]
    fn go_to_page_respects_range() {
        let mut store = loaded(&["a"], 100);
        assert!(store.go_to_page(5));
        assert_eq!(store.pagination().current_page(), 5);
        assert!(!store.go_to_page(6));
        assert!(!store.go_to_page(0));
        assert_eq!(store.pagination().current_page(), 5);
    }

    #[test]
    fn events_follow_committed_mutations() {
        let mut store = GalleryStore::new();
        let events = recorded(&mut store);

        store.begin_load();
        store
            .ingest_fetch_result(&nasa_payload(vec![nasa_item("a", "A", "2020")], 40), 20)
            .unwrap();
        store.end_load(None);
        store.go_to_page(2);
        store.go_to_page(9);
        store.remove_image("a");
        store.remove_image("a");

        assert_eq!(
            *events.borrow(),
            vec![
                GalleryEvent::LoadStarted,
                GalleryEvent::ImagesReplaced {
                    count: 1,
                    total_pages: 2
                },
                GalleryEvent::LoadFinished { failed: false },
                GalleryEvent::PageChanged { page: 2 },
                GalleryEvent::ImageRemoved { id: "a".into() },
            ]
        );
    }

    #[test]
    fn failed_normalization_emits_no_replace_event() {
        let mut store = GalleryStore::new();
        let events = recorded(&mut store);
        store.begin_load();
        let err = store.ingest_fetch_result(&json!({"collection": {}}), 20).unwrap_err();
        store.end_load(Some(&err));
        assert_eq!(
            *events.borrow(),
            vec![
                GalleryEvent::LoadStarted,
                GalleryEvent::LoadFinished { failed: true },
            ]
        );
    }
}
