//! The gallery session: one image source plus all view-model state.
//!
//! [`Gallery`] owns the [`GalleryStore`], the [`CollectionManager`], the
//! filter selections and the viewer. It is the only place that talks to an
//! [`ImageSource`], and it decides when a fetch is needed:
//!
//! | Trigger | Page | Fetch |
//! |---------|------|-------|
//! | live search input | kept | no (local filtering only) |
//! | settled search text changed | reset to 1 | yes |
//! | year / media / center changed | reset to 1 | yes |
//! | page changed to a valid page | new page | yes |
//! | page out of range or current | kept | no |
//!
//! A fetch is split into [`Gallery::begin_fetch`] and
//! [`Gallery::complete_fetch`]. Responses are applied in completion order
//! with no sequencing, so when requests overlap the last one to complete
//! wins, even if it was issued first.

use crate::client::{FetchError, ImageSource};
use crate::collections::CollectionManager;
use crate::filter::{FilterField, FilterState};
use crate::gallery::{GalleryStore, NewImage};
use crate::query::{QueryRequest, build_query};
use crate::types::{DEFAULT_PAGE_SIZE, Image};
use crate::viewer::Viewer;

#[derive(Debug)]
pub struct Gallery<S> {
    source: S,
    page_size: u32,
    store: GalleryStore,
    collections: CollectionManager,
    filters: FilterState,
    /// Search text of the last query sent (or about to be sent).
    settled_search: String,
    viewer: Viewer,
}

impl<S: ImageSource> Gallery<S> {
    pub fn new(source: S) -> Self {
        Self::with_page_size(source, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            store: GalleryStore::new(),
            collections: CollectionManager::new(),
            filters: FilterState::default(),
            settled_search: String::new(),
            viewer: Viewer::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn store(&self) -> &GalleryStore {
        &self.store
    }

    /// Mutable store access, for subscribing renderers.
    pub fn store_mut(&mut self) -> &mut GalleryStore {
        &mut self.store
    }

    pub fn collections(&self) -> &CollectionManager {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut CollectionManager {
        &mut self.collections
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn settled_search(&self) -> &str {
        &self.settled_search
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Loaded images passing the current search text and filters.
    pub fn filtered_images(&self) -> Vec<&Image> {
        self.store.filtered_images(&self.filters)
    }

    // ---- search and filters ----

    /// Replace search text and filters without fetching, for sessions that
    /// start from command-line state. The text is both live and settled.
    pub fn restore(&mut self, search: &str, mut filters: FilterState) {
        filters.search = search.to_string();
        self.filters = filters;
        self.settled_search = search.to_string();
        self.store.reset_page();
    }

    /// Update the live search text. Filters locally; never fetches.
    pub fn input_search(&mut self, text: &str) {
        self.filters.search = text.to_string();
    }

    pub fn clear_search(&mut self) {
        self.filters.clear_search();
    }

    /// Adopt debounced search text. Unchanged text is ignored; anything
    /// else goes back to page 1 and fetches. Returns whether a fetch ran.
    pub async fn settle_search(&mut self, text: &str) -> bool {
        if text == self.settled_search {
            return false;
        }
        tracing::info!(search = text, "search settled");
        self.settled_search = text.to_string();
        self.store.reset_page();
        self.refresh().await;
        true
    }

    /// Change a selection filter, reset to page 1 and fetch. Setting the
    /// current value again does nothing.
    pub async fn set_filter(&mut self, field: FilterField, value: &str) -> bool {
        if self.filters.get(field).unwrap_or("") == value {
            return false;
        }
        tracing::info!(%field, value, "filter changed");
        self.filters.set(field, value);
        self.store.reset_page();
        self.refresh().await;
        true
    }

    // ---- pagination ----

    /// Move to page `n` and fetch it. Invalid pages change nothing.
    pub async fn go_to_page(&mut self, n: u32) -> bool {
        if !self.store.go_to_page(n) {
            return false;
        }
        self.refresh().await;
        true
    }

    pub async fn next_page(&mut self) -> bool {
        let page = self.store.pagination().current_page();
        self.go_to_page(page.saturating_add(1)).await
    }

    pub async fn previous_page(&mut self) -> bool {
        let page = self.store.pagination().current_page();
        self.go_to_page(page.saturating_sub(1)).await
    }

    // ---- fetching ----

    /// Fetch the current page for the settled search and filters.
    ///
    /// Returns `true` if the response was ingested. Failures are logged
    /// and surface only as the store's error message.
    pub async fn refresh(&mut self) -> bool {
        let request = self.begin_fetch();
        let result = self.source.fetch(&request).await;
        self.complete_fetch(result)
    }

    /// Mark the store as loading and describe the request to send.
    pub fn begin_fetch(&mut self) -> QueryRequest {
        self.store.begin_load();
        let page = self.store.pagination().current_page();
        let request = build_query(&self.settled_search, &self.filters, page, self.page_size);
        tracing::debug!(page, search = %self.settled_search, "fetch started");
        request
    }

    /// Apply a fetch outcome to the store.
    pub fn complete_fetch(&mut self, result: Result<serde_json::Value, FetchError>) -> bool {
        match result {
            Ok(payload) => match self.store.ingest_fetch_result(&payload, self.page_size) {
                Ok(_) => {
                    self.store.end_load(None);
                    true
                }
                Err(err) => {
                    tracing::warn!(error = %err, "search payload rejected");
                    self.store.end_load(Some(&err));
                    false
                }
            },
            Err(err) => {
                self.store.end_load(Some(&err));
                false
            }
        }
    }

    // ---- local edits ----

    pub fn add_local_image(&mut self, new: NewImage) -> Option<String> {
        self.store.add_local_image(new)
    }

    pub fn remove_image(&mut self, id: &str) -> bool {
        self.store.remove_image(id)
    }

    /// Copy a loaded image into a collection.
    pub fn add_to_collection(&mut self, collection_id: &str, image_id: &str) -> bool {
        let Some(image) = self.store.image(image_id) else {
            tracing::debug!(image = image_id, "image not loaded");
            return false;
        };
        self.collections.add_image_to_collection(collection_id, image)
    }

    // ---- viewer ----

    /// Open a loaded image in the viewer.
    pub fn open_image(&mut self, id: &str) -> bool {
        if self.store.image(id).is_none() {
            return false;
        }
        self.viewer.open(id);
        true
    }

    pub fn close_viewer(&mut self) {
        self.viewer.close();
    }

    /// The viewed image, if it is still visible.
    pub fn viewed_image(&self) -> Option<&Image> {
        self.viewer.current(&self.filtered_images())
    }

    pub fn view_next(&mut self) -> bool {
        let visible = self.store.filtered_images(&self.filters);
        self.viewer.next(&visible)
    }

    pub fn view_previous(&mut self) -> bool {
        let visible = self.store.filtered_images(&self.filters);
        self.viewer.previous(&visible)
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.viewer.zoom_in()
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.viewer.zoom_out()
    }
}
