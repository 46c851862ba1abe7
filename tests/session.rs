//! End-to-end session behavior against a scripted image source.
//!
//! The source records every request it receives and answers from a queue of
//! canned responses, so each test can assert both what was fetched and what
//! the store ended up showing.

use nasa_gallery::client::{FetchError, ImageSource};
use nasa_gallery::debounce::{Debouncer, SEARCH_DEBOUNCE};
use nasa_gallery::filter::FilterField;
use nasa_gallery::gallery::{FETCH_ERROR_MESSAGE, GalleryEvent};
use nasa_gallery::query::QueryRequest;
use nasa_gallery::session::Gallery;
use nasa_gallery::types::NO_DESCRIPTION;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::{Instant, sleep};

#[derive(Default)]
struct ScriptedSource {
    responses: RefCell<VecDeque<Result<Value, FetchError>>>,
    requests: RefCell<Vec<QueryRequest>>,
}

impl ScriptedSource {
    fn answering(responses: Vec<Result<Value, FetchError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::default(),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn last_request(&self) -> QueryRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was made")
    }
}

impl ImageSource for ScriptedSource {
    async fn fetch(&self, request: &QueryRequest) -> Result<Value, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(page_of(&[], 0)))
    }
}

fn item(id: &str, title: &str, date: &str) -> Value {
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

fn page_of(ids: &[&str], total_hits: u64) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| item(id, &format!("Image {id}"), "2020-01-01T00:00:00Z"))
        .collect();
    json!({ "collection": { "items": items, "metadata": { "total_hits": total_hits } } })
}

fn ids<S: ImageSource>(gallery: &Gallery<S>) -> Vec<String> {
    gallery
        .store()
        .images()
        .iter()
        .map(|img| img.id.clone())
        .collect()
}

fn server_error() -> FetchError {
    FetchError::Status {
        status: 500,
        body: "internal error".into(),
    }
}

// =========================================================================
// Fetch lifecycle
// =========================================================================

#[tokio::test]
async fn rocket_payload_is_normalized() {
    let payload = json!({
        "collection": {
            "items": [{
                "data": [{ "nasa_id": "1", "title": "Rocket", "date_created": "2020-05-01T00:00:00Z" }],
                "links": [{ "href": "http://x/1.jpg" }]
            }],
            "metadata": { "total_hits": 21 }
        }
    });
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![Ok(payload)]));
    assert!(gallery.refresh().await);

    let images = gallery.store().images();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, "1");
    assert_eq!(images[0].title, "Rocket");
    assert_eq!(images[0].description, NO_DESCRIPTION);
    assert_eq!(images[0].url, "http://x/1.jpg");
    assert_eq!(gallery.store().pagination().total_pages(), 2);
    assert!(!gallery.store().is_loading());
    assert_eq!(gallery.store().error(), None);
}

#[tokio::test]
async fn empty_object_payload_keeps_previous_images() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![
        Ok(page_of(&["a", "b"], 2)),
        Ok(json!({})),
    ]));
    gallery.refresh().await;
    assert!(!gallery.refresh().await);

    assert_eq!(ids(&gallery), vec!["a", "b"]);
    assert!(!gallery.store().is_loading());
    assert_eq!(gallery.store().error(), Some(FETCH_ERROR_MESSAGE));
}

#[tokio::test]
async fn transport_error_keeps_previous_images() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![
        Ok(page_of(&["a"], 1)),
        Err(server_error()),
    ]));
    gallery.refresh().await;
    assert!(!gallery.refresh().await);

    assert_eq!(ids(&gallery), vec!["a"]);
    assert_eq!(gallery.store().error(), Some(FETCH_ERROR_MESSAGE));
}

#[tokio::test]
async fn next_successful_fetch_clears_the_error() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![
        Err(server_error()),
        Ok(page_of(&["a"], 1)),
    ]));
    gallery.refresh().await;
    assert!(gallery.store().error().is_some());
    gallery.refresh().await;
    assert_eq!(gallery.store().error(), None);
    assert_eq!(ids(&gallery), vec!["a"]);
}

#[tokio::test]
async fn store_events_bracket_each_fetch() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![Ok(page_of(&["a"], 1))]));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    gallery
        .store_mut()
        .subscribe(move |e| sink.borrow_mut().push(e.clone()));

    gallery.refresh().await;
    assert_eq!(
        *events.borrow(),
        vec![
            GalleryEvent::LoadStarted,
            GalleryEvent::ImagesReplaced {
                count: 1,
                total_pages: 1
            },
            GalleryEvent::LoadFinished { failed: false },
        ]
    );
}

// =========================================================================
// Pagination and filters
// =========================================================================

#[tokio::test]
async fn page_change_fetches_that_page() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![Ok(page_of(&["a"], 100))]));
    gallery.refresh().await;
    assert!(gallery.go_to_page(3).await);
    assert_eq!(gallery.source().last_request().page(), Some(3));
    assert_eq!(gallery.store().pagination().current_page(), 3);
}

#[tokio::test]
async fn out_of_range_page_makes_no_request() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![Ok(page_of(&["a"], 100))]));
    gallery.refresh().await;
    let before = gallery.source().request_count();

    assert!(!gallery.go_to_page(0).await);
    assert!(!gallery.go_to_page(6).await);
    assert!(!gallery.go_to_page(1).await);
    assert!(!gallery.previous_page().await);

    assert_eq!(gallery.source().request_count(), before);
    assert_eq!(gallery.store().pagination().current_page(), 1);
}

#[tokio::test]
async fn filter_change_resets_to_first_page() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![
        Ok(page_of(&["a"], 100)),
        Ok(page_of(&["b"], 100)),
    ]));
    gallery.refresh().await;
    gallery.go_to_page(4).await;

    assert!(gallery.set_filter(FilterField::Year, "2020").await);
    let request = gallery.source().last_request();
    assert_eq!(request.page(), Some(1));
    assert_eq!(request.get("year_start"), Some("2020"));
    assert_eq!(gallery.store().pagination().current_page(), 1);

    let count = gallery.source().request_count();
    assert!(!gallery.set_filter(FilterField::Year, "2020").await);
    assert_eq!(gallery.source().request_count(), count);
}

#[tokio::test]
async fn clearing_a_filter_drops_its_parameter() {
    let mut gallery = Gallery::new(ScriptedSource::default());
    gallery.set_filter(FilterField::Center, "JPL").await;
    assert_eq!(gallery.source().last_request().get("center"), Some("JPL"));
    gallery.set_filter(FilterField::Center, "").await;
    assert_eq!(gallery.source().last_request().get("center"), None);
}

// =========================================================================
// Search and debounce
// =========================================================================

#[tokio::test]
async fn live_input_filters_without_fetching() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![Ok(json!({
        "collection": {
            "items": [item("1", "Mars Rover", "2020"), item("2", "Moon Lander", "1969")],
            "metadata": { "total_hits": 2 }
        }
    }))]));
    gallery.refresh().await;
    let count = gallery.source().request_count();

    gallery.input_search("ROVER");
    let visible: Vec<&str> = gallery
        .filtered_images()
        .iter()
        .map(|img| img.id.as_str())
        .collect();
    assert_eq!(visible, vec!["1"]);
    assert_eq!(gallery.source().request_count(), count);
}

#[tokio::test]
async fn settling_unchanged_text_does_not_fetch() {
    let mut gallery = Gallery::new(ScriptedSource::default());
    assert!(gallery.settle_search("mars").await);
    assert!(!gallery.settle_search("mars").await);
    assert_eq!(gallery.source().request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn typing_burst_sends_one_query() {
    let mut gallery = Gallery::new(ScriptedSource::default());
    let (mut debouncer, mut settled) = Debouncer::new(SEARCH_DEBOUNCE);

    for text in ["m", "ma", "mar"] {
        gallery.input_search(text);
        debouncer.push(text.to_string());
        sleep(Duration::from_millis(100)).await;
    }
    gallery.input_search("mars");
    debouncer.push("mars".to_string());
    let last_keystroke = Instant::now();

    let text = settled.recv().await.unwrap();
    assert!(last_keystroke.elapsed() >= SEARCH_DEBOUNCE);
    gallery.settle_search(&text).await;

    sleep(Duration::from_secs(2)).await;
    assert!(settled.try_recv().is_err());
    assert_eq!(gallery.source().request_count(), 1);
    assert_eq!(gallery.source().last_request().text(), Some("mars"));
}

// =========================================================================
// Overlapping requests
// =========================================================================

#[tokio::test]
async fn last_completed_response_wins() {
    let mut gallery = Gallery::new(ScriptedSource::default());
    let first = gallery.begin_fetch();
    let second = gallery.begin_fetch();
    assert_eq!(first, second);

    // The newer request answers first, the stale one after it.
    gallery.complete_fetch(Ok(page_of(&["new"], 1)));
    gallery.complete_fetch(Ok(page_of(&["stale"], 1)));

    assert_eq!(ids(&gallery), vec!["stale"]);
    assert!(!gallery.store().is_loading());
}

// =========================================================================
// Collections and viewer
// =========================================================================

#[tokio::test]
async fn collection_entries_survive_page_changes() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![
        Ok(page_of(&["a", "b"], 40)),
        Ok(page_of(&["c"], 40)),
    ]));
    gallery.refresh().await;
    let id = gallery
        .collections_mut()
        .create_collection("Mars Trip", None)
        .unwrap();
    assert!(gallery.add_to_collection(&id, "a"));
    assert!(!gallery.add_to_collection(&id, "a"));
    assert!(!gallery.add_to_collection(&id, "missing"));

    gallery.go_to_page(2).await;
    assert_eq!(ids(&gallery), vec!["c"]);
    let collection = gallery.collections().get(&id).unwrap();
    assert_eq!(collection.images.len(), 1);
    assert_eq!(collection.images[0].title, "Image a");
}

#[tokio::test]
async fn viewer_steps_through_visible_images() {
    let mut gallery = Gallery::new(ScriptedSource::answering(vec![Ok(page_of(
        &["a", "b", "c"],
        3,
    ))]));
    gallery.refresh().await;

    assert!(!gallery.open_image("zzz"));
    assert!(gallery.open_image("a"));
    assert!(gallery.view_next());
    assert_eq!(gallery.viewed_image().map(|img| img.id.as_str()), Some("b"));

    gallery.zoom_in();
    gallery.close_viewer();
    assert_eq!(gallery.viewed_image(), None);
    assert_eq!(gallery.viewer().zoom(), 100);
}
