//! # NASA Gallery
//!
//! A view model for browsing the NASA Image and Video Library. Remote search
//! results, client-side filters, the page window and user-made collections
//! are kept in one consistent state that a renderer observes.
//!
//! # Architecture: One Store, One Source
//!
//! ```text
//!  input ──▶ Debouncer ──▶ session::Gallery ──build_query──▶ ImageSource
//!                              │                               │
//!                              │   ◀──── raw JSON payload ─────┘
//!                              ▼
//!                     GalleryStore (normalize, dedupe, paginate)
//!                              │
//!                              ▼ GalleryEvent
//!                           renderer (shell / output)
//! ```
//!
//! The store never performs I/O. The session decides when to fetch, the
//! [`client::ImageSource`] performs the fetch, and the store only ingests a
//! payload it is handed. This separation keeps the store testable with
//! plain JSON values and no runtime.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`query`] | Pure request construction from search text, filters and page |
//! | [`normalize`] | Raw API payload → [`types::Image`] records plus hit count |
//! | [`gallery`] | The state store: images, loading/error, pagination, derived views |
//! | [`pagination`] | 1-based page window with range checks |
//! | [`filter`] | Search and selection predicates, fixed choice lists |
//! | [`collections`] | Named user collections with de-duplicated entries |
//! | [`debounce`] | Cancellable timer that settles bursts of search input |
//! | [`observe`] | Subscriber list used by the store and collection manager |
//! | [`session`] | Composition root: owns the store and drives fetches |
//! | [`client`] | `ImageSource` trait and the `reqwest` HTTP implementation |
//! | [`viewer`] | Full-size viewer selection and zoom |
//! | [`settings`] | Persisted display preferences |
//! | [`config`] | `gallery.toml` loading, merging over stock defaults, validation |
//! | [`output`] | Terminal formatting of gallery state |
//! | [`shell`] | Interactive command loop and its command grammar |
//!
//! # Design Decisions
//!
//! ## Explicit Store, No Globals
//!
//! The store is a value owned by [`session::Gallery`]. Renderers register
//! closures with `subscribe` and receive typed events after each committed
//! mutation. Tests build as many independent stores as they like.
//!
//! ## Errors Stop at the Session
//!
//! Transport and payload failures are logged with their cause and then
//! reduced to one fixed user-facing message on the store. The previously
//! loaded page stays visible. There is no retry.
//!
//! ## Last Response Wins
//!
//! Overlapping fetches are not sequenced. Whichever response completes last
//! is the one on screen. The debounce keeps overlaps rare during typing.
//!
//! ## Stock Defaults Plus Overrides
//!
//! Configuration starts from compiled-in defaults serialized to TOML. A user
//! `gallery.toml` only needs the keys it changes; it is deep-merged on top
//! and unknown keys are rejected, so typos fail loudly.

pub mod client;
pub mod collections;
pub mod config;
pub mod debounce;
pub mod filter;
pub mod gallery;
pub mod normalize;
pub mod observe;
pub mod output;
pub mod pagination;
pub mod query;
pub mod session;
pub mod settings;
pub mod shell;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
