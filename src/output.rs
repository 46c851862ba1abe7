//! Terminal rendering of gallery state.
//!
//! # Information-First Display
//!
//! Every entity (image, collection) leads with its positional index and
//! title. Secondary facts (date, center, id, link) follow as indented
//! context lines, and only in the list layout; the grid layout keeps one
//! line per image.
//!
//! # Output Format
//!
//! ## Gallery (grid)
//!
//! ```text
//! Search: mars | Year: 2021
//! 001 Perseverance Rover Illustration [2020]
//! 002 Ingenuity's First Flight [2021]
//! Page 1 of 211 (next ›)
//! ```
//!
//! ## Gallery (list)
//!
//! ```text
//! 001 Perseverance Rover Illustration
//!     An illustration of the Mars 2020 Perseverance rover.
//!     Date: 2020-03-23  Center: JPL  Id: PIA23764
//!     https://images-assets.nasa.gov/image/PIA23764/PIA23764~thumb.jpg
//! ```
//!
//! ## Collections
//!
//! ```text
//! Collections
//! 001 Mars Trip (2 images)
//!     Favourites from the rover missions
//!     Id: 0192...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::collections::CollectionManager;
use crate::filter::FilterState;
use crate::gallery::GalleryStore;
use crate::settings::{Layout, Preferences};
use crate::types::Image;

/// Descriptions longer than this are cut in the list layout.
const DESCRIPTION_WIDTH: usize = 120;

pub const EMPTY_TITLE: &str = "No Images Found";
pub const EMPTY_HINT: &str = "Try adjusting your search or filters to find what you're looking for.";

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Positional index + title, with an optional image count.
///
/// ```text
/// 001 Mars Trip (3 images)
/// 002 Rocket
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(1) => format!("{} {} (1 image)", format_index(index), title),
        Some(n) => format!("{} {} ({} images)", format_index(index), title, n),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Untitled images show their id in parens; the id is the identity.
fn image_title(image: &Image) -> String {
    if image.title.trim().is_empty() {
        format!("({})", image.id)
    } else {
        image.title.clone()
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

fn image_lines(index: usize, image: &Image, layout: Layout) -> Vec<String> {
    let title = image_title(image);
    match layout {
        Layout::Grid => {
            let year = image.year();
            if year.is_empty() {
                vec![entity_header(index, &title, None)]
            } else {
                vec![format!("{} [{}]", entity_header(index, &title, None), year)]
            }
        }
        Layout::List => {
            let ctx = indent(1);
            let mut lines = vec![entity_header(index, &title, None)];
            if !image.description.is_empty() {
                lines.push(format!(
                    "{}{}",
                    ctx,
                    truncate_desc(&image.description, DESCRIPTION_WIDTH)
                ));
            }
            let mut facts = Vec::new();
            if !image.date.is_empty() {
                facts.push(format!("Date: {}", image.date.get(..10).unwrap_or(&image.date)));
            }
            if !image.center.is_empty() {
                facts.push(format!("Center: {}", image.center));
            }
            facts.push(format!("Id: {}", image.id));
            lines.push(format!("{}{}", ctx, facts.join("  ")));
            if !image.url.is_empty() {
                lines.push(format!("{}{}", ctx, image.url));
            }
            lines
        }
    }
}

// ============================================================================
// Gallery
// ============================================================================

/// One-line summary of the active search and filters, if any are set.
pub fn format_filters(filters: &FilterState) -> Option<String> {
    let mut parts = Vec::new();
    if !filters.search.is_empty() {
        parts.push(format!("Search: {}", filters.search));
    }
    if let Some(year) = &filters.year {
        parts.push(format!("Year: {year}"));
    }
    if let Some(media) = &filters.media_type {
        parts.push(format!("Media: {media}"));
    }
    if let Some(center) = &filters.center {
        parts.push(format!("Center: {center}"));
    }
    (!parts.is_empty()).then(|| parts.join(" | "))
}

/// Format the gallery: status, visible images and the page footer.
pub fn format_gallery(
    store: &GalleryStore,
    filters: &FilterState,
    visible: &[&Image],
    layout: Layout,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(summary) = format_filters(filters) {
        lines.push(summary);
    }
    if store.is_loading() {
        lines.push("Loading...".to_string());
    }
    if let Some(error) = store.error() {
        lines.push(format!("Error: {error}"));
    }

    if visible.is_empty() {
        if !store.is_loading() {
            lines.push(EMPTY_TITLE.to_string());
            lines.push(format!("{}{}", indent(1), EMPTY_HINT));
        }
    } else {
        for (i, image) in visible.iter().enumerate() {
            lines.extend(image_lines(i + 1, image, layout));
        }
    }

    let pagination = store.pagination();
    let mut footer = format!(
        "Page {} of {}",
        pagination.current_page(),
        pagination.total_pages()
    );
    match (pagination.has_previous(), pagination.has_next()) {
        (true, true) => footer.push_str(" (‹ prev | next ›)"),
        (true, false) => footer.push_str(" (‹ prev)"),
        (false, true) => footer.push_str(" (next ›)"),
        (false, false) => {}
    }
    lines.push(footer);

    lines
}

/// Print the gallery to stdout.
pub fn print_gallery(store: &GalleryStore, filters: &FilterState, visible: &[&Image], layout: Layout) {
    for line in format_gallery(store, filters, visible, layout) {
        println!("{}", line);
    }
}

/// Year choices for the year filter, newest first.
pub fn format_years(years: &[String]) -> Vec<String> {
    if years.is_empty() {
        return vec!["Years: (none loaded)".to_string()];
    }
    vec![format!("Years: {}", years.join(", "))]
}

// ============================================================================
// Collections
// ============================================================================

pub fn format_collections(manager: &CollectionManager) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];
    if manager.collections().is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (i, collection) in manager.collections().iter().enumerate() {
        lines.push(entity_header(i + 1, &collection.name, Some(collection.images.len())));
        if let Some(description) = &collection.description {
            lines.push(format!("{}{}", indent(1), description));
        }
        lines.push(format!("{}Id: {}", indent(1), collection.id));
        for (j, image) in collection.images.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, &image_title(image), None)
            ));
        }
    }
    lines
}

pub fn print_collections(manager: &CollectionManager) {
    for line in format_collections(manager) {
        println!("{}", line);
    }
}

// ============================================================================
// Viewer and settings
// ============================================================================

pub fn format_viewer(image: &Image, zoom: u32) -> Vec<String> {
    let mut lines = vec![format!("{} ({}%)", image_title(image), zoom)];
    lines.extend(image_lines(1, image, Layout::List).into_iter().skip(1));
    lines
}

pub fn format_settings(prefs: &Preferences) -> Vec<String> {
    vec![
        "Settings".to_string(),
        format!("{}Background: {}", indent(1), prefs.background_color),
        format!("{}Font size: {}px", indent(1), prefs.font_size),
        format!("{}Layout: {}", indent(1), prefs.layout),
        format!("{}Theme: {}", indent(1), prefs.theme),
    ]
}

pub fn print_settings(prefs: &Preferences) {
    for line in format_settings(prefs) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
