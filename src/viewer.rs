//! Full-size image viewer state.
//!
//! The viewer remembers which image is open and a zoom level. Navigation
//! works against whatever image list the caller is showing, so next/previous
//! follow the filtered view rather than the raw store.

use crate::types::Image;

pub const DEFAULT_ZOOM: u32 = 100;
pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 200;
pub const ZOOM_STEP: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    selected: Option<String>,
    zoom: u32,
}

impl Default for Viewer {
    fn default() -> Self {
        Self {
            selected: None,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Zoom level in percent.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn open(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.zoom = DEFAULT_ZOOM;
    }

    /// The open image, if it is still in `images`.
    pub fn current<'a>(&self, images: &[&'a Image]) -> Option<&'a Image> {
        let id = self.selected.as_deref()?;
        images.iter().copied().find(|img| img.id == id)
    }

    /// Step to the following image. Stays put at the end of the list.
    pub fn next(&mut self, images: &[&Image]) -> bool {
        self.step(images, |pos, len| (pos + 1 < len).then_some(pos + 1))
    }

    /// Step to the preceding image. Stays put at the start of the list.
    pub fn previous(&mut self, images: &[&Image]) -> bool {
        self.step(images, |pos, _| pos.checked_sub(1))
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.zoom = self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM);
        self.zoom
    }

    fn step(&mut self, images: &[&Image], target: impl Fn(usize, usize) -> Option<usize>) -> bool {
        let Some(id) = self.selected.as_deref() else {
            return false;
        };
        let Some(pos) = images.iter().position(|img| img.id == id) else {
            return false;
        };
        match target(pos, images.len()) {
            Some(next) => {
                self.selected = Some(images[next].id.clone());
                true
            }
            None => false,
        }
    }
}
