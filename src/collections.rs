//! User-defined image collections.
//!
//! A [`Collection`] groups images under a name. Entries are copies of the
//! [`Image`] taken when it was added, so a collection keeps showing an image
//! after the gallery has moved on to another page.
//!
//! Every operation that cannot apply (blank name, unknown collection, image
//! already present or absent) is a silent no-op. Methods report whether
//! anything changed but never return an error.

use crate::observe::{Listeners, SubscriptionId};
use crate::types::Image;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub images: Vec<Image>,
}

impl Collection {
    pub fn contains(&self, image_id: &str) -> bool {
        self.images.iter().any(|img| img.id == image_id)
    }
}

/// A committed change to the collection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    Created { id: String },
    Deleted { id: String },
    ImageAdded { collection_id: String, image_id: String },
    ImageRemoved { collection_id: String, image_id: String },
}

#[derive(Debug, Default)]
pub struct CollectionManager {
    collections: Vec<Collection>,
    listeners: Listeners<CollectionEvent>,
}

impl CollectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&CollectionEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Create an empty collection. A name that is blank after trimming
    /// creates nothing.
    pub fn create_collection(&mut self, name: &str, description: Option<&str>) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = uuid::Uuid::now_v7().to_string();
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        self.collections.push(Collection {
            id: id.clone(),
            name: name.to_string(),
            description,
            images: Vec::new(),
        });
        tracing::debug!(collection = %id, name, "collection created");
        self.listeners
            .notify(&CollectionEvent::Created { id: id.clone() });
        Some(id)
    }

    pub fn delete_collection(&mut self, id: &str) -> bool {
        let before = self.collections.len();
        self.collections.retain(|c| c.id != id);
        if self.collections.len() == before {
            return false;
        }
        self.listeners
            .notify(&CollectionEvent::Deleted { id: id.to_string() });
        true
    }

    /// Append a copy of `image` unless the collection already has it.
    pub fn add_image_to_collection(&mut self, collection_id: &str, image: &Image) -> bool {
        let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) else {
            return false;
        };
        if collection.contains(&image.id) {
            return false;
        }
        collection.images.push(image.clone());
        self.listeners.notify(&CollectionEvent::ImageAdded {
            collection_id: collection_id.to_string(),
            image_id: image.id.clone(),
        });
        true
    }

    pub fn remove_image_from_collection(&mut self, collection_id: &str, image_id: &str) -> bool {
        let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) else {
            return false;
        };
        let before = collection.images.len();
        collection.images.retain(|img| img.id != image_id);
        if collection.images.len() == before {
            return false;
        }
        self.listeners.notify(&CollectionEvent::ImageRemoved {
            collection_id: collection_id.to_string(),
            image_id: image_id.to_string(),
        });
        true
    }

    /// Images from `loaded` that could still be added to the collection.
    pub fn available_images<'a>(&self, collection_id: &str, loaded: &'a [Image]) -> Vec<&'a Image> {
        match self.get(collection_id) {
            Some(collection) => loaded
                .iter()
                .filter(|img| !collection.contains(&img.id))
                .collect(),
            None => Vec::new(),
        }
    }
}
