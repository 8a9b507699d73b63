//! Selfie gallery
//!
//! The gallery is an in-memory display list backed by a durable list stored
//! under a single key. At startup the stored list is read back to
//! repopulate the display list; restoring never writes to the store.
//!
//! Storage grows without bound. Swap in another [`ListStore`] to bound it.

use crate::capture::{EncodedImage, GalleryAppender, PersistError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Durable storage of image lists, one list per key
pub trait ListStore: Send + Sync {
    /// Appends to the end of the list stored under `key`
    fn append(&self, key: &str, image: &EncodedImage) -> Result<(), PersistError>;

    /// Returns the list stored under `key`, oldest first
    fn load(&self, key: &str) -> Result<Vec<EncodedImage>, PersistError>;
}

/// Non-durable store, for tests and `--no-persist` runs
#[derive(Debug, Default)]
pub struct MemoryListStore {
    lists: Mutex<HashMap<String, Vec<EncodedImage>>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListStore for MemoryListStore {
    fn append(&self, key: &str, image: &EncodedImage) -> Result<(), PersistError> {
        self.lists
            .lock()
            .entry(key.to_string())
            .or_default()
            .push(image.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<EncodedImage>, PersistError> {
        Ok(self.lists.lock().get(key).cloned().unwrap_or_default())
    }
}

/// Display list plus durable store
pub struct Gallery {
    key: String,
    store: Arc<dyn ListStore>,
    entries: Mutex<Vec<EncodedImage>>,
}

impl Gallery {
    /// Opens the gallery stored under `key`, loading existing entries
    pub fn restore(store: Arc<dyn ListStore>, key: impl Into<String>) -> Result<Self, PersistError> {
        let key = key.into();
        let entries = store.load(&key)?;
        tracing::info!("Gallery '{}' restored with {} selfie(s)", key, entries.len());

        Ok(Self {
            key,
            store,
            entries: Mutex::new(entries),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the display list, oldest first
    pub fn entries(&self) -> Vec<EncodedImage> {
        self.entries.lock().clone()
    }

    /// Most recent selfie
    pub fn latest(&self) -> Option<EncodedImage> {
        self.entries.lock().last().cloned()
    }
}

impl GalleryAppender for Gallery {
    /// Shows the image, then stores it. A store failure is returned but the
    /// image stays on display.
    fn append_to_gallery(&self, image: &EncodedImage) -> Result<(), PersistError> {
        self.entries.lock().push(image.clone());
        self.store.append(&self.key, image)?;
        tracing::debug!("Gallery '{}' now holds {} selfie(s)", self.key, self.len());
        Ok(())
    }
}
