//! Lightbox selection state with wraparound navigation.

use gallery_host::GalleryError;

use crate::collection::Collection;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Open item, tracked by key with a cached index.
///
/// While `open_key` is set, `open_index` points at the item with that key inside the collection.
pub struct NavigationState {
    open_key: Option<String>,
    open_index: usize,
}

impl NavigationState {
    /// Key of the open item.
    pub fn open_key(&self) -> Option<&str> {
        self.open_key.as_deref()
    }

    /// Index of the open item, when one is open.
    pub fn open_index(&self) -> Option<usize> {
        self.open_key.as_ref().map(|_| self.open_index)
    }

    /// Returns `true` while an item is open.
    pub const fn is_open(&self) -> bool {
        self.open_key.is_some()
    }

    /// Opens the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::Index`] when `index` is outside the collection; the state is left
    /// unchanged.
    pub fn open(&mut self, index: usize, collection: &Collection) -> Result<(), GalleryError> {
        let item = collection.get(index).ok_or(GalleryError::Index {
            index,
            len: collection.len(),
        })?;
        self.open_key = Some(item.key.clone());
        self.open_index = index;
        Ok(())
    }

    /// Moves to the next item, wrapping to the first. Returns `true` when the open item changed.
    pub fn next(&mut self, collection: &Collection) -> bool {
        self.step(collection, true)
    }

    /// Moves to the previous item, wrapping to the last. Returns `true` when the open item changed.
    pub fn prev(&mut self, collection: &Collection) -> bool {
        self.step(collection, false)
    }

    fn step(&mut self, collection: &Collection, forward: bool) -> bool {
        let len = collection.len();
        let Some(current) = self.open_index() else {
            return false;
        };
        if len <= 1 {
            return false;
        }
        let target = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        match collection.get(target) {
            Some(item) => {
                self.open_key = Some(item.key.clone());
                self.open_index = target;
                true
            }
            None => false,
        }
    }

    /// Clears the selection.
    pub fn close(&mut self) {
        self.open_key = None;
        self.open_index = 0;
    }

    /// Whether a later item exists, against the current collection length.
    pub fn has_next(&self, len: usize) -> bool {
        self.open_index().is_some_and(|index| index + 1 < len)
    }

    /// Whether an earlier item exists.
    pub fn has_prev(&self) -> bool {
        self.open_index().is_some_and(|index| index > 0)
    }

    /// Re-locates the open key after the collection changed, clearing the selection when the key
    /// is gone.
    pub fn revalidate(&mut self, collection: &Collection) {
        let Some(key) = self.open_key.as_deref() else {
            return;
        };
        match collection.index_of(key) {
            Some(index) => self.open_index = index,
            None => self.close(),
        }
    }
}
