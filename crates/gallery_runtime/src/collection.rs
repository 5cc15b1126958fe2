//! Incremental, deduplicated item accumulator with generation-guarded appends.

use std::collections::HashMap;
use std::rc::Rc;

use gallery_host::{GalleryItem, GalleryPage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Ordered, key-deduplicated items accumulated across listing pages.
///
/// The collection only grows within a generation. [`Collection::reset`] is the single way to
/// shrink it; it also bumps the generation so completions issued before the reset are dropped by
/// [`Collection::append_if_current`].
///
/// Items and the key index are shared between clones until the next append, so cloning the
/// session state and comparing an untouched collection costs a pointer check.
pub struct Collection {
    items: Rc<Vec<GalleryItem>>,
    index_by_key: Rc<HashMap<String, usize>>,
    next_cursor: Option<String>,
    initial_loaded: bool,
    generation: u64,
}

impl Collection {
    /// Items in arrival order.
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when no item has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    /// Position of the item with `key`.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index_by_key.get(key).copied()
    }

    /// Cursor for the next page, when one exists.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Whether at least one page landed in the current generation.
    pub const fn initial_loaded(&self) -> bool {
        self.initial_loaded
    }

    /// Whether another page can be requested. Always `false` before the first page.
    pub fn has_more(&self) -> bool {
        self.initial_loaded && self.next_cursor.is_some()
    }

    /// Current generation; bumped by every [`Collection::reset`].
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Appends unseen items from `page` (first occurrence wins) and adopts its cursor.
    ///
    /// Returns the number of newly added items.
    pub fn append(&mut self, page: GalleryPage) -> usize {
        let before = self.items.len();
        let fresh: Vec<GalleryItem> = page
            .items
            .into_iter()
            .filter(|item| !self.index_by_key.contains_key(&item.key))
            .collect();
        if !fresh.is_empty() {
            let items = Rc::make_mut(&mut self.items);
            let index_by_key = Rc::make_mut(&mut self.index_by_key);
            for item in fresh {
                if index_by_key.contains_key(&item.key) {
                    continue;
                }
                index_by_key.insert(item.key.clone(), items.len());
                items.push(item);
            }
        }
        self.next_cursor = page.continuation_cursor;
        self.initial_loaded = true;
        self.items.len() - before
    }

    /// Appends `page` only when it was requested in the current generation.
    ///
    /// Returns `None` for stale completions, leaving the collection untouched.
    pub fn append_if_current(&mut self, generation: u64, page: GalleryPage) -> Option<usize> {
        (generation == self.generation).then(|| self.append(page))
    }

    /// Clears items, key index, and cursor, and starts a new generation.
    pub fn reset(&mut self) {
        self.items = Rc::default();
        self.index_by_key = Rc::default();
        self.next_cursor = None;
        self.initial_loaded = false;
        self.generation = self.generation.wrapping_add(1);
    }

    #[cfg(test)]
    pub(crate) fn shares_storage_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.items, &other.items) && Rc::ptr_eq(&self.index_by_key, &other.index_by_key)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(key: &str, url: &str) -> GalleryItem {
        GalleryItem {
            key: key.to_string(),
            display_url: url.to_string(),
            thumb_url: None,
            byte_size: None,
            media_type: None,
            last_modified: None,
            container: None,
        }
    }

    fn page(keys: &[&str], cursor: Option<&str>) -> GalleryPage {
        GalleryPage::new(
            keys.iter().map(|key| item(key, key)).collect(),
            cursor.map(str::to_string),
        )
    }

    #[test]
    fn keys_are_unique_and_first_occurrence_wins() {
        let mut collection = Collection::default();
        assert_eq!(collection.append(page(&["a", "b"], Some("c1"))), 2);
        let mut overlapping = page(&["b", "c", "a"], None);
        overlapping.items[0].display_url = "second-b".to_string();
        assert_eq!(collection.append(overlapping), 1);

        let keys: Vec<_> = collection.items().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(collection.get(1).map(|i| i.display_url.as_str()), Some("b"));
        assert_eq!(collection.index_of("c"), Some(2));
        assert!(!collection.has_more());
    }

    #[test]
    fn clones_share_items_until_one_of_them_appends() {
        let mut collection = Collection::default();
        collection.append(page(&["a", "b"], Some("c1")));
        let snapshot = collection.clone();
        assert!(collection.shares_storage_with(&snapshot));
        assert_eq!(collection, snapshot);

        collection.append(page(&["c"], None));
        assert!(!collection.shares_storage_with(&snapshot));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(collection.len(), 3);

        let before_duplicate = collection.clone();
        collection.append(page(&["a"], None));
        assert!(collection.shares_storage_with(&before_duplicate));
    }

    #[test]
    fn has_more_is_false_before_first_page() {
        let mut collection = Collection::default();
        assert!(!collection.has_more());
        collection.append(page(&[], Some("abc")));
        assert!(collection.initial_loaded());
        assert!(collection.has_more());
        assert_eq!(collection.next_cursor(), Some("abc"));
    }

    #[test]
    fn stale_generation_completion_is_dropped() {
        let mut collection = Collection::default();
        let issued_at = collection.generation();
        collection.append(page(&["a"], Some("next")));
        collection.reset();

        assert_eq!(collection.append_if_current(issued_at, page(&["b"], None)), None);
        assert!(collection.is_empty());
        assert_eq!(collection.next_cursor(), None);
        assert!(!collection.initial_loaded());

        let current = collection.generation();
        assert_eq!(collection.append_if_current(current, page(&["b"], None)), Some(1));
    }

    #[test]
    fn reset_clears_key_index() {
        let mut collection = Collection::default();
        collection.append(page(&["a"], None));
        collection.reset();
        collection.append(page(&["a"], None));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.index_of("a"), Some(0));
    }
}
