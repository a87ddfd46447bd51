//! Ordered in-memory collection addressed by a caller-supplied key
//!
//! Entities are rehydrated from network payloads all the time, so every
//! operation matches on the extracted key and never on identity. A key
//! appears at most once in the store.

use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Key extraction function shared between stores
pub type KeyFn<E, K> = Arc<dyn Fn(&E) -> K + Send + Sync>;

/// Keys whose selection state changed in one operation
///
/// This is the selection-changed event: every selection mutation on a
/// [`KeyedStore`] returns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange<K> {
    pub added: Vec<K>,
    pub removed: Vec<K>,
}

impl<K> Default for SelectionChange<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<K> SelectionChange<K> {
    pub fn added(key: K) -> Self {
        Self {
            added: vec![key],
            removed: Vec::new(),
        }
    }

    pub fn removed(key: K) -> Self {
        Self {
            added: Vec::new(),
            removed: vec![key],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered entities plus the set of selected keys
pub struct KeyedStore<E, K> {
    items: IndexMap<K, E>,
    selected: IndexSet<K>,
    key_fn: KeyFn<E, K>,
}

impl<E, K> KeyedStore<E, K>
where
    K: Clone + Eq + Hash,
{
    /// Create an empty store keyed by `key_fn`
    pub fn new(key_fn: impl Fn(&E) -> K + Send + Sync + 'static) -> Self {
        Self::with_key_fn(Arc::new(key_fn))
    }

    /// Create an empty store sharing an existing key function
    pub fn with_key_fn(key_fn: KeyFn<E, K>) -> Self {
        Self {
            items: IndexMap::new(),
            selected: IndexSet::new(),
            key_fn,
        }
    }

    /// Key of an entity, as this store sees it
    pub fn key_of(&self, item: &E) -> K {
        (self.key_fn)(item)
    }

    /// Replace the whole sequence
    ///
    /// Duplicate keys keep the position of their first occurrence and the
    /// value of their last. Selection survives only for keys still present.
    pub fn set_data(&mut self, items: impl IntoIterator<Item = E>) {
        self.items.clear();
        for item in items {
            let key = self.key_of(&item);
            self.items.insert(key, item);
        }
        let items = &self.items;
        self.selected.retain(|key| items.contains_key(key));
    }

    pub fn find(&self, key: &K) -> Option<&E> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    /// Position of a key in the sequence
    pub fn position(&self, key: &K) -> Option<usize> {
        self.items.get_index_of(key)
    }

    /// Add at the end; an item with the same key is moved there and replaced
    pub fn append(&mut self, item: E) {
        let key = self.key_of(&item);
        let (index, _) = self.items.insert_full(key, item);
        let last = self.items.len() - 1;
        self.items.move_index(index, last);
    }

    /// Add at the front; an item with the same key is moved there and replaced
    pub fn prepend(&mut self, item: E) {
        let key = self.key_of(&item);
        self.items.shift_insert(0, key, item);
    }

    /// Remove by key; absent keys are ignored
    pub fn remove(&mut self, key: &K) -> Option<E> {
        self.selected.shift_remove(key);
        self.items.shift_remove(key)
    }

    /// Swap the item stored under `old_key` for `item`, keeping its position
    ///
    /// When the new item carries a different key, selection follows it and any
    /// other item already holding that key is dropped. Returns `false` when
    /// `old_key` is not loaded.
    pub fn replace(&mut self, old_key: &K, item: E) -> bool {
        let Some(index) = self.items.get_index_of(old_key) else {
            return false;
        };

        let new_key = self.key_of(&item);
        if &new_key == old_key {
            if let Some((_, slot)) = self.items.get_index_mut(index) {
                *slot = item;
            }
            return true;
        }

        let was_selected = self.selected.shift_remove(old_key);
        self.items.shift_remove_index(index);

        let mut target = index;
        if let Some(existing) = self.items.get_index_of(&new_key) {
            self.items.shift_remove_index(existing);
            if existing < index {
                target -= 1;
            }
        }

        let target = target.min(self.items.len());
        self.items.shift_insert(target, new_key.clone(), item);
        if was_selected {
            self.selected.insert(new_key);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &E> {
        self.items.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.items.keys()
    }

    pub fn to_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.items.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected.clear();
    }

    // === Selection ===

    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn selected_keys(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    /// Selected items, in sequence order
    pub fn selected_items(&self) -> impl Iterator<Item = &E> {
        self.items
            .iter()
            .filter(|(key, _)| self.selected.contains(*key))
            .map(|(_, item)| item)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Select a loaded key; unknown or already selected keys change nothing
    pub fn select(&mut self, key: &K) -> SelectionChange<K> {
        if self.items.contains_key(key) && self.selected.insert(key.clone()) {
            SelectionChange::added(key.clone())
        } else {
            SelectionChange::default()
        }
    }

    pub fn deselect(&mut self, key: &K) -> SelectionChange<K> {
        if self.selected.shift_remove(key) {
            SelectionChange::removed(key.clone())
        } else {
            SelectionChange::default()
        }
    }

    /// Flip the selection of one key (a checkbox click)
    pub fn toggle(&mut self, key: &K) -> SelectionChange<K> {
        if self.selected.contains(key) {
            self.deselect(key)
        } else {
            self.select(key)
        }
    }

    pub fn select_all(&mut self) -> SelectionChange<K> {
        let mut change = SelectionChange::default();
        for key in self.items.keys() {
            if self.selected.insert(key.clone()) {
                change.added.push(key.clone());
            }
        }
        change
    }

    pub fn clear_selection(&mut self) -> SelectionChange<K> {
        SelectionChange {
            added: Vec::new(),
            removed: self.selected.drain(..).collect(),
        }
    }

    /// Whether every loaded item is selected (false for an empty store)
    pub fn all_selected(&self) -> bool {
        !self.items.is_empty() && self.items.keys().all(|key| self.selected.contains(key))
    }

    /// Clear the selection if every loaded item is selected, otherwise select them all
    pub fn toggle_select_all(&mut self) -> SelectionChange<K> {
        if self.all_selected() {
            self.clear_selection()
        } else {
            self.select_all()
        }
    }
}

impl<E: Clone, K: Clone> Clone for KeyedStore<E, K> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            selected: self.selected.clone(),
            key_fn: Arc::clone(&self.key_fn),
        }
    }
}

impl<E: fmt::Debug, K: fmt::Debug> fmt::Debug for KeyedStore<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedStore")
            .field("items", &self.items)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
