//! In-memory copies of backend collections.
//!
//! A page keeps the last collection it fetched plus an index by record id so
//! edit handlers can look records up without another request.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

/// A backend record with a stable identifier.
pub trait Record: Clone {
    type Id: Clone + Eq + Hash + Display + FromStr;

    fn id(&self) -> Self::Id;
}

/// Ordered collection with lookup by id.
#[derive(Debug, Clone)]
pub struct CollectionCache<T: Record> {
    items: Vec<T>,
    index: HashMap<T::Id, usize>,
}

impl<T: Record> Default for CollectionCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Record> CollectionCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with a fresh fetch.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.reindex();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the record with the same id in place.
    ///
    /// Returns `false` and leaves the collection untouched when no record has
    /// that id.
    pub fn patch(&mut self, record: T) -> bool {
        match self.index.get(&record.id()) {
            Some(&i) => {
                self.items[i] = record;
                true
            }
            None => false,
        }
    }

    /// Insert a record at the front, replacing an existing copy.
    pub fn prepend(&mut self, record: T) {
        let id = record.id();
        self.items.retain(|r| r.id() != id);
        self.items.insert(0, record);
        self.reindex();
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let i = *self.index.get(id)?;
        let removed = self.items.remove(i);
        self.reindex();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id(), i))
            .collect();
    }
}
