//! Insertion-ordered entries
//!
//! `HashMap` does not preserve insertion order, so entries are kept in a
//! `Vec` with a parallel `HashMap` from key to slot index. Re-inserting an
//! existing key replaces its value in place and keeps its position.

use crate::key::Key;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Ordered `Key -> T` mapping
#[derive(Clone)]
pub struct Entries<T> {
    slots: Vec<(Key, T)>,
    index: HashMap<Key, usize>,
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Entries<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &Key) -> Option<&T> {
        self.index.get(key).map(|&i| &self.slots[i].1)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut T> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.slots[i].1),
            None => None,
        }
    }

    /// Insert or replace. Returns the previous value for an existing key,
    /// whose position is left unchanged.
    pub fn insert(&mut self, key: Key, value: T) -> Option<T> {
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.slots[i].1, value));
        }
        self.index.insert(key.clone(), self.slots.len());
        self.slots.push((key, value));
        None
    }

    /// Remove a key, shifting later entries down to preserve order
    pub fn remove(&mut self, key: &Key) -> Option<T> {
        let i = self.index.remove(key)?;
        let (_, value) = self.slots.remove(i);
        for (k, _) in &self.slots[i..] {
            if let Some(slot) = self.index.get_mut(k) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Key, T)> {
        self.slots.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.slots.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<&(Key, T)> {
        self.slots.first()
    }

    /// Stable sort of the entries
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&(Key, T), &(Key, T)) -> Ordering,
    {
        self.slots.sort_by(|a, b| compare(a, b));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, (k, _)) in self.slots.iter().enumerate() {
            self.index.insert(k.clone(), i);
        }
    }
}

impl<T: PartialEq> PartialEq for Entries<T> {
    /// Order-sensitive comparison
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl<T: fmt::Debug> fmt::Debug for Entries<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<T> FromIterator<(Key, T)> for Entries<T> {
    fn from_iter<I: IntoIterator<Item = (Key, T)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut entries = Entries::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            entries.insert(k, v);
        }
        entries
    }
}

impl<T> IntoIterator for Entries<T> {
    type Item = (Key, T);
    type IntoIter = std::vec::IntoIter<(Key, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Entries<T> {
    type Item = &'a (Key, T);
    type IntoIter = std::slice::Iter<'a, (Key, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

impl<T: Serialize> Serialize for Entries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in &self.slots {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct EntriesVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
    type Value = Entries<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Entries<T>, A::Error> {
        let mut entries = Entries::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((k, v)) = access.next_entry::<Key, T>()? {
            entries.insert(k, v);
        }
        Ok(entries)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
