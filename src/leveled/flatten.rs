//! Flatten and stratify
//!
//! Flattening by `n` collapses the top `n + 1` levels into one level keyed by
//! `(n + 1)`-tuples. Stratifying by `n` is the inverse: the top-level tuple
//! keys are split back into `n` nested levels.
//!
//! Empty sub-maps above the flatten cutoff have no path down to the cutoff,
//! so their keys are lost. Flatten then stratify only round-trips maps with
//! no such empty sub-maps.

use super::{LeveledMap, Node};
use crate::entries::Entries;
use crate::error::MapError;
use crate::key::{Key, KeyTuple};
use crate::shape::{wrap_level, Shape, FLATTENED_LEVEL_NAME_SEPARATOR};
use std::collections::HashSet;
use std::slice;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Options for [`LeveledMap::flatten_with`]
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Tuple keys remember the names of the levels they were built from
    pub named: bool,
    /// Name of the collapsed level; defaults to the collapsed names joined
    /// by `"___"`. Only used when the map has level names.
    pub flattened_name: Option<String>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            named: true,
            flattened_name: None,
        }
    }
}

/// Depth-first iterator over `(key path, node)` pairs at a fixed depth
pub struct FlattenIter<'a, V> {
    stack: Vec<slice::Iter<'a, (Key, Node<V>)>>,
    path: Vec<Key>,
    cutoff: usize,
}

impl<'a, V> FlattenIter<'a, V> {
    pub(super) fn new(map: &'a LeveledMap<V>, cutoff: usize) -> Self {
        Self {
            stack: vec![map.entries().iter()],
            path: Vec::with_capacity(cutoff + 1),
            cutoff,
        }
    }
}

impl<'a, V> Iterator for FlattenIter<'a, V> {
    type Item = (Vec<Key>, &'a Node<V>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                    self.path.pop();
                }
                Some((key, node)) => {
                    if self.stack.len() == self.cutoff + 1 {
                        let mut path = self.path.clone();
                        path.push(key.clone());
                        return Some((path, node));
                    }
                    if let Node::Branch(child) = node {
                        self.path.push(key.clone());
                        self.stack.push(child.entries().iter());
                    }
                }
            }
        }
    }
}

impl<V> LeveledMap<V> {
    /// Iterate `(path, node)` pairs where each path has `n + 1` keys.
    /// Negative `n` counts from the deepest level.
    pub fn iter_flatten(&self, n: isize) -> Result<FlattenIter<'_, V>, MapError> {
        let n = self.shape.wrap_level(n)?;
        Ok(FlattenIter::new(self, n))
    }

    /// Every leaf with its full key path
    pub fn leaves(&self) -> impl Iterator<Item = (Vec<Key>, &V)> {
        FlattenIter::new(self, self.levels() - 1).filter_map(|(path, node)| match node {
            Node::Leaf(v) => Some((path, v)),
            Node::Branch(_) => None,
        })
    }

    /// Keys the map would have after `flatten(n)`
    pub fn flatten_keys(&self, n: isize, named: bool) -> Result<Vec<Key>, MapError> {
        let n = self.shape.wrap_level(n)?;
        let names = named.then(|| self.shape.prefix_names(n + 1));
        Ok(FlattenIter::new(self, n)
            .map(|(path, _)| tuple_key(path, names.as_ref()))
            .collect())
    }

    /// Nodes found `n + 1` levels down, in depth-first order
    pub fn flatten_values(&self, n: isize) -> Result<Vec<&Node<V>>, MapError> {
        Ok(self.iter_flatten(n)?.map(|(_, node)| node).collect())
    }

    /// Distinct keys of every level, in first-seen order unless `sorted`
    pub fn unique_keys(&self, sorted: bool) -> Vec<Vec<Key>> {
        let mut result = Vec::with_capacity(self.levels());
        let mut current: Vec<&LeveledMap<V>> = vec![self];
        for _ in 0..self.levels() {
            let mut seen = HashSet::new();
            let mut keys = Vec::new();
            let mut next = Vec::new();
            for map in current {
                for (key, node) in map.entries().iter() {
                    if seen.insert(key) {
                        keys.push(key.clone());
                    }
                    if let Node::Branch(child) = node {
                        next.push(child);
                    }
                }
            }
            if sorted {
                keys.sort();
            }
            result.push(keys);
            current = next;
        }
        result
    }

    /// [`unique_keys`](Self::unique_keys) paired with level names
    pub fn unique_keys_named(&self, sorted: bool) -> Vec<(String, Vec<Key>)> {
        self.level_names()
            .into_iter()
            .zip(self.unique_keys(sorted))
            .collect()
    }

    fn flattened_shape(&self, n: usize, flattened_name: Option<&str>) -> Result<Shape, MapError> {
        let names = self.shape.names().map(|names| {
            let joined = match flattened_name {
                Some(name) => name.to_string(),
                None => names[..=n].join(FLATTENED_LEVEL_NAME_SEPARATOR),
            };
            let mut out = Vec::with_capacity(names.len() - n);
            out.push(joined);
            out.extend(names[n + 1..].iter().cloned());
            out
        });
        Shape::with_names(self.levels() - n, names)
    }
}

impl<V: Clone> LeveledMap<V> {
    /// Collapse the top `n + 1` levels into one, with named tuple keys
    pub fn flatten(&self, n: isize) -> Result<Self, MapError> {
        self.flatten_with(n, &FlattenOptions::default())
    }

    #[instrument(skip_all, fields(levels = self.levels(), n = n))]
    pub fn flatten_with(&self, n: isize, options: &FlattenOptions) -> Result<Self, MapError> {
        let n = self.shape.wrap_level(n)?;
        if n == 0 {
            return Ok(self.clone());
        }
        let shape = self.flattened_shape(n, options.flattened_name.as_deref())?;
        let names = options.named.then(|| self.shape.prefix_names(n + 1));

        let mut entries = Entries::with_capacity(self.dim[n]);
        for (path, node) in FlattenIter::new(self, n) {
            entries.insert(tuple_key(path, names.as_ref()), node.clone());
        }
        let flat = Self::assemble(shape, entries);
        debug!(dim = ?flat.dim, "Flattened map");
        Ok(flat)
    }

    /// Split top-level tuple keys into `n` new leading levels.
    ///
    /// Each key of `k` parts becomes `n` single-part levels followed by the
    /// remaining `k - n` parts (a scalar if one part is left, a tuple
    /// otherwise). Negative `n` counts back from the first key's length.
    pub fn stratify(&self, n: isize) -> Result<Self, MapError> {
        self.stratify_with(n, None)
    }

    /// Stratify by one less than the first key's length
    pub fn stratify_inferred(&self) -> Result<Self, MapError> {
        match self.entries().first() {
            Some((key, _)) => self.stratify_with(key.parts().len() as isize - 1, None),
            None => Ok(self.clone()),
        }
    }

    /// Stratify with explicit names for the `n + 1` levels that replace the
    /// top level. Without names, the top level name is split on `"___"` and
    /// used when it has exactly `n + 1` parts.
    #[instrument(skip_all, fields(levels = self.levels(), n = n))]
    pub fn stratify_with(&self, n: isize, names: Option<Vec<String>>) -> Result<Self, MapError> {
        let Some((first, _)) = self.entries().first() else {
            return Ok(self.clone());
        };
        let n = wrap_level(n, first.parts().len())?;
        if n == 0 {
            return Ok(self.clone());
        }

        let shape = self.stratified_shape(n, names)?;
        let mut stratified = Self::new(shape);
        for (key, node) in self.entries().iter() {
            let parts = key.parts();
            if parts.len() < n + 1 {
                return Err(MapError::Level {
                    level: n as isize,
                    allowed: parts.len(),
                });
            }
            let mut path = parts[..n].to_vec();
            path.push(Key::from_parts(parts[n..].to_vec()));
            stratified.set(&path, node.clone())?;
        }
        debug!(dim = ?stratified.dim, "Stratified map");
        Ok(stratified)
    }

    fn stratified_shape(&self, n: usize, names: Option<Vec<String>>) -> Result<Shape, MapError> {
        let levels = self.levels() + n;
        let remaining = &self.level_names()[1..];
        let leading = match names {
            Some(names) => {
                if names.len() != n + 1 {
                    return Err(MapError::shape(format!(
                        "{} names given for {} stratified levels",
                        names.len(),
                        n + 1
                    )));
                }
                Some(names)
            }
            None => self.shape.names().and_then(|names| {
                let candidate: Vec<String> = names[0]
                    .split(FLATTENED_LEVEL_NAME_SEPARATOR)
                    .map(str::to_string)
                    .collect();
                (candidate.len() == n + 1).then_some(candidate)
            }),
        };
        let names = leading.map(|mut leading| {
            leading.extend(remaining.iter().cloned());
            leading
        });
        Shape::with_names(levels, names)
    }
}

fn tuple_key(path: Vec<Key>, names: Option<&Arc<[String]>>) -> Key {
    match names {
        Some(names) => Key::Tuple(KeyTuple::named(path, names.clone())),
        None => Key::Tuple(KeyTuple::new(path)),
    }
}
