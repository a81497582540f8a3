//! Level rearrangement, metadata replacement, sorting and mapping.
//!
//! Everything here returns a new map.

use super::flatten::FlattenIter;
use super::{LeveledMap, Node};
use crate::entries::Entries;
use crate::error::MapError;
use crate::key::Key;
use crate::nested::Nested;
use crate::shape::Shape;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, instrument};

impl<V> LeveledMap<V> {
    /// Same shape, new top-level data. Each node is conformed to the shape.
    pub fn replace_data<I>(&self, data: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = (Key, Node<V>)>,
    {
        let tail = self.shape.tail();
        let mut entries = Entries::new();
        for (key, node) in data {
            entries.insert(key, Self::conform(tail.as_ref(), node)?);
        }
        Ok(Self::assemble(self.shape.clone(), entries))
    }

    /// Leaf-wise transform into a map of another value type. Shape and
    /// widths are unchanged.
    pub fn map_values<W, F>(&self, f: F) -> LeveledMap<W>
    where
        F: Fn(&V) -> W,
    {
        self.map_values_with(&f)
    }

    fn map_values_with<W, F>(&self, f: &F) -> LeveledMap<W>
    where
        F: Fn(&V) -> W,
    {
        let entries = self
            .entries
            .iter()
            .map(|(key, node)| {
                let node = match node {
                    Node::Branch(child) => Node::Branch(child.map_values_with(f)),
                    Node::Leaf(v) => Node::Leaf(f(v)),
                };
                (key.clone(), node)
            })
            .collect();
        LeveledMap {
            shape: self.shape.clone(),
            entries,
            dim: self.dim.clone(),
        }
    }
}

/// Validate a level permutation of `0..perm.len()` against `levels`
fn check_permutation(perm: &[usize], levels: usize) -> Result<(), MapError> {
    if perm.is_empty() || perm.len() > levels {
        return Err(MapError::Level {
            level: perm.len() as isize,
            allowed: levels,
        });
    }
    let mut seen = vec![false; perm.len()];
    for &level in perm {
        if level >= perm.len() || seen[level] {
            return Err(MapError::invalid_levels(format!(
                "{:?} is not a permutation of levels 0..{}",
                perm,
                perm.len()
            )));
        }
        seen[level] = true;
    }
    Ok(())
}

impl<V: Clone> LeveledMap<V> {
    /// Reorder the top `perm.len()` levels: level `i` of the result is level
    /// `perm[i]` of this map. Level names follow their levels.
    #[instrument(skip_all, fields(levels = self.levels(), perm = ?perm))]
    pub fn rearrange(&self, perm: &[usize]) -> Result<Self, MapError> {
        check_permutation(perm, self.levels())?;
        let m = perm.len();
        if perm.iter().enumerate().all(|(i, &level)| i == level) {
            return Ok(self.clone());
        }

        let names = self.shape.names().map(|names| {
            perm.iter()
                .map(|&i| names[i].clone())
                .chain(names[m..].iter().cloned())
                .collect()
        });
        let mut rearranged = Self::new(Shape::with_names(self.levels(), names)?);
        for (path, node) in FlattenIter::new(self, m - 1) {
            let path: Vec<Key> = perm.iter().map(|&i| path[i].clone()).collect();
            rearranged.set(&path, node.clone())?;
        }
        debug!(dim = ?rearranged.dim, "Rearranged levels");
        Ok(rearranged)
    }

    /// [`rearrange`](Self::rearrange) with level names. The names must be
    /// distinct and cover exactly the first `names.len()` levels.
    pub fn rearrange_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, MapError> {
        let mut unique = HashSet::new();
        let mut perm = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if !unique.insert(name) {
                return Err(MapError::invalid_levels(format!(
                    "level name '{}' given twice",
                    name
                )));
            }
            perm.push(self.shape.position(name)?);
        }
        if perm.iter().any(|&level| level >= perm.len()) {
            return Err(MapError::invalid_levels(
                "rearranged level names must be contiguous from level 0",
            ));
        }
        self.rearrange(&perm)
    }

    /// Swap two levels; levels in between stay in place
    pub fn swap_levels(&self, a: usize, b: usize) -> Result<Self, MapError> {
        for level in [a, b] {
            if level >= self.levels() {
                return Err(MapError::Level {
                    level: level as isize,
                    allowed: self.levels(),
                });
            }
        }
        if a == b {
            return Err(MapError::invalid_levels(format!(
                "cannot swap level {} with itself",
                a
            )));
        }
        let mut perm: Vec<usize> = (0..=a.max(b)).collect();
        perm.swap(a, b);
        self.rearrange(&perm)
    }

    pub fn swap_levels_by_name(&self, a: &str, b: &str) -> Result<Self, MapError> {
        self.swap_levels(self.shape.position(a)?, self.shape.position(b)?)
    }

    /// Same data under a new shape with the same number of levels
    pub fn replace_metadata(&self, shape: Shape) -> Result<Self, MapError> {
        if shape.levels() != self.levels() {
            return Err(MapError::shape(format!(
                "cannot describe a map with {} levels as {} levels",
                self.levels(),
                shape.levels()
            )));
        }
        let mut map = self.clone();
        map.apply_shape(shape);
        Ok(map)
    }

    /// Top-level entries sorted by key
    pub fn sort_keys(&self, reverse: bool) -> Self {
        self.sort_keys_by(Key::cmp, reverse)
    }

    pub fn sort_keys_by<F>(&self, mut compare: F, reverse: bool) -> Self
    where
        F: FnMut(&Key, &Key) -> Ordering,
    {
        self.sorted_by(|(ka, _), (kb, _)| compare(ka, kb), reverse)
    }

    /// Top-level entries sorted by node
    pub fn sort_values_by<F>(&self, mut compare: F, reverse: bool) -> Self
    where
        F: FnMut(&Node<V>, &Node<V>) -> Ordering,
    {
        self.sorted_by(|(_, a), (_, b)| compare(a, b), reverse)
    }

    fn sorted_by<F>(&self, mut compare: F, reverse: bool) -> Self
    where
        F: FnMut(&(Key, Node<V>), &(Key, Node<V>)) -> Ordering,
    {
        let mut entries = self.entries.clone();
        if reverse {
            entries.sort_by(|a, b| compare(b, a));
        } else {
            entries.sort_by(|a, b| compare(a, b));
        }
        Self {
            shape: self.shape.clone(),
            entries,
            dim: self.dim.clone(),
        }
    }

    /// Apply `key_fn` and `node_fn` to every entry at `level`. Mapped nodes
    /// are conformed again and two keys mapping to one are a shape error.
    pub fn map<K, N>(&self, level: isize, key_fn: K, node_fn: N) -> Result<Self, MapError>
    where
        K: Fn(&Key) -> Key,
        N: Fn(&Node<V>) -> Node<V>,
    {
        let level = self.shape.wrap_level(level)?;
        self.map_at(level, &key_fn, &node_fn)
    }

    pub fn map_keys<K>(&self, level: isize, key_fn: K) -> Result<Self, MapError>
    where
        K: Fn(&Key) -> Key,
    {
        self.map(level, key_fn, Node::clone)
    }

    pub fn map_nodes<N>(&self, level: isize, node_fn: N) -> Result<Self, MapError>
    where
        N: Fn(&Node<V>) -> Node<V>,
    {
        self.map(level, Key::clone, node_fn)
    }

    fn map_at<K, N>(&self, remaining: usize, key_fn: &K, node_fn: &N) -> Result<Self, MapError>
    where
        K: Fn(&Key) -> Key,
        N: Fn(&Node<V>) -> Node<V>,
    {
        let tail = self.shape.tail();
        let mut entries = Entries::with_capacity(self.len());
        for (key, node) in self.entries.iter() {
            if remaining == 0 {
                let mapped = key_fn(key);
                let node = Self::conform(tail.as_ref(), node_fn(node))?;
                if entries.contains_key(&mapped) {
                    return Err(MapError::shape(format!(
                        "key '{}' produced twice by mapping",
                        mapped
                    )));
                }
                entries.insert(mapped, node);
            } else {
                let node = match node {
                    Node::Branch(child) => Node::Branch(child.map_at(remaining - 1, key_fn, node_fn)?),
                    Node::Leaf(v) => Node::Leaf(v.clone()),
                };
                entries.insert(key.clone(), node);
            }
        }
        Ok(Self::assemble(self.shape.clone(), entries))
    }

    /// Key each item by `by`, then nest the resulting tuple keys into the
    /// shape's levels. Later items replace earlier ones with the same key.
    pub fn group_by<I, F>(items: I, by: F, shape: Shape) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> Key,
    {
        let mut flat = Self::new(Shape::new(1)?);
        for item in items {
            let key = by(&item);
            flat.set(&[key], Node::Leaf(item))?;
        }
        if flat.is_empty() {
            return Ok(Self::new(shape));
        }
        flat.stratify(shape.levels() as isize - 1)?
            .replace_metadata(shape)
    }
}

impl<V: Ord + Clone> LeveledMap<V> {
    /// Top-level leaves sorted by value. Only single-level maps have leaves
    /// at the top.
    pub fn sort_values(&self, reverse: bool) -> Result<Self, MapError> {
        if self.levels() != 1 {
            return Err(MapError::shape(format!(
                "sorting by value needs a single-level map, found {} levels",
                self.levels()
            )));
        }
        Ok(self.sort_values_by(|a, b| a.as_leaf().cmp(&b.as_leaf()), reverse))
    }
}

impl<T: Clone> LeveledMap<Nested<T>> {
    /// Read the same data at a different number of levels
    pub fn relevel(&self, shape: Shape) -> Result<Self, MapError> {
        let map = Self::from_tree(self.to_tree(), shape)?;
        debug!(levels = map.levels(), dim = ?map.dim, "Relevelled map");
        Ok(map)
    }

    /// The full tree, with leaf mappings spliced back in
    pub fn to_tree(&self) -> Nested<T> {
        Nested::Map(
            self.entries
                .iter()
                .map(|(key, node)| {
                    let child = match node {
                        Node::Branch(b) => b.to_tree(),
                        Node::Leaf(tree) => tree.clone(),
                    };
                    (key.clone(), child)
                })
                .collect(),
        )
    }
}
