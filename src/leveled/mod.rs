//! Leveled Maps
//!
//! A [`LeveledMap`] is an ordered mapping with a fixed, declared number of
//! levels. Every value above the last level is itself a `LeveledMap` with one
//! level fewer and the parent's level names minus the first; values at the
//! last level are leaves.
//!
//! Each map caches its width per level in `dim`: `dim[0]` is the number of
//! entries, `dim[i]` the sum of the children's `dim[i - 1]`. Construction
//! computes it bottom-up once; in-place mutators adjust it with a signed
//! delta along the mutated path instead of recounting.
//!
//! Transforms (flatten, stratify, filter, rearrange, sort, map) never touch
//! their input and return an independent map.

mod arrange;
mod filter;
mod flatten;
mod mutate;
mod render;

pub use filter::{Criteria, Criterion, FilterOptions, KeyMatcher};
pub use flatten::{FlattenIter, FlattenOptions};

use crate::entries::Entries;
use crate::error::MapError;
use crate::key::Key;
use crate::nested::Nested;
use crate::shape::Shape;
use serde::ser::{Serialize, Serializer};
use tracing::debug;

/// A value stored in a leveled map
#[derive(Debug, Clone, PartialEq)]
pub enum Node<V> {
    /// Sub-map one level down
    Branch(LeveledMap<V>),
    /// Value at the last level
    Leaf(V),
}

impl<V> Node<V> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&V> {
        match self {
            Node::Leaf(v) => Some(v),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&LeveledMap<V>> {
        match self {
            Node::Branch(b) => Some(b),
            Node::Leaf(_) => None,
        }
    }

    pub fn into_leaf(self) -> Option<V> {
        match self {
            Node::Leaf(v) => Some(v),
            Node::Branch(_) => None,
        }
    }

    pub fn into_branch(self) -> Option<LeveledMap<V>> {
        match self {
            Node::Branch(b) => Some(b),
            Node::Leaf(_) => None,
        }
    }

    /// Widths this node contributes below its own key (empty for leaves)
    pub(crate) fn dim(&self) -> &[usize] {
        match self {
            Node::Branch(b) => &b.dim,
            Node::Leaf(_) => &[],
        }
    }
}

impl<V> From<LeveledMap<V>> for Node<V> {
    fn from(map: LeveledMap<V>) -> Self {
        Node::Branch(map)
    }
}

impl<V: Serialize> Serialize for Node<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Branch(b) => b.serialize(serializer),
            Node::Leaf(v) => v.serialize(serializer),
        }
    }
}

/// Ordered nested map with a fixed number of levels
#[derive(Debug, Clone)]
pub struct LeveledMap<V> {
    shape: Shape,
    entries: Entries<Node<V>>,
    dim: Vec<usize>,
}

impl<V> LeveledMap<V> {
    /// Empty map of the given shape
    pub fn new(shape: Shape) -> Self {
        let dim = vec![0; shape.levels()];
        Self {
            shape,
            entries: Entries::new(),
            dim,
        }
    }

    /// Empty unnamed map with `levels` levels
    pub fn with_levels(levels: usize) -> Result<Self, MapError> {
        Ok(Self::new(Shape::new(levels)?))
    }

    /// Build from a plain nested mapping whose depth is exactly the shape's
    /// number of levels.
    ///
    /// A leaf where a mapping is required fails with [`MapError::Type`]; a
    /// mapping where a leaf is required fails with [`MapError::Shape`].
    pub fn from_nested(tree: Nested<V>, shape: Shape) -> Result<Self, MapError> {
        let map = Self::build(tree, shape, &|node| match node {
            Nested::Leaf(v) => Ok(v),
            Nested::Map(_) => Err(MapError::shape(
                "found a mapping below the declared leaf level",
            )),
        })?;
        debug!(levels = map.levels(), dim = ?map.dim, "Built leveled map from nested input");
        Ok(map)
    }

    /// Build by setting each `(key path, value)` pair in order.
    ///
    /// Every path must have exactly one key per level. Later duplicates
    /// overwrite earlier ones.
    pub fn from_pairs<I>(pairs: I, shape: Shape) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = (Vec<Key>, V)>,
    {
        let mut map = Self::new(shape);
        for (path, value) in pairs {
            if path.len() != map.levels() {
                return Err(MapError::shape(format!(
                    "key path of length {} for a map with {} levels",
                    path.len(),
                    map.levels()
                )));
            }
            map.set(&path, Node::Leaf(value))?;
        }
        debug!(levels = map.levels(), dim = ?map.dim, "Built leveled map from pairs");
        Ok(map)
    }

    /// Recursive bootstrap shared by the nested constructors. `leaf` turns
    /// whatever sits at the last level into a value.
    fn build<X, F>(tree: Nested<X>, shape: Shape, leaf: &F) -> Result<Self, MapError>
    where
        F: Fn(Nested<X>) -> Result<V, MapError>,
    {
        let children = match tree {
            Nested::Map(children) => children,
            Nested::Leaf(_) => {
                return Err(MapError::Type(format!(
                    "expected a mapping with {} levels, found a leaf value",
                    shape.levels()
                )))
            }
        };

        let tail = shape.tail();
        let mut entries = Entries::with_capacity(children.len());
        for (key, child) in children {
            let node = match &tail {
                Some(tail) => Node::Branch(Self::build(child, tail.clone(), leaf)?),
                None => Node::Leaf(leaf(child)?),
            };
            entries.insert(key, node);
        }
        Ok(Self::assemble(shape, entries))
    }

    /// Wrap already conformant entries, computing `dim` from the children's
    /// cached widths.
    pub(crate) fn assemble(shape: Shape, entries: Entries<Node<V>>) -> Self {
        let mut dim = vec![0; shape.levels()];
        dim[0] = entries.len();
        for node in entries.values() {
            for (slot, width) in dim[1..].iter_mut().zip(node.dim()) {
                *slot += width;
            }
        }
        Self {
            shape,
            entries,
            dim,
        }
    }

    /// Coerce a node into the form expected at a position: a leaf when
    /// `expected` is `None`, otherwise a branch of exactly that shape.
    ///
    /// A conformant branch is reused as is; a branch of the right depth whose
    /// level names differ is renamed in place.
    pub(crate) fn conform(expected: Option<&Shape>, node: Node<V>) -> Result<Node<V>, MapError> {
        match (expected, node) {
            (None, Node::Leaf(v)) => Ok(Node::Leaf(v)),
            (None, Node::Branch(b)) => Err(MapError::Type(format!(
                "expected a leaf value, found a map with {} levels",
                b.levels()
            ))),
            (Some(shape), Node::Leaf(_)) => Err(MapError::Type(format!(
                "expected a map with {} levels, found a leaf value",
                shape.levels()
            ))),
            (Some(shape), Node::Branch(mut b)) => {
                if b.levels() != shape.levels() {
                    return Err(MapError::shape(format!(
                        "expected a map with {} levels, found one with {}",
                        shape.levels(),
                        b.levels()
                    )));
                }
                if b.shape != *shape {
                    b.apply_shape(shape.clone());
                }
                Ok(Node::Branch(b))
            }
        }
    }

    /// Replace the shape of this map and all descendants. Levels must match.
    pub(crate) fn apply_shape(&mut self, shape: Shape) {
        debug_assert_eq!(shape.levels(), self.levels());
        if let Some(tail) = shape.tail() {
            for node in self.entries.values_mut() {
                if let Node::Branch(child) = node {
                    child.apply_shape(tail.clone());
                }
            }
        }
        self.shape = shape;
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn levels(&self) -> usize {
        self.shape.levels()
    }

    /// Effective level names (synthesised when none were set)
    pub fn level_names(&self) -> Vec<String> {
        self.shape.level_names()
    }

    /// Cached width of each level
    pub fn dim(&self) -> &[usize] {
        &self.dim
    }

    /// Widths keyed by level name
    pub fn dim_by_name(&self) -> Vec<(String, usize)> {
        self.level_names()
            .into_iter()
            .zip(self.dim.iter().copied())
            .collect()
    }

    /// Full recursive recount of the widths, independent of the cache
    pub fn recount_dim(&self) -> Vec<usize> {
        let mut dim = vec![0; self.levels()];
        dim[0] = self.entries.len();
        for node in self.entries.values() {
            if let Node::Branch(child) = node {
                for (slot, width) in dim[1..].iter_mut().zip(child.recount_dim()) {
                    *slot += width;
                }
            }
        }
        dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Node<V>)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Node<V>> {
        self.entries.values()
    }

    /// Top-level lookup
    pub fn get_key(&self, key: &Key) -> Option<&Node<V>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn entries(&self) -> &Entries<Node<V>> {
        &self.entries
    }
}

impl<V: Clone> LeveledMap<V> {
    /// Deep copy into a plain nested mapping
    pub fn to_nested(&self) -> Nested<V> {
        Nested::Map(
            self.entries
                .iter()
                .map(|(k, node)| {
                    let child = match node {
                        Node::Branch(b) => b.to_nested(),
                        Node::Leaf(v) => Nested::Leaf(v.clone()),
                    };
                    (k.clone(), child)
                })
                .collect(),
        )
    }
}

impl<V> LeveledMap<V> {
    /// Consume into a plain nested mapping
    pub fn into_nested(self) -> Nested<V> {
        Nested::Map(
            self.entries
                .into_iter()
                .map(|(k, node)| {
                    let child = match node {
                        Node::Branch(b) => b.into_nested(),
                        Node::Leaf(v) => Nested::Leaf(v),
                    };
                    (k, child)
                })
                .collect(),
        )
    }
}

impl<V: Serialize> LeveledMap<V> {
    /// Plain JSON object form with stringified keys.
    ///
    /// Object key order follows `serde_json`'s map, not insertion order. Two
    /// keys that stringify identically fail with [`MapError::Conversion`].
    pub fn to_json_value(&self) -> Result<serde_json::Value, MapError> {
        let mut object = serde_json::Map::new();
        for (key, node) in self.entries.iter() {
            let value = match node {
                Node::Branch(b) => b.to_json_value()?,
                Node::Leaf(v) => {
                    serde_json::to_value(v).map_err(|e| MapError::Conversion(e.to_string()))?
                }
            };
            if object.insert(key.to_string(), value).is_some() {
                return Err(MapError::Conversion(format!(
                    "key '{}' collides with another key once stringified",
                    key
                )));
            }
        }
        Ok(serde_json::Value::Object(object))
    }
}

impl<T> LeveledMap<Nested<T>> {
    /// Build from a nested mapping that may be deeper than the shape: maps
    /// found at the last level are kept whole as leaf values.
    pub fn from_tree(tree: Nested<T>, shape: Shape) -> Result<Self, MapError> {
        let map = Self::build(tree, shape, &|node| Ok(node))?;
        debug!(levels = map.levels(), dim = ?map.dim, "Built leveled map from tree");
        Ok(map)
    }
}

impl<V: PartialEq> PartialEq for LeveledMap<V> {
    /// Order-sensitive comparison of shape and entries
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.entries == other.entries
    }
}

impl<V: Serialize> Serialize for LeveledMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
