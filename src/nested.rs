//! Plain nested mappings
//!
//! [`Nested`] is the unstructured form of a leveled map: an ordered mapping
//! whose values are either further mappings or leaf values, with no declared
//! depth. It is what callers hand to
//! [`LeveledMap::from_nested`](crate::LeveledMap::from_nested) and what
//! [`LeveledMap::to_nested`](crate::LeveledMap::to_nested) gives back.

use crate::entries::Entries;
use crate::key::Key;
use serde::{Deserialize, Serialize};

/// Ordered nested mapping of arbitrary depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested<V> {
    Map(Entries<Nested<V>>),
    Leaf(V),
}

impl<V> Nested<V> {
    /// Empty mapping
    pub fn empty() -> Self {
        Nested::Map(Entries::new())
    }

    /// Mapping built from `(key, child)` pairs in order
    pub fn map<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, Nested<V>)>,
        K: Into<Key>,
    {
        Nested::Map(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn leaf(value: V) -> Self {
        Nested::Leaf(value)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Nested::Leaf(_))
    }

    pub fn as_map(&self) -> Option<&Entries<Nested<V>>> {
        match self {
            Nested::Map(entries) => Some(entries),
            Nested::Leaf(_) => None,
        }
    }

    /// Depth found by following first children until a leaf or an empty
    /// mapping. A leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Nested::Map(entries) = current {
            depth += 1;
            match entries.first() {
                Some((_, child)) => current = child,
                None => break,
            }
        }
        depth
    }
}

/// Build a [`Nested`] literal.
///
/// Values must be single token trees; wrap longer expressions in
/// parentheses, e.g. `"k" => ("v".to_string())`.
///
/// ```
/// use strata::{nested, Nested};
///
/// let tree: Nested<i32> = nested!({ "a" => { "x" => 1, "y" => 2 }, "b" => {} });
/// assert_eq!(tree.depth(), 2);
/// ```
#[macro_export]
macro_rules! nested {
    ({ $($key:expr => $val:tt),* $(,)? }) => {
        $crate::Nested::Map(
            ::std::vec![$(($crate::Key::from($key), $crate::nested!($val))),*]
                .into_iter()
                .collect(),
        )
    };
    ($leaf:expr) => {
        $crate::Nested::Leaf($leaf)
    };
}
