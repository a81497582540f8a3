//! Key and value filtering
//!
//! Criteria are given per level, either positionally or by level name, and
//! resolved once into [`KeyMatcher`]s before any traversal.

use super::{LeveledMap, Node};
use crate::entries::Entries;
use crate::error::MapError;
use crate::key::Key;
use crate::shape::Shape;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Predicate over a key
pub type KeyPredicate = Arc<dyn Fn(&Key) -> bool + Send + Sync>;

/// What to keep at one level
#[derive(Clone)]
pub enum Criterion {
    /// Every key
    Wildcard,
    /// Keys for which the predicate holds
    Predicate(KeyPredicate),
    /// Keys in the set
    MemberOf(HashSet<Key>),
    /// One key
    Equals(Key),
}

impl Criterion {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Key) -> bool + Send + Sync + 'static,
    {
        Criterion::Predicate(Arc::new(f))
    }

    pub fn member_of<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Criterion::MemberOf(keys.into_iter().map(Into::into).collect())
    }

    pub fn equals(key: impl Into<Key>) -> Self {
        Criterion::Equals(key.into())
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Wildcard => f.write_str("Wildcard"),
            Criterion::Predicate(_) => f.write_str("Predicate(..)"),
            Criterion::MemberOf(keys) => f.debug_tuple("MemberOf").field(keys).finish(),
            Criterion::Equals(key) => f.debug_tuple("Equals").field(key).finish(),
        }
    }
}

impl From<Key> for Criterion {
    fn from(key: Key) -> Self {
        Criterion::Equals(key)
    }
}

impl From<&str> for Criterion {
    fn from(key: &str) -> Self {
        Criterion::Equals(Key::from(key))
    }
}

/// A resolved criterion with its inversion flag
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    criterion: Criterion,
    invert: bool,
}

impl KeyMatcher {
    pub fn new(criterion: Criterion, invert: bool) -> Self {
        Self { criterion, invert }
    }

    /// Matches every key, whatever the inversion of the other levels
    fn pass() -> Self {
        Self::new(Criterion::Wildcard, false)
    }

    pub fn matches(&self, key: &Key) -> bool {
        let hit = match &self.criterion {
            Criterion::Wildcard => true,
            Criterion::Predicate(f) => f(key),
            Criterion::MemberOf(keys) => keys.contains(key),
            Criterion::Equals(expected) => expected == key,
        };
        hit != self.invert
    }
}

/// Per-level criteria
#[derive(Debug, Clone)]
pub enum Criteria {
    /// One criterion per level, starting at the top
    Positional(Vec<Criterion>),
    /// Criteria keyed by level name; unnamed levels are unconstrained.
    ///
    /// With `filter_out`, only the named levels are inverted: keys matching
    /// a named criterion are dropped, while keys at levels left out always
    /// pass. An explicit [`Criterion::Wildcard`] is inverted like any other
    /// criterion.
    ByName(Vec<(String, Criterion)>),
}

impl Criteria {
    pub fn by_name<I, S>(criteria: I) -> Self
    where
        I: IntoIterator<Item = (S, Criterion)>,
        S: Into<String>,
    {
        Criteria::ByName(criteria.into_iter().map(|(n, c)| (n.into(), c)).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Criteria::Positional(c) => c.len(),
            Criteria::ByName(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve against a shape into one matcher per constrained level.
    ///
    /// By-name criteria produce matchers down to the deepest named level;
    /// levels in between that were not named match everything and are never
    /// inverted.
    pub fn resolve(&self, shape: &Shape, invert: bool) -> Result<Vec<KeyMatcher>, MapError> {
        if self.is_empty() {
            return Err(MapError::EmptyCriteria);
        }
        match self {
            Criteria::Positional(criteria) => {
                if criteria.len() > shape.levels() {
                    return Err(MapError::Level {
                        level: criteria.len() as isize,
                        allowed: shape.levels(),
                    });
                }
                Ok(criteria
                    .iter()
                    .map(|c| KeyMatcher::new(c.clone(), invert))
                    .collect())
            }
            Criteria::ByName(criteria) => {
                let mut slots: Vec<Option<&Criterion>> = vec![None; shape.levels()];
                for (name, criterion) in criteria {
                    slots[shape.position(name)?] = Some(criterion);
                }
                let depth = slots.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
                Ok(slots[..depth]
                    .iter()
                    .map(|slot| match slot {
                        Some(c) => KeyMatcher::new((*c).clone(), invert),
                        None => KeyMatcher::pass(),
                    })
                    .collect())
            }
        }
    }
}

impl From<Vec<Criterion>> for Criteria {
    fn from(criteria: Vec<Criterion>) -> Self {
        Criteria::Positional(criteria)
    }
}

/// Options shared by the filters
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// Keep what fails the criteria instead of what passes
    pub filter_out: bool,
    /// Drop sub-maps left empty by the filter
    pub drop_empty: bool,
}

impl<V> LeveledMap<V> {
    /// Borrowed `(path, node)` pairs selected by `criteria`, one path per
    /// match at the deepest constrained level
    pub fn select(&self, criteria: &Criteria) -> Result<Vec<(Vec<Key>, &Node<V>)>, MapError> {
        let matchers = criteria.resolve(&self.shape, false)?;
        let mut selected = Vec::new();
        self.collect_matches(&matchers, &mut Vec::with_capacity(matchers.len()), &mut selected);
        Ok(selected)
    }

    fn collect_matches<'a>(
        &'a self,
        matchers: &[KeyMatcher],
        prefix: &mut Vec<Key>,
        out: &mut Vec<(Vec<Key>, &'a Node<V>)>,
    ) {
        let Some((matcher, rest)) = matchers.split_first() else {
            return;
        };
        for (key, node) in self.entries().iter() {
            if !matcher.matches(key) {
                continue;
            }
            prefix.push(key.clone());
            if rest.is_empty() {
                out.push((prefix.clone(), node));
            } else if let Node::Branch(child) = node {
                child.collect_matches(rest, prefix, out);
            }
            prefix.pop();
        }
    }
}

impl<V: Clone> LeveledMap<V> {
    /// Prune keys failing their level's criterion, with their subtrees
    #[instrument(skip_all, fields(levels = self.levels(), criteria = criteria.len()))]
    pub fn filter_key(&self, criteria: &Criteria, options: FilterOptions) -> Result<Self, MapError> {
        let matchers = criteria.resolve(&self.shape, options.filter_out)?;
        let filtered = self.filter_entries(&matchers, options.drop_empty);
        debug!(dim = ?filtered.dim, "Filtered keys");
        Ok(filtered)
    }

    fn filter_entries(&self, matchers: &[KeyMatcher], drop_empty: bool) -> Self {
        let Some((matcher, rest)) = matchers.split_first() else {
            return self.clone();
        };
        let mut entries = Entries::new();
        for (key, node) in self.entries().iter() {
            if !matcher.matches(key) {
                continue;
            }
            let node = match node {
                Node::Branch(child) => {
                    let filtered = child.filter_entries(rest, drop_empty);
                    if drop_empty && filtered.is_empty() {
                        continue;
                    }
                    Node::Branch(filtered)
                }
                Node::Leaf(v) => Node::Leaf(v.clone()),
            };
            entries.insert(key.clone(), node);
        }
        Self::assemble(self.shape.clone(), entries)
    }

    /// Prune entries at `level` (default the deepest) whose node fails
    /// `predicate`
    pub fn filter_values<F>(
        &self,
        predicate: F,
        level: Option<isize>,
        options: FilterOptions,
    ) -> Result<Self, MapError>
    where
        F: Fn(&Node<V>) -> bool,
    {
        let level = match level {
            Some(level) => self.shape.wrap_level(level)?,
            None => self.levels() - 1,
        };
        let filtered = self.filter_at(&predicate, level, options);
        debug!(level, dim = ?filtered.dim, "Filtered values");
        Ok(filtered)
    }

    /// Prune leaves whose value fails `predicate`
    pub fn filter_leaves<F>(&self, predicate: F, options: FilterOptions) -> Self
    where
        F: Fn(&V) -> bool,
    {
        let predicate = |node: &Node<V>| node.as_leaf().map_or(false, &predicate);
        self.filter_at(&predicate, self.levels() - 1, options)
    }

    fn filter_at<F>(&self, predicate: &F, remaining: usize, options: FilterOptions) -> Self
    where
        F: Fn(&Node<V>) -> bool,
    {
        let mut entries = Entries::new();
        for (key, node) in self.entries().iter() {
            if remaining == 0 {
                if predicate(node) != options.filter_out {
                    entries.insert(key.clone(), node.clone());
                }
            } else if let Node::Branch(child) = node {
                let filtered = child.filter_at(predicate, remaining - 1, options);
                if options.drop_empty && filtered.is_empty() {
                    continue;
                }
                entries.insert(key.clone(), Node::Branch(filtered));
            }
        }
        Self::assemble(self.shape.clone(), entries)
    }

    /// Assign `node` at every path selected by `criteria`; returns how many
    /// paths were written. The node is validated once before any write.
    pub fn set_where(&mut self, criteria: &Criteria, node: Node<V>) -> Result<usize, MapError> {
        let paths: Vec<Vec<Key>> = self
            .select(criteria)?
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        let Some(depth) = paths.first().map(Vec::len) else {
            return Ok(0);
        };
        let node = Self::conform(self.shape.descend(depth).as_ref(), node)?;
        for path in &paths {
            self.set(path, node.clone())?;
        }
        debug!(count = paths.len(), "Set selected paths");
        Ok(paths.len())
    }
}
