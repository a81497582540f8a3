//! In-place mutation and path lookups.
//!
//! Every mutator computes the change in widths at the point of mutation and
//! adds it to `dim` on the way back up the path, so ancestors never recount
//! their subtrees.

use super::{LeveledMap, Node};
use crate::error::MapError;
use crate::key::Key;
use crate::nested::Nested;
use tracing::trace;

/// Add `sign * dim` into `delta` slot by slot
fn accumulate(delta: &mut [isize], dim: &[usize], sign: isize) {
    for (slot, width) in delta.iter_mut().zip(dim) {
        *slot += sign * *width as isize;
    }
}

fn display_path(path: &[Key]) -> String {
    Key::from_parts(path.to_vec()).to_string()
}

impl<V> LeveledMap<V> {
    fn check_path(&self, path: &[Key]) -> Result<(), MapError> {
        if path.is_empty() {
            return Err(MapError::EmptyKeyPath);
        }
        if path.len() > self.levels() {
            return Err(MapError::shape(format!(
                "key path of length {} exceeds {} levels",
                path.len(),
                self.levels()
            )));
        }
        Ok(())
    }

    fn apply_delta(&mut self, delta: &[isize]) {
        for (width, change) in self.dim.iter_mut().zip(delta) {
            *width = width.saturating_add_signed(*change);
        }
    }

    /// Insert or replace the node at `path`.
    ///
    /// The node is conformed to the position first: a leaf when the path has
    /// one key per level, otherwise a branch with the remaining levels.
    /// Missing intermediate maps are created. Returns the replaced node.
    pub fn set(&mut self, path: &[Key], node: Node<V>) -> Result<Option<Node<V>>, MapError> {
        self.check_path(path)?;
        let node = Self::conform(self.shape.descend(path.len()).as_ref(), node)?;
        let (previous, delta) = self.insert_at(path, node);
        trace!(depth = path.len(), ?delta, replaced = previous.is_some(), "Set node");
        Ok(previous)
    }

    /// Shorthand for setting a leaf value at a full-depth path
    pub fn set_leaf(&mut self, path: &[Key], value: V) -> Result<Option<Node<V>>, MapError> {
        self.set(path, Node::Leaf(value))
    }

    /// Coerce a plain nested mapping to the shape expected at `path`, then set it
    pub fn set_nested(
        &mut self,
        path: &[Key],
        tree: Nested<V>,
    ) -> Result<Option<Node<V>>, MapError> {
        self.check_path(path)?;
        let node = match self.shape.descend(path.len()) {
            Some(shape) => Node::Branch(LeveledMap::from_nested(tree, shape)?),
            None => match tree {
                Nested::Leaf(v) => Node::Leaf(v),
                Nested::Map(_) => {
                    return Err(MapError::Type(
                        "expected a leaf value, found a mapping".to_string(),
                    ))
                }
            },
        };
        self.set(path, node)
    }

    /// Existing node at `path`, or `default` after inserting it
    pub fn setdefault(&mut self, path: &[Key], default: Node<V>) -> Result<&Node<V>, MapError> {
        if !self.has_key(path)? {
            self.set(path, default)?;
        }
        self.get(path)
    }

    /// Assumes `path` was validated. Returns the replaced node and the change
    /// applied to this map's widths.
    fn insert_at(&mut self, path: &[Key], node: Node<V>) -> (Option<Node<V>>, Vec<isize>) {
        let mut delta = vec![0isize; self.levels()];
        let previous = match path {
            [key] => {
                accumulate(&mut delta[1..], node.dim(), 1);
                let previous = self.entries.insert(key.clone(), node);
                match &previous {
                    Some(old) => accumulate(&mut delta[1..], old.dim(), -1),
                    None => delta[0] += 1,
                }
                previous
            }
            [key, rest @ ..] => {
                if !self.entries.contains_key(key) {
                    if let Some(tail) = self.shape.tail() {
                        self.entries
                            .insert(key.clone(), Node::Branch(LeveledMap::new(tail)));
                        delta[0] += 1;
                    }
                }
                match self.entries.get_mut(key) {
                    Some(Node::Branch(child)) => {
                        let (previous, child_delta) = child.insert_at(rest, node);
                        for (slot, change) in delta[1..].iter_mut().zip(&child_delta) {
                            *slot += change;
                        }
                        previous
                    }
                    _ => None,
                }
            }
            [] => None,
        };
        self.apply_delta(&delta);
        (previous, delta)
    }

    /// Remove a top-level key and its subtree
    pub fn delete(&mut self, key: &Key) -> Result<Node<V>, MapError> {
        let node = self
            .entries
            .remove(key)
            .ok_or_else(|| MapError::KeyNotFound(key.to_string()))?;
        let mut delta = vec![0isize; self.levels()];
        delta[0] = -1;
        accumulate(&mut delta[1..], node.dim(), -1);
        self.apply_delta(&delta);
        trace!(key = %key, ?delta, "Deleted key");
        Ok(node)
    }

    /// Remove the node at any depth
    pub fn remove_path(&mut self, path: &[Key]) -> Result<Node<V>, MapError> {
        self.check_path(path)?;
        let (node, delta) = self
            .remove_at(path)
            .ok_or_else(|| MapError::KeyNotFound(display_path(path)))?;
        trace!(depth = path.len(), ?delta, "Removed node");
        Ok(node)
    }

    fn remove_at(&mut self, path: &[Key]) -> Option<(Node<V>, Vec<isize>)> {
        let mut delta = vec![0isize; self.levels()];
        let removed = match path {
            [key] => {
                let node = self.entries.remove(key)?;
                delta[0] = -1;
                accumulate(&mut delta[1..], node.dim(), -1);
                node
            }
            [key, rest @ ..] => match self.entries.get_mut(key) {
                Some(Node::Branch(child)) => {
                    let (node, child_delta) = child.remove_at(rest)?;
                    for (slot, change) in delta[1..].iter_mut().zip(&child_delta) {
                        *slot += change;
                    }
                    node
                }
                _ => return None,
            },
            [] => return None,
        };
        self.apply_delta(&delta);
        Some((removed, delta))
    }

    fn lookup(&self, path: &[Key]) -> Option<&Node<V>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.entries.get(first)?;
        for key in rest {
            node = match node {
                Node::Branch(b) => b.entries.get(key)?,
                Node::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    fn lookup_mut(&mut self, path: &[Key]) -> Option<&mut Node<V>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.entries.get_mut(first)?;
        for key in rest {
            node = match node {
                Node::Branch(b) => b.entries.get_mut(key)?,
                Node::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    /// Node at `path`
    pub fn get(&self, path: &[Key]) -> Result<&Node<V>, MapError> {
        self.check_path(path)?;
        self.lookup(path)
            .ok_or_else(|| MapError::KeyNotFound(display_path(path)))
    }

    /// Node at `path`, or `default` when any key along it is absent
    pub fn get_or<'a>(
        &'a self,
        path: &[Key],
        default: &'a Node<V>,
    ) -> Result<&'a Node<V>, MapError> {
        self.check_path(path)?;
        Ok(self.lookup(path).unwrap_or(default))
    }

    pub fn has_key(&self, path: &[Key]) -> Result<bool, MapError> {
        self.check_path(path)?;
        Ok(self.lookup(path).is_some())
    }

    fn check_leaf_path(&self, path: &[Key]) -> Result<(), MapError> {
        self.check_path(path)?;
        if path.len() != self.levels() {
            return Err(MapError::shape(format!(
                "leaf paths need {} keys, got {}",
                self.levels(),
                path.len()
            )));
        }
        Ok(())
    }

    /// Leaf value at a full-depth path
    pub fn leaf(&self, path: &[Key]) -> Result<&V, MapError> {
        self.check_leaf_path(path)?;
        match self.lookup(path) {
            Some(Node::Leaf(v)) => Ok(v),
            _ => Err(MapError::KeyNotFound(display_path(path))),
        }
    }

    /// Mutable leaf value. Leaves do not count toward `dim`, so no update is
    /// needed.
    pub fn leaf_mut(&mut self, path: &[Key]) -> Result<&mut V, MapError> {
        self.check_leaf_path(path)?;
        match self.lookup_mut(path) {
            Some(Node::Leaf(v)) => Ok(v),
            _ => Err(MapError::KeyNotFound(display_path(path))),
        }
    }
}
