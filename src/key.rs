//! Keys
//!
//! A [`Key`] is either a scalar (bool, integer, string) or a tuple of keys.
//! Tuple keys are what flattening produces and what stratifying splits apart.
//! A tuple may remember the level names it was built from, which allows
//! lookups such as `key.field("region")`; the names never take part in
//! equality, ordering or hashing.

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A map key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Str(String),
    Tuple(KeyTuple),
}

/// A composite key, optionally carrying the names of its parts
#[derive(Debug, Clone)]
pub struct KeyTuple {
    parts: Vec<Key>,
    names: Option<Arc<[String]>>,
}

impl KeyTuple {
    pub fn new(parts: Vec<Key>) -> Self {
        Self { parts, names: None }
    }

    /// Build a named tuple. `names` must have one entry per part.
    pub(crate) fn named(parts: Vec<Key>, names: Arc<[String]>) -> Self {
        debug_assert_eq!(parts.len(), names.len());
        Self {
            parts,
            names: Some(names),
        }
    }

    pub fn parts(&self) -> &[Key] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<Key> {
        self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Look up a part by level name (named tuples only)
    pub fn field(&self, name: &str) -> Option<&Key> {
        let names = self.names.as_ref()?;
        let idx = names.iter().position(|n| n == name)?;
        self.parts.get(idx)
    }
}

impl PartialEq for KeyTuple {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for KeyTuple {}

impl Hash for KeyTuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl PartialOrd for KeyTuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyTuple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl Key {
    /// Build a plain (unnamed) tuple key
    pub fn tuple<I, K>(parts: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Key::Tuple(KeyTuple::new(parts.into_iter().map(Into::into).collect()))
    }

    /// Build a key path from anything convertible into keys
    ///
    /// ```
    /// use strata::Key;
    ///
    /// let path = Key::path(["a", "b"]);
    /// assert_eq!(path, vec![Key::from("a"), Key::from("b")]);
    /// ```
    pub fn path<I, K>(parts: I) -> Vec<Key>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        parts.into_iter().map(Into::into).collect()
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Key::Tuple(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&KeyTuple> {
        match self {
            Key::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Parts of this key: the tuple parts, or the key itself for scalars
    pub fn parts(&self) -> &[Key] {
        match self {
            Key::Tuple(t) => t.parts(),
            scalar => std::slice::from_ref(scalar),
        }
    }

    /// Join key parts back into a single key: one part stays scalar,
    /// several become an unnamed tuple.
    pub(crate) fn from_parts(mut parts: Vec<Key>) -> Key {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Key::Tuple(KeyTuple::new(parts))
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Str(s) => f.write_str(s),
            Key::Tuple(t) => {
                f.write_str("(")?;
                for (i, part) in t.parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Str(s.clone())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<u32> for Key {
    fn from(i: u32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<KeyTuple> for Key {
    fn from(t: KeyTuple) -> Self {
        Key::Tuple(t)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Bool(b) => serializer.serialize_bool(*b),
            Key::Int(i) => serializer.serialize_i64(*i),
            Key::Str(s) => serializer.serialize_str(s),
            Key::Tuple(t) => {
                let mut seq = serializer.serialize_seq(Some(t.len()))?;
                for part in &t.parts {
                    seq.serialize_element(part)?;
                }
                seq.end()
            }
        }
    }
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
    type Value = Key;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, integer, boolean or sequence of keys")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Key, E> {
        Ok(Key::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Key, E> {
        Ok(Key::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Key, E> {
        i64::try_from(v)
            .map(Key::Int)
            .map_err(|_| E::custom(format!("integer key {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
        Ok(Key::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Key, E> {
        Ok(Key::Str(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Key, A::Error> {
        let mut parts = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(part) = seq.next_element::<Key>()? {
            parts.push(part);
        }
        Ok(Key::Tuple(KeyTuple::new(parts)))
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeyVisitor)
    }
}
