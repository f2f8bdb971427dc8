//! Dynamic keyed and indexed access
//!
//! Hosts whose contents are not known statically (maps, lists, lookup tables)
//! implement these traits next to their [`HostClass`](crate::HostClass). The
//! collection wrapper and the inspector use them independently of the
//! declared members.

use std::fmt;

use crate::error::{HostError, HostResult};
use crate::value::HostValue;

/// Key of a keyed host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Position in a sequence
    Index(usize),
    /// Named entry
    Name(String),
}

impl Key {
    /// Parse a property name: canonical decimal digits become an index
    pub fn parse(property: &str) -> Key {
        let canonical = property == "0" || !property.starts_with(['0', '+']);
        match property.parse::<usize>() {
            Ok(index) if canonical => Key::Index(index),
            _ => Key::Name(property.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(n) => write!(f, "{}", n),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

/// Keyed enumeration for map-like hosts
pub trait KeyedAccess {
    /// Keys in enumeration order
    fn keys(&self) -> Vec<Key>;

    /// Value stored under `key`
    fn get(&self, key: &Key) -> HostResult<HostValue>;

    /// Whether `key` is present
    fn contains(&self, key: &Key) -> bool {
        self.keys().contains(key)
    }

    /// Store a value under `key`
    fn put(&self, key: &Key, _value: HostValue) -> HostResult<()> {
        Err(HostError::failed(format!("key '{}' is read-only", key)))
    }
}

/// Indexed access for list-like hosts
pub trait SequenceAccess {
    /// Number of elements
    fn len(&self) -> usize;

    /// Element at `index`, `None` when out of range
    fn get(&self, index: usize) -> Option<HostValue>;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the element at `index`
    fn set(&self, index: usize, _value: HostValue) -> HostResult<()> {
        Err(HostError::failed(format!("index {} is read-only", index)))
    }

    /// Snapshot of all elements
    fn to_vec(&self) -> Vec<HostValue> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }
}
