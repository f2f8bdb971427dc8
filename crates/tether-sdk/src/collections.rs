//! Built-in host containers
//!
//! `HostList` and `HostMap` are ready-made list- and map-shaped hosts. Both
//! implement the dynamic access traits, so scripts can index them and tooling
//! can enumerate them, and both publish a small class descriptor
//! (`tether.List`, `tether.Map`) for their methods.

use std::any::Any;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::access::{Key, KeyedAccess, SequenceAccess};
use crate::class::HostClass;
use crate::error::{HostError, HostResult};
use crate::value::{HostObject, HostValue, ValueType};

/// Fully-qualified class name of [`HostList`]
pub const LIST_CLASS_NAME: &str = "tether.List";

/// Fully-qualified class name of [`HostMap`]
pub const MAP_CLASS_NAME: &str = "tether.Map";

fn arg<'a>(args: &'a [HostValue], index: usize) -> &'a HostValue {
    static UNDEFINED: HostValue = HostValue::Undefined;
    args.get(index).unwrap_or(&UNDEFINED)
}

fn key_arg(args: &[HostValue]) -> HostResult<String> {
    arg(args, 0)
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| HostError::mismatch("String", arg(args, 0).type_name()))
}

static LIST_CLASS: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<HostList>(LIST_CLASS_NAME)
        .function("push", &[ValueType::Any], ValueType::Int, |list, args| {
            let mut items = list.items.write();
            items.push(arg(args, 0).clone());
            Ok(items.len().into())
        })
        .function("size", &[], ValueType::Int, |list, _| Ok(list.items.read().len().into()))
        .build()
});

static MAP_CLASS: Lazy<HostClass> = Lazy::new(|| {
    HostClass::builder::<HostMap>(MAP_CLASS_NAME)
        .function("get", &[ValueType::Str], ValueType::Any, |map, args| {
            let key = key_arg(args)?;
            Ok(map.lookup(&key).unwrap_or(HostValue::Undefined))
        })
        .function("put", &[ValueType::Str, ValueType::Any], ValueType::Void, |map, args| {
            map.insert(key_arg(args)?, arg(args, 1).clone());
            Ok(HostValue::Undefined)
        })
        .function("containsKey", &[ValueType::Str], ValueType::Bool, |map, args| {
            let key = key_arg(args)?;
            Ok(map.lookup(&key).is_some().into())
        })
        .function("size", &[], ValueType::Int, |map, _| Ok(map.entries.read().len().into()))
        .build()
});

/// Growable list host
#[derive(Default)]
pub struct HostList {
    items: RwLock<Vec<HostValue>>,
}

impl HostList {
    /// Create a list from values
    pub fn new(items: Vec<HostValue>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Append a value
    pub fn push(&self, value: HostValue) {
        self.items.write().push(value);
    }
}

impl FromIterator<HostValue> for HostList {
    fn from_iter<I: IntoIterator<Item = HostValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl SequenceAccess for HostList {
    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn get(&self, index: usize) -> Option<HostValue> {
        self.items.read().get(index).cloned()
    }

    fn set(&self, index: usize, value: HostValue) -> HostResult<()> {
        let mut items = self.items.write();
        match index {
            i if i < items.len() => items[i] = value,
            i if i == items.len() => items.push(value),
            _ => {
                return Err(HostError::ArgumentError(format!(
                    "index {} out of bounds for length {}",
                    index,
                    items.len()
                )))
            }
        }
        Ok(())
    }

    fn to_vec(&self) -> Vec<HostValue> {
        self.items.read().clone()
    }
}

impl KeyedAccess for HostList {
    fn keys(&self) -> Vec<Key> {
        (0..self.items.read().len()).map(Key::Index).collect()
    }

    fn get(&self, key: &Key) -> HostResult<HostValue> {
        match key {
            Key::Index(i) => SequenceAccess::get(self, *i)
                .ok_or_else(|| HostError::ArgumentError(format!("index {} out of bounds", i))),
            Key::Name(name) => Err(HostError::mismatch("index", name.as_str())),
        }
    }

    fn contains(&self, key: &Key) -> bool {
        matches!(key, Key::Index(i) if *i < self.items.read().len())
    }

    fn put(&self, key: &Key, value: HostValue) -> HostResult<()> {
        match key {
            Key::Index(i) => self.set(*i, value),
            Key::Name(name) => Err(HostError::mismatch("index", name.as_str())),
        }
    }
}

impl HostObject for HostList {
    fn host_class(&self) -> &'static HostClass {
        &LIST_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_keyed(&self) -> Option<&dyn KeyedAccess> {
        Some(self)
    }

    fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
        Some(self)
    }

    fn display(&self) -> String {
        format!("List[{}]", self.items.read().len())
    }
}

/// Insertion-ordered string-keyed map host
#[derive(Default)]
pub struct HostMap {
    entries: RwLock<Vec<(String, HostValue)>>,
}

impl HostMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&self, key: impl Into<String>, value: HostValue) {
        let key = key.into();
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    /// Look up an entry
    pub fn lookup(&self, key: &str) -> Option<HostValue> {
        self.entries
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, HostValue)> for HostMap {
    fn from_iter<I: IntoIterator<Item = (K, HostValue)>>(iter: I) -> Self {
        let map = HostMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl KeyedAccess for HostMap {
    fn keys(&self) -> Vec<Key> {
        self.entries
            .read()
            .iter()
            .map(|(k, _)| Key::Name(k.clone()))
            .collect()
    }

    fn get(&self, key: &Key) -> HostResult<HostValue> {
        let name = key.to_string();
        self.lookup(&name)
            .ok_or_else(|| HostError::ArgumentError(format!("no entry '{}'", name)))
    }

    fn contains(&self, key: &Key) -> bool {
        self.lookup(&key.to_string()).is_some()
    }

    fn put(&self, key: &Key, value: HostValue) -> HostResult<()> {
        self.insert(key.to_string(), value);
        Ok(())
    }
}

impl HostObject for HostMap {
    fn host_class(&self) -> &'static HostClass {
        &MAP_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_keyed(&self) -> Option<&dyn KeyedAccess> {
        Some(self)
    }

    fn display(&self) -> String {
        format!("Map{{{}}}", self.len())
    }
}
