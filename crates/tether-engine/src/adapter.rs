//! Adapter registry
//!
//! An adapter replaces a host object of one exact type with a substitute
//! value before wrapping, e.g. exposing a script-friendly view of an internal
//! type. Lookup matches the concrete runtime type only; parent classes are
//! not consulted.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tether_sdk::{HostClass, HostObject, HostRef, HostValue};

/// Stateless transformation from a host object to its substitute
pub trait Adapter: Send + Sync {
    /// Produce the value to wrap in place of `object`
    fn adapt(&self, object: &HostRef) -> HostValue;
}

impl<F> Adapter for F
where
    F: Fn(&HostRef) -> HostValue + Send + Sync,
{
    fn adapt(&self, object: &HostRef) -> HostValue {
        self(object)
    }
}

struct Entry {
    type_name: String,
    adapter: Arc<dyn Adapter>,
}

/// Exact-type map from host types to adapters
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: FxHashMap<TypeId, Entry>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for host type `T`, replacing any previous one
    pub fn register<T: HostObject>(&mut self, adapter: impl Adapter + 'static) {
        self.insert(TypeId::of::<T>(), type_name::<T>().to_string(), Arc::new(adapter));
    }

    /// Register an adapter for the concrete type described by `class`
    pub fn register_for(&mut self, class: &HostClass, adapter: impl Adapter + 'static) {
        self.insert(class.type_id(), class.name().to_string(), Arc::new(adapter));
    }

    fn insert(&mut self, type_id: TypeId, type_name: String, adapter: Arc<dyn Adapter>) {
        tracing::debug!(target: "tether::adapter", ty = %type_name, "adapter registered");
        if let Some(previous) = self.adapters.insert(type_id, Entry { type_name, adapter }) {
            tracing::debug!(target: "tether::adapter", ty = %previous.type_name, "previous adapter replaced");
        }
    }

    /// Adapter registered for exactly `type_id`
    pub fn lookup(&self, type_id: TypeId) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(&type_id).map(|entry| entry.adapter.clone())
    }

    /// Adapter registered for the concrete runtime type of `object`
    pub fn lookup_object(&self, object: &HostRef) -> Option<Arc<dyn Adapter>> {
        self.lookup(object.as_any().type_id())
    }

    /// Number of registered adapters
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.adapters.values().map(|e| e.type_name.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("AdapterRegistry").field("adapters", &names).finish()
    }
}
