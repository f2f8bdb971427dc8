//! Standard wrap links

use std::rc::Rc;
use std::sync::Arc;

use tether_sdk::HostRef;

use super::collection::CollectionObject;
use super::reflective::ReflectiveObject;
use super::scope::WrapScope;
use super::value::ScriptValue;
use super::{LinkOutcome, WrapLink};
use crate::adapter::AdapterRegistry;
use crate::resolver::MemberResolver;

/// Substitutes objects that have a registered adapter
pub struct AdapterLink {
    adapters: Arc<AdapterRegistry>,
}

impl AdapterLink {
    /// Create a link over `adapters`
    pub fn new(adapters: Arc<AdapterRegistry>) -> Self {
        Self { adapters }
    }
}

impl WrapLink for AdapterLink {
    fn name(&self) -> &str {
        "adapter"
    }

    fn wrap(&self, object: &HostRef, _scope: &WrapScope) -> LinkOutcome {
        match self.adapters.lookup_object(object) {
            Some(adapter) => LinkOutcome::Substitute(adapter.adapt(object)),
            None => LinkOutcome::Delegate,
        }
    }
}

/// Wraps hosts with keyed or indexed access
pub struct CollectionLink {
    resolver: Arc<MemberResolver>,
}

impl CollectionLink {
    /// Create a link over `resolver`
    pub fn new(resolver: Arc<MemberResolver>) -> Self {
        Self { resolver }
    }
}

impl WrapLink for CollectionLink {
    fn name(&self) -> &str {
        "collection"
    }

    fn wrap(&self, object: &HostRef, _scope: &WrapScope) -> LinkOutcome {
        if object.as_sequence().is_none() && object.as_keyed().is_none() {
            return LinkOutcome::Delegate;
        }
        let table = self.resolver.resolve(object.host_class());
        LinkOutcome::Wrapped(ScriptValue::Object(Rc::new(CollectionObject::new(object.clone(), table))))
    }
}

/// Reflective wrapping of any object
pub struct DefaultLink {
    resolver: Arc<MemberResolver>,
}

impl DefaultLink {
    /// Create a link over `resolver`
    pub fn new(resolver: Arc<MemberResolver>) -> Self {
        Self { resolver }
    }
}

impl WrapLink for DefaultLink {
    fn name(&self) -> &str {
        "default"
    }

    fn wrap(&self, object: &HostRef, _scope: &WrapScope) -> LinkOutcome {
        LinkOutcome::Wrapped(reflect(&self.resolver, object))
    }
}

pub(super) fn reflect(resolver: &MemberResolver, object: &HostRef) -> ScriptValue {
    let table = resolver.resolve(object.host_class());
    ScriptValue::Object(Rc::new(ReflectiveObject::new(object.clone(), table)))
}
