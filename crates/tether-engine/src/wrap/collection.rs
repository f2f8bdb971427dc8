//! Collection wrapper
//!
//! Hosts with keyed or indexed access get synthetic members on top of their
//! regular table: `length`, numeric indices, entry keys, and for sequences
//! `forEach(callback)` and `indexOf(value)`.

use std::fmt;
use std::sync::Arc;

use tether_sdk::{HostError, HostRef, HostResult, HostValue, Key, NativeFunction, ScriptFunction};

use super::object::ScriptObject;
use super::reflective::ReflectiveObject;
use super::scope::WrapScope;
use super::value::ScriptValue;
use crate::error::{BridgeError, BridgeResult};
use crate::resolver::MemberTable;

const LENGTH: &str = "length";
const FOR_EACH: &str = "forEach";
const INDEX_OF: &str = "indexOf";

/// Wrapper for list- and map-like hosts
pub struct CollectionObject {
    object: HostRef,
    base: ReflectiveObject,
}

impl CollectionObject {
    /// Wrap `object` with its resolved table
    pub fn new(object: HostRef, table: Arc<MemberTable>) -> Self {
        let base = ReflectiveObject::new(object.clone(), table);
        Self { object, base }
    }

    fn len(&self) -> Option<usize> {
        if let Some(seq) = self.object.as_sequence() {
            return Some(seq.len());
        }
        self.object.as_keyed().map(|keyed| keyed.keys().len())
    }

    fn is_sequence(&self) -> bool {
        self.object.as_sequence().is_some()
    }

    fn synthetic(&self, name: &str) -> BridgeResult<Option<HostValue>> {
        if name == LENGTH {
            return Ok(self.len().map(HostValue::from));
        }
        if let Some(seq) = self.object.as_sequence() {
            match name {
                FOR_EACH | INDEX_OF => {
                    let method = self.base.method_value(name, || self.sequence_method(name));
                    return Ok(Some(HostValue::Function(method)));
                }
                _ => {}
            }
            if let Key::Index(i) = Key::parse(name) {
                return Ok(Some(seq.get(i).unwrap_or_default()));
            }
        }
        if let Some(keyed) = self.object.as_keyed() {
            let key = Key::parse(name);
            if keyed.contains(&key) {
                return keyed
                    .get(&key)
                    .map(Some)
                    .map_err(|source| BridgeError::MemberRetrievalFailed {
                        member: format!("[{}]", key),
                        source,
                    });
            }
        }
        Ok(None)
    }

    fn sequence_method(&self, name: &str) -> ScriptFunction {
        let object = self.object.clone();
        if name == FOR_EACH {
            NativeFunction::named(FOR_EACH, move |args| for_each(&object, args))
        } else {
            NativeFunction::named(INDEX_OF, move |args| index_of(&object, args))
        }
    }
}

fn for_each(object: &HostRef, args: &[HostValue]) -> HostResult<HostValue> {
    let seq = object
        .as_sequence()
        .ok_or_else(|| HostError::failed("not a sequence"))?;
    let callback = args
        .first()
        .and_then(HostValue::as_function)
        .ok_or_else(|| HostError::mismatch("Function", args.first().map_or("undefined", |a| a.type_name())))?;
    for (index, item) in seq.to_vec().into_iter().enumerate() {
        callback.call(&[item, HostValue::from(index)])?;
    }
    Ok(HostValue::Undefined)
}

fn index_of(object: &HostRef, args: &[HostValue]) -> HostResult<HostValue> {
    let seq = object
        .as_sequence()
        .ok_or_else(|| HostError::failed("not a sequence"))?;
    let needle = args.first().cloned().unwrap_or_default();
    let position = seq.to_vec().iter().position(|item| item.same(&needle));
    Ok(position.map_or(HostValue::Int(-1), HostValue::from))
}

impl ScriptObject for CollectionObject {
    fn class_name(&self) -> &str {
        self.base.class_name()
    }

    fn get(&self, name: &str, scope: &WrapScope) -> BridgeResult<ScriptValue> {
        match self.synthetic(name)? {
            Some(value) => Ok(scope.wrap(&value)),
            None => self.base.get(name, scope),
        }
    }

    fn put(&self, name: &str, value: &ScriptValue, scope: &WrapScope) -> BridgeResult<()> {
        if self.base.table().property(name).is_some() {
            return self.base.put(name, value, scope);
        }
        let key = Key::parse(name);
        let value = scope.unwrap(value);
        let result = match (&key, self.object.as_sequence(), self.object.as_keyed()) {
            (Key::Index(i), Some(seq), _) => seq.set(*i, value),
            (_, _, Some(keyed)) => keyed.put(&key, value),
            _ => return self.base.table().set(&*self.object, name, value),
        };
        result.map_err(|source| BridgeError::InvocationFailed {
            member: format!("[{}]", key),
            source,
        })
    }

    fn has(&self, name: &str) -> bool {
        if name == LENGTH || self.base.has(name) {
            return true;
        }
        let key = Key::parse(name);
        if let (Key::Index(i), Some(seq)) = (&key, self.object.as_sequence()) {
            return *i < seq.len();
        }
        if self.is_sequence() && (name == FOR_EACH || name == INDEX_OF) {
            return true;
        }
        self.object.as_keyed().is_some_and(|keyed| keyed.contains(&key))
    }

    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = match (self.object.as_sequence(), self.object.as_keyed()) {
            (Some(seq), _) => (0..seq.len()).map(|i| i.to_string()).collect(),
            (None, Some(keyed)) => keyed.keys().iter().map(Key::to_string).collect(),
            (None, None) => Vec::new(),
        };
        ids.push(LENGTH.to_string());
        ids.extend(self.base.ids());
        ids
    }

    fn call(&self, name: &str, args: &[ScriptValue], scope: &WrapScope) -> BridgeResult<ScriptValue> {
        if self.is_sequence() && (name == FOR_EACH || name == INDEX_OF) {
            let args = scope.unwrap_all(args);
            let result = match name {
                FOR_EACH => for_each(&self.object, &args),
                _ => index_of(&self.object, &args),
            };
            return result
                .map(|value| scope.wrap(&value))
                .map_err(|source| BridgeError::InvocationFailed {
                    member: name.to_string(),
                    source,
                });
        }
        self.base.call(name, args, scope)
    }

    fn unwrap(&self) -> HostRef {
        self.object.clone()
    }
}

impl fmt::Debug for CollectionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionObject")
            .field("class", &self.class_name())
            .field("length", &self.len())
            .finish()
    }
}
