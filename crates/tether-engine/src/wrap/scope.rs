//! Per-execution wrap scope
//!
//! A scope remembers every host object it has wrapped, so the same host
//! object always comes back as the same wrapper while the scope lives. The
//! cache holds the host handle as well, which keeps the allocation (and so
//! the identity key) from being reused. Scopes are single-threaded and are
//! dropped with the execution they belong to.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tether_sdk::{object_id, HostRef, HostValue, ScriptFunction};

use super::reflective::BoundMethod;
use super::value::ScriptValue;
use super::WrapPipeline;
use crate::error::RuntimeFault;

/// Identity-preserving wrapper cache for one execution
pub struct WrapScope {
    pipeline: Arc<WrapPipeline>,
    cache: RefCell<FxHashMap<usize, (HostRef, ScriptValue)>>,
}

impl WrapScope {
    /// Open a scope over `pipeline`
    pub fn new(pipeline: Arc<WrapPipeline>) -> Self {
        Self {
            pipeline,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Pipeline used for objects not yet wrapped in this scope
    pub fn pipeline(&self) -> &Arc<WrapPipeline> {
        &self.pipeline
    }

    /// Script-visible form of `value`
    pub fn wrap(&self, value: &HostValue) -> ScriptValue {
        let object = match value {
            HostValue::Object(object) => object,
            other => return ScriptValue::from_primitive(other).unwrap_or_default(),
        };
        let id = object_id(object);
        if let Some((_, wrapped)) = self.cache.borrow().get(&id) {
            return wrapped.clone();
        }

        let wrapped = self.pipeline.wrap_object(object, self);
        self.cache.borrow_mut().insert(id, (object.clone(), wrapped.clone()));
        wrapped
    }

    /// Wrap every value
    pub fn wrap_all(&self, values: &[HostValue]) -> Vec<ScriptValue> {
        values.iter().map(|v| self.wrap(v)).collect()
    }

    /// Host form of a script value; wrappers yield their host object
    pub fn unwrap(&self, value: &ScriptValue) -> HostValue {
        match value {
            ScriptValue::Undefined => HostValue::Undefined,
            ScriptValue::Null => HostValue::Null,
            ScriptValue::Bool(b) => HostValue::Bool(*b),
            ScriptValue::Int(i) => HostValue::Int(*i),
            ScriptValue::Number(n) => HostValue::Float(*n),
            ScriptValue::Str(s) => HostValue::Str(s.clone()),
            ScriptValue::Function(f) => HostValue::Function(f.clone()),
            ScriptValue::Object(o) => HostValue::Object(o.unwrap()),
        }
    }

    /// Unwrap every value
    pub fn unwrap_all(&self, values: &[ScriptValue]) -> Vec<HostValue> {
        values.iter().map(|v| self.unwrap(v)).collect()
    }

    /// Call a function value with script arguments.
    ///
    /// Host methods read as values keep their [`BridgeError`](crate::BridgeError)
    /// as the fault's cause; other callables fail with their message only.
    pub fn call_function(&self, function: &ScriptFunction, args: &[ScriptValue]) -> Result<ScriptValue, RuntimeFault> {
        let args = self.unwrap_all(args);
        let result = match function.as_any().and_then(|any| any.downcast_ref::<BoundMethod>()) {
            Some(method) => method.invoke(&args)?,
            None => function
                .call(&args)
                .map_err(|err| RuntimeFault::new(err.to_string()))?,
        };
        Ok(self.wrap(&result))
    }

    /// Number of wrapped objects
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Check if nothing was wrapped yet
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

impl fmt::Debug for WrapScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapScope").field("wrapped", &self.len()).finish()
    }
}
