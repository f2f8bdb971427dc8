//! Reflective wrapper driven by the member table

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tether_sdk::{Callable, HostError, HostRef, HostResult, HostValue, ScriptFunction};

use super::object::ScriptObject;
use super::scope::WrapScope;
use super::value::ScriptValue;
use crate::error::{BridgeError, BridgeResult};
use crate::resolver::MemberTable;

/// Generic wrapper exposing exactly the members of the resolved table
pub struct ReflectiveObject {
    object: HostRef,
    table: Arc<MemberTable>,
    methods: RefCell<FxHashMap<String, ScriptFunction>>,
}

impl ReflectiveObject {
    /// Wrap `object` with its resolved table
    pub fn new(object: HostRef, table: Arc<MemberTable>) -> Self {
        Self {
            object,
            table,
            methods: RefCell::new(FxHashMap::default()),
        }
    }

    /// Resolved member table
    pub fn table(&self) -> &Arc<MemberTable> {
        &self.table
    }

    /// Host value of a member: property value, or bound method for functions
    pub(crate) fn get_host(&self, name: &str) -> BridgeResult<HostValue> {
        if let Some(property) = self.table.property(name) {
            return property.get(&*self.object);
        }
        if self.table.contains(name) {
            let method = self.method_value(name, || {
                let bound: ScriptFunction = Arc::new(BoundMethod {
                    receiver: self.object.clone(),
                    table: self.table.clone(),
                    name: name.to_string(),
                });
                bound
            });
            return Ok(HostValue::Function(method));
        }
        Ok(HostValue::Undefined)
    }

    /// Function value read through `name`; repeated reads yield the same function
    pub(crate) fn method_value(&self, name: &str, make: impl FnOnce() -> ScriptFunction) -> ScriptFunction {
        if let Some(function) = self.methods.borrow().get(name) {
            return function.clone();
        }
        let function = make();
        self.methods.borrow_mut().insert(name.to_string(), function.clone());
        function
    }

    pub(crate) fn call_host(&self, name: &str, args: &[HostValue]) -> BridgeResult<HostValue> {
        if self.table.functions(name).is_empty() {
            if let Some(property) = self.table.property(name) {
                if let HostValue::Function(f) = property.get(&*self.object)? {
                    return f.call(args).map_err(|source| BridgeError::InvocationFailed {
                        member: name.to_string(),
                        source,
                    });
                }
            }
        }
        self.table.invoke(&*self.object, name, args)
    }
}

impl ScriptObject for ReflectiveObject {
    fn class_name(&self) -> &str {
        self.object.host_class().simple_name()
    }

    fn get(&self, name: &str, scope: &WrapScope) -> BridgeResult<ScriptValue> {
        Ok(scope.wrap(&self.get_host(name)?))
    }

    fn put(&self, name: &str, value: &ScriptValue, scope: &WrapScope) -> BridgeResult<()> {
        self.table.set(&*self.object, name, scope.unwrap(value))
    }

    fn has(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    fn ids(&self) -> Vec<String> {
        self.table.names().to_vec()
    }

    fn call(&self, name: &str, args: &[ScriptValue], scope: &WrapScope) -> BridgeResult<ScriptValue> {
        let result = self.call_host(name, &scope.unwrap_all(args))?;
        Ok(scope.wrap(&result))
    }

    fn unwrap(&self) -> HostRef {
        self.object.clone()
    }
}

impl fmt::Debug for ReflectiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectiveObject")
            .field("class", &self.table.class_name())
            .finish()
    }
}

/// Host function group read as a value, bound to its receiver
pub struct BoundMethod {
    receiver: HostRef,
    table: Arc<MemberTable>,
    name: String,
}

impl BoundMethod {
    /// Resolve the overload set for `args` and call the winner, keeping the bridge error
    pub fn invoke(&self, args: &[HostValue]) -> BridgeResult<HostValue> {
        self.table.invoke(&*self.receiver, &self.name, args)
    }
}

impl Callable for BoundMethod {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn call(&self, args: &[HostValue]) -> HostResult<HostValue> {
        self.invoke(args).map_err(HostError::from)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}
