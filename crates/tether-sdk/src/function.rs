//! Callable values shared between host and script code

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::HostResult;
use crate::value::HostValue;

/// Shared handle to a callable value
pub type ScriptFunction = Arc<dyn Callable>;

/// A value that can be invoked with positional arguments.
///
/// Script runtimes implement this for script-defined functions handed to host
/// code (callbacks); the engine implements it for host methods read as values.
pub trait Callable: Send + Sync {
    /// Function name, if it has one
    fn name(&self) -> Option<&str>;

    /// Invoke with positional arguments
    fn call(&self, args: &[HostValue]) -> HostResult<HostValue>;

    /// Concrete callable, for runtimes that special-case known implementations
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// Closure-backed callable
pub struct NativeFunction {
    name: Option<String>,
    body: Box<dyn Fn(&[HostValue]) -> HostResult<HostValue> + Send + Sync>,
}

impl NativeFunction {
    /// Create a named function
    pub fn named<F>(name: impl Into<String>, body: F) -> ScriptFunction
    where
        F: Fn(&[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        Arc::new(NativeFunction {
            name: Some(name.into()),
            body: Box::new(body),
        })
    }

    /// Create an anonymous function
    pub fn anonymous<F>(body: F) -> ScriptFunction
    where
        F: Fn(&[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        Arc::new(NativeFunction {
            name: None,
            body: Box::new(body),
        })
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn call(&self, args: &[HostValue]) -> HostResult<HostValue> {
        (self.body)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}
