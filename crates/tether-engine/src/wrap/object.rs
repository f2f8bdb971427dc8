//! Script object contract

use tether_sdk::HostRef;

use super::scope::WrapScope;
use super::value::ScriptValue;
use crate::error::BridgeResult;

/// A wrapped host value as seen by a script runtime.
///
/// Values flowing out of the object are wrapped through `scope`, values
/// flowing in are unwrapped through it.
pub trait ScriptObject {
    /// Simple class name of the wrapped host object
    fn class_name(&self) -> &str;

    /// Read a property; unknown names yield `Undefined`
    fn get(&self, name: &str, scope: &WrapScope) -> BridgeResult<ScriptValue>;

    /// Assign a property
    fn put(&self, name: &str, value: &ScriptValue, scope: &WrapScope) -> BridgeResult<()>;

    /// Whether `name` is exposed
    fn has(&self, name: &str) -> bool;

    /// Exposed names in enumeration order
    fn ids(&self) -> Vec<String>;

    /// Call the function `name`
    fn call(&self, name: &str, args: &[ScriptValue], scope: &WrapScope) -> BridgeResult<ScriptValue>;

    /// The wrapped host object
    fn unwrap(&self) -> HostRef;
}
