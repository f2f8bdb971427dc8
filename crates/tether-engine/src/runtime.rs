//! Script runtime contract
//!
//! The bridge does not execute scripts itself. A runtime integration
//! implements [`ScriptRuntime`] and calls back into the [`WrapScope`] it is
//! handed whenever a host value crosses into script code.

use std::sync::Arc;

use crate::error::RuntimeFault;
use crate::wrap::{ScriptValue, WrapPipeline, WrapScope};

/// Source name used for scripts evaluated from a string
pub const INLINE_SOURCE: &str = "<inline script>";

/// Narrow interface the engine needs from an embedded script runtime
pub trait ScriptRuntime {
    /// Compiled form of a script
    type Script;

    /// Receive the pipeline the runtime must use to expose host values
    fn install_wrap_hook(&mut self, pipeline: Arc<WrapPipeline>);

    /// Enter a thread-scoped execution context
    fn enter(&self);

    /// Leave the execution context entered last
    fn exit(&self);

    /// Compile `source`, reporting positions against `source_name`
    fn compile(&self, source: &str, source_name: &str) -> Result<Self::Script, RuntimeFault>;

    /// Run a compiled script with an optional global object
    fn execute(
        &self,
        script: &Self::Script,
        global: Option<&ScriptValue>,
        scope: &WrapScope,
    ) -> Result<ScriptValue, RuntimeFault>;

    /// Look up a global binding left by previous executions
    fn global(&self, name: &str, scope: &WrapScope) -> Option<ScriptValue>;

    /// Call `callee` with `this` and positional arguments.
    ///
    /// Function values are best called through [`WrapScope::call_function`],
    /// which keeps bridge failures of host methods typed.
    fn call(
        &self,
        callee: &ScriptValue,
        this: Option<&ScriptValue>,
        args: &[ScriptValue],
        scope: &WrapScope,
    ) -> Result<ScriptValue, RuntimeFault>;
}

/// Keeps a runtime context entered; exits on drop
pub struct ExecutionGuard<'a, R: ScriptRuntime + ?Sized> {
    runtime: &'a R,
}

impl<'a, R: ScriptRuntime + ?Sized> ExecutionGuard<'a, R> {
    /// Enter `runtime`
    pub fn enter(runtime: &'a R) -> Self {
        runtime.enter();
        Self { runtime }
    }
}

impl<R: ScriptRuntime + ?Sized> Drop for ExecutionGuard<'_, R> {
    fn drop(&mut self) {
        self.runtime.exit();
    }
}
