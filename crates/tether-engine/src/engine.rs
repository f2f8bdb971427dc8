//! Script engine facade
//!
//! Every call enters the runtime, opens a fresh [`WrapScope`], wraps the
//! global object (if any) and the arguments, runs, unwraps the result and
//! exits again, also when the call fails.

use std::fmt;
use std::sync::Arc;

use tether_sdk::HostValue;

use crate::context::BridgeContext;
use crate::error::{ScriptError, ScriptErrorKind};
use crate::inspector::InspectorNode;
use crate::runtime::{ExecutionGuard, ScriptRuntime, INLINE_SOURCE};
use crate::wrap::{ScriptValue, WrapScope};

/// Engine over a script runtime and a bridge context
pub struct ScriptEngine<R: ScriptRuntime> {
    runtime: R,
    context: Arc<BridgeContext>,
    global: Option<HostValue>,
}

impl<R: ScriptRuntime> ScriptEngine<R> {
    /// Create an engine and install the context's pipeline into `runtime`
    pub fn new(mut runtime: R, context: Arc<BridgeContext>) -> Self {
        runtime.install_wrap_hook(context.pipeline().clone());
        Self {
            runtime,
            context,
            global: None,
        }
    }

    /// Expose `global` as the global object of every execution.
    ///
    /// Fails with `AccessDenied` when the class of the global object is not granted.
    pub fn with_global(mut self, global: HostValue) -> Result<Self, ScriptError> {
        if let Some(object) = global.as_object() {
            self.context.resolver().policy().check(object.host_class().name())?;
        }
        self.global = Some(global);
        Ok(self)
    }

    /// Bridge context
    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.context
    }

    /// Underlying runtime
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Global object, if set
    pub fn global(&self) -> Option<&HostValue> {
        self.global.as_ref()
    }

    /// Evaluate inline source
    pub fn eval(&self, source: &str) -> Result<HostValue, ScriptError> {
        self.eval_named(source, INLINE_SOURCE)
    }

    /// Evaluate source, reporting positions against `source_name`
    pub fn eval_named(&self, source: &str, source_name: &str) -> Result<HostValue, ScriptError> {
        let _guard = ExecutionGuard::enter(&self.runtime);
        tracing::debug!(target: "tether::engine", source = source_name, "evaluating script");
        let script = self.compile_in(source, source_name)?;
        self.execute_in(&script, source_name)
    }

    /// Compile inline source for repeated evaluation
    pub fn compile(&self, source: &str) -> Result<CompiledScript<'_, R>, ScriptError> {
        self.compile_named(source, INLINE_SOURCE)
    }

    /// Compile source for repeated evaluation
    pub fn compile_named(&self, source: &str, source_name: &str) -> Result<CompiledScript<'_, R>, ScriptError> {
        let _guard = ExecutionGuard::enter(&self.runtime);
        let script = self.compile_in(source, source_name)?;
        Ok(CompiledScript {
            engine: self,
            script,
            source_name: source_name.to_string(),
        })
    }

    /// Call the global function `name`
    pub fn invoke_function(&self, name: &str, args: &[HostValue]) -> Result<HostValue, ScriptError> {
        let _guard = ExecutionGuard::enter(&self.runtime);
        tracing::debug!(target: "tether::engine", function = name, "invoking function");
        let scope = self.context.new_scope();
        let global = self.global.as_ref().map(|g| scope.wrap(g));

        let callee = match self.runtime.global(name, &scope) {
            Some(value) => value,
            None => match &global {
                Some(ScriptValue::Object(object)) => object.get(name, &scope)?,
                _ => ScriptValue::Undefined,
            },
        };
        let callee = require_function(callee, name)?;
        self.call_in(&callee, global.as_ref(), args, &scope)
    }

    /// Call method `name` of `this`; an empty name calls `this` itself
    pub fn invoke_method(&self, this: &HostValue, name: &str, args: &[HostValue]) -> Result<HostValue, ScriptError> {
        let _guard = ExecutionGuard::enter(&self.runtime);
        tracing::debug!(target: "tether::engine", method = name, "invoking method");
        let scope = self.context.new_scope();
        let this = scope.wrap(this);

        let callee = match (&this, name.is_empty()) {
            (ScriptValue::Function(_), true) => this.clone(),
            (ScriptValue::Object(object), false) => object.get(name, &scope)?,
            _ => ScriptValue::Undefined,
        };
        let callee = require_function(callee, name)?;
        self.call_in(&callee, Some(&this), args, &scope)
    }

    /// Inspection root over `value`
    pub fn inspect(&self, value: HostValue) -> InspectorNode {
        self.context.inspect(value)
    }

    fn compile_in(&self, source: &str, source_name: &str) -> Result<R::Script, ScriptError> {
        self.runtime
            .compile(source, source_name)
            .map_err(|fault| ScriptError::from_fault(fault, ScriptErrorKind::Compile, source_name))
    }

    fn execute_in(&self, script: &R::Script, source_name: &str) -> Result<HostValue, ScriptError> {
        let scope = self.context.new_scope();
        let global = self.global.as_ref().map(|g| scope.wrap(g));
        let result = self
            .runtime
            .execute(script, global.as_ref(), &scope)
            .map_err(|fault| ScriptError::from_fault(fault, ScriptErrorKind::Runtime, source_name))?;
        Ok(scope.unwrap(&result))
    }

    fn call_in(
        &self,
        callee: &ScriptValue,
        this: Option<&ScriptValue>,
        args: &[HostValue],
        scope: &WrapScope,
    ) -> Result<HostValue, ScriptError> {
        let args = scope.wrap_all(args);
        let result = self
            .runtime
            .call(callee, this, &args, scope)
            .map_err(|fault| ScriptError::from_fault(fault, ScriptErrorKind::Runtime, ""))?;
        Ok(scope.unwrap(&result))
    }
}

fn require_function(value: ScriptValue, name: &str) -> Result<ScriptValue, ScriptError> {
    match value {
        ScriptValue::Function(_) => Ok(value),
        _ => Err(ScriptError::new(
            ScriptErrorKind::NoSuchMethod,
            format!("function '{}' not found", name),
        )),
    }
}

impl<R: ScriptRuntime> fmt::Debug for ScriptEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("context", &self.context)
            .field("global", &self.global)
            .finish()
    }
}

/// Script compiled by a [`ScriptEngine`]
pub struct CompiledScript<'e, R: ScriptRuntime> {
    engine: &'e ScriptEngine<R>,
    script: R::Script,
    source_name: String,
}

impl<'e, R: ScriptRuntime> CompiledScript<'e, R> {
    /// Run the script in a fresh scope
    pub fn eval(&self) -> Result<HostValue, ScriptError> {
        let _guard = ExecutionGuard::enter(&self.engine.runtime);
        tracing::debug!(target: "tether::engine", source = %self.source_name, "evaluating compiled script");
        self.engine.execute_in(&self.script, &self.source_name)
    }

    /// Source name the script was compiled with
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Engine that compiled the script
    pub fn engine(&self) -> &'e ScriptEngine<R> {
        self.engine
    }
}
