//! Tether engine - host-object bridge for embedded script runtimes
//!
//! This crate decides which members of a host object script code may see,
//! converts host values into script-visible wrappers, and builds inspection
//! trees over live object graphs.
//!
//! # Components
//!
//! - [`ShutterPolicy`]: default-deny allow-list of types whose members may be exposed
//! - [`AdapterRegistry`]: exact-type substitutes applied before wrapping
//! - [`MemberResolver`]: cached, filtered member tables with overload resolution
//! - [`WrapPipeline`] / [`WrapScope`]: ordered wrap links and per-execution identity cache
//! - [`InspectorNode`]: lazily expanded inspection tree
//! - [`ScriptEngine`]: facade over a [`ScriptRuntime`] integration
//! - [`BridgeContext`]: owns the shared pieces; built directly or from [`BridgeConfig`]
//!
//! # Example
//!
//! ```ignore
//! let context = Arc::new(
//!     BridgeContext::builder()
//!         .grant("demo.model.Person")
//!         .build(),
//! );
//! let engine = ScriptEngine::new(runtime, context).with_global(HostValue::object(person))?;
//! let greeting = engine.invoke_function("greet", &["world".into()])?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod inspector;
pub mod resolver;
pub mod runtime;
pub mod shutter;
pub mod wrap;

pub use adapter::{Adapter, AdapterRegistry};
pub use config::{BridgeConfig, ConfigError};
pub use context::{BridgeContext, BridgeContextBuilder};
pub use engine::{CompiledScript, ScriptEngine};
pub use error::{BridgeError, BridgeResult, RuntimeFault, ScriptError, ScriptErrorKind};
pub use inspector::InspectorNode;
pub use resolver::{Member, MemberKind, MemberResolver, MemberTable};
pub use runtime::{ExecutionGuard, ScriptRuntime, INLINE_SOURCE};
pub use shutter::ShutterPolicy;
pub use wrap::{LinkOutcome, ScriptObject, ScriptRef, ScriptValue, WrapLink, WrapPipeline, WrapScope};

pub use tether_sdk;
