//! Tether SDK - host-side types for exposing Rust objects to script runtimes
//!
//! Host-type authors depend on this crate only. It provides the dynamic value
//! model ([`HostValue`]), the object trait ([`HostObject`]), explicit class
//! descriptors ([`HostClass`], built with [`ClassBuilder`]), and the optional
//! dynamic access traits used by collection wrapping and inspection.
//!
//! # Example
//!
//! ```ignore
//! use once_cell::sync::Lazy;
//! use tether_sdk::{HostClass, HostObject, ValueType};
//!
//! struct Person { name: String }
//!
//! static PERSON: Lazy<HostClass> = Lazy::new(|| {
//!     HostClass::builder::<Person>("demo.model.Person")
//!         .field("name", ValueType::Str, |p| Ok(p.name.as_str().into()))
//!         .function("greet", &[ValueType::Str], ValueType::Str, |p, args| {
//!             Ok(format!("{} greets {}", p.name, args[0]).into())
//!         })
//!         .build()
//! });
//!
//! impl HostObject for Person {
//!     fn host_class(&self) -> &'static HostClass { &PERSON }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod access;
pub mod capability;
pub mod class;
pub mod collections;
pub mod error;
pub mod function;
pub mod value;

pub use access::{Key, KeyedAccess, SequenceAccess};
pub use capability::Capability;
pub use class::{ClassBuilder, DeclKind, Getter, HostClass, Invoker, MemberDecl, ParentLink, Setter, Upcast};
pub use collections::{HostList, HostMap, LIST_CLASS_NAME, MAP_CLASS_NAME};
pub use error::{HostError, HostResult};
pub use function::{Callable, NativeFunction, ScriptFunction};
pub use value::{object_id, HostObject, HostRef, HostValue, ValueType};
