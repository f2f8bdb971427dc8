//! HostValue: the dynamic value model of the host side
//!
//! Every value that crosses the bridge is a `HostValue`. Primitives are stored
//! inline, host objects are shared through `Arc<dyn HostObject>` and script
//! callbacks through `Arc<dyn Callable>`.
//!
//! Object identity is `Arc` pointer identity: two `HostValue::Object` handles
//! are the same object exactly when they point at the same allocation.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::access::{KeyedAccess, SequenceAccess};
use crate::class::HostClass;
use crate::function::ScriptFunction;

/// Shared handle to a host object
pub type HostRef = Arc<dyn HostObject>;

/// A host type whose instances can be exposed to script code.
///
/// Implementors publish a static [`HostClass`] descriptor (usually kept in a
/// `once_cell::sync::Lazy`) listing the members scripts may see.
///
/// ```ignore
/// static POINT: Lazy<HostClass> = Lazy::new(|| {
///     HostClass::builder::<Point>("geo.Point")
///         .field("x", ValueType::Float, |p| Ok(p.x.into()))
///         .build()
/// });
///
/// impl HostObject for Point {
///     fn host_class(&self) -> &'static HostClass { &POINT }
///     fn as_any(&self) -> &dyn Any { self }
/// }
/// ```
pub trait HostObject: Any + Send + Sync {
    /// Class descriptor of the concrete runtime type
    fn host_class(&self) -> &'static HostClass;

    /// Upcast used by member handles to reach the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Dynamic keyed enumeration (map-like hosts)
    fn as_keyed(&self) -> Option<&dyn KeyedAccess> {
        None
    }

    /// Indexed access (list-like hosts)
    fn as_sequence(&self) -> Option<&dyn SequenceAccess> {
        None
    }

    /// Text shown by tooling for this object
    fn display(&self) -> String {
        self.host_class().simple_name().to_string()
    }
}

/// Dynamic host value
#[derive(Clone, Default)]
pub enum HostValue {
    /// The script runtime's "undefined" sentinel
    #[default]
    Undefined,
    /// Null reference
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Host object handle
    Object(HostRef),
    /// Callable value (script callback or bound host method)
    Function(ScriptFunction),
}

impl HostValue {
    /// Wrap a host object into a shared handle
    pub fn object<T: HostObject>(object: T) -> Self {
        HostValue::Object(Arc::new(object))
    }

    /// Check for the undefined sentinel
    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HostValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(f) => Some(*f),
            HostValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the object handle
    pub fn as_object(&self) -> Option<&HostRef> {
        match self {
            HostValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get the function handle
    pub fn as_function(&self) -> Option<&ScriptFunction> {
        match self {
            HostValue::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Borrow the concrete host type behind an object value
    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        self.as_object()?.as_any().downcast_ref::<T>()
    }

    /// Runtime type name: class simple name for objects, primitive name otherwise
    pub fn type_name(&self) -> &str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "Bool",
            HostValue::Int(_) => "Int",
            HostValue::Float(_) => "Float",
            HostValue::Str(_) => "String",
            HostValue::Object(o) => o.host_class().simple_name(),
            HostValue::Function(_) => "Function",
        }
    }

    /// Identity for objects and functions, value equality for primitives
    pub fn same(&self, other: &HostValue) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) => true,
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Int(a), HostValue::Int(b)) => a == b,
            (HostValue::Float(a), HostValue::Float(b)) => a == b,
            (HostValue::Int(a), HostValue::Float(b)) | (HostValue::Float(b), HostValue::Int(a)) => {
                (*a as f64) == *b
            }
            (HostValue::Str(a), HostValue::Str(b)) => a == b,
            (HostValue::Object(a), HostValue::Object(b)) => object_id(a) == object_id(b),
            (HostValue::Function(a), HostValue::Function(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

/// Stable identity of a host object handle (its allocation address)
pub fn object_id(object: &HostRef) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "HostValue::Undefined"),
            HostValue::Null => write!(f, "HostValue::Null"),
            HostValue::Bool(b) => write!(f, "HostValue::Bool({})", b),
            HostValue::Int(i) => write!(f, "HostValue::Int({})", i),
            HostValue::Float(x) => write!(f, "HostValue::Float({})", x),
            HostValue::Str(s) => write!(f, "HostValue::Str({:?})", s),
            HostValue::Object(o) => write!(f, "HostValue::Object({})", o.host_class().name()),
            HostValue::Function(func) => {
                write!(f, "HostValue::Function({})", func.name().unwrap_or("<anonymous>"))
            }
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "undefined"),
            HostValue::Null => write!(f, "null"),
            HostValue::Bool(b) => write!(f, "{}", b),
            HostValue::Int(i) => write!(f, "{}", i),
            HostValue::Float(x) => write!(f, "{}", x),
            HostValue::Str(s) => write!(f, "{}", s),
            HostValue::Object(o) => write!(f, "{}", o.display()),
            HostValue::Function(func) => write!(f, "{}()", func.name().unwrap_or("f")),
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<i32> for HostValue {
    fn from(i: i32) -> Self {
        HostValue::Int(i as i64)
    }
}

impl From<i64> for HostValue {
    fn from(i: i64) -> Self {
        HostValue::Int(i)
    }
}

impl From<usize> for HostValue {
    fn from(i: usize) -> Self {
        HostValue::Int(i as i64)
    }
}

impl From<f64> for HostValue {
    fn from(f: f64) -> Self {
        HostValue::Float(f)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(Arc::from(s))
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(Arc::from(s))
    }
}

impl From<HostRef> for HostValue {
    fn from(o: HostRef) -> Self {
        HostValue::Object(o)
    }
}

impl From<ScriptFunction> for HostValue {
    fn from(f: ScriptFunction) -> Self {
        HostValue::Function(f)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(HostValue::Null)
    }
}

// ============================================================================
// Declared Types
// ============================================================================

/// Declared type of a field, accessor, parameter or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Accepts any value
    Any,
    /// Boolean primitive
    Bool,
    /// Integer primitive (non-nullable)
    Int,
    /// Float primitive (non-nullable)
    Float,
    /// Boxed number (nullable, accepts Int and Float)
    Number,
    /// String (nullable)
    Str,
    /// Host object, optionally of a fully-qualified class
    Object(Option<&'static str>),
    /// Callable value (nullable)
    Function,
    /// No value (function return only)
    Void,
}

impl ValueType {
    /// Name shown to tooling
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Any => "Any",
            ValueType::Bool => "Bool",
            ValueType::Int => "Int",
            ValueType::Float => "Float",
            ValueType::Number => "Number",
            ValueType::Str => "String",
            ValueType::Object(Some(class)) => class.rsplit('.').next().unwrap_or(class),
            ValueType::Object(None) => "Object",
            ValueType::Function => "Function",
            ValueType::Void => "Void",
        }
    }

    /// Whether null is an acceptable value of this type
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            ValueType::Any
                | ValueType::Number
                | ValueType::Str
                | ValueType::Object(_)
                | ValueType::Function
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
