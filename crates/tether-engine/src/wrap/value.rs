//! Script-visible values

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tether_sdk::{HostValue, ScriptFunction};

use super::object::ScriptObject;

/// Shared handle to a wrapper object
pub type ScriptRef = Rc<dyn ScriptObject>;

/// Value as seen by script code
#[derive(Clone, Default)]
pub enum ScriptValue {
    /// The undefined sentinel
    #[default]
    Undefined,
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating-point number
    Number(f64),
    /// String
    Str(Arc<str>),
    /// Callable
    Function(ScriptFunction),
    /// Wrapped host object
    Object(ScriptRef),
}

impl ScriptValue {
    /// Convert a non-object host value; objects need a scope and yield `None`
    pub(crate) fn from_primitive(value: &HostValue) -> Option<ScriptValue> {
        Some(match value {
            HostValue::Undefined => ScriptValue::Undefined,
            HostValue::Null => ScriptValue::Null,
            HostValue::Bool(b) => ScriptValue::Bool(*b),
            HostValue::Int(i) => ScriptValue::Int(*i),
            HostValue::Float(f) => ScriptValue::Number(*f),
            HostValue::Str(s) => ScriptValue::Str(s.clone()),
            HostValue::Function(f) => ScriptValue::Function(f.clone()),
            HostValue::Object(_) => return None,
        })
    }

    /// Check for the undefined sentinel
    pub fn is_undefined(&self) -> bool {
        matches!(self, ScriptValue::Undefined)
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, ScriptValue::Null)
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as number, widening integers
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) => Some(*n),
            ScriptValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the callable
    pub fn as_function(&self) -> Option<&ScriptFunction> {
        match self {
            ScriptValue::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get the wrapper object
    pub fn as_object(&self) -> Option<&ScriptRef> {
        match self {
            ScriptValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Script-level type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Undefined => "undefined",
            ScriptValue::Null => "null",
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Int(_) | ScriptValue::Number(_) => "number",
            ScriptValue::Str(_) => "string",
            ScriptValue::Function(_) => "function",
            ScriptValue::Object(_) => "object",
        }
    }

    /// Wrapper identity for objects and functions, value equality otherwise
    pub fn same(&self, other: &ScriptValue) -> bool {
        match (self, other) {
            (ScriptValue::Undefined, ScriptValue::Undefined) => true,
            (ScriptValue::Null, ScriptValue::Null) => true,
            (ScriptValue::Bool(a), ScriptValue::Bool(b)) => a == b,
            (ScriptValue::Int(a), ScriptValue::Int(b)) => a == b,
            (ScriptValue::Number(a), ScriptValue::Number(b)) => a == b,
            (ScriptValue::Int(a), ScriptValue::Number(b)) | (ScriptValue::Number(b), ScriptValue::Int(a)) => {
                (*a as f64) == *b
            }
            (ScriptValue::Str(a), ScriptValue::Str(b)) => a == b,
            (ScriptValue::Function(a), ScriptValue::Function(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (ScriptValue::Object(a), ScriptValue::Object(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Undefined => write!(f, "ScriptValue::Undefined"),
            ScriptValue::Null => write!(f, "ScriptValue::Null"),
            ScriptValue::Bool(b) => write!(f, "ScriptValue::Bool({})", b),
            ScriptValue::Int(i) => write!(f, "ScriptValue::Int({})", i),
            ScriptValue::Number(n) => write!(f, "ScriptValue::Number({})", n),
            ScriptValue::Str(s) => write!(f, "ScriptValue::Str({:?})", s),
            ScriptValue::Function(func) => {
                write!(f, "ScriptValue::Function({})", func.name().unwrap_or("<anonymous>"))
            }
            ScriptValue::Object(o) => write!(f, "ScriptValue::Object({})", o.class_name()),
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Undefined => write!(f, "undefined"),
            ScriptValue::Null => write!(f, "null"),
            ScriptValue::Bool(b) => write!(f, "{}", b),
            ScriptValue::Int(i) => write!(f, "{}", i),
            ScriptValue::Number(n) => write!(f, "{}", n),
            ScriptValue::Str(s) => write!(f, "{}", s),
            ScriptValue::Function(func) => write!(f, "{}()", func.name().unwrap_or("f")),
            ScriptValue::Object(o) => write!(f, "{}", o.unwrap().display()),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Bool(b)
    }
}

impl From<i64> for ScriptValue {
    fn from(i: i64) -> Self {
        ScriptValue::Int(i)
    }
}

impl From<i32> for ScriptValue {
    fn from(i: i32) -> Self {
        ScriptValue::Int(i as i64)
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::Str(Arc::from(s))
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::Str(Arc::from(s))
    }
}

impl From<ScriptFunction> for ScriptValue {
    fn from(f: ScriptFunction) -> Self {
        ScriptValue::Function(f)
    }
}
