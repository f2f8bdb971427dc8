//! Resolved members

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tether_sdk::{Getter, HostError, HostObject, HostValue, Invoker, Setter, Upcast, ValueType};

use super::overload;
use crate::error::{BridgeError, BridgeResult};

/// Chain of projections from the concrete receiver to the declaring class
#[derive(Clone, Default)]
pub(crate) struct ReceiverPath {
    steps: Vec<Arc<dyn Upcast>>,
}

impl ReceiverPath {
    pub(crate) fn then(&self, step: Arc<dyn Upcast>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    fn project<'a>(&self, receiver: &'a dyn Any) -> Option<&'a dyn Any> {
        self.steps.iter().try_fold(receiver, |current, step| step.upcast(current))
    }
}

/// Kind-specific part of a [`Member`]
#[derive(Clone)]
pub enum MemberKind {
    /// Direct attribute
    Field {
        /// Declared type
        ty: ValueType,
        /// Read handle
        get: Getter,
        /// Write handle, absent for read-only fields
        set: Option<Setter>,
    },
    /// Getter/setter pair collapsed into one property
    Accessor {
        /// Declared type
        ty: ValueType,
        /// Read handle
        get: Option<Getter>,
        /// Write handle
        set: Option<Setter>,
    },
    /// One invocable signature
    Function {
        /// Parameter types
        params: Vec<ValueType>,
        /// Return type
        ret: ValueType,
        /// Call handle
        invoke: Invoker,
    },
}

/// A resolved accessor on a host type
#[derive(Clone)]
pub struct Member {
    name: String,
    declaring: String,
    depth: usize,
    path: ReceiverPath,
    kind: MemberKind,
}

impl Member {
    pub(crate) fn new(name: &str, declaring: &str, depth: usize, path: ReceiverPath, kind: MemberKind) -> Self {
        Self {
            name: name.to_string(),
            declaring: declaring.to_string(),
            depth,
            path,
            kind,
        }
    }

    /// Exposed name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified name of the declaring class
    pub fn declaring_class(&self) -> &str {
        &self.declaring
    }

    /// Inheritance distance from the resolved class (0 = declared on it)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Kind and handles
    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut MemberKind {
        &mut self.kind
    }

    /// Whether this is a field or accessor
    pub fn is_property(&self) -> bool {
        !self.is_function()
    }

    /// Whether this is a function signature
    pub fn is_function(&self) -> bool {
        matches!(self.kind, MemberKind::Function { .. })
    }

    /// Whether the property can be read
    pub fn is_readable(&self) -> bool {
        match &self.kind {
            MemberKind::Field { .. } => true,
            MemberKind::Accessor { get, .. } => get.is_some(),
            MemberKind::Function { .. } => false,
        }
    }

    /// Whether the property can be assigned
    pub fn is_writable(&self) -> bool {
        match &self.kind {
            MemberKind::Field { set, .. } | MemberKind::Accessor { set, .. } => set.is_some(),
            MemberKind::Function { .. } => false,
        }
    }

    /// Declared value type (return type for functions)
    pub fn value_type(&self) -> ValueType {
        match &self.kind {
            MemberKind::Field { ty, .. } | MemberKind::Accessor { ty, .. } => *ty,
            MemberKind::Function { ret, .. } => *ret,
        }
    }

    /// Parameter types of a function
    pub fn params(&self) -> Option<&[ValueType]> {
        match &self.kind {
            MemberKind::Function { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Display signature, e.g. `f(String, Number)`
    pub fn signature(&self) -> String {
        match self.params() {
            Some(params) => {
                let params: Vec<&str> = params.iter().map(ValueType::name).collect();
                format!("{}({})", self.name, params.join(", "))
            }
            None => self.name.clone(),
        }
    }

    fn receiver<'a>(&self, object: &'a dyn HostObject) -> Result<&'a dyn Any, HostError> {
        self.path
            .project(object.as_any())
            .ok_or_else(|| HostError::mismatch(self.declaring.as_str(), object.host_class().name()))
    }

    /// Read the property from `object`
    pub fn get(&self, object: &dyn HostObject) -> BridgeResult<HostValue> {
        let getter = match &self.kind {
            MemberKind::Field { get, .. } => Some(get),
            MemberKind::Accessor { get, .. } => get.as_ref(),
            MemberKind::Function { .. } => None,
        };
        let result = match getter {
            Some(get) => self.receiver(object).and_then(|recv| get(recv)),
            None => Err(HostError::failed(format!("{} is not readable", self.name))),
        };
        result.map_err(|source| BridgeError::MemberRetrievalFailed {
            member: self.name.clone(),
            source,
        })
    }

    /// Assign the property on `object`
    pub fn set(&self, object: &dyn HostObject, value: HostValue) -> BridgeResult<()> {
        let setter = match &self.kind {
            MemberKind::Field { set, ty, .. } | MemberKind::Accessor { set, ty, .. } => {
                set.as_ref().map(|s| (s, *ty))
            }
            MemberKind::Function { .. } => None,
        };
        let Some((set, ty)) = setter else {
            return Err(BridgeError::ReadOnly {
                class: object.host_class().simple_name().to_string(),
                member: self.name.clone(),
            });
        };
        if overload::rank(&value, ty).is_none() {
            return Err(BridgeError::InvocationFailed {
                member: self.name.clone(),
                source: HostError::mismatch(ty.name(), value.type_name()),
            });
        }
        let value = overload::coerce(&value, ty);
        self.receiver(object)
            .and_then(|recv| set(recv, value))
            .map_err(|source| BridgeError::InvocationFailed {
                member: self.name.clone(),
                source,
            })
    }

    /// Call the function on `object` with already selected and coerced arguments
    pub fn invoke(&self, object: &dyn HostObject, args: &[HostValue]) -> BridgeResult<HostValue> {
        let MemberKind::Function { invoke, params, .. } = &self.kind else {
            return Err(BridgeError::NotCallable {
                class: object.host_class().simple_name().to_string(),
                member: self.name.clone(),
            });
        };
        let args: Vec<HostValue> = args
            .iter()
            .zip(params)
            .map(|(arg, ty)| overload::coerce(arg, *ty))
            .collect();
        self.receiver(object)
            .and_then(|recv| invoke(recv, &args))
            .map_err(|source| BridgeError::InvocationFailed {
                member: self.signature(),
                source,
            })
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            MemberKind::Field { .. } => "Field",
            MemberKind::Accessor { .. } => "Accessor",
            MemberKind::Function { .. } => "Function",
        };
        f.debug_struct("Member")
            .field("kind", &kind)
            .field("signature", &self.signature())
            .field("declaring", &self.declaring)
            .finish()
    }
}
