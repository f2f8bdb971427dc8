//! Class descriptors for host types
//!
//! A [`HostClass`] is the explicit, build-once description of what a host
//! type exposes: the exposed name of every field, getter, setter and function,
//! its declared type, a type-erased access handle, and the capability it
//! requires. Descriptors are built with the typed [`ClassBuilder`], which
//! wraps each closure into a handle that downcasts the receiver to the
//! concrete type.
//!
//! Inheritance is modeled by composition: a class may name a parent class and
//! a projection from the child struct to the embedded parent struct. The
//! resolver walks this chain and reaches parent members through the
//! projection, keeping the parent as their declaring type.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::capability::Capability;
use crate::error::{HostError, HostResult};
use crate::value::{HostValue, ValueType};

/// Type-erased field/getter handle
pub type Getter = Arc<dyn Fn(&dyn Any) -> HostResult<HostValue> + Send + Sync>;

/// Type-erased field/setter handle
pub type Setter = Arc<dyn Fn(&dyn Any, HostValue) -> HostResult<()> + Send + Sync>;

/// Type-erased function handle
pub type Invoker = Arc<dyn Fn(&dyn Any, &[HostValue]) -> HostResult<HostValue> + Send + Sync>;

/// Projection from a receiver to its embedded parent
pub trait Upcast: Send + Sync {
    /// Project `receiver` to the parent value, `None` if it is not the child type
    fn upcast<'a>(&self, receiver: &'a dyn Any) -> Option<&'a dyn Any>;
}

struct Projection<T, P> {
    project: fn(&T) -> &P,
}

impl<T: 'static, P: 'static> Upcast for Projection<T, P> {
    fn upcast<'a>(&self, receiver: &'a dyn Any) -> Option<&'a dyn Any> {
        let child = receiver.downcast_ref::<T>()?;
        Some((self.project)(child) as &dyn Any)
    }
}

/// Link from a class to its parent class
#[derive(Clone)]
pub struct ParentLink {
    class: &'static HostClass,
    upcast: Arc<dyn Upcast>,
}

impl ParentLink {
    /// Parent class descriptor
    pub fn class(&self) -> &'static HostClass {
        self.class
    }

    /// Projection from a child receiver to the parent receiver
    pub fn upcast(&self) -> &Arc<dyn Upcast> {
        &self.upcast
    }
}

/// Kind and handles of a declared member
#[derive(Clone)]
pub enum DeclKind {
    /// Direct attribute, optionally assignable
    Field {
        /// Declared value type
        ty: ValueType,
        /// Read handle
        get: Getter,
        /// Write handle
        set: Option<Setter>,
    },
    /// Read half of an accessor pair
    Getter {
        /// Declared value type
        ty: ValueType,
        /// Read handle
        get: Getter,
    },
    /// Write half of an accessor pair
    Setter {
        /// Declared value type
        ty: ValueType,
        /// Write handle
        set: Setter,
    },
    /// One invocable signature
    Function {
        /// Declared parameter types
        params: Vec<ValueType>,
        /// Declared return type
        ret: ValueType,
        /// Call handle
        invoke: Invoker,
    },
}

/// A member declared directly on a class
#[derive(Clone)]
pub struct MemberDecl {
    name: String,
    kind: DeclKind,
}

impl MemberDecl {
    /// Exposed name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind and handles
    pub fn kind(&self) -> &DeclKind {
        &self.kind
    }

    /// Capability needed to expose this member at all
    pub fn required(&self) -> Capability {
        match self.kind {
            DeclKind::Field { .. } | DeclKind::Getter { .. } => Capability::READ,
            DeclKind::Setter { .. } => Capability::WRITE,
            DeclKind::Function { .. } => Capability::INVOKE,
        }
    }
}

impl fmt::Debug for MemberDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            DeclKind::Field { set: Some(_), .. } => "field(rw)",
            DeclKind::Field { set: None, .. } => "field",
            DeclKind::Getter { .. } => "getter",
            DeclKind::Setter { .. } => "setter",
            DeclKind::Function { .. } => "function",
        };
        write!(f, "{} {}", kind, self.name)
    }
}

/// Descriptor of a host type
pub struct HostClass {
    name: String,
    type_id: TypeId,
    parent: Option<ParentLink>,
    members: Vec<MemberDecl>,
}

impl HostClass {
    /// Start describing host type `T` under a fully-qualified name
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> ClassBuilder<T> {
        ClassBuilder::new(name)
    }

    /// Fully-qualified name, e.g. `demo.model.Person`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last segment of the fully-qualified name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Identity of the concrete Rust type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Parent link, if any
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Members declared directly on this class, in declaration order
    pub fn members(&self) -> &[MemberDecl] {
        &self.members
    }

    /// Whether this class or one of its ancestors has the given name
    pub fn is_subclass_of(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.name == name {
                return true;
            }
            current = class.parent.as_ref().map(|p| p.class);
        }
        false
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.class.name()))
            .field("members", &self.members)
            .finish()
    }
}

fn receiver<'a, T: 'static>(class: &str, value: &'a dyn Any) -> HostResult<&'a T> {
    value
        .downcast_ref::<T>()
        .ok_or_else(|| HostError::mismatch(class, "foreign receiver"))
}

/// Typed builder for [`HostClass`]
pub struct ClassBuilder<T> {
    name: String,
    parent: Option<ParentLink>,
    members: Vec<MemberDecl>,
    _marker: std::marker::PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            members: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    fn push(mut self, name: &str, kind: DeclKind) -> Self {
        self.members.push(MemberDecl {
            name: name.to_string(),
            kind,
        });
        self
    }

    fn getter_handle<G>(&self, get: G) -> Getter
    where
        G: Fn(&T) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        Arc::new(move |recv: &dyn Any| get(receiver::<T>(&class, recv)?))
    }

    fn setter_handle<S>(&self, set: S) -> Setter
    where
        S: Fn(&T, HostValue) -> HostResult<()> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        Arc::new(move |recv: &dyn Any, value: HostValue| set(receiver::<T>(&class, recv)?, value))
    }

    /// Inherit the members of `parent`, reached through `project`
    pub fn extends<P: Any>(mut self, parent: &'static HostClass, project: fn(&T) -> &P) -> Self {
        self.parent = Some(ParentLink {
            class: parent,
            upcast: Arc::new(Projection { project }),
        });
        self
    }

    /// Read-only field
    pub fn field<G>(self, name: &str, ty: ValueType, get: G) -> Self
    where
        G: Fn(&T) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        let get = self.getter_handle(get);
        self.push(name, DeclKind::Field { ty, get, set: None })
    }

    /// Assignable field
    pub fn field_mut<G, S>(self, name: &str, ty: ValueType, get: G, set: S) -> Self
    where
        G: Fn(&T) -> HostResult<HostValue> + Send + Sync + 'static,
        S: Fn(&T, HostValue) -> HostResult<()> + Send + Sync + 'static,
    {
        let get = self.getter_handle(get);
        let set = Some(self.setter_handle(set));
        self.push(name, DeclKind::Field { ty, get, set })
    }

    /// Getter half of an accessor property
    pub fn getter<G>(self, name: &str, ty: ValueType, get: G) -> Self
    where
        G: Fn(&T) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        let get = self.getter_handle(get);
        self.push(name, DeclKind::Getter { ty, get })
    }

    /// Setter half of an accessor property
    pub fn setter<S>(self, name: &str, ty: ValueType, set: S) -> Self
    where
        S: Fn(&T, HostValue) -> HostResult<()> + Send + Sync + 'static,
    {
        let set = self.setter_handle(set);
        self.push(name, DeclKind::Setter { ty, set })
    }

    /// Function with one signature; declare several to form an overload set
    pub fn function<F>(self, name: &str, params: &[ValueType], ret: ValueType, body: F) -> Self
    where
        F: Fn(&T, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        let invoke: Invoker = Arc::new(move |recv: &dyn Any, args: &[HostValue]| {
            body(receiver::<T>(&class, recv)?, args)
        });
        self.push(
            name,
            DeclKind::Function {
                params: params.to_vec(),
                ret,
                invoke,
            },
        )
    }

    /// Finish the descriptor
    pub fn build(self) -> HostClass {
        HostClass {
            name: self.name,
            type_id: TypeId::of::<T>(),
            parent: self.parent,
            members: self.members,
        }
    }
}
