//! Member resolution
//!
//! The resolver turns a class descriptor into a [`MemberTable`]: the members
//! of the class and its ancestors that script code may see, grouped by
//! exposed name. Members declared on a type the shutter has not granted are
//! skipped, as are member parts whose capability the resolver was not built
//! with. A member redeclared by a subclass shadows the inherited one.
//!
//! Tables are computed once per concrete class and shared. Concurrent first
//! resolutions build outside the cache lock and the first published table
//! wins; every caller gets that one.

mod member;
pub mod overload;
mod table;

pub use member::{Member, MemberKind};
pub use table::MemberTable;

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tether_sdk::{Capability, DeclKind, Getter, HostClass, HostObject, MemberDecl, Setter};

use member::ReceiverPath;

use crate::shutter::ShutterPolicy;

/// Computes and caches member tables
pub struct MemberResolver {
    policy: ShutterPolicy,
    capabilities: Capability,
    cache: DashMap<TypeId, Arc<MemberTable>>,
}

impl MemberResolver {
    /// Create a resolver exposing `capabilities` on types granted by `policy`
    pub fn new(policy: ShutterPolicy, capabilities: Capability) -> Self {
        Self {
            policy,
            capabilities,
            cache: DashMap::new(),
        }
    }

    /// Create a resolver exposing every capability
    pub fn with_policy(policy: ShutterPolicy) -> Self {
        Self::new(policy, Capability::ALL)
    }

    /// Shutter consulted for every declaring type
    pub fn policy(&self) -> &ShutterPolicy {
        &self.policy
    }

    /// Capabilities this resolver exposes
    pub fn capabilities(&self) -> Capability {
        self.capabilities
    }

    /// Number of cached tables
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Member table of `class`, built on first use
    pub fn resolve(&self, class: &'static HostClass) -> Arc<MemberTable> {
        let key = class.type_id();
        if let Some(table) = self.cache.get(&key) {
            return table.clone();
        }

        let built = Arc::new(self.build(class));
        let published = self.cache.entry(key).or_insert_with(|| built.clone()).clone();
        if Arc::ptr_eq(&published, &built) {
            tracing::debug!(
                target: "tether::resolver",
                class = class.name(),
                members = published.len(),
                "member table published"
            );
        } else {
            tracing::trace!(target: "tether::resolver", class = class.name(), "member table already published");
        }
        published
    }

    /// Member table of the concrete runtime class of `object`
    pub fn resolve_object(&self, object: &dyn HostObject) -> Arc<MemberTable> {
        self.resolve(object.host_class())
    }

    fn build(&self, class: &'static HostClass) -> MemberTable {
        let mut table = MemberTable::new(class.name(), class.type_id());
        let mut path = ReceiverPath::default();
        let mut current = Some(class);
        let mut depth = 0;

        while let Some(declaring) = current {
            if self.policy.visible(declaring.name()) {
                for decl in declaring.members() {
                    self.collect(&mut table, declaring, decl, depth, &path);
                }
            } else {
                tracing::trace!(target: "tether::resolver", class = declaring.name(), "not granted, members skipped");
            }
            current = match declaring.parent() {
                Some(link) => {
                    path = path.then(Arc::clone(link.upcast()));
                    Some(link.class())
                }
                None => None,
            };
            depth += 1;
        }

        for name in table.names() {
            let group = table.group(name).unwrap_or_default();
            if group.iter().any(Member::is_property) && group.iter().any(Member::is_function) {
                tracing::warn!(
                    target: "tether::resolver",
                    class = class.name(),
                    member = %name,
                    "property and function share a name; reads resolve to the property"
                );
            }
        }
        table
    }

    fn collect(&self, table: &mut MemberTable, declaring: &HostClass, decl: &MemberDecl, depth: usize, path: &ReceiverPath) {
        if !self.capabilities.contains(decl.required()) {
            tracing::trace!(
                target: "tether::resolver",
                class = declaring.name(),
                member = decl.name(),
                required = %decl.required(),
                "capability not exposed"
            );
            return;
        }
        let writable = self.capabilities.contains(Capability::WRITE);
        let name = decl.name();
        let group = table.group_mut(name);
        let member = |kind| Member::new(name, declaring.name(), depth, path.clone(), kind);

        match decl.kind() {
            DeclKind::Field { ty, get, set } => {
                if group.iter().any(Member::is_property) {
                    return;
                }
                group.push(member(MemberKind::Field {
                    ty: *ty,
                    get: get.clone(),
                    set: set.clone().filter(|_| writable),
                }));
            }
            DeclKind::Getter { ty, get } => {
                if !merge_accessor(group, depth, Some(get), None) {
                    group.push(member(MemberKind::Accessor {
                        ty: *ty,
                        get: Some(get.clone()),
                        set: None,
                    }));
                }
            }
            DeclKind::Setter { ty, set } => {
                if !merge_accessor(group, depth, None, Some(set)) {
                    group.push(member(MemberKind::Accessor {
                        ty: *ty,
                        get: None,
                        set: Some(set.clone()),
                    }));
                }
            }
            DeclKind::Function { params, ret, invoke } => {
                if group.iter().any(|m| m.params() == Some(params.as_slice())) {
                    return;
                }
                group.push(member(MemberKind::Function {
                    params: params.clone(),
                    ret: *ret,
                    invoke: invoke.clone(),
                }));
            }
        }
    }
}

/// Fold an accessor half into the existing property of `group`.
///
/// Returns `false` when the group has no property yet. A property from a
/// more-derived class shadows the half.
fn merge_accessor(
    group: &mut [Member],
    depth: usize,
    get: Option<&Getter>,
    set: Option<&Setter>,
) -> bool {
    let Some(existing) = group.iter_mut().find(|m| m.is_property()) else {
        return false;
    };
    if existing.depth() != depth {
        return true;
    }
    if let MemberKind::Accessor { get: g, set: s, .. } = existing.kind_mut() {
        if g.is_none() {
            *g = get.cloned();
        }
        if s.is_none() {
            *s = set.cloned();
        }
    }
    true
}

impl std::fmt::Debug for MemberResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberResolver")
            .field("policy", &self.policy)
            .field("capabilities", &self.capabilities)
            .field("cached", &self.cache.len())
            .finish()
    }
}
