//! Object inspection tree
//!
//! A lazily expanded tree over a host object graph for debuggers and
//! consoles. Each node captures a name, a declared type, the value read at
//! construction time and the failure raised while reading it, if any.
//! Children are one node per readable single-member property of the value,
//! plus one `[key]` node per entry of keyed hosts, sorted by name.
//!
//! A new root materializes `depth` levels (two by default: the root's
//! children and theirs). [`InspectorNode::visit`] materializes one more level
//! below the node's children. Nodes are snapshots: they never re-read values
//! unless [`InspectorNode::set_value`] is called.

use std::fmt;
use std::sync::Arc;

use tether_sdk::{HostValue, ValueType};

use crate::error::BridgeError;
use crate::resolver::MemberResolver;

/// Default number of levels built eagerly below a root
pub const DEFAULT_DEPTH: usize = 2;

const ROOT_NAME: &str = "(root)";

/// One node of the inspection tree
pub struct InspectorNode {
    resolver: Arc<MemberResolver>,
    name: String,
    declared: Option<ValueType>,
    value: HostValue,
    failure: Option<BridgeError>,
    children: Vec<InspectorNode>,
    expanded: bool,
    visited: bool,
}

impl InspectorNode {
    /// Root node named `(root)` with the default depth
    pub fn root(resolver: Arc<MemberResolver>, value: HostValue) -> Self {
        Self::root_with_depth(resolver, value, DEFAULT_DEPTH)
    }

    /// Root node named `(root)` materializing `depth` levels
    pub fn root_with_depth(resolver: Arc<MemberResolver>, value: HostValue, depth: usize) -> Self {
        let mut node = Self::build(resolver, ROOT_NAME.to_string(), None, value, None, depth);
        node.visited = true;
        node
    }

    /// Root node with a custom name
    pub fn named(resolver: Arc<MemberResolver>, name: impl Into<String>, value: HostValue) -> Self {
        Self::with_failure(resolver, name, value, None)
    }

    /// Root node carrying the failure raised while obtaining `value`
    pub fn with_failure(
        resolver: Arc<MemberResolver>,
        name: impl Into<String>,
        value: HostValue,
        failure: Option<BridgeError>,
    ) -> Self {
        let mut node = Self::build(resolver, name.into(), None, value, failure, DEFAULT_DEPTH);
        node.visited = true;
        node
    }

    fn build(
        resolver: Arc<MemberResolver>,
        name: String,
        declared: Option<ValueType>,
        value: HostValue,
        failure: Option<BridgeError>,
        depth: usize,
    ) -> Self {
        let mut node = Self {
            resolver,
            name,
            declared,
            value,
            failure,
            children: Vec::new(),
            expanded: false,
            visited: false,
        };
        node.expand(depth);
        node
    }

    /// Build children down to `depth` levels, once
    fn expand(&mut self, depth: usize) {
        if depth == 0 || self.expanded || self.failure.is_some() {
            return;
        }
        self.expanded = true;
        let Some(object) = self.value.as_object() else {
            return;
        };

        let table = self.resolver.resolve(object.host_class());
        let mut children = Vec::new();
        for name in table.names() {
            let Some([member]) = table.group(name) else {
                continue;
            };
            if !member.is_property() || !member.is_readable() {
                continue;
            }
            let (value, failure) = match member.get(&**object) {
                Ok(value) => (value, None),
                Err(err) => (HostValue::Undefined, Some(err)),
            };
            children.push(self.child(name.clone(), Some(member.value_type()), value, failure, depth - 1));
        }

        if let Some(keyed) = object.as_keyed() {
            for key in keyed.keys() {
                let (value, failure) = match keyed.get(&key) {
                    Ok(value) => (value, None),
                    Err(source) => (
                        HostValue::Undefined,
                        Some(BridgeError::MemberRetrievalFailed {
                            member: format!("[{}]", key),
                            source,
                        }),
                    ),
                };
                children.push(self.child(format!("[{}]", key), None, value, failure, depth - 1));
            }
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        self.children = children;
    }

    fn child(
        &self,
        name: String,
        declared: Option<ValueType>,
        value: HostValue,
        failure: Option<BridgeError>,
        depth: usize,
    ) -> InspectorNode {
        Self::build(self.resolver.clone(), name, declared, value, failure, depth)
    }

    /// Materialize one more level below the children; idempotent
    pub fn visit(&mut self) -> &[InspectorNode] {
        if !self.visited {
            self.visited = true;
            for child in &mut self.children {
                child.expand(1);
            }
        }
        &self.children
    }

    /// Replace the captured value (e.g. after an edit) and rebuild the children
    pub fn set_value(&mut self, declared: Option<ValueType>, value: HostValue, failure: Option<BridgeError>) {
        self.declared = declared;
        self.value = value;
        self.failure = failure;
        self.children.clear();
        self.expanded = false;
        self.visited = false;
        self.expand(DEFAULT_DEPTH);
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Captured value
    pub fn value(&self) -> &HostValue {
        &self.value
    }

    /// Failure raised while reading the value
    pub fn failure(&self) -> Option<&BridgeError> {
        self.failure.as_ref()
    }

    /// Materialized children, sorted by name
    pub fn children(&self) -> &[InspectorNode] {
        &self.children
    }

    /// Child with the given name
    pub fn child_named(&self, name: &str) -> Option<&InspectorNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Mutable child with the given name, for visiting deeper levels
    pub fn child_named_mut(&mut self, name: &str) -> Option<&mut InspectorNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Whether the children of this node have been built
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Type shown for the node: declared type, or runtime type when undeclared.
    /// Null without a concrete declaration shows as `Any`.
    pub fn type_name(&self) -> Option<String> {
        match self.declared {
            Some(ty) if ty != ValueType::Any => Some(ty.name().to_string()),
            _ => match &self.value {
                HostValue::Undefined => None,
                HostValue::Null => Some(ValueType::Any.name().to_string()),
                value => Some(value.type_name().to_string()),
            },
        }
    }

    fn value_text(&self) -> String {
        match &self.value {
            HostValue::Str(s) => format!("\"{}\"", s),
            value => value.to_string(),
        }
    }
}

impl fmt::Display for InspectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failure.is_some() {
            return write!(f, "{} - (exception occured)", self.name);
        }
        match self.type_name() {
            Some(ty) if !self.value.is_undefined() => {
                write!(f, "{}: {} = {}", self.name, ty, self.value_text())
            }
            _ => write!(f, "{} - (undefined property)", self.name),
        }
    }
}

impl fmt::Debug for InspectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InspectorNode")
            .field("node", &self.to_string())
            .field("children", &self.children)
            .finish()
    }
}
