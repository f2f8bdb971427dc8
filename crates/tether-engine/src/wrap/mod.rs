//! Wrap pipeline
//!
//! Converts host values into script-visible values. Objects go through an
//! ordered list of links; the standard list is
//!
//! 1. [`AdapterLink`]: substitute objects that have a registered adapter and
//!    restart the chain with the substitute
//! 2. [`CollectionLink`]: wrap keyed and indexed hosts with synthetic members
//! 3. [`DefaultLink`]: wrap anything else reflectively
//!
//! Each link either wraps the object, substitutes it, or delegates to the next
//! link. Substitution restarts at the first link, at most
//! `max_adapter_depth` times in a row. Primitives and functions never enter
//! the chain.

mod collection;
mod links;
mod object;
mod reflective;
mod scope;
mod value;

pub use collection::CollectionObject;
pub use links::{AdapterLink, CollectionLink, DefaultLink};
pub use object::ScriptObject;
pub use reflective::{BoundMethod, ReflectiveObject};
pub use scope::WrapScope;
pub use value::{ScriptRef, ScriptValue};

use std::fmt;
use std::sync::Arc;

use tether_sdk::{HostRef, HostValue};

use crate::adapter::AdapterRegistry;
use crate::resolver::MemberResolver;

/// Default bound on consecutive adapter substitutions
pub const DEFAULT_MAX_ADAPTER_DEPTH: usize = 8;

/// Result of offering an object to a link
pub enum LinkOutcome {
    /// The link produced the script-visible value
    Wrapped(ScriptValue),
    /// Wrap this value instead, starting again at the first link
    Substitute(HostValue),
    /// Pass the object to the next link
    Delegate,
}

/// One strategy in the wrap chain
pub trait WrapLink: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Offer `object` to this link
    fn wrap(&self, object: &HostRef, scope: &WrapScope) -> LinkOutcome;
}

/// Ordered chain of wrap links
pub struct WrapPipeline {
    links: Vec<Arc<dyn WrapLink>>,
    resolver: Arc<MemberResolver>,
    max_adapter_depth: usize,
}

impl WrapPipeline {
    /// Create a pipeline with no links; every object is wrapped reflectively
    pub fn new(resolver: Arc<MemberResolver>) -> Self {
        Self {
            links: Vec::new(),
            resolver,
            max_adapter_depth: DEFAULT_MAX_ADAPTER_DEPTH,
        }
    }

    /// Create the adapter → collection → default pipeline
    pub fn standard(resolver: Arc<MemberResolver>, adapters: Arc<AdapterRegistry>) -> Self {
        let mut pipeline = Self::new(resolver.clone());
        pipeline.push_back(Arc::new(AdapterLink::new(adapters)));
        pipeline.push_back(Arc::new(CollectionLink::new(resolver.clone())));
        pipeline.push_back(Arc::new(DefaultLink::new(resolver)));
        pipeline
    }

    /// Set the bound on consecutive adapter substitutions
    pub fn with_max_adapter_depth(mut self, depth: usize) -> Self {
        self.max_adapter_depth = depth;
        self
    }

    /// Bound on consecutive adapter substitutions
    pub fn max_adapter_depth(&self) -> usize {
        self.max_adapter_depth
    }

    /// Resolver used for reflective wrapping
    pub fn resolver(&self) -> &Arc<MemberResolver> {
        &self.resolver
    }

    /// Insert `link` at `index` (clamped to the chain length)
    pub fn insert_link(&mut self, index: usize, link: Arc<dyn WrapLink>) {
        let index = index.min(self.links.len());
        tracing::debug!(target: "tether::wrap", link = link.name(), index, "wrap link inserted");
        self.links.insert(index, link);
    }

    /// Insert `link` before every other link
    pub fn push_front(&mut self, link: Arc<dyn WrapLink>) {
        self.insert_link(0, link);
    }

    /// Append `link` after every other link
    pub fn push_back(&mut self, link: Arc<dyn WrapLink>) {
        self.insert_link(self.links.len(), link);
    }

    /// Link names in chain order
    pub fn link_names(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.name()).collect()
    }

    /// Run `object` through the chain
    pub(crate) fn wrap_object(&self, object: &HostRef, scope: &WrapScope) -> ScriptValue {
        let mut current = object.clone();
        let mut substitutions = 0;

        'chain: loop {
            for link in &self.links {
                match link.wrap(&current, scope) {
                    LinkOutcome::Wrapped(value) => {
                        tracing::trace!(
                            target: "tether::wrap",
                            link = link.name(),
                            class = current.host_class().name(),
                            "wrapped"
                        );
                        return value;
                    }
                    LinkOutcome::Delegate => {}
                    LinkOutcome::Substitute(HostValue::Object(next)) => {
                        substitutions += 1;
                        if substitutions > self.max_adapter_depth {
                            tracing::warn!(
                                target: "tether::wrap",
                                class = current.host_class().name(),
                                depth = self.max_adapter_depth,
                                "adapter substitution limit reached, wrapping reflectively"
                            );
                            return links::reflect(&self.resolver, &current);
                        }
                        tracing::trace!(
                            target: "tether::wrap",
                            link = link.name(),
                            from = current.host_class().name(),
                            to = next.host_class().name(),
                            "substituted"
                        );
                        current = next;
                        continue 'chain;
                    }
                    LinkOutcome::Substitute(other) => {
                        return ScriptValue::from_primitive(&other).unwrap_or_default();
                    }
                }
            }
            return links::reflect(&self.resolver, &current);
        }
    }
}

impl fmt::Debug for WrapPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapPipeline")
            .field("links", &self.link_names())
            .field("max_adapter_depth", &self.max_adapter_depth)
            .finish()
    }
}
