//! Bridge context
//!
//! A [`BridgeContext`] owns one resolver, one adapter registry and one wrap
//! pipeline. It is built once, shared through `Arc`, and hands out wrap
//! scopes and inspection roots.

use std::fmt;
use std::sync::Arc;

use tether_sdk::{Capability, HostClass, HostObject, HostValue};

use crate::adapter::{Adapter, AdapterRegistry};
use crate::config::{BridgeConfig, ConfigError};
use crate::inspector::{InspectorNode, DEFAULT_DEPTH};
use crate::resolver::{MemberResolver, MemberTable};
use crate::shutter::ShutterPolicy;
use crate::wrap::{WrapLink, WrapPipeline, WrapScope, DEFAULT_MAX_ADAPTER_DEPTH};

/// Shared bridge state
pub struct BridgeContext {
    resolver: Arc<MemberResolver>,
    adapters: Arc<AdapterRegistry>,
    pipeline: Arc<WrapPipeline>,
    inspector_depth: usize,
}

impl BridgeContext {
    /// Start building a context
    pub fn builder() -> BridgeContextBuilder {
        BridgeContextBuilder::default()
    }

    /// Build a context from configuration
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Ok(BridgeContextBuilder::from_config(config)?.build())
    }

    /// Member resolver
    pub fn resolver(&self) -> &Arc<MemberResolver> {
        &self.resolver
    }

    /// Adapter registry
    pub fn adapters(&self) -> &Arc<AdapterRegistry> {
        &self.adapters
    }

    /// Wrap pipeline
    pub fn pipeline(&self) -> &Arc<WrapPipeline> {
        &self.pipeline
    }

    /// Member table of `class`
    pub fn resolve(&self, class: &'static HostClass) -> Arc<MemberTable> {
        self.resolver.resolve(class)
    }

    /// Whether members declared on the class of `object` are visible
    pub fn is_exposed(&self, object: &dyn HostObject) -> bool {
        self.resolver.policy().visible(object.host_class().name())
    }

    /// Open a fresh wrap scope
    pub fn new_scope(&self) -> WrapScope {
        WrapScope::new(self.pipeline.clone())
    }

    /// Inspection root over `value`
    pub fn inspect(&self, value: HostValue) -> InspectorNode {
        InspectorNode::root_with_depth(self.resolver.clone(), value, self.inspector_depth)
    }
}

impl fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeContext")
            .field("resolver", &self.resolver)
            .field("adapters", &self.adapters)
            .field("pipeline", &self.pipeline)
            .field("inspector_depth", &self.inspector_depth)
            .finish()
    }
}

/// Builder for [`BridgeContext`]
pub struct BridgeContextBuilder {
    policy: ShutterPolicy,
    capabilities: Capability,
    adapters: AdapterRegistry,
    links: Vec<(usize, Arc<dyn WrapLink>)>,
    max_adapter_depth: usize,
    inspector_depth: usize,
}

impl Default for BridgeContextBuilder {
    fn default() -> Self {
        Self {
            policy: ShutterPolicy::new(),
            capabilities: Capability::ALL,
            adapters: AdapterRegistry::new(),
            links: Vec::new(),
            max_adapter_depth: DEFAULT_MAX_ADAPTER_DEPTH,
            inspector_depth: DEFAULT_DEPTH,
        }
    }
}

impl BridgeContextBuilder {
    /// Builder preloaded from configuration
    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            policy: config.policy(),
            capabilities: config.capabilities()?,
            max_adapter_depth: config.wrap.max_adapter_depth,
            inspector_depth: config.inspector.depth,
            ..Self::default()
        })
    }

    /// Grant a type on the shutter
    pub fn grant(mut self, ty: impl Into<String>) -> Self {
        self.policy.grant(ty);
        self
    }

    /// Replace the shutter policy
    pub fn policy(mut self, policy: ShutterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set exposed capabilities
    pub fn capabilities(mut self, capabilities: Capability) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Register an adapter for host type `T`
    pub fn adapter<T: HostObject>(mut self, adapter: impl Adapter + 'static) -> Self {
        self.adapters.register::<T>(adapter);
        self
    }

    /// Register an adapter for the type described by `class`
    pub fn adapter_for(mut self, class: &HostClass, adapter: impl Adapter + 'static) -> Self {
        self.adapters.register_for(class, adapter);
        self
    }

    /// Insert a custom link into the standard chain at `index`
    pub fn link(mut self, index: usize, link: Arc<dyn WrapLink>) -> Self {
        self.links.push((index, link));
        self
    }

    /// Bound on consecutive adapter substitutions
    pub fn max_adapter_depth(mut self, depth: usize) -> Self {
        self.max_adapter_depth = depth;
        self
    }

    /// Levels materialized below new inspection roots
    pub fn inspector_depth(mut self, depth: usize) -> Self {
        self.inspector_depth = depth;
        self
    }

    /// Finish the context
    pub fn build(self) -> BridgeContext {
        let resolver = Arc::new(MemberResolver::new(self.policy, self.capabilities));
        let adapters = Arc::new(self.adapters);
        let mut pipeline = WrapPipeline::standard(resolver.clone(), adapters.clone())
            .with_max_adapter_depth(self.max_adapter_depth);
        for (index, link) in self.links {
            pipeline.insert_link(index, link);
        }
        tracing::debug!(
            target: "tether::context",
            granted = resolver.policy().len(),
            adapters = adapters.len(),
            links = ?pipeline.link_names(),
            "bridge context built"
        );
        BridgeContext {
            resolver,
            adapters,
            pipeline: Arc::new(pipeline),
            inspector_depth: self.inspector_depth,
        }
    }
}
