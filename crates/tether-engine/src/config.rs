//! Bridge configuration (tether.toml)
//!
//! ```toml
//! [shutter]
//! grant = ["demo.model.Person", "demo.model.Address"]
//!
//! [resolver]
//! capabilities = "READ|INVOKE"   # default "ALL"
//!
//! [wrap]
//! max_adapter_depth = 8
//!
//! [inspector]
//! depth = 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_sdk::Capability;
use thiserror::Error;

use crate::inspector::DEFAULT_DEPTH;
use crate::shutter::ShutterPolicy;
use crate::wrap::DEFAULT_MAX_ADAPTER_DEPTH;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Allow-list
    #[serde(default)]
    pub shutter: ShutterConfig,

    /// Member resolution
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Wrap pipeline
    #[serde(default)]
    pub wrap: WrapConfig,

    /// Inspector
    #[serde(default)]
    pub inspector: InspectorConfig,
}

/// `[shutter]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShutterConfig {
    /// Fully-qualified names of granted types
    #[serde(default)]
    pub grant: Vec<String>,
}

/// `[resolver]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolverConfig {
    /// Exposed capabilities, e.g. `"READ|INVOKE"` (default: "ALL")
    #[serde(default = "default_capabilities")]
    pub capabilities: String,
}

fn default_capabilities() -> String {
    Capability::ALL.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            capabilities: default_capabilities(),
        }
    }
}

/// `[wrap]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WrapConfig {
    /// Bound on consecutive adapter substitutions (default: 8)
    #[serde(default = "default_max_adapter_depth")]
    pub max_adapter_depth: usize,
}

fn default_max_adapter_depth() -> usize {
    DEFAULT_MAX_ADAPTER_DEPTH
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            max_adapter_depth: default_max_adapter_depth(),
        }
    }
}

/// `[inspector]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectorConfig {
    /// Levels materialized below a new root (default: 2)
    #[serde(default = "default_inspector_depth")]
    pub depth: usize,
}

fn default_inspector_depth() -> usize {
    DEFAULT_DEPTH
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            depth: default_inspector_depth(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capabilities()?;
        if let Some(name) = self.shutter.grant.iter().find(|name| !is_valid_type_name(name)) {
            return Err(ConfigError::Invalid(format!("invalid type name in shutter.grant: '{}'", name)));
        }
        if self.inspector.depth == 0 {
            return Err(ConfigError::Invalid("inspector.depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parsed `resolver.capabilities`
    pub fn capabilities(&self) -> Result<Capability, ConfigError> {
        Capability::from_combined_str(&self.resolver.capabilities).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "unknown capability in resolver.capabilities: '{}'",
                self.resolver.capabilities
            ))
        })
    }

    /// Shutter policy granting `shutter.grant`
    pub fn policy(&self) -> ShutterPolicy {
        ShutterPolicy::with_grants(self.shutter.grant.iter().cloned())
    }
}

fn is_valid_type_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            part.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
                && part.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}
