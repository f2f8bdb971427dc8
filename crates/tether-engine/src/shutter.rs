//! Access shutter
//!
//! The shutter is the allow-list consulted by the member resolver before it
//! exposes any member declared directly on a type. It is default-deny: a type
//! is visible only after it has been granted by its exact fully-qualified
//! name. Granting a subclass does not make the members its parent declares
//! visible, and granting a parent does not extend to its subclasses.

use rustc_hash::FxHashSet;

use crate::error::{BridgeError, BridgeResult};

/// Default-deny allow-list over fully-qualified type names
#[derive(Debug, Clone, Default)]
pub struct ShutterPolicy {
    granted: FxHashSet<String>,
}

impl ShutterPolicy {
    /// Create a policy that denies every type
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy granting the given types
    pub fn with_grants<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut policy = Self::new();
        for ty in types {
            policy.grant(ty);
        }
        policy
    }

    /// Allow members declared on `ty` to be exposed
    pub fn grant(&mut self, ty: impl Into<String>) {
        let ty = ty.into();
        tracing::debug!(target: "tether::shutter", class = %ty, "granted");
        self.granted.insert(ty);
    }

    /// Whether members declared on `ty` may be exposed
    pub fn visible(&self, ty: &str) -> bool {
        self.granted.contains(ty)
    }

    /// Like [`visible`](Self::visible), but reports a denial as an error
    pub fn check(&self, ty: &str) -> BridgeResult<()> {
        if self.visible(ty) {
            Ok(())
        } else {
            Err(BridgeError::AccessDenied {
                class: ty.to_string(),
            })
        }
    }

    /// Granted type names, sorted
    pub fn granted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.granted.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of granted types
    pub fn len(&self) -> usize {
        self.granted.len()
    }

    /// Check if nothing is granted
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}
