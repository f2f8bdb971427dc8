//! Member tables

use std::any::TypeId;
use std::fmt;

use rustc_hash::FxHashMap;
use tether_sdk::{HostObject, HostValue};

use super::member::Member;
use super::overload;
use crate::error::{BridgeError, BridgeResult};

/// Exposed members of one concrete class, grouped by exposed name
pub struct MemberTable {
    class_name: String,
    type_id: TypeId,
    groups: FxHashMap<String, Vec<Member>>,
    names: Vec<String>,
}

impl MemberTable {
    pub(crate) fn new(class_name: &str, type_id: TypeId) -> Self {
        Self {
            class_name: class_name.to_string(),
            type_id,
            groups: FxHashMap::default(),
            names: Vec::new(),
        }
    }

    pub(crate) fn group_mut(&mut self, name: &str) -> &mut Vec<Member> {
        if !self.groups.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.groups.entry(name.to_string()).or_default()
    }

    /// Fully-qualified name of the resolved class
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Type identity the table is keyed by
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Exposed names, most-derived class first, declaration order within a class
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All members sharing `name`
    pub fn group(&self, name: &str) -> Option<&[Member]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Whether `name` is exposed
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// The field or accessor named `name`
    pub fn property(&self, name: &str) -> Option<&Member> {
        self.groups.get(name)?.iter().find(|m| m.is_property())
    }

    /// The overload set named `name`
    pub fn functions(&self, name: &str) -> Vec<&Member> {
        self.groups
            .get(name)
            .map(|group| group.iter().filter(|m| m.is_function()).collect())
            .unwrap_or_default()
    }

    /// Number of exposed names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if nothing is exposed
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn simple_name(&self) -> &str {
        self.class_name.rsplit('.').next().unwrap_or(&self.class_name)
    }

    fn unknown(&self, name: &str) -> BridgeError {
        BridgeError::UnknownMember {
            class: self.simple_name().to_string(),
            member: name.to_string(),
        }
    }

    /// Read property `name` of `object`
    pub fn get(&self, object: &dyn HostObject, name: &str) -> BridgeResult<HostValue> {
        self.property(name).ok_or_else(|| self.unknown(name))?.get(object)
    }

    /// Assign property `name` of `object`
    pub fn set(&self, object: &dyn HostObject, name: &str, value: HostValue) -> BridgeResult<()> {
        match self.property(name) {
            Some(member) => member.set(object, value),
            None if self.contains(name) => Err(BridgeError::ReadOnly {
                class: self.simple_name().to_string(),
                member: name.to_string(),
            }),
            None => Err(self.unknown(name)),
        }
    }

    /// Resolve the overload set `name` for `args` and call the winner
    pub fn invoke(&self, object: &dyn HostObject, name: &str, args: &[HostValue]) -> BridgeResult<HostValue> {
        let candidates = self.functions(name);
        if candidates.is_empty() {
            return Err(if self.contains(name) {
                BridgeError::NotCallable {
                    class: self.simple_name().to_string(),
                    member: name.to_string(),
                }
            } else {
                self.unknown(name)
            });
        }
        let member = overload::select(self.simple_name(), name, &candidates, args)?;
        member.invoke(object, args)
    }
}

impl fmt::Debug for MemberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberTable")
            .field("class", &self.class_name)
            .field("names", &self.names)
            .finish()
    }
}
