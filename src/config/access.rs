// Author: Dustin Pilgrim
// License: MIT

use crate::ConfigError;

use super::{Config, Member, Value};

impl Config {
    /// Case-insensitive lookup: the local mapping first, then the inherits
    /// chain. The lexical parent is never consulted.
    pub fn get(&self, key: &str) -> Option<Member> {
        let lower = key.to_lowercase();
        if let Some(member) = self.inner.borrow().members.get(&lower) {
            return Some(member.clone());
        }
        self.inherits()?.get(&lower)
    }

    /// The property value under `key`, if it names a property.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        match self.get(key)? {
            Member::Property(node) => Some(node.value),
            Member::Class(_) => None,
        }
    }

    /// The nested class under `key`, if it names one.
    pub fn get_class(&self, key: &str) -> Option<Config> {
        match self.get(key)? {
            Member::Class(config) => Some(config),
            Member::Property(_) => None,
        }
    }

    /// Insert or replace a member. Replacing keeps the member's original
    /// position; a new key appends.
    pub fn set(&self, member: Member) {
        let lower = member.name().to_lowercase();
        self.inner.borrow_mut().members.insert(lower, member);
    }

    /// Remove a local member, shifting later members up. Inherited members
    /// cannot be removed through a child scope.
    pub fn remove(&self, key: &str) -> Option<Member> {
        self.inner.borrow_mut().members.shift_remove(&key.to_lowercase())
    }

    /// Original-case member names: own members in insertion order, then any
    /// inherited names not shadowed locally.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inner
            .borrow()
            .members
            .values()
            .map(|m| m.name())
            .collect();
        if let Some(base) = self.inherits() {
            let own = self.inner.borrow();
            for name in base.keys() {
                if !own.members.contains_key(&name.to_lowercase()) {
                    keys.push(name);
                }
            }
        }
        keys
    }

    /// The local members in insertion order. Inherited members are not
    /// included; follow [`Config::inherits`] for those.
    pub fn members(&self) -> Vec<Member> {
        self.inner.borrow().members.values().cloned().collect()
    }

    /// Number of local members, inherited ones excluded.
    pub fn len(&self) -> usize {
        self.inner.borrow().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().members.is_empty()
    }

    /// Append a member during decode. A case-insensitive collision with an
    /// existing local member is an error.
    pub(crate) fn add(&self, member: Member) -> Result<(), ConfigError> {
        let name = member.name();
        let lower = name.to_lowercase();
        let mut inner = self.inner.borrow_mut();
        if inner.members.contains_key(&lower) {
            return Err(ConfigError::DuplicateMember {
                name,
                scope: inner.name.clone(),
            });
        }
        inner.members.insert(lower, member);
        Ok(())
    }

    /// Resolve a class name for inheritance: this scope (inherited members
    /// included), then each lexically enclosing scope outward. A property
    /// under the name does not shadow a class further out.
    pub(crate) fn find_class(&self, name: &str) -> Option<Config> {
        if let Some(Member::Class(config)) = self.get(name) {
            return Some(config);
        }
        self.parent()?.find_class(name)
    }
}
