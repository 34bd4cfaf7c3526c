//! Permission codes and permission sets.
//!
//! A permission code is an opaque `resource:action` string such as
//! `"contract:approve"`. Only exact-match membership is ever tested; the
//! resource and action halves are never interpreted.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Opaque capability identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(String);

impl PermissionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for PermissionCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

// String's Ord is str's Ord, so BTreeSet lookups by &str are consistent.
impl Borrow<str> for PermissionCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Set of permission codes granted through a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<PermissionCode>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether this set contains the given code (exact match).
    pub fn contains(&self, code: &str) -> bool {
        self.permissions.contains(code)
    }

    /// Adds a permission to the set.
    pub fn grant(&mut self, code: impl Into<PermissionCode>) {
        self.permissions.insert(code.into());
    }

    /// Removes a permission from the set.
    pub fn revoke(&mut self, code: &str) {
        self.permissions.remove(code);
    }

    /// Adds every permission of `other` to this set.
    pub fn extend_from(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().cloned());
    }

    /// Returns all permissions in the set, in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionCode> {
        self.permissions.iter()
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl<C: Into<PermissionCode>> FromIterator<C> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Vec<&str>> for PermissionSet {
    fn from(codes: Vec<&str>) -> Self {
        codes.into_iter().collect()
    }
}

/// A principal's effective permissions.
///
/// Top-authority principals hold [`EffectivePermissions::All`]; everyone else
/// holds the union of their roles' capability sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectivePermissions {
    /// Universal set: every non-empty code is granted.
    All,
    /// Explicit union of role capability sets.
    Set(PermissionSet),
}

impl EffectivePermissions {
    /// Returns whether `code` is granted. Empty codes are never granted.
    pub fn contains(&self, code: &str) -> bool {
        if code.is_empty() {
            return false;
        }
        match self {
            EffectivePermissions::All => true,
            EffectivePermissions::Set(set) => set.contains(code),
        }
    }

    /// Returns whether this is the universal set.
    pub fn is_all(&self) -> bool {
        matches!(self, EffectivePermissions::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_set_operations() {
        let mut set = PermissionSet::empty();
        assert!(!set.contains("contract:read"));

        set.grant("contract:read");
        assert!(set.contains("contract:read"));

        set.grant("contract:read"); // Duplicate grant is no-op
        assert_eq!(set.len(), 1);

        set.grant("contract:update");
        assert_eq!(set.len(), 2);

        set.revoke("contract:read");
        assert!(!set.contains("contract:read"));
        assert!(set.contains("contract:update"));
    }

    #[test]
    fn test_no_prefix_matching() {
        let set = PermissionSet::from(vec!["contract:read"]);

        assert!(!set.contains("contract"));
        assert!(!set.contains("contract:"));
        assert!(!set.contains("contract:read:all"));
        assert!(!set.contains("Contract:Read"));
    }

    #[test]
    fn test_extend_from_is_union() {
        let mut a = PermissionSet::from(vec!["a:read", "b:read"]);
        let b = PermissionSet::from(vec!["b:read", "c:read"]);
        a.extend_from(&b);

        let codes: Vec<&str> = a.iter().map(PermissionCode::as_str).collect();
        assert_eq!(codes, vec!["a:read", "b:read", "c:read"]);
    }

    #[test]
    fn test_effective_permissions() {
        assert!(EffectivePermissions::All.contains("anything:goes"));
        assert!(!EffectivePermissions::All.contains(""));

        let set = EffectivePermissions::Set(PermissionSet::from(vec!["a:read"]));
        assert!(set.contains("a:read"));
        assert!(!set.contains("a:write"));
        assert!(!set.is_all());
    }
}
