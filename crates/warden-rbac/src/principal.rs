//! The authenticated actor and its boundary record.

use serde::{Deserialize, Serialize};
use warden_types::{PrincipalId, RegionId};

use crate::permissions::{EffectivePermissions, PermissionSet};
use crate::roles::{AuthorityLevel, Role, RoleRecord};

/// The actor making a request.
///
/// Built at authentication time and immutable for the lifetime of the
/// request. Roles keep the order the identity collaborator delivered them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    /// Assigned region, if any. Drives region scoping.
    pub region: Option<RegionId>,
    pub roles: Vec<Role>,
}

impl Principal {
    /// Creates a principal with no region and no roles.
    pub fn new(id: PrincipalId) -> Self {
        Self {
            id,
            region: None,
            roles: Vec::new(),
        }
    }

    /// Sets the assigned region.
    pub fn with_region(mut self, region: RegionId) -> Self {
        self.region = Some(region);
        self
    }

    /// Appends a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    /// Returns the assigned role with the smallest ordinal.
    ///
    /// When several roles share the highest level, the first one wins.
    pub fn highest_role(&self) -> Option<&Role> {
        self.roles.iter().min_by_key(|role| role.level)
    }

    /// Returns the level of [`highest_role`](Self::highest_role).
    pub fn highest_level(&self) -> Option<AuthorityLevel> {
        self.highest_role().map(|role| role.level)
    }

    /// Returns whether the highest assigned role is the top level.
    pub fn is_top_authority(&self) -> bool {
        self.highest_level().is_some_and(AuthorityLevel::is_top)
    }

    /// Union of every role's capability set, or the universal set for a
    /// top-authority principal.
    pub fn effective_permissions(&self) -> EffectivePermissions {
        if self.is_top_authority() {
            return EffectivePermissions::All;
        }

        let mut union = PermissionSet::empty();
        for role in &self.roles {
            union.extend_from(&role.permissions);
        }
        EffectivePermissions::Set(union)
    }

    /// Converts a boundary record.
    pub fn from_record(record: PrincipalRecord) -> Self {
        Self {
            id: PrincipalId::new(record.id),
            region: record.region_id.map(RegionId::new),
            roles: record.roles.into_iter().map(Role::from_record).collect(),
        }
    }
}

/// Principal as delivered by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    pub id: u64,
    #[serde(default)]
    pub region_id: Option<u64>,
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
}

impl From<PrincipalRecord> for Principal {
    fn from(record: PrincipalRecord) -> Self {
        Principal::from_record(record)
    }
}
