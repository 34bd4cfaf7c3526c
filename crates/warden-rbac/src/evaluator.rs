//! Permission and role-management decisions.
//!
//! Every function here is pure and total over already-loaded data. Missing
//! roles or permissions resolve to the most restrictive answer.

use tracing::debug;

use crate::permissions::EffectivePermissions;
use crate::principal::Principal;
use crate::roles::{AuthorityLevel, Role};

/// Answers RBAC questions for one principal.
///
/// The effective permission set is aggregated once on construction, so
/// build one evaluator per request and reuse it.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator<'a> {
    principal: &'a Principal,
    permissions: EffectivePermissions,
}

impl<'a> PermissionEvaluator<'a> {
    /// Creates an evaluator for `principal`.
    pub fn new(principal: &'a Principal) -> Self {
        Self {
            principal,
            permissions: principal.effective_permissions(),
        }
    }

    /// The principal being evaluated.
    pub fn principal(&self) -> &'a Principal {
        self.principal
    }

    /// The aggregated permissions.
    pub fn permissions(&self) -> &EffectivePermissions {
        &self.permissions
    }

    /// Returns whether the principal's highest role is the top level.
    pub fn is_top_authority(&self) -> bool {
        self.permissions.is_all()
    }

    /// Returns the assigned role with the highest authority.
    pub fn highest_role(&self) -> Option<&'a Role> {
        self.principal.highest_role()
    }

    /// Returns the principal's highest authority level, if any role is assigned.
    pub fn highest_level(&self) -> Option<AuthorityLevel> {
        self.principal.highest_level()
    }

    /// Returns whether the principal holds a role with the given code.
    pub fn has_role(&self, code: &str) -> bool {
        self.principal.roles.iter().any(|role| role.code == code)
    }

    /// Returns whether the principal holds `code`.
    ///
    /// Always true for a top-authority principal (except for the empty code).
    /// Otherwise an exact-match membership test; no prefix matching.
    pub fn has_permission(&self, code: &str) -> bool {
        let granted = self.permissions.contains(code);
        if !granted {
            debug!(
                principal = %self.principal.id,
                permission = %code,
                "Permission denied"
            );
        }
        granted
    }

    /// Returns whether the principal holds at least one of `codes`.
    ///
    /// An empty list is never satisfied.
    pub fn has_any<I, S>(&self, codes: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .any(|code| self.permissions.contains(code.as_ref()))
    }

    /// Returns whether the principal holds every one of `codes`.
    ///
    /// An empty list is vacuously satisfied.
    pub fn has_all<I, S>(&self, codes: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .all(|code| self.permissions.contains(code.as_ref()))
    }

    /// Returns whether the principal may manage (assign, edit, revoke) `target`.
    ///
    /// Requires strictly greater authority: peers and superiors are never
    /// manageable, except by the top authority.
    pub fn can_manage_role(&self, target: &Role) -> bool {
        let allowed = can_manage_level(self.highest_level(), target.level);
        if !allowed {
            debug!(
                principal = %self.principal.id,
                target_role = %target.code,
                target_level = %target.level,
                "Role management denied"
            );
        }
        allowed
    }

    /// Returns whether the principal may manage the user `target`.
    ///
    /// - A principal never manages themselves through this path.
    /// - A principal without roles manages nobody.
    /// - A target without roles is manageable by any principal with a role.
    /// - Otherwise compares against the target's highest-authority role.
    pub fn can_manage_user(&self, target: &Principal) -> bool {
        if target.id == self.principal.id {
            debug!(principal = %self.principal.id, "Self-management denied");
            return false;
        }

        let Some(own) = self.highest_level() else {
            return false;
        };

        let allowed = match target.highest_level() {
            None => true,
            Some(target_level) => can_manage_level(Some(own), target_level),
        };

        if !allowed {
            debug!(
                principal = %self.principal.id,
                target = %target.id,
                "User management denied"
            );
        }
        allowed
    }
}

/// Core management rule over levels.
///
/// `manager` is the manager's highest level (`None` if it holds no role).
pub fn can_manage_level(manager: Option<AuthorityLevel>, target: AuthorityLevel) -> bool {
    match manager {
        None => false,
        Some(level) if level.is_top() => true,
        Some(level) => level.outranks(target),
    }
}
