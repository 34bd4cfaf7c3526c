#![allow(clippy::match_same_arms)]
//! Authority levels and role records.
//!
//! Five authority levels form a strict total order. The lowest ordinal is the
//! highest authority:
//!
//! | Ordinal | Level       | Region scoping |
//! |---------|-------------|----------------|
//! | 0       | SuperAdmin  | global         |
//! | 1       | Director    | global         |
//! | 2       | Head        | scoped         |
//! | 3       | Manager     | scoped         |
//! | 4       | Staff       | scoped         |
//!
//! Raw level values coming from the role-management collaborator are
//! converted exactly once, through [`AuthorityLevel::from_raw`]. Anything
//! unrecognized becomes [`AuthorityLevel::Staff`].

use serde::{Deserialize, Serialize};
use tracing::warn;
use warden_types::RoleId;

use crate::permissions::{PermissionCode, PermissionSet};

/// Authority level of a role.
///
/// The derived `Ord` follows declaration order, so `SuperAdmin < Director <
/// ... < Staff`: *smaller means more authority*.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorityLevel {
    /// Top authority. Bypasses every permission and management check.
    SuperAdmin,
    /// Organisation-wide leadership.
    Director,
    /// Head of a region or department.
    Head,
    /// Manager of a team within a region.
    Manager,
    /// Lowest authority, and the fallback for malformed values.
    #[default]
    Staff,
}

impl AuthorityLevel {
    /// All levels, highest authority first.
    pub const ALL: [AuthorityLevel; 5] = [
        AuthorityLevel::SuperAdmin,
        AuthorityLevel::Director,
        AuthorityLevel::Head,
        AuthorityLevel::Manager,
        AuthorityLevel::Staff,
    ];

    /// The top authority level.
    pub const TOP: AuthorityLevel = AuthorityLevel::SuperAdmin;

    /// The lowest authority level.
    pub const LOWEST: AuthorityLevel = AuthorityLevel::Staff;

    /// Returns the ordinal (0 = highest authority).
    pub fn ordinal(self) -> u8 {
        match self {
            AuthorityLevel::SuperAdmin => 0,
            AuthorityLevel::Director => 1,
            AuthorityLevel::Head => 2,
            AuthorityLevel::Manager => 3,
            AuthorityLevel::Staff => 4,
        }
    }

    /// Converts an ordinal back to a level. Out-of-range values map to
    /// [`AuthorityLevel::LOWEST`].
    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            0 => AuthorityLevel::SuperAdmin,
            1 => AuthorityLevel::Director,
            2 => AuthorityLevel::Head,
            3 => AuthorityLevel::Manager,
            _ => AuthorityLevel::Staff,
        }
    }

    /// Converts a raw external value into a level.
    ///
    /// Accepts the level names in any case with `_`, `-` or no separator
    /// (`SUPER_ADMIN`, `super-admin`, `SuperAdmin`) as well as the numeric
    /// ordinals `"0"` to `"4"` written as a single digit. Every other value,
    /// including `"00"`, `"+0"` and the empty string, maps to
    /// [`AuthorityLevel::LOWEST`]. This function is total.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_rbac::roles::AuthorityLevel;
    ///
    /// assert_eq!(AuthorityLevel::from_raw("DIRECTOR"), AuthorityLevel::Director);
    /// assert_eq!(AuthorityLevel::from_raw("super-admin"), AuthorityLevel::SuperAdmin);
    /// assert_eq!(AuthorityLevel::from_raw("2"), AuthorityLevel::Head);
    /// assert_eq!(AuthorityLevel::from_raw("root"), AuthorityLevel::Staff);
    /// ```
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let [digit @ b'0'..=b'4'] = trimmed.as_bytes() {
            return Self::from_ordinal(digit - b'0');
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "super_admin" | "super-admin" | "superadmin" => AuthorityLevel::SuperAdmin,
            "director" => AuthorityLevel::Director,
            "head" => AuthorityLevel::Head,
            "manager" => AuthorityLevel::Manager,
            "staff" => AuthorityLevel::Staff,
            _ => {
                warn!(raw = %raw, "Unrecognized authority level, using lowest authority");
                AuthorityLevel::LOWEST
            }
        }
    }

    /// Canonical name, as produced by serialization.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthorityLevel::SuperAdmin => "SUPER_ADMIN",
            AuthorityLevel::Director => "DIRECTOR",
            AuthorityLevel::Head => "HEAD",
            AuthorityLevel::Manager => "MANAGER",
            AuthorityLevel::Staff => "STAFF",
        }
    }

    /// Returns whether this is the top authority level.
    pub fn is_top(self) -> bool {
        self == Self::TOP
    }

    /// Returns whether this level has strictly greater authority than `other`.
    pub fn outranks(self, other: AuthorityLevel) -> bool {
        self.ordinal() < other.ordinal()
    }

    /// Returns whether principals at this level see data across all regions.
    ///
    /// Only the two highest levels are unscoped.
    pub fn has_global_visibility(self) -> bool {
        match self {
            AuthorityLevel::SuperAdmin => true,
            AuthorityLevel::Director => true,
            AuthorityLevel::Head => false,
            AuthorityLevel::Manager => false,
            AuthorityLevel::Staff => false,
        }
    }
}

impl std::fmt::Display for AuthorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role assigned to principals.
///
/// Owned by the role-management collaborator; read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    /// Stable role code (e.g. `"regional_manager"`).
    pub code: String,
    pub level: AuthorityLevel,
    /// Optional department tag.
    pub department: Option<String>,
    /// Built-in roles that cannot be edited through the admin surface.
    pub is_system: bool,
    /// Aggregated capability set reachable through this role.
    pub permissions: PermissionSet,
}

impl Role {
    /// Creates a role with no department, no permissions and `is_system = false`.
    pub fn new(id: RoleId, code: impl Into<String>, level: AuthorityLevel) -> Self {
        Self {
            id,
            code: code.into(),
            level,
            department: None,
            is_system: false,
            permissions: PermissionSet::empty(),
        }
    }

    /// Sets the department tag.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Marks the role as a system role.
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Grants a permission code.
    pub fn with_permission(mut self, code: impl Into<PermissionCode>) -> Self {
        self.permissions.grant(code.into());
        self
    }

    /// Converts a boundary record, applying the defaulting level conversion.
    pub fn from_record(record: RoleRecord) -> Self {
        Self {
            id: RoleId::new(record.id),
            level: AuthorityLevel::from_raw(&record.level),
            code: record.code,
            department: record.department.filter(|d| !d.is_empty()),
            is_system: record.is_system,
            permissions: record.permissions.into_iter().collect(),
        }
    }
}

/// Role as delivered by the role-management collaborator.
///
/// `level` is kept raw; [`Role::from_record`] is the only place it is
/// interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: u64,
    pub code: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl From<RoleRecord> for Role {
    fn from(record: RoleRecord) -> Self {
        Role::from_record(record)
    }
}
